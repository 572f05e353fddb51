//! Labeled-row extraction from report text.
//!
//! Each variable appears in the report as a label line (the variable name,
//! usually followed by a unit in parentheses) with its projections on the
//! next line. For every variable a cascade of [`LabelPattern`]s is tried in
//! order; the first pattern that matches anywhere in the text selects the
//! data line, and the numeric tokens on that line become the reading.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use focus_report_ingest_models::VariableReading;
use regex::Regex;

use crate::PdfError;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?(?:\d*\.\d+|\d+)").expect("valid regex"));

/// Label shapes, in the order they are tried.
///
/// The unit-specific forms come first so that an unrelated mention of a
/// bare variable name earlier in the text does not win over the real table
/// row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPattern {
    /// `<name> (variação %)`, used by the price indices.
    PercentChange,
    /// `<name> (R$/US$)`, used by the exchange rate.
    ExchangeRate,
    /// `<name> (% a.a.)`, used by the policy rate.
    AnnualRate,
    /// `<name> (% de crescimento)`, used by GDP and industrial output.
    Growth,
    /// `<name>` followed by anything.
    Generic,
}

impl LabelPattern {
    /// Every pattern, in priority order.
    pub const CASCADE: [Self; 5] = [
        Self::PercentChange,
        Self::ExchangeRate,
        Self::AnnualRate,
        Self::Growth,
        Self::Generic,
    ];

    /// Escaped unit suffix, or `None` for [`Self::Generic`].
    const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::PercentChange => Some(r"\(variação %\)"),
            Self::ExchangeRate => Some(r"\(R\$/US\$\)"),
            Self::AnnualRate => Some(r"\(% a\.a\.\)"),
            Self::Growth => Some(r"\(% de crescimento\)"),
            Self::Generic => None,
        }
    }

    /// Builds the regex for `name`. Capture group 1 is the line after the
    /// label line.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Regex`] if the pattern fails to compile.
    pub fn build(self, name: &str) -> Result<Regex, PdfError> {
        let name = regex::escape(name);
        let pattern = match self.suffix() {
            Some(suffix) => format!(r"{name}\s*{suffix}[^\n]*\n([^\n]*)"),
            None => format!(r"{name}[^\n]*\n([^\n]*)"),
        };
        Ok(Regex::new(&pattern)?)
    }
}

/// Returns every numeric token on `line`, left to right.
#[must_use]
pub fn numeric_tokens(line: &str) -> Vec<&str> {
    NUMBER_RE.find_iter(line).map(|m| m.as_str()).collect()
}

/// The compiled cascade for one variable.
#[derive(Debug)]
struct VariablePatterns {
    name: String,
    cascade: Vec<(LabelPattern, Regex)>,
}

impl VariablePatterns {
    fn new(name: &str) -> Result<Self, PdfError> {
        let cascade = LabelPattern::CASCADE
            .iter()
            .map(|&pattern| pattern.build(name).map(|re| (pattern, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_owned(),
            cascade,
        })
    }

    /// Returns the data line selected by the first matching pattern.
    fn data_line<'t>(&self, text: &'t str) -> Option<(LabelPattern, &'t str)> {
        self.cascade.iter().find_map(|(pattern, re)| {
            let line = re.captures(text)?.get(1)?.as_str();
            Some((*pattern, line.trim()))
        })
    }
}

/// Extracts readings for a fixed set of variables from report text.
///
/// Patterns are compiled once in [`ReportExtractor::new`] and reused for
/// every document.
#[derive(Debug)]
pub struct ReportExtractor {
    variables: Vec<VariablePatterns>,
}

impl ReportExtractor {
    /// Compiles the pattern cascade for each variable name.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Regex`] if any pattern fails to compile.
    pub fn new<S: AsRef<str>>(variables: &[S]) -> Result<Self, PdfError> {
        let variables = variables
            .iter()
            .map(|name| VariablePatterns::new(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { variables })
    }

    /// Names of the variables this extractor looks for.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Extracts a reading for every variable found in `text`.
    ///
    /// Variables without a matching label, or whose data line holds no
    /// numbers, are left out of the map.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeMap<String, VariableReading> {
        let mut readings = BTreeMap::new();

        for variable in &self.variables {
            let Some((pattern, line)) = variable.data_line(text) else {
                log::debug!("No label found for {}", variable.name);
                continue;
            };

            let tokens = numeric_tokens(line);
            let Some(reading) = VariableReading::from_tokens(&tokens, line) else {
                log::debug!(
                    "{} matched {pattern:?} but line has no numbers: {line:?}",
                    variable.name
                );
                continue;
            };

            log::debug!("{} matched {pattern:?}: {line:?}", variable.name);
            readings.insert(variable.name.clone(), reading);
        }

        log::debug!(
            "Extracted {}/{} variables",
            readings.len(),
            self.variables.len()
        );

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(names: &[&str]) -> ReportExtractor {
        ReportExtractor::new(names).unwrap()
    }

    #[test]
    fn extracts_three_values_after_labeled_line() {
        let text = "Mediana - Agregado\nIPCA (variação %)\n5.5 4.2 3.8\n";
        let readings = extractor(&["IPCA"]).extract(text);
        let ipca = &readings["IPCA"];
        assert_eq!(ipca.current.as_deref(), Some("5.5"));
        assert_eq!(ipca.next_year.as_deref(), Some("4.2"));
        assert_eq!(ipca.two_years.as_deref(), Some("3.8"));
        assert_eq!(ipca.raw_line, "5.5 4.2 3.8");
    }

    #[test]
    fn unit_specific_label_wins_over_earlier_bare_mention() {
        let text = "Taxa de câmbio mencionada no texto\n99 98\n\
                    Taxa de câmbio (R$/US$) fim de período\n5.90 5.80 5.75\n";
        let readings = extractor(&["Taxa de câmbio"]).extract(text);
        assert_eq!(readings["Taxa de câmbio"].current.as_deref(), Some("5.90"));
    }

    #[test]
    fn suffix_patterns_cover_each_unit() {
        let text = "Meta Taxa Selic (% a.a.)\n15.00 12.25 10.50\n\
                    PIB Total (% de crescimento)\n2.21 1.70 1.90\n";
        let readings = extractor(&["Meta Taxa Selic", "PIB Total"]).extract(text);
        assert_eq!(readings["Meta Taxa Selic"].current.as_deref(), Some("15.00"));
        assert_eq!(readings["PIB Total"].two_years.as_deref(), Some("1.90"));
    }

    #[test]
    fn generic_fallback_handles_unknown_unit() {
        let text = "Conta corrente (US$ bilhões)\n-56.0 -51.5 -48.0\n";
        let compiled = VariablePatterns::new("Conta corrente").unwrap();
        let (pattern, line) = compiled.data_line(text).unwrap();
        assert_eq!(pattern, LabelPattern::Generic);
        assert_eq!(line, "-56.0 -51.5 -48.0");

        let readings = extractor(&["Conta corrente"]).extract(text);
        let reading = &readings["Conta corrente"];
        assert_eq!(reading.current.as_deref(), Some("-56.0"));
        assert_eq!(reading.next_year.as_deref(), Some("-51.5"));
    }

    #[test]
    fn line_without_numbers_leaves_variable_absent() {
        let text = "IPCA (variação %)\nsem projeção disponível\n";
        let readings = extractor(&["IPCA"]).extract(text);
        assert!(!readings.contains_key("IPCA"));
    }

    #[test]
    fn first_matching_pattern_stops_cascade_even_without_numbers() {
        // The suffix pattern matches but its data line is empty; the
        // generic pattern would have found numbers further down.
        let text = "IPCA (variação %)\n\nIPCA cheio\n4.1\n";
        let readings = extractor(&["IPCA"]).extract(text);
        assert!(readings.is_empty());
    }

    #[test]
    fn missing_slots_stay_absent() {
        let text = "IGP-DI (variação %)\n3.1\n";
        let readings = extractor(&["IGP-DI"]).extract(text);
        let reading = &readings["IGP-DI"];
        assert_eq!(reading.current.as_deref(), Some("3.1"));
        assert_eq!(reading.next_year, None);
        assert_eq!(reading.two_years, None);
    }

    #[test]
    fn unobserved_variables_are_absent() {
        let text = "IPCA (variação %)\n5.5 4.2 3.8\n";
        let readings = extractor(&["IPCA", "IGP-M"]).extract(text);
        assert_eq!(readings.len(), 1);
        assert!(!readings.contains_key("IGP-M"));
    }

    #[test]
    fn names_are_matched_literally() {
        let text = "IPCAX (variação %)\n1 2 3\n";
        let readings = extractor(&["IPC.X"]).extract(text);
        assert!(readings.is_empty());
    }

    #[test]
    fn numeric_tokens_handle_signs_and_decimals() {
        assert_eq!(
            numeric_tokens("  -1.5 +2 .75 ano 2026 "),
            vec!["-1.5", "+2", ".75", "2026"]
        );
        assert!(numeric_tokens("n/d").is_empty());
    }

    #[test]
    fn variable_names_preserve_configured_order() {
        let extractor = extractor(&["PIB Total", "IPCA"]);
        let names: Vec<&str> = extractor.variable_names().collect();
        assert_eq!(names, vec!["PIB Total", "IPCA"]);
    }
}
