//! `ompi_info --all --parsable` output.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmpiValue {
    Bool(bool),
    None,
    Text(String),
}

impl OmpiValue {
    fn parse(raw: &str) -> Self {
        match raw {
            "true" | "yes" => OmpiValue::Bool(true),
            "false" | "no" => OmpiValue::Bool(false),
            "none" => OmpiValue::None,
            other => OmpiValue::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OmpiInfo {
    values: HashMap<String, OmpiValue>,
}

impl OmpiInfo {
    /// Each non-blank line is split at its last `:`; later keys win.
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let (key, value) = line.rsplit_once(':')?;
                Some((key.to_string(), OmpiValue::parse(value)))
            })
            .collect();
        Self { values }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            OmpiValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Names of the `option:*` capabilities reported as enabled, sorted.
    pub fn enabled_options(&self) -> Vec<String> {
        let mut options: Vec<String> = self
            .values
            .iter()
            .filter(|(_, value)| **value == OmpiValue::Bool(true))
            .filter_map(|(key, _)| key.strip_prefix("option:"))
            .filter(|rest| !rest.contains(':'))
            .map(str::to_string)
            .collect();
        options.sort();
        options
    }
}
