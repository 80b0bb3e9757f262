use serde::{Deserialize, Serialize};

/// Kind of state tax whose allocation is being shown.
///
/// The set is closed. Unknown codes fail to parse and are rejected at the
/// request boundary instead of reaching the allocation mapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    #[default]
    Income,
    Corporate,
    Sales,
}

impl TaxType {
    pub fn all() -> &'static [TaxType] {
        &[Self::Income, Self::Corporate, Self::Sales]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Corporate => "corporate",
            Self::Sales => "sales",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "NY State Income Tax",
            Self::Corporate => "NY State Corporate Tax",
            Self::Sales => "NY State Sales Tax",
        }
    }

    /// Label used on the direct-entry form's tax type selector.
    pub fn form_label(&self) -> &'static str {
        match self {
            Self::Income => "Personal Income Tax",
            Self::Corporate => "Corporate Tax",
            Self::Sales => "Sales Tax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "corporate" => Some(Self::Corporate),
            "sales" => Some(Self::Sales),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown tax type '{s}' (expected income, corporate or sales)"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_code() {
        for tax_type in TaxType::all() {
            assert_eq!(TaxType::parse(tax_type.as_str()), Some(*tax_type));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!("property".parse::<TaxType>().is_err());
        assert!(serde_json::from_str::<TaxType>("\"property\"").is_err());
    }

    #[test]
    fn serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&TaxType::Corporate).unwrap(), "\"corporate\"");
    }
}
