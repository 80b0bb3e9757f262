use serde::{Deserialize, Serialize};

/// Filing status selected on the estimate form.
///
/// Serialized with the camel-case codes the web form submits. Deserializing
/// an unrecognised code yields [`FilingStatus::Single`] rather than an error,
/// matching how an unknown status picks the single-filer tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    pub fn all() -> &'static [FilingStatus] {
        &[
            Self::Single,
            Self::MarriedJoint,
            Self::MarriedSeparate,
            Self::HeadOfHousehold,
            Self::QualifyingWidow,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedJoint => "marriedJoint",
            Self::MarriedSeparate => "marriedSeparate",
            Self::HeadOfHousehold => "headOfHousehold",
            Self::QualifyingWidow => "qualifyingWidow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedJoint => "Married Filing Jointly",
            Self::MarriedSeparate => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingWidow => "Qualifying Widow(er)",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "marriedJoint" => Some(Self::MarriedJoint),
            "marriedSeparate" => Some(Self::MarriedSeparate),
            "headOfHousehold" => Some(Self::HeadOfHousehold),
            "qualifyingWidow" => Some(Self::QualifyingWidow),
            _ => None,
        }
    }

    /// Parses a status code, substituting [`FilingStatus::Single`] for
    /// anything unrecognised.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(code = %s, "unknown filing status; using single");
            Self::Single
        })
    }
}

impl From<String> for FilingStatus {
    fn from(s: String) -> Self {
        Self::parse_or_default(&s)
    }
}

impl From<FilingStatus> for String {
    fn from(status: FilingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
