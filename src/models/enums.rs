use serde::{Deserialize, Serialize};

use crate::error::TextAnalyticsError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant order is the ordering used by `PartialOrd`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = TextAnalyticsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(TextAnalyticsError::InvalidInput(format!(
                        "unknown {} value '{}'",
                        stringify!($name),
                        s
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Like `str_enum!`, for values the service may extend. Unknown strings
/// decode to `Unknown` and re-encode unchanged.
macro_rules! open_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $s,)+
                    Self::Unknown(other) => other,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($s => Self::$variant,)+
                    _ => Self::Unknown(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unknown(other) => other,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ServiceVersion {
    V3_0 => "v3.0",
    V3_1 => "v3.1",
    V2022_05_01 => "2022-05-01",
    V2023_04_01 => "2023-04-01",
});

impl ServiceVersion {
    /// The newest version this client speaks.
    pub fn latest() -> Self {
        Self::V2023_04_01
    }

    /// Versions served under `/text/analytics/{version}`.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::V3_0 | Self::V3_1)
    }
}

impl Default for ServiceVersion {
    fn default() -> Self {
        Self::latest()
    }
}

str_enum!(PiiDomain {
    Phi => "phi",
});

str_enum!(ClassificationType {
    Single => "Single",
    Multi => "Multi",
});

open_enum!(SentimentLabel {
    Positive => "positive",
    Neutral => "neutral",
    Negative => "negative",
    Mixed => "mixed",
});

str_enum!(StringIndexType {
    TextElements => "TextElements_v8",
    UnicodeCodePoint => "UnicodeCodePoint",
    Utf16CodeUnit => "Utf16CodeUnit",
});

impl Default for StringIndexType {
    fn default() -> Self {
        Self::Utf16CodeUnit
    }
}

open_enum!(Certainty {
    Positive => "positive",
    PositivePossible => "positivePossible",
    NeutralPossible => "neutralPossible",
    NegativePossible => "negativePossible",
    Negative => "negative",
});

open_enum!(Conditionality {
    Hypothetical => "hypothetical",
    Conditional => "conditional",
});

open_enum!(Association {
    Subject => "subject",
    Other => "other",
});

/// PII category filter. The service adds categories over time, so any
/// string is accepted; the constants cover the common ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiiCategory(String);

impl PiiCategory {
    pub const PERSON: &'static str = "Person";
    pub const PHONE_NUMBER: &'static str = "PhoneNumber";
    pub const EMAIL: &'static str = "Email";
    pub const ADDRESS: &'static str = "Address";
    pub const US_SOCIAL_SECURITY_NUMBER: &'static str = "USSocialSecurityNumber";
    pub const CREDIT_CARD_NUMBER: &'static str = "CreditCardNumber";
    pub const INTERNATIONAL_BANKING_ACCOUNT_NUMBER: &'static str = "InternationalBankingAccountNumber";
    pub const ORGANIZATION: &'static str = "Organization";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PiiCategory {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn service_versions_are_ordered_oldest_first() {
        assert!(ServiceVersion::V3_0 < ServiceVersion::V3_1);
        assert!(ServiceVersion::V3_1 < ServiceVersion::V2022_05_01);
        assert!(ServiceVersion::V2022_05_01 < ServiceVersion::V2023_04_01);
        assert_eq!(ServiceVersion::default(), ServiceVersion::V2023_04_01);
    }

    #[test]
    fn legacy_versions() {
        assert!(ServiceVersion::V3_0.is_legacy());
        assert!(ServiceVersion::V3_1.is_legacy());
        assert!(!ServiceVersion::V2022_05_01.is_legacy());
    }

    #[test]
    fn parse_service_version() {
        assert_eq!(ServiceVersion::from_str("v3.1").unwrap(), ServiceVersion::V3_1);
        assert_eq!(
            ServiceVersion::from_str("2022-05-01").unwrap(),
            ServiceVersion::V2022_05_01
        );
        assert!(ServiceVersion::from_str("v4.0").is_err());
    }

    #[test]
    fn sentiment_label_deserializes_wire_names() {
        let label: SentimentLabel = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(label, SentimentLabel::Mixed);
        assert_eq!(serde_json::to_string(&SentimentLabel::Positive).unwrap(), "\"positive\"");
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let label: SentimentLabel = serde_json::from_str("\"ambivalent\"").unwrap();
        assert_eq!(label, SentimentLabel::Unknown("ambivalent".into()));
        assert!(!label.is_known());
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"ambivalent\"");

        let association: Association = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(association, Association::Other);
        assert_eq!(Certainty::from("likely").as_str(), "likely");
    }

    #[test]
    fn certainty_uses_camel_case_wire_names() {
        let c: Certainty = serde_json::from_str("\"negativePossible\"").unwrap();
        assert_eq!(c, Certainty::NegativePossible);
    }

    #[test]
    fn string_index_type_wire_name() {
        assert_eq!(StringIndexType::TextElements.as_str(), "TextElements_v8");
        assert_eq!(StringIndexType::default(), StringIndexType::Utf16CodeUnit);
    }

    #[test]
    fn pii_category_accepts_unknown_names() {
        let c = PiiCategory::from("ABARoutingNumber");
        assert_eq!(c.as_str(), "ABARoutingNumber");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"ABARoutingNumber\"");
    }
}
