use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred real-world meaning of a column, independent of its storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Unknown,
    Null,
    Boolean,
    Currency,
    Numeric,
    Date,
    String,
    Id,
    FlightNumber,
    Email,
    Url,
    PhoneNumber,
}

impl SemanticType {
    /// Every variant, in declaration order.
    pub const ALL: [SemanticType; 12] = [
        Self::Unknown,
        Self::Null,
        Self::Boolean,
        Self::Currency,
        Self::Numeric,
        Self::Date,
        Self::String,
        Self::Id,
        Self::FlightNumber,
        Self::Email,
        Self::Url,
        Self::PhoneNumber,
    ];

    /// Wire label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Currency => "currency",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::String => "string",
            Self::Id => "id",
            Self::FlightNumber => "flight_number",
            Self::Email => "email",
            Self::Url => "url",
            Self::PhoneNumber => "phone_number",
        }
    }

    /// Sample-vote winners accepted without the uniqueness override.
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Currency | Self::Date | Self::Boolean)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serde() {
        for semantic in SemanticType::ALL {
            let json = serde_json::to_string(&semantic).unwrap();
            assert_eq!(json, format!("\"{}\"", semantic.as_str()));
        }
    }

    #[test]
    fn test_trusted_types() {
        assert!(SemanticType::Currency.is_trusted());
        assert!(SemanticType::Date.is_trusted());
        assert!(SemanticType::Boolean.is_trusted());
        assert!(!SemanticType::Numeric.is_trusted());
        assert!(!SemanticType::Email.is_trusted());
    }
}
