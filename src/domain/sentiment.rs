use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical sentiment every raw classifier label is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Three-letter code used by the upstream prediction API (`POS`, `NEG`, `NEU`).
    pub fn code(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POS",
            Sentiment::Negative => "NEG",
            Sentiment::Neutral => "NEU",
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Sentiment::Negative)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// Strict parse of canonical names and codes. Free-form model labels go
    /// through `LabelNormalizer` instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" => Ok(Self::Positive),
            "NEGATIVE" | "NEG" => Ok(Self::Negative),
            "NEUTRAL" | "NEU" => Ok(Self::Neutral),
            other => Err(format!("invalid sentiment: {other}")),
        }
    }
}

/// Handling priority derived from sentiment and classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" | "MED" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(format!("invalid priority: {other}")),
        }
    }
}
