// Activity intensity labels shared by the step and calorie estimators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse activity intensity. Serialized in kebab-case (`"very-high"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intensity {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Intensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
            Intensity::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&Intensity::VeryHigh).unwrap();
        assert_eq!(json, "\"very-high\"");
        let back: Intensity = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(back, Intensity::Moderate);
    }

    #[test]
    fn display_matches_wire_name() {
        for i in [
            Intensity::Low,
            Intensity::Moderate,
            Intensity::High,
            Intensity::VeryHigh,
        ] {
            let json = serde_json::to_string(&i).unwrap();
            assert_eq!(json, format!("\"{i}\""));
        }
    }
}
