//! Time slots within a care day

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three care rounds recorded per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    /// Morning round
    Morning,

    /// Midday round
    Noon,

    /// Evening round
    Evening,
}

impl TimeSlot {
    /// All slots in sheet order
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Noon, TimeSlot::Evening];

    /// Get the wire token for this slot
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Noon => "noon",
            TimeSlot::Evening => "evening",
        }
    }

    /// Parse a wire token. Only the three exact tokens are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "morning" => Some(TimeSlot::Morning),
            "noon" => Some(TimeSlot::Noon),
            "evening" => Some(TimeSlot::Evening),
            _ => None,
        }
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidTimeSlot(s.to_string()))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse(slot.as_str()), Some(slot));
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(TimeSlot::parse("Morning"), None);
        assert_eq!(TimeSlot::parse("midday"), None);
        assert!("night".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_serde_tokens() {
        assert_eq!(serde_json::to_string(&TimeSlot::Noon).unwrap(), "\"noon\"");
        let slot: TimeSlot = serde_json::from_str("\"evening\"").unwrap();
        assert_eq!(slot, TimeSlot::Evening);
    }
}
