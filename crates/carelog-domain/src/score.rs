//! Appetite and energy scores

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer score in [1, 5]
///
/// Scores come from paper marks: a full mark is 5, a partial mark 3,
/// an absent mark 1. A blank cell maps to [`Score::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Lowest valid score
    pub const MIN: u8 = 1;

    /// Highest valid score
    pub const MAX: u8 = 5;

    /// Score used for blank or unreadable cells
    pub const DEFAULT: Score = Score(3);

    /// Score for a full "good" mark
    pub const PRESENT: Score = Score(5);

    /// Score for a partial mark
    pub const PARTIAL: Score = Score(3);

    /// Score for an absent mark
    pub const ABSENT: Score = Score(1);

    /// Create a score, returning `None` when out of range
    ///
    /// # Examples
    ///
    /// ```
    /// use carelog_domain::Score;
    ///
    /// assert_eq!(Score::new(4).map(|s| s.value()), Some(4));
    /// assert!(Score::new(0).is_none());
    /// assert!(Score::new(6).is_none());
    /// ```
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Get the raw value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Score {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(DomainError::InvalidScore(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
