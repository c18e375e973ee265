//! Leaderboard rows and raw store members.

use serde::{Deserialize, Serialize};

/// Identity used for unranked slots.
pub const PLACEHOLDER_IDENTITY: &str = "Steve";

/// Display name shown for unranked slots ("nobody").
pub const PLACEHOLDER_NAME: &str = "Ingen";

/// A member of the ranking store's sorted set, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    /// Stable player identifier.
    pub identity: String,

    /// Experience points.
    pub score: f64,
}

impl ScoredMember {
    pub fn new(identity: impl Into<String>, score: f64) -> Self {
        Self {
            identity: identity.into(),
            score,
        }
    }

    /// Score clamped to the non-negative, finite range.
    pub fn normalized_score(&self) -> f64 {
        if self.score.is_finite() {
            self.score.max(0.0)
        } else if self.score == f64::INFINITY {
            f64::MAX
        } else {
            0.0
        }
    }
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Zero-based position.
    pub rank: usize,

    /// Key used to resolve the display name.
    pub identity: String,

    /// Human-readable name; empty if it could not be resolved.
    pub display_name: String,

    /// Experience points, non-negative.
    pub score: f64,

    /// Set only on rows synthesized to pad the standings.
    #[serde(skip)]
    placeholder: bool,
}

impl LeaderboardEntry {
    /// A row backed by a real store member.
    pub fn ranked(
        rank: usize,
        identity: impl Into<String>,
        display_name: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            rank,
            identity: identity.into(),
            display_name: display_name.into(),
            score,
            placeholder: false,
        }
    }

    /// A synthetic row for a place nobody holds yet.
    pub fn placeholder(rank: usize) -> Self {
        Self {
            rank,
            identity: PLACEHOLDER_IDENTITY.to_string(),
            display_name: PLACEHOLDER_NAME.to_string(),
            score: 0.0,
            placeholder: true,
        }
    }

    /// Whether this row was synthesized to pad the standings.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Score truncated toward zero, as displayed.
    pub fn display_score(&self) -> u64 {
        // `as` saturates and maps NaN to 0
        self.score.trunc() as u64
    }

    /// Row caption: `"<name> - <score> XP"`.
    pub fn label(&self) -> String {
        format!("{} - {} XP", self.display_name, self.display_score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_truncates_score() {
        let entry = LeaderboardEntry::ranked(0, "p1", "Alice", 499.99);
        assert_eq!(entry.label(), "Alice - 499 XP");
        assert!(!entry.is_placeholder());
    }

    #[test]
    fn test_placeholder_row() {
        let entry = LeaderboardEntry::placeholder(2);
        assert_eq!(entry.rank, 2);
        assert_eq!(entry.identity, "Steve");
        assert_eq!(entry.display_name, "Ingen");
        assert_eq!(entry.score, 0.0);
        assert!(entry.is_placeholder());
        assert_eq!(entry.label(), "Ingen - 0 XP");
    }

    #[test]
    fn test_real_member_with_sentinel_values_is_not_a_placeholder() {
        let entry = LeaderboardEntry::ranked(0, PLACEHOLDER_IDENTITY, PLACEHOLDER_NAME, 0.0);
        assert!(!entry.is_placeholder());
        assert_eq!(entry.label(), LeaderboardEntry::placeholder(0).label());
    }

    #[test]
    fn test_normalized_score() {
        assert_eq!(ScoredMember::new("a", -5.0).normalized_score(), 0.0);
        assert_eq!(ScoredMember::new("a", f64::NAN).normalized_score(), 0.0);
        assert_eq!(ScoredMember::new("a", 12.5).normalized_score(), 12.5);
    }
}
