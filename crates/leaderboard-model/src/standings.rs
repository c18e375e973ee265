//! Ranked standings: an ordered sequence of exactly N entries.

use serde::Serialize;

use crate::entry::{LeaderboardEntry, ScoredMember};

/// Order members by descending score and keep the first `n`.
///
/// The sort is stable: members with equal scores keep the order in which
/// the store returned them. Non-finite and negative scores rank as 0.
pub fn rank_members(mut members: Vec<ScoredMember>, n: usize) -> Vec<ScoredMember> {
    members.sort_by(|a, b| b.normalized_score().total_cmp(&a.normalized_score()));
    members.truncate(n);
    members
}

/// The ranked rows handed to the renderer.
///
/// Length is fixed at construction and every rank in `0..len` appears exactly
/// once, in order. Places without a real member hold placeholder rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Standings {
    entries: Vec<LeaderboardEntry>,
}

impl Standings {
    /// Build standings of length `n` from ranked members and their resolved
    /// display names.
    ///
    /// Extra members beyond `n` are dropped; missing places are padded.
    pub fn from_ranked<I>(ranked: I, n: usize) -> Self
    where
        I: IntoIterator<Item = (ScoredMember, String)>,
    {
        let mut entries: Vec<LeaderboardEntry> = ranked
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(rank, (member, display_name))| {
                let score = member.normalized_score();
                LeaderboardEntry::ranked(rank, member.identity, display_name, score)
            })
            .collect();

        while entries.len() < n {
            entries.push(LeaderboardEntry::placeholder(entries.len()));
        }

        Self { entries }
    }

    /// Standings where every place is unranked.
    pub fn placeholders(n: usize) -> Self {
        Self::from_ranked(std::iter::empty(), n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LeaderboardEntry> {
        self.entries.iter()
    }

    /// Number of rows backed by a real store member.
    pub fn ranked_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_placeholder()).count()
    }
}

impl<'a> IntoIterator for &'a Standings {
    type Item = &'a LeaderboardEntry;
    type IntoIter = std::slice::Iter<'a, LeaderboardEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(members: Vec<ScoredMember>) -> Vec<(ScoredMember, String)> {
        members
            .into_iter()
            .map(|m| {
                let name = m.identity.to_uppercase();
                (m, name)
            })
            .collect()
    }

    #[test]
    fn test_rank_members_sorts_descending_and_truncates() {
        let ranked = rank_members(
            vec![
                ScoredMember::new("p1", 500.0),
                ScoredMember::new("p2", 900.0),
                ScoredMember::new("p3", 100.0),
                ScoredMember::new("p4", 50.0),
            ],
            3,
        );
        let ids: Vec<&str> = ranked.iter().map(|m| m.identity.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_rank_members_keeps_store_order_for_ties() {
        let ranked = rank_members(
            vec![
                ScoredMember::new("b", 10.0),
                ScoredMember::new("a", 10.0),
                ScoredMember::new("c", 20.0),
                ScoredMember::new("d", 10.0),
            ],
            4,
        );
        let ids: Vec<&str> = ranked.iter().map(|m| m.identity.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_standings_pads_with_placeholders() {
        let standings = Standings::from_ranked(named(vec![ScoredMember::new("p1", 42.0)]), 3);
        assert_eq!(standings.len(), 3);
        assert_eq!(standings.ranked_count(), 1);
        assert_eq!(standings.entries()[0].display_name, "P1");
        assert!(standings.entries()[1].is_placeholder());
        assert!(standings.entries()[2].is_placeholder());
        let ranks: Vec<usize> = standings.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_standings_drops_surplus_members() {
        let members = (0..10)
            .map(|i| ScoredMember::new(format!("p{i}"), 100.0 - i as f64))
            .collect();
        let standings = Standings::from_ranked(named(members), 3);
        assert_eq!(standings.len(), 3);
        assert_eq!(standings.ranked_count(), 3);
    }

    #[test]
    fn test_member_named_like_a_placeholder_still_counts_as_ranked() {
        let standings = Standings::from_ranked(
            vec![(ScoredMember::new("Steve", 0.0), "Ingen".to_string())],
            2,
        );
        assert_eq!(standings.ranked_count(), 1);
        assert!(!standings.entries()[0].is_placeholder());
        assert!(standings.entries()[1].is_placeholder());
    }

    #[test]
    fn test_zero_length_standings() {
        assert!(Standings::placeholders(0).is_empty());
    }

    #[test]
    fn test_standings_serialize_as_array() {
        let standings = Standings::placeholders(1);
        let json = serde_json::to_value(&standings).unwrap();
        assert_eq!(json[0]["display_name"], "Ingen");
        assert_eq!(json[0]["rank"], 0);
    }
}
