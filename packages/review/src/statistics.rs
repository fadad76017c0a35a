// ABOUTME: Vote aggregation for a single meeting requirement
// ABOUTME: Effective voter sets, pending voters, counts, and rounded percentages

use std::collections::{HashMap, HashSet};

use crate::types::{Vote, VoteOption, VoteStatistics, VoterDetail};

/// Comment stored on votes recorded automatically when a meeting ends
pub const ABSTAIN_SYSTEM_COMMENT: &str =
    "Recorded as abstain automatically: no vote was cast before the meeting ended";

/// Users entitled to vote on a requirement.
///
/// A non-empty assignment narrows the attendee list; ids that are no longer
/// attendees are dropped. An empty assignment means every attendee votes.
pub fn effective_voter_ids(assigned_voter_ids: &[i64], attendee_ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    if assigned_voter_ids.is_empty() {
        attendee_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    } else {
        let attendees: HashSet<i64> = attendee_ids.iter().copied().collect();
        assigned_voter_ids
            .iter()
            .copied()
            .filter(|id| attendees.contains(id) && seen.insert(*id))
            .collect()
    }
}

/// Eligible voters without a vote row, in eligibility order
pub fn pending_voter_ids(eligible_voter_ids: &[i64], votes: &[Vote]) -> Vec<i64> {
    let voted: HashSet<i64> = votes.iter().map(|v| v.voter_id).collect();
    eligible_voter_ids
        .iter()
        .copied()
        .filter(|id| !voted.contains(id))
        .collect()
}

/// Share of `count` in `total` as a percentage rounded to one decimal
pub fn percentage(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Aggregate the votes cast on one meeting requirement
pub fn compute_statistics(
    meeting_id: i64,
    requirement_id: i64,
    votes: &[Vote],
    eligible_voter_ids: &[i64],
    voter_names: &HashMap<i64, String>,
) -> VoteStatistics {
    let count = |option: VoteOption| votes.iter().filter(|v| v.vote_option == option).count() as i64;

    let approve_count = count(VoteOption::Approve);
    let reject_count = count(VoteOption::Reject);
    let abstain_count = count(VoteOption::Abstain);
    let total_votes = votes.len() as i64;

    let voted: HashSet<i64> = votes.iter().map(|v| v.voter_id).collect();
    let is_complete = eligible_voter_ids.iter().all(|id| voted.contains(id));

    let mut voters: Vec<VoterDetail> = votes
        .iter()
        .map(|v| VoterDetail {
            voter_id: v.voter_id,
            voter_name: voter_names.get(&v.voter_id).cloned(),
            vote_option: v.vote_option,
            comment: v.comment.clone(),
            voted_at: v.updated_at,
        })
        .collect();
    voters.sort_by(|a, b| a.voted_at.cmp(&b.voted_at).then(a.voter_id.cmp(&b.voter_id)));

    VoteStatistics {
        meeting_id,
        requirement_id,
        total_votes,
        approve_count,
        reject_count,
        abstain_count,
        approve_percentage: percentage(approve_count, total_votes),
        reject_percentage: percentage(reject_count, total_votes),
        abstain_percentage: percentage(abstain_count, total_votes),
        eligible_voter_count: eligible_voter_ids.len() as i64,
        voted_count: voted.len() as i64,
        is_complete,
        voters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn vote(voter_id: i64, option: VoteOption, minute: u32) -> Vote {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, minute, 0).unwrap();
        Vote {
            id: voter_id,
            tenant_id: 1,
            meeting_id: 1,
            requirement_id: 7,
            voter_id,
            vote_option: option,
            comment: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_effective_voters_default_to_attendees() {
        assert_eq!(effective_voter_ids(&[], &[3, 1, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_effective_voters_drop_non_attendees() {
        assert_eq!(effective_voter_ids(&[2, 9, 2], &[1, 2, 3]), vec![2]);
    }

    #[test]
    fn test_pending_voters() {
        let votes = vec![vote(1, VoteOption::Approve, 0)];
        assert_eq!(pending_voter_ids(&[1, 2, 3], &votes), vec![2, 3]);
    }

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(1, 3, 33.3)]
    #[case(2, 3, 66.7)]
    #[case(1, 8, 12.5)]
    #[case(5, 5, 100.0)]
    fn test_percentage(#[case] count: i64, #[case] total: i64, #[case] expected: f64) {
        assert_eq!(percentage(count, total), expected);
    }

    #[test]
    fn test_empty_statistics_are_zero() {
        let stats = compute_statistics(1, 7, &[], &[1, 2], &HashMap::new());
        assert_eq!(stats.total_votes, 0);
        assert_eq!(stats.approve_percentage, 0.0);
        assert_eq!(stats.reject_percentage, 0.0);
        assert_eq!(stats.abstain_percentage, 0.0);
        assert!(!stats.is_complete);
    }

    #[test]
    fn test_one_of_each_option() {
        let votes = vec![
            vote(2, VoteOption::Reject, 5),
            vote(1, VoteOption::Approve, 1),
            vote(3, VoteOption::Abstain, 9),
        ];
        let names = HashMap::from([(1, "Alice".to_string()), (2, "Bob".to_string())]);

        let stats = compute_statistics(1, 7, &votes, &[1, 2, 3], &names);

        assert_eq!(
            (stats.approve_count, stats.reject_count, stats.abstain_count),
            (1, 1, 1)
        );
        assert_eq!(stats.approve_percentage, 33.3);
        assert_eq!(stats.reject_percentage, 33.3);
        assert_eq!(stats.abstain_percentage, 33.3);
        assert!(stats.is_complete);
        assert_eq!(
            stats.voters.iter().map(|v| v.voter_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(stats.voters[0].voter_name.as_deref(), Some("Alice"));
        assert_eq!(stats.voters[2].voter_name, None);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let votes: Vec<Vote> = (1..=7)
            .map(|id| {
                let option = match id % 3 {
                    0 => VoteOption::Approve,
                    1 => VoteOption::Reject,
                    _ => VoteOption::Abstain,
                };
                vote(id, option, id as u32)
            })
            .collect();

        let stats = compute_statistics(1, 7, &votes, &[], &HashMap::new());
        let sum = stats.approve_percentage + stats.reject_percentage + stats.abstain_percentage;

        assert!((sum - 100.0).abs() <= 0.15, "sum was {}", sum);
    }

    #[test]
    fn test_completion_checks_each_eligible_voter() {
        // Voter 4 is not eligible; eligible voter 2 has not voted
        let votes = vec![vote(1, VoteOption::Approve, 0), vote(4, VoteOption::Approve, 1)];

        let stats = compute_statistics(1, 7, &votes, &[1, 2], &HashMap::new());

        assert_eq!(stats.voted_count, 2);
        assert_eq!(stats.eligible_voter_count, 2);
        assert!(!stats.is_complete);
    }
}
