//! Vote resolution.

use std::collections::HashMap;

use invaders_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Role, Roster};

/// What happens when two or more targets share the highest vote count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Execute the tied target who joined the room first.
    #[default]
    FirstByJoinOrder,
    /// Execute nobody.
    NoExecution,
}

/// Votes received by one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub target: PlayerId,
    pub votes: usize,
}

/// Everything a resolved vote produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Per-target tallies, targets in join order, zero counts omitted.
    pub counts: Vec<VoteCount>,
    /// The player executed by plurality, if any.
    pub executed: Option<PlayerId>,
    /// Players killed by an Alien King vote, in the order it happened.
    pub king_kills: Vec<PlayerId>,
    /// Public log lines, in resolution order.
    pub log: Vec<String>,
}

/// Resolves one voting phase.
///
/// Voters are visited in join order. A ballot only counts if, at the
/// moment it is visited, the voter is alive and not silenced and the
/// target is alive. Each counted ballot:
///
/// - adds one to the target's tally, and
/// - if the voter is an Alien King with the ability unused, kills the
///   target on the spot and spends the ability. Later ballots for that
///   target no longer count.
///
/// After the pass the target with the highest tally is executed if still
/// alive; `tie_break` settles equal tallies. Vote bans are lifted once
/// the vote is resolved.
pub fn resolve_votes(
    roster: &mut Roster,
    votes: &HashMap<PlayerId, PlayerId>,
    tie_break: TieBreak,
) -> VoteOutcome {
    let mut outcome = VoteOutcome::default();
    let mut tally: HashMap<PlayerId, usize> = HashMap::new();
    let voters: Vec<PlayerId> = roster.ids().collect();

    for voter in voters {
        let Some(&target) = votes.get(&voter) else {
            continue;
        };
        if !roster.is_alive(voter)
            || roster.is_silenced(voter)
            || !roster.is_alive(target)
        {
            continue;
        }

        *tally.entry(target).or_default() += 1;

        let king_strikes = roster.get_mut(voter).is_some_and(|player| {
            let armed = player.role == Some(Role::AlienKing)
                && player.can_use_alien_king;
            if armed {
                player.can_use_alien_king = false;
            }
            armed
        });
        if king_strikes && roster.kill(target) {
            outcome.king_kills.push(target);
            outcome.log.push(format!(
                "{} used the Alien King's power to kill {}",
                roster.name_of(voter),
                roster.name_of(target)
            ));
        }
    }

    outcome.counts = roster
        .ids()
        .filter_map(|target| {
            tally.get(&target).map(|&votes| VoteCount { target, votes })
        })
        .collect();

    if let Some(candidate) = plurality(&outcome.counts, tie_break) {
        if roster.kill(candidate) {
            outcome.executed = Some(candidate);
            outcome.log.push(format!(
                "{} was executed by vote",
                roster.name_of(candidate)
            ));
        }
    }

    roster.clear_silences();
    outcome
}

/// Picks the execution candidate from tallies listed in join order.
fn plurality(counts: &[VoteCount], tie_break: TieBreak) -> Option<PlayerId> {
    let mut best: Option<VoteCount> = None;
    let mut tied = false;

    for count in counts {
        match best {
            Some(current) if count.votes < current.votes => {}
            Some(current) if count.votes == current.votes => tied = true,
            _ => {
                best = Some(*count);
                tied = false;
            }
        }
    }

    match (best, tie_break) {
        (Some(_), TieBreak::NoExecution) if tied => None,
        (best, _) => best.map(|count| count.target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn seated(roles: &[Role]) -> Roster {
        let mut roster = Roster::new();
        for (i, _) in roles.iter().enumerate() {
            let id = i as u64 + 1;
            roster.add(pid(id), format!("p{id}"));
        }
        roster.start_game(roles);
        roster
    }

    fn ballots(pairs: &[(u64, u64)]) -> HashMap<PlayerId, PlayerId> {
        pairs.iter().map(|&(v, t)| (pid(v), pid(t))).collect()
    }

    fn five_good() -> Roster {
        seated(&[
            Role::Traveler,
            Role::Merchant,
            Role::Doctor,
            Role::Conductor,
            Role::Almodamer,
        ])
    }

    #[test]
    fn test_plurality_executes_most_voted() {
        // A(1) and B(2) vote X(4); C(3) votes Y(5).
        let mut roster = five_good();
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 4), (2, 4), (3, 5)]),
            TieBreak::default(),
        );

        assert_eq!(outcome.executed, Some(pid(4)));
        assert!(roster.is_dead(pid(4)));
        assert!(roster.is_alive(pid(5)));
        assert_eq!(
            outcome.counts,
            vec![
                VoteCount { target: pid(4), votes: 2 },
                VoteCount { target: pid(5), votes: 1 },
            ]
        );
        assert_eq!(outcome.log, vec!["p4 was executed by vote".to_string()]);
    }

    #[test]
    fn test_no_votes_no_execution() {
        let mut roster = five_good();
        let outcome = resolve_votes(&mut roster, &HashMap::new(), TieBreak::default());
        assert_eq!(outcome, VoteOutcome::default());
    }

    #[test]
    fn test_tie_goes_to_earliest_joined_target() {
        // p5 gets its vote first, but p4 joined earlier.
        let mut roster = five_good();
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 5), (2, 4)]),
            TieBreak::FirstByJoinOrder,
        );
        assert_eq!(outcome.executed, Some(pid(4)));
    }

    #[test]
    fn test_tie_with_no_execution_policy() {
        let mut roster = five_good();
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 5), (2, 4)]),
            TieBreak::NoExecution,
        );
        assert_eq!(outcome.executed, None);
        assert_eq!(roster.alive().len(), 5);
    }

    #[test]
    fn test_no_execution_policy_still_executes_clear_winner() {
        let mut roster = five_good();
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 5), (2, 4), (3, 5)]),
            TieBreak::NoExecution,
        );
        assert_eq!(outcome.executed, Some(pid(5)));
    }

    #[test]
    fn test_dead_voters_and_dead_targets_ignored() {
        let mut roster = five_good();
        roster.kill(pid(1));
        roster.kill(pid(5));
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 4), (2, 5), (3, 2)]),
            TieBreak::default(),
        );
        assert_eq!(outcome.counts, vec![VoteCount { target: pid(2), votes: 1 }]);
        assert_eq!(outcome.executed, Some(pid(2)));
    }

    #[test]
    fn test_silenced_voter_ignored_and_ban_lifted() {
        let mut roster = five_good();
        roster.silence(pid(1));
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 4), (2, 5)]),
            TieBreak::default(),
        );
        assert_eq!(outcome.executed, Some(pid(5)));
        assert!(!roster.is_silenced(pid(1)));
    }

    #[test]
    fn test_alien_king_kills_immediately_even_without_plurality() {
        // King p1 votes p5 alone; p2 and p4 vote p3.
        let mut roster = seated(&[
            Role::AlienKing,
            Role::Traveler,
            Role::Doctor,
            Role::Conductor,
            Role::Merchant,
        ]);
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 5), (2, 3), (4, 3)]),
            TieBreak::default(),
        );

        assert_eq!(outcome.king_kills, vec![pid(5)]);
        assert!(roster.is_dead(pid(5)));
        assert_eq!(outcome.executed, Some(pid(3)));
        assert!(!roster.get(pid(1)).unwrap().can_use_alien_king);
        assert_eq!(
            outcome.log,
            vec![
                "p1 used the Alien King's power to kill p5".to_string(),
                "p3 was executed by vote".to_string(),
            ]
        );
    }

    #[test]
    fn test_ballots_for_king_victim_after_the_kill_are_dropped() {
        // King p1 kills p4 before p3's ballot for p4 is visited, so p4
        // ends on one vote, tied with p3, who joined first.
        let mut roster = seated(&[
            Role::AlienKing,
            Role::Traveler,
            Role::Doctor,
            Role::Conductor,
        ]);
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 4), (2, 3), (3, 4)]),
            TieBreak::default(),
        );
        assert_eq!(outcome.king_kills, vec![pid(4)]);
        assert_eq!(
            outcome.counts,
            vec![
                VoteCount { target: pid(3), votes: 1 },
                VoteCount { target: pid(4), votes: 1 },
            ]
        );
        assert_eq!(outcome.executed, Some(pid(3)));
    }

    #[test]
    fn test_king_killed_favourite_is_not_executed_twice() {
        // p2 (joined before the king) votes p4 first, then the king p3
        // votes p4 and kills them. p4 holds the plurality but is already
        // dead, so nobody is executed.
        let mut roster = seated(&[
            Role::Traveler,
            Role::Doctor,
            Role::AlienKing,
            Role::Conductor,
        ]);
        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(2, 4), (3, 4)]),
            TieBreak::default(),
        );
        assert_eq!(outcome.counts, vec![VoteCount { target: pid(4), votes: 2 }]);
        assert_eq!(outcome.king_kills, vec![pid(4)]);
        assert_eq!(outcome.executed, None);
        assert_eq!(outcome.log.len(), 1);
    }

    #[test]
    fn test_king_ability_is_one_shot() {
        let mut roster = seated(&[
            Role::AlienKing,
            Role::Traveler,
            Role::Doctor,
            Role::Conductor,
            Role::Merchant,
        ]);
        resolve_votes(&mut roster, &ballots(&[(1, 5)]), TieBreak::default());
        assert!(roster.is_dead(pid(5)));

        let outcome = resolve_votes(
            &mut roster,
            &ballots(&[(1, 4), (2, 3), (3, 2), (4, 2)]),
            TieBreak::default(),
        );
        assert!(outcome.king_kills.is_empty());
        assert!(roster.is_alive(pid(4)));
        assert_eq!(outcome.executed, Some(pid(2)));
    }
}
