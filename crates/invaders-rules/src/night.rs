//! Night action resolution.

use std::collections::{BTreeSet, HashMap};

use invaders_protocol::PlayerId;

use crate::{NightEffect, Role, Roster, Team};

/// A night action as recorded when it was submitted.
///
/// `role` is the actor's role at submission time, so a role reshuffle
/// between rounds cannot change what an already-recorded action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightAction {
    pub role: Role,
    pub target: PlayerId,
}

/// A Conductor's private result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investigation {
    pub investigator: PlayerId,
    pub target: PlayerId,
    pub target_name: String,
    pub is_good: bool,
}

/// Everything a resolved night produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    /// Public log lines, in resolution order.
    pub log: Vec<String>,
    /// The dead set after resolution.
    pub dead: BTreeSet<PlayerId>,
    /// Private results, one per Conductor action on a seated target.
    pub investigations: Vec<Investigation>,
}

/// Resolves one night's actions against the roster.
///
/// Resolution does not depend on submission order. Actions are visited
/// in the actors' join order and applied in three passes:
///
/// 1. **Protection**: the first Doctor action names the protected player.
/// 2. **Kills**: every Visitor action kills its target if the target is
///    alive and not protected.
/// 3. **Side effects**, Conductor, then Eating Heads, then The Stranger:
///    investigations report the target's apparent team; Eating Heads
///    bars a living target from the next vote; The Stranger revives a
///    dead good-team target.
///
/// Actions whose actor has since left the room are skipped.
pub fn resolve_night(
    roster: &mut Roster,
    actions: &HashMap<PlayerId, NightAction>,
) -> NightOutcome {
    let ordered: Vec<(PlayerId, NightAction)> = roster
        .ids()
        .filter_map(|id| actions.get(&id).map(|action| (id, *action)))
        .collect();

    let with_effect = |effect: NightEffect| {
        ordered
            .iter()
            .filter(move |(_, action)| action.role.night_effect() == effect)
    };

    let mut outcome = NightOutcome::default();

    let protected = with_effect(NightEffect::Protect)
        .next()
        .map(|(_, action)| action.target);

    for (_, action) in with_effect(NightEffect::Kill) {
        if Some(action.target) == protected {
            continue;
        }
        if roster.kill(action.target) {
            outcome.log.push(format!(
                "{} was killed during the night",
                roster.name_of(action.target)
            ));
        }
    }

    for (actor, action) in with_effect(NightEffect::Investigate) {
        let Some(target) = roster.get(action.target) else {
            continue;
        };
        let Some(role) = target.role else {
            continue;
        };
        outcome.investigations.push(Investigation {
            investigator: *actor,
            target: target.id,
            target_name: target.name.clone(),
            is_good: role.apparent_team() == Team::Good,
        });
    }

    for (_, action) in with_effect(NightEffect::Silence) {
        if roster.is_alive(action.target) {
            roster.silence(action.target);
            outcome.log.push(format!(
                "{} will not be able to vote tomorrow",
                roster.name_of(action.target)
            ));
        }
    }

    for (_, action) in with_effect(NightEffect::Revive) {
        let good = roster
            .role_of(action.target)
            .is_some_and(|role| role.team() == Team::Good);
        if good && roster.revive(action.target) {
            outcome.log.push(format!(
                "{} was brought back to life",
                roster.name_of(action.target)
            ));
        }
    }

    outcome.dead = roster.dead().clone();
    outcome
}
