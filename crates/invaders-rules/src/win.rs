use crate::{Roster, Team};

/// Decides whether either team has won.
///
/// Only living players with a role count. No evil survivors means good
/// wins; evil matching or outnumbering good means evil wins; anything
/// else means the game goes on.
pub fn evaluate_winner(roster: &Roster) -> Option<Team> {
    let (mut evil, mut good) = (0usize, 0usize);
    for id in roster.alive() {
        match roster.role_of(*id).map(|role| role.team()) {
            Some(Team::Evil) => evil += 1,
            Some(Team::Good) => good += 1,
            None => {}
        }
    }

    if evil == 0 {
        Some(Team::Good)
    } else if evil >= good {
        Some(Team::Evil)
    } else {
        None
    }
}
