use model::{Match, PlayerInfo, Round, Side, TeamInfo, Teams};

use crate::engine::EngineState;

/// Derives the rosters from the collected snapshots. A player lands on the
/// side they were last seen on, so halftime swaps resolve to the final one.
pub fn build_teams(rounds: &[Round]) -> Teams {
    let mut seen: std::collections::HashMap<u64, (String, Side)> = std::collections::HashMap::new();
    for round in rounds {
        for snapshot in &round.snapshots {
            for player in &snapshot.players {
                if player.steam_id == 0 {
                    continue;
                }
                let Some(side) = player.team else {
                    continue;
                };
                seen.insert(player.steam_id, (player.name.clone(), side));
            }
        }
    }

    let mut ct = Vec::new();
    let mut t = Vec::new();
    for (steam_id, (name, side)) in seen {
        let info = PlayerInfo { steam_id, name };
        match side {
            Side::Ct => ct.push(info),
            Side::T => t.push(info),
        }
    }
    ct.sort_unstable_by_key(|p| p.steam_id);
    t.sort_unstable_by_key(|p| p.steam_id);

    Teams {
        ct: TeamInfo {
            name: String::new(),
            players: ct,
        },
        t: TeamInfo {
            name: String::new(),
            players: t,
        },
    }
}

pub fn build_match(
    id: String,
    map: Option<&str>,
    rounds: Vec<Round>,
    state: &dyn EngineState,
) -> Match {
    Match {
        id,
        map: map.unwrap_or_default().to_owned(),
        tick_rate: state.tick_rate(),
        duration: state.current_time(),
        teams: build_teams(&rounds),
        rounds,
        map_config: None,
    }
}
