use model::GrenadeType;

use crate::engine::{
    side_from_code, BombView, DemoEngine, DemoEvent, EngineError, EngineState, GrenadeThrow,
    KillActor, KillData, ParticipantView, ProjectileView, RoundEndReason,
};

/// File extension the replay format is stored under.
pub const FILE_EXTENSION: &str = "demlog";

/// One line of a replay log.
///
/// A log is JSON entries separated by newlines: a header carrying tick rate
/// and map name, world frames with the full player/bomb/projectile state, and
/// game events. Winner and reason codes in events are numeric, exactly as a
/// real decoder would hand them over.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LogEntry {
    #[serde(rename_all = "camelCase")]
    Header { tick_rate: f64, map: String },
    Frame {
        tick: i32,
        #[serde(default)]
        players: Vec<ParticipantView>,
        #[serde(default)]
        bomb: BombView,
        #[serde(default)]
        projectiles: Vec<ProjectileView>,
    },
    Event { tick: i32, event: WireEvent },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    RoundStart,
    FreezetimeEnd,
    RoundEnd {
        winner: i32,
        reason: i32,
    },
    Kill {
        #[serde(default)]
        attacker: Option<WireActor>,
        #[serde(default)]
        victim: Option<WireActor>,
        #[serde(default)]
        weapon: Option<String>,
        #[serde(default)]
        headshot: bool,
        #[serde(default)]
        penetrated: u32,
    },
    BombPlanted,
    BombDefused,
    BombExploded,
    BombPickup {
        carrier: u64,
    },
    BombDropped,
    #[serde(rename_all = "camelCase")]
    GrenadeThrown {
        entity_id: i32,
        grenade: GrenadeType,
        #[serde(default)]
        thrower: Option<u64>,
        x: f64,
        y: f64,
    },
    #[serde(rename_all = "camelCase")]
    GrenadeDestroyed {
        entity_id: i32,
        x: f64,
        y: f64,
    },
    SmokeStart {
        x: f64,
        y: f64,
    },
    SmokeExpired {
        x: f64,
        y: f64,
    },
    FireStart {
        x: f64,
        y: f64,
    },
    FireExpired {
        x: f64,
        y: f64,
    },
    DecoyStart {
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActor {
    pub steam_id: u64,
    pub x: f64,
    pub y: f64,
}

pub struct ReplayEngine<'d> {
    data: &'d [u8],
    cursor: usize,
    line_no: usize,
    map: Option<String>,
    state: ReplayState,
}

#[derive(Default)]
struct ReplayState {
    tick: i32,
    tick_rate: f64,
    players: Vec<ParticipantView>,
    bomb: BombView,
    projectiles: Vec<ProjectileView>,
}

impl EngineState for ReplayState {
    fn current_tick(&self) -> i32 {
        self.tick
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    fn current_time(&self) -> f64 {
        if self.tick_rate <= 0.0 {
            return 0.0;
        }
        self.tick as f64 / self.tick_rate
    }

    fn participants(&self) -> Vec<ParticipantView> {
        self.players.clone()
    }

    fn bomb(&self) -> BombView {
        self.bomb
    }

    fn projectiles(&self) -> Vec<ProjectileView> {
        self.projectiles.clone()
    }
}

impl<'d> ReplayEngine<'d> {
    pub fn new(data: &'d [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            line_no: 0,
            map: None,
            state: ReplayState::default(),
        }
    }

    /// Next line and whether it was terminated by a newline. An unterminated
    /// line is by definition the last one.
    fn next_line(&mut self) -> Option<(&'d [u8], bool)> {
        if self.cursor >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.cursor..];
        self.line_no += 1;
        match rest.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                self.cursor += pos + 1;
                Some((&rest[..pos], true))
            }
            None => {
                self.cursor = self.data.len();
                Some((rest, false))
            }
        }
    }
}

impl DemoEngine for ReplayEngine<'_> {
    fn next_event(&mut self) -> Result<Option<DemoEvent>, EngineError> {
        loop {
            let Some((line, terminated)) = self.next_line() else {
                return Ok(None);
            };
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            let entry: LogEntry = match serde_json::from_slice(line) {
                Ok(entry) => entry,
                // A cut-off final line means the recording stopped mid write.
                // Everything before it still counts.
                Err(_) if !terminated => return Err(EngineError::UnexpectedEndOfStream),
                Err(err) => {
                    return Err(EngineError::Malformed {
                        line: self.line_no,
                        message: err.to_string(),
                    })
                }
            };

            match entry {
                LogEntry::Header { tick_rate, map } => {
                    self.state.tick_rate = tick_rate;
                    self.map = Some(map);
                }
                LogEntry::Frame {
                    tick,
                    players,
                    bomb,
                    projectiles,
                } => {
                    self.state.tick = tick;
                    self.state.players = players;
                    self.state.bomb = bomb;
                    self.state.projectiles = projectiles;
                    return Ok(Some(DemoEvent::FrameAdvance));
                }
                LogEntry::Event { tick, event } => {
                    self.state.tick = tick;
                    return Ok(Some(decode(event)));
                }
            }
        }
    }

    fn state(&self) -> &dyn EngineState {
        &self.state
    }

    fn progress(&self) -> f32 {
        if self.data.is_empty() {
            return 1.0;
        }
        self.cursor as f32 / self.data.len() as f32
    }

    fn map_name(&self) -> Option<&str> {
        self.map.as_deref()
    }
}

fn decode(event: WireEvent) -> DemoEvent {
    match event {
        WireEvent::RoundStart => DemoEvent::RoundStart,
        WireEvent::FreezetimeEnd => DemoEvent::FreezetimeEnd,
        WireEvent::RoundEnd { winner, reason } => DemoEvent::RoundEnd {
            winner: side_from_code(winner),
            reason: RoundEndReason::from_code(reason),
        },
        WireEvent::Kill {
            attacker,
            victim,
            weapon,
            headshot,
            penetrated,
        } => DemoEvent::Kill(KillData {
            attacker: attacker.map(actor),
            victim: victim.map(actor),
            weapon,
            headshot,
            penetrated,
        }),
        WireEvent::BombPlanted => DemoEvent::BombPlanted,
        WireEvent::BombDefused => DemoEvent::BombDefused,
        WireEvent::BombExploded => DemoEvent::BombExploded,
        WireEvent::BombPickup { carrier } => DemoEvent::BombPickup { carrier },
        WireEvent::BombDropped => DemoEvent::BombDropped,
        WireEvent::GrenadeThrown {
            entity_id,
            grenade,
            thrower,
            x,
            y,
        } => DemoEvent::GrenadeThrown(GrenadeThrow {
            entity_id,
            kind: grenade,
            thrower,
            x,
            y,
        }),
        WireEvent::GrenadeDestroyed { entity_id, x, y } => {
            DemoEvent::GrenadeDestroyed { entity_id, x, y }
        }
        WireEvent::SmokeStart { x, y } => DemoEvent::SmokeStart { x, y },
        WireEvent::SmokeExpired { x, y } => DemoEvent::SmokeExpired { x, y },
        WireEvent::FireStart { x, y } => DemoEvent::FireStart { x, y },
        WireEvent::FireExpired { x, y } => DemoEvent::FireExpired { x, y },
        WireEvent::DecoyStart { x, y } => DemoEvent::DecoyStart { x, y },
    }
}

fn actor(actor: WireActor) -> KillActor {
    KillActor {
        steam_id: actor.steam_id,
        x: actor.x,
        y: actor.y,
    }
}
