use model::{GrenadeType, Side, WinReason};

/// A single event pulled out of a demo engine.
///
/// `FrameAdvance` means the engine finished applying one world frame and the
/// snapshot of [`EngineState`] is consistent for sampling. All other variants
/// carry the game event itself, with positions already resolved by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    RoundStart,
    FreezetimeEnd,
    RoundEnd {
        winner: Option<Side>,
        reason: RoundEndReason,
    },
    Kill(KillData),
    BombPlanted,
    BombDefused,
    BombExploded,
    BombPickup {
        carrier: u64,
    },
    BombDropped,
    GrenadeThrown(GrenadeThrow),
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
    FrameAdvance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KillData {
    pub attacker: Option<KillActor>,
    pub victim: Option<KillActor>,
    pub weapon: Option<String>,
    pub headshot: bool,
    pub penetrated: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillActor {
    pub steam_id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrenadeThrow {
    pub entity_id: i32,
    pub kind: GrenadeType,
    pub thrower: Option<u64>,
    pub x: f64,
    pub y: f64,
}

/// Read access to the engine's world state at the current tick.
pub trait EngineState {
    fn current_tick(&self) -> i32;
    fn tick_rate(&self) -> f64;
    /// Seconds since the start of the demo.
    fn current_time(&self) -> f64;
    fn participants(&self) -> Vec<ParticipantView>;
    fn bomb(&self) -> BombView;
    fn projectiles(&self) -> Vec<ProjectileView>;
}

/// Pull interface over a demo decoder.
///
/// `next_event` drives the engine forward by exactly one event and `state`
/// reflects the world after that event was applied.
pub trait DemoEngine {
    fn next_event(&mut self) -> Result<Option<DemoEvent>, EngineError>;
    fn state(&self) -> &dyn EngineState;
    /// Fraction of the underlying stream consumed so far, in `0.0..=1.0`.
    fn progress(&self) -> f32;
    fn map_name(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub steam_id: u64,
    pub name: String,
    pub team: Option<Side>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub health: i32,
    pub armor: i32,
    pub is_alive: bool,
    pub active_weapon: Option<String>,
    pub has_defuser: bool,
    /// Remaining flashbang blindness in seconds.
    pub flash_remaining: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombView {
    pub carrier: Option<BombCarrier>,
    /// Last position the engine saw the bomb on the ground.
    pub ground_x: f64,
    pub ground_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombCarrier {
    pub steam_id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileView {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,
    #[error("malformed entry at line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("reading stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a round can end with, as the engine numbers them in its
/// round_end message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEndReason {
    TargetBombed,
    VipEscaped,
    VipKilled,
    TerroristsEscaped,
    CtStoppedEscape,
    TerroristsStopped,
    BombDefused,
    CtWin,
    TerroristsWin,
    Draw,
    HostagesRescued,
    TargetSaved,
    HostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TerroristsSurrender,
    CtSurrender,
    TerroristsPlanted,
    CtsReachedHostage,
    Unknown,
}

pub static ROUND_END_REASON: phf::Map<i32, RoundEndReason> = phf::phf_map! {
    1_i32 => RoundEndReason::TargetBombed,
    2_i32 => RoundEndReason::VipEscaped,
    3_i32 => RoundEndReason::VipKilled,
    4_i32 => RoundEndReason::TerroristsEscaped,
    5_i32 => RoundEndReason::CtStoppedEscape,
    6_i32 => RoundEndReason::TerroristsStopped,
    7_i32 => RoundEndReason::BombDefused,
    8_i32 => RoundEndReason::CtWin,
    9_i32 => RoundEndReason::TerroristsWin,
    10_i32 => RoundEndReason::Draw,
    11_i32 => RoundEndReason::HostagesRescued,
    12_i32 => RoundEndReason::TargetSaved,
    13_i32 => RoundEndReason::HostagesNotRescued,
    14_i32 => RoundEndReason::TerroristsNotEscaped,
    15_i32 => RoundEndReason::VipNotEscaped,
    16_i32 => RoundEndReason::GameStart,
    17_i32 => RoundEndReason::TerroristsSurrender,
    18_i32 => RoundEndReason::CtSurrender,
    19_i32 => RoundEndReason::TerroristsPlanted,
    20_i32 => RoundEndReason::CtsReachedHostage,
};

impl RoundEndReason {
    pub fn from_code(code: i32) -> Self {
        ROUND_END_REASON
            .get(&code)
            .copied()
            .unwrap_or(RoundEndReason::Unknown)
    }

    /// Collapses the engine reason onto the coarse category the output
    /// document uses.
    pub fn win_reason(&self) -> WinReason {
        match self {
            Self::TerroristsWin | Self::CtWin | Self::TerroristsStopped | Self::CtStoppedEscape => {
                WinReason::Elimination
            }
            Self::BombDefused => WinReason::BombDefused,
            Self::TargetBombed => WinReason::BombExploded,
            Self::TargetSaved => WinReason::Time,
            _ => WinReason::Other,
        }
    }
}

/// Maps the engine's numeric team slot onto a side. 2 is terrorists, 3 is
/// counter-terrorists, everything else (spectators, unassigned) is none.
pub fn side_from_code(code: i32) -> Option<Side> {
    match code {
        2 => Some(Side::T),
        3 => Some(Side::Ct),
        _ => None,
    }
}
