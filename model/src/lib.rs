mod mapconfig;
pub use mapconfig::MapConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ct,
    T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    Elimination,
    BombDefused,
    BombExploded,
    Time,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrenadeType {
    Smoke,
    Flash,
    He,
    Molotov,
    Incendiary,
    Decoy,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BombPhase {
    Carried,
    Planted,
    Dropped,
    Defused,
    Exploded,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub map: String,
    pub tick_rate: f64,
    pub duration: f64,
    pub teams: Teams,
    pub rounds: Vec<Round>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_config: Option<MapConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Teams {
    pub ct: TeamInfo,
    pub t: TeamInfo,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TeamInfo {
    pub name: String,
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub steam_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_reason: Option<WinReason>,
    pub end_t_score: u32,
    #[serde(rename = "endCTScore")]
    pub end_ct_score: u32,
    pub snapshots: Vec<Snapshot>,
    pub kills: Vec<KillEvent>,
    pub grenades: Vec<GrenadeEvent>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tick: i32,
    pub time_in_round: f64,
    pub bomb: Bomb,
    pub players: Vec<PlayerState>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bomb {
    pub x: f64,
    pub y: f64,
    pub state: BombPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub steam_id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Side>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub hp: i32,
    pub armor: i32,
    pub is_alive: bool,
    pub weapon: String,
    pub has_defuser: bool,
    pub flash_alpha: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillEvent {
    pub tick: i32,
    pub time_in_round: f64,
    pub attacker: u64,
    pub victim: u64,
    pub weapon: String,
    pub headshot: bool,
    pub wallbang: bool,
    pub attacker_x: f64,
    pub attacker_y: f64,
    pub victim_x: f64,
    pub victim_y: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrenadeEvent {
    #[serde(rename = "type")]
    pub kind: GrenadeType,
    pub thrower: u64,
    pub throw_tick: i32,
    pub throw_time: f64,
    pub throw_x: f64,
    pub throw_y: f64,
    pub detonate_tick: i32,
    pub detonate_time: f64,
    pub detonate_x: f64,
    pub detonate_y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrajectoryPoint {
    #[serde(rename = "t")]
    pub time_in_round: f64,
    pub x: f64,
    pub y: f64,
}
