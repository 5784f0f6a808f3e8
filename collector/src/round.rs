use model::{Bomb, BombPhase, KillEvent, PlayerState, Round, Side, Snapshot};

use crate::engine::{DemoEvent, EngineState, GrenadeThrow, KillData, RoundEndReason};
use crate::grenades::GrenadeCorrelator;

/// Used when the engine reports no usable tick rate, roughly 5 snapshots per
/// second at the common 64 tick.
const FALLBACK_SAMPLE_INTERVAL: i32 = 13;

#[derive(Debug, Clone)]
pub struct Config {
    pub snapshots_per_second: f64,
    /// How long collection keeps running after the round end signal, so the
    /// aftermath stays visible.
    pub post_round_buffer_seconds: f64,
    /// Upper bound on the distance between an effect signal and the throw it
    /// is matched to. Unbounded when unset.
    pub max_grenade_match_distance: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshots_per_second: 5.0,
            post_round_buffer_seconds: 3.0,
            max_grenade_match_distance: None,
        }
    }
}

enum RoundState {
    Idle,
    Active(ActiveRound),
    PendingEnd { round: ActiveRound, end_tick: i32 },
}

struct ActiveRound {
    round: Round,
    grenades: GrenadeCorrelator,
    start_tick: i32,
    last_snapshot_tick: i32,
    sample_interval: i32,
    post_round_ticks: i32,
    bomb_phase: Option<BombPhase>,
    bomb_carrier: Option<u64>,
}

impl ActiveRound {
    fn seconds_since_start(&self, tick: i32, state: &dyn EngineState) -> f64 {
        let rate = state.tick_rate();
        if rate <= 0.0 {
            return 0.0;
        }
        (tick - self.start_tick) as f64 / rate
    }

    fn maybe_snapshot(&mut self, tick: i32, state: &dyn EngineState) {
        if tick - self.last_snapshot_tick < self.sample_interval {
            return;
        }
        self.last_snapshot_tick = tick;

        let time = self.seconds_since_start(tick, state);
        let players = state
            .participants()
            .into_iter()
            .map(|p| PlayerState {
                steam_id: p.steam_id,
                name: p.name,
                team: p.team,
                x: p.x,
                y: p.y,
                z: p.z,
                yaw: p.yaw,
                hp: p.health,
                armor: p.armor,
                is_alive: p.is_alive,
                weapon: p.active_weapon.unwrap_or_default(),
                has_defuser: p.has_defuser,
                flash_alpha: flash_alpha(p.flash_remaining),
            })
            .collect();

        self.round.snapshots.push(Snapshot {
            tick,
            time_in_round: time,
            bomb: self.capture_bomb(state),
            players,
        });
        self.grenades.sample(&state.projectiles(), time);
    }

    /// A live carrier wins over everything. Otherwise the phase tracked from
    /// bomb events applies, with the last known ground position.
    fn capture_bomb(&self, state: &dyn EngineState) -> Bomb {
        let live = state.bomb();
        if let Some(carrier) = live.carrier {
            return Bomb {
                x: carrier.x,
                y: carrier.y,
                state: BombPhase::Carried,
                carrier: Some(carrier.steam_id),
            };
        }

        let phase = self.bomb_phase.unwrap_or(BombPhase::Dropped);
        let carrier = match phase {
            BombPhase::Carried => self.bomb_carrier,
            _ => None,
        };
        Bomb {
            x: live.ground_x,
            y: live.ground_y,
            state: phase,
            carrier,
        }
    }
}

/// Turns the flat event stream into per-round records.
///
/// A round goes live at freeze time end, keeps collecting through the
/// post-round buffer after the end signal and is committed when the buffer
/// elapses, a new round starts, or the stream ends.
pub struct RoundCollector {
    config: Config,
    state: RoundState,
    rounds: Vec<Round>,
    ct_score: u32,
    t_score: u32,
}

impl RoundCollector {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RoundState::Idle,
            rounds: Vec::new(),
            ct_score: 0,
            t_score: 0,
        }
    }

    pub fn handle(&mut self, event: &DemoEvent, state: &dyn EngineState) {
        match event {
            DemoEvent::RoundStart => self.on_round_start(),
            DemoEvent::FreezetimeEnd => self.on_freezetime_end(state),
            DemoEvent::RoundEnd { winner, reason } => self.on_round_end(*winner, *reason, state),
            DemoEvent::Kill(kill) => self.on_kill(kill, state),
            DemoEvent::BombPlanted => self.set_bomb(BombPhase::Planted, None),
            DemoEvent::BombDefused => self.set_bomb(BombPhase::Defused, None),
            DemoEvent::BombExploded => self.set_bomb(BombPhase::Exploded, None),
            DemoEvent::BombPickup { carrier } => self.set_bomb(BombPhase::Carried, Some(*carrier)),
            DemoEvent::BombDropped => self.set_bomb(BombPhase::Dropped, None),
            DemoEvent::GrenadeThrown(throw) => self.on_grenade_thrown(throw, state),
            DemoEvent::GrenadeDestroyed { entity_id, x, y } => {
                self.on_grenade_destroyed(*entity_id, *x, *y, state)
            }
            DemoEvent::SmokeStart { x, y } => self.on_smoke_start(*x, *y, state),
            DemoEvent::SmokeExpired { x, y } => self.on_smoke_expired(*x, *y, state),
            DemoEvent::FireStart { x, y } => {
                if let Some(active) = self.active_mut() {
                    active.grenades.on_fire_start(*x, *y);
                }
            }
            DemoEvent::FireExpired { x, y } => self.on_fire_expired(*x, *y, state),
            DemoEvent::DecoyStart { x, y } => {
                if let Some(active) = self.active_mut() {
                    active.grenades.on_decoy_start(*x, *y);
                }
            }
            DemoEvent::FrameAdvance => self.on_frame(state),
        }
    }

    /// Flushes whatever round is still open and returns everything collected.
    pub fn finish(mut self) -> Vec<Round> {
        self.finalize_open();
        self.rounds
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    fn on_round_start(&mut self) {
        // The buffered tail of the previous round must not bleed into a new
        // one starting before the buffer elapses.
        if matches!(self.state, RoundState::PendingEnd { .. }) {
            self.finalize_open();
        }
    }

    fn on_freezetime_end(&mut self, state: &dyn EngineState) {
        // Mid-stream recordings can drop the previous end signal entirely.
        self.finalize_open();

        let tick_rate = state.tick_rate();
        let mut sample_interval = 0;
        let mut post_round_ticks = 0;
        if tick_rate > 0.0 {
            sample_interval = (tick_rate / self.config.snapshots_per_second).round() as i32;
            post_round_ticks = (tick_rate * self.config.post_round_buffer_seconds) as i32;
        }
        if sample_interval < 1 {
            sample_interval = FALLBACK_SAMPLE_INTERVAL;
        }

        let number = self.rounds.len() as u32 + 1;
        tracing::debug!(number, tick = state.current_tick(), "round live");
        self.state = RoundState::Active(ActiveRound {
            round: Round {
                number,
                winner: None,
                win_reason: None,
                end_t_score: 0,
                end_ct_score: 0,
                snapshots: Vec::new(),
                kills: Vec::new(),
                grenades: Vec::new(),
            },
            grenades: GrenadeCorrelator::new(self.config.max_grenade_match_distance),
            start_tick: state.current_tick(),
            last_snapshot_tick: 0,
            sample_interval,
            post_round_ticks,
            bomb_phase: None,
            bomb_carrier: None,
        });
    }

    fn on_round_end(
        &mut self,
        winner: Option<Side>,
        reason: RoundEndReason,
        state: &dyn EngineState,
    ) {
        let end_tick = state.current_tick();
        match std::mem::replace(&mut self.state, RoundState::Idle) {
            RoundState::Idle => {}
            RoundState::Active(mut active) | RoundState::PendingEnd { round: mut active, .. } => {
                match winner {
                    Some(Side::Ct) => self.ct_score += 1,
                    Some(Side::T) => self.t_score += 1,
                    None => {}
                }
                active.round.winner = winner;
                active.round.win_reason = Some(reason.win_reason());
                active.round.end_t_score = self.t_score;
                active.round.end_ct_score = self.ct_score;
                self.state = RoundState::PendingEnd {
                    round: active,
                    end_tick,
                };
            }
        }
    }

    fn on_frame(&mut self, state: &dyn EngineState) {
        let tick = state.current_tick();
        if let RoundState::PendingEnd { round, end_tick } = &self.state {
            if tick - *end_tick > round.post_round_ticks {
                self.finalize_open();
                return;
            }
        }
        if let Some(active) = self.active_mut() {
            active.maybe_snapshot(tick, state);
        }
    }

    fn on_kill(&mut self, kill: &KillData, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };

        let mut event = KillEvent {
            tick,
            time_in_round: active.seconds_since_start(tick, state),
            attacker: 0,
            victim: 0,
            weapon: kill.weapon.clone().unwrap_or_default(),
            headshot: kill.headshot,
            wallbang: kill.penetrated > 0,
            attacker_x: 0.0,
            attacker_y: 0.0,
            victim_x: 0.0,
            victim_y: 0.0,
        };
        if let Some(attacker) = kill.attacker {
            event.attacker = attacker.steam_id;
            event.attacker_x = attacker.x;
            event.attacker_y = attacker.y;
        }
        if let Some(victim) = kill.victim {
            event.victim = victim.steam_id;
            event.victim_x = victim.x;
            event.victim_y = victim.y;
        }
        active.round.kills.push(event);
    }

    fn set_bomb(&mut self, phase: BombPhase, carrier: Option<u64>) {
        if let Some(active) = self.active_mut() {
            active.bomb_phase = Some(phase);
            active.bomb_carrier = carrier;
        }
    }

    fn on_grenade_thrown(&mut self, throw: &GrenadeThrow, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };
        let time = active.seconds_since_start(tick, state);
        active.grenades.on_throw(throw, tick, time);
    }

    fn on_grenade_destroyed(&mut self, entity_id: i32, x: f64, y: f64, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };
        let time = active.seconds_since_start(tick, state);
        active.grenades.on_destroy(entity_id, x, y, tick, time);
    }

    fn on_smoke_start(&mut self, x: f64, y: f64, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };
        let time = active.seconds_since_start(tick, state);
        active.grenades.on_smoke_start(x, y, tick, time);
    }

    fn on_smoke_expired(&mut self, x: f64, y: f64, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };
        let time = active.seconds_since_start(tick, state);
        active.grenades.on_smoke_expired(x, y, time);
    }

    fn on_fire_expired(&mut self, x: f64, y: f64, state: &dyn EngineState) {
        let tick = state.current_tick();
        let Some(active) = self.active_mut() else {
            return;
        };
        let time = active.seconds_since_start(tick, state);
        active.grenades.on_fire_expired(x, y, time);
    }

    fn finalize_open(&mut self) {
        match std::mem::replace(&mut self.state, RoundState::Idle) {
            RoundState::Idle => {}
            RoundState::Active(mut active) | RoundState::PendingEnd { round: mut active, .. } => {
                active.round.grenades = active.grenades.finish();
                tracing::debug!(
                    number = active.round.number,
                    snapshots = active.round.snapshots.len(),
                    kills = active.round.kills.len(),
                    grenades = active.round.grenades.len(),
                    "round committed"
                );
                self.rounds.push(active.round);
            }
        }
    }

    fn active_mut(&mut self) -> Option<&mut ActiveRound> {
        match &mut self.state {
            RoundState::Idle => None,
            RoundState::Active(active) => Some(active),
            RoundState::PendingEnd { round, .. } => Some(round),
        }
    }
}

fn flash_alpha(remaining: f64) -> f64 {
    if remaining <= 0.0 {
        return 0.0;
    }
    (remaining / 5.0 * 255.0).min(255.0)
}
