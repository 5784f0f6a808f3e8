use model::{GrenadeEvent, GrenadeType, TrajectoryPoint};

use crate::engine::{GrenadeThrow, ProjectileView};
use crate::trajectory;

pub const MAX_TRAJECTORY_POINTS: usize = 10;

const SMOKE_DURATION: f64 = 18.0;
const MOLOTOV_MAX_DURATION: f64 = 7.0;
const DECOY_DURATION: f64 = 15.0;

/// Correlates the grenade signals of a single round.
///
/// Throws are tracked in-flight under the projectile's entity id and sampled
/// into a trajectory every world frame. Effect signals (smoke bloom, fire
/// start, decoy start) arrive without that id, so they are matched back to a
/// throw by position. Signals that match nothing are dropped.
pub struct GrenadeCorrelator {
    inflight: std::collections::HashMap<i32, Inflight>,
    committed: Vec<GrenadeEvent>,
    /// Committed smokes keyed by their quantized bloom position, for the
    /// later expiry signal.
    smoke_by_pos: std::collections::HashMap<[i64; 2], usize>,
    fire_by_pos: std::collections::HashMap<[i64; 2], usize>,
    max_match_dist_sq: Option<f64>,
}

struct Inflight {
    event: GrenadeEvent,
    trajectory: Vec<TrajectoryPoint>,
}

impl GrenadeCorrelator {
    pub fn new(max_match_distance: Option<f64>) -> Self {
        Self {
            inflight: std::collections::HashMap::new(),
            committed: Vec::new(),
            smoke_by_pos: std::collections::HashMap::new(),
            fire_by_pos: std::collections::HashMap::new(),
            max_match_dist_sq: max_match_distance.map(|d| d * d),
        }
    }

    pub fn on_throw(&mut self, throw: &GrenadeThrow, tick: i32, time: f64) {
        let event = GrenadeEvent {
            kind: throw.kind,
            thrower: throw.thrower.unwrap_or(0),
            throw_tick: tick,
            throw_time: time,
            throw_x: throw.x,
            throw_y: throw.y,
            detonate_tick: 0,
            detonate_time: 0.0,
            detonate_x: 0.0,
            detonate_y: 0.0,
            effect_duration: None,
            trajectory: Vec::new(),
        };
        self.inflight.insert(
            throw.entity_id,
            Inflight {
                event,
                trajectory: vec![TrajectoryPoint {
                    time_in_round: time,
                    x: throw.x,
                    y: throw.y,
                }],
            },
        );
    }

    /// Appends the current projectile positions to their trajectories.
    pub fn sample(&mut self, projectiles: &[ProjectileView], time: f64) {
        for projectile in projectiles {
            if let Some(grenade) = self.inflight.get_mut(&projectile.entity_id) {
                grenade.trajectory.push(TrajectoryPoint {
                    time_in_round: time,
                    x: projectile.x,
                    y: projectile.y,
                });
            }
        }
    }

    /// Projectile entity destroyed, which is where HE and flash grenades
    /// detonate. Commits the throw with the destroy position.
    pub fn on_destroy(&mut self, entity_id: i32, x: f64, y: f64, tick: i32, time: f64) {
        let Some(mut grenade) = self.inflight.remove(&entity_id) else {
            tracing::trace!(entity_id, "projectile destroyed without a tracked throw");
            return;
        };

        grenade.event.detonate_tick = tick;
        grenade.event.detonate_time = time;
        grenade.event.detonate_x = x;
        grenade.event.detonate_y = y;
        grenade.event.trajectory =
            trajectory::downsample(grenade.trajectory, MAX_TRAJECTORY_POINTS);
        self.committed.push(grenade.event);
    }

    /// Smoke cloud formed. The signal carries no entity id, so the nearest
    /// in-flight smoke (by throw position) is committed with the bloom as its
    /// detonation point and the full cloud lifetime as a provisional duration.
    pub fn on_smoke_start(&mut self, x: f64, y: f64, tick: i32, time: f64) {
        let Some(entity_id) = self.nearest_inflight_smoke(x, y) else {
            tracing::trace!("smoke bloom without a matching throw");
            return;
        };
        let Some(mut grenade) = self.inflight.remove(&entity_id) else {
            return;
        };

        grenade.event.detonate_tick = tick;
        grenade.event.detonate_time = time;
        grenade.event.detonate_x = x;
        grenade.event.detonate_y = y;
        grenade.event.effect_duration = Some(SMOKE_DURATION);
        grenade.event.trajectory =
            trajectory::downsample(grenade.trajectory, MAX_TRAJECTORY_POINTS);
        self.committed.push(grenade.event);

        self.smoke_by_pos
            .insert(quantize(x, y), self.committed.len() - 1);
    }

    /// Smoke faded early (or late). Replaces the provisional duration with
    /// the observed one.
    pub fn on_smoke_expired(&mut self, x: f64, y: f64, time: f64) {
        let Some(idx) = self.smoke_by_pos.remove(&quantize(x, y)) else {
            return;
        };
        if let Some(grenade) = self.committed.get_mut(idx) {
            if grenade.detonate_time > 0.0 && time > grenade.detonate_time {
                grenade.effect_duration = Some(time - grenade.detonate_time);
            }
        }
    }

    pub fn on_fire_start(&mut self, x: f64, y: f64) {
        const FIRE: &[GrenadeType] = &[GrenadeType::Molotov, GrenadeType::Incendiary];
        let Some(idx) = self.nearest_unresolved(FIRE, x, y) else {
            tracing::trace!("fire started without a matching molotov");
            return;
        };
        self.committed[idx].effect_duration = Some(MOLOTOV_MAX_DURATION);
        self.fire_by_pos.insert(quantize(x, y), idx);
    }

    pub fn on_fire_expired(&mut self, x: f64, y: f64, time: f64) {
        let Some(idx) = self.fire_by_pos.remove(&quantize(x, y)) else {
            return;
        };
        if let Some(grenade) = self.committed.get_mut(idx) {
            if grenade.detonate_time > 0.0 {
                let duration = (time - grenade.detonate_time).min(MOLOTOV_MAX_DURATION);
                if duration > 0.0 {
                    grenade.effect_duration = Some(duration);
                }
            }
        }
    }

    pub fn on_decoy_start(&mut self, x: f64, y: f64) {
        let Some(idx) = self.nearest_unresolved(&[GrenadeType::Decoy], x, y) else {
            tracing::trace!("decoy started without a matching throw");
            return;
        };
        self.committed[idx].effect_duration = Some(DECOY_DURATION);
    }

    /// Commits everything still in flight and returns the round's grenades.
    ///
    /// Leftover throws get their last sampled position as a synthetic
    /// detonation point. The detonation tick stays zero for those.
    pub fn finish(&mut self) -> Vec<GrenadeEvent> {
        let mut leftover: Vec<Inflight> = self.inflight.drain().map(|(_, g)| g).collect();
        leftover.sort_by_key(|g| g.event.throw_tick);
        if !leftover.is_empty() {
            tracing::debug!(count = leftover.len(), "force-committing unfinished grenades");
        }

        for mut grenade in leftover {
            if let Some(last) = grenade.trajectory.last() {
                grenade.event.detonate_time = last.time_in_round;
                grenade.event.detonate_x = last.x;
                grenade.event.detonate_y = last.y;
            }
            grenade.event.trajectory =
                trajectory::downsample(grenade.trajectory, MAX_TRAJECTORY_POINTS);
            self.committed.push(grenade.event);
        }

        self.smoke_by_pos.clear();
        self.fire_by_pos.clear();
        std::mem::take(&mut self.committed)
    }

    fn nearest_inflight_smoke(&self, x: f64, y: f64) -> Option<i32> {
        let mut best: Option<(i32, f64)> = None;
        for (id, grenade) in &self.inflight {
            if grenade.event.kind != GrenadeType::Smoke {
                continue;
            }
            let d = dist_sq(grenade.event.throw_x, grenade.event.throw_y, x, y);
            if let Some(max) = self.max_match_dist_sq {
                if d > max {
                    continue;
                }
            }
            let better = match best {
                None => true,
                // Entity id breaks exact ties to keep the pick stable.
                Some((best_id, best_d)) => d < best_d || (d == best_d && *id < best_id),
            };
            if better {
                best = Some((*id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Newest committed throw of one of `kinds` without a resolved effect
    /// duration, nearest to the given position. Ties keep the newer throw.
    fn nearest_unresolved(&self, kinds: &[GrenadeType], x: f64, y: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, grenade) in self.committed.iter().enumerate().rev() {
            if grenade.effect_duration.is_some() || !kinds.contains(&grenade.kind) {
                continue;
            }
            let d = dist_sq(grenade.detonate_x, grenade.detonate_y, x, y);
            if let Some(max) = self.max_match_dist_sq {
                if d > max {
                    continue;
                }
            }
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

fn quantize(x: f64, y: f64) -> [i64; 2] {
    [x.round() as i64, y.round() as i64]
}

fn dist_sq(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}
