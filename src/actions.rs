//! Action catalogue and the effect phase: turning action levels into
//! creature state changes and at most one movement intent.

use crate::config::ActionConfig;
use crate::creature::Creature;
use crate::grid::{Coord, Dir, Grid};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Effector outputs of the neural network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SetResponsiveness,
    SetOscillatorPeriod,
    /// Absolute east(+)/west(-)
    MoveX,
    /// Absolute south(+)/north(-)
    MoveY,
    MoveEast,
    MoveWest,
    MoveNorth,
    MoveSouth,
    MoveForward,
    MoveLeft,
    MoveRight,
    /// Signed rotation: negative turns left, positive turns right
    MoveRightLeft,
    MoveRandom,
}

impl Action {
    pub const COUNT: usize = 13;

    pub const ALL: [Action; Action::COUNT] = [
        Action::SetResponsiveness,
        Action::SetOscillatorPeriod,
        Action::MoveX,
        Action::MoveY,
        Action::MoveEast,
        Action::MoveWest,
        Action::MoveNorth,
        Action::MoveSouth,
        Action::MoveForward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveRightLeft,
        Action::MoveRandom,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Action> {
        Action::ALL.get(idx).copied()
    }
}

/// Enabled-action mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSet([bool; Action::COUNT]);

impl ActionSet {
    pub fn all() -> Self {
        Self([true; Action::COUNT])
    }

    pub fn only(actions: &[Action]) -> Self {
        let mut mask = [false; Action::COUNT];
        for action in actions {
            mask[action.index()] = true;
        }
        Self(mask)
    }

    #[inline]
    pub fn contains(&self, action: Action) -> bool {
        self.0[action.index()]
    }

    /// Level of `action`, or 0.0 when it is disabled
    #[inline]
    pub fn level(&self, levels: &[f32], action: Action) -> f32 {
        if self.contains(action) {
            levels[action.index()]
        } else {
            0.0
        }
    }
}

/// Effect-phase settings derived from config
#[derive(Debug, Clone, Copy)]
pub struct ActionSettings {
    pub enabled: ActionSet,
    pub response_curve_k: f32,
}

impl ActionSettings {
    pub fn from_config(config: &ActionConfig) -> Self {
        Self {
            enabled: ActionSet::only(&config.enabled),
            response_curve_k: config.response_curve_k,
        }
    }
}

/// Movement multiplier for a responsiveness in 0.0..=1.0.
///
/// `(2 - r)^(-2k) - 2^(-2k) * (1 - r)`: 0 at r = 0, 1 at r = 1, increasing
/// in between; larger `k` keeps low responsiveness closer to zero.
pub fn response_curve(responsiveness: f32, k: f32) -> f32 {
    let r = responsiveness.clamp(0.0, 1.0) as f64;
    let k = k as f64;
    ((2.0 - r).powf(-2.0 * k) - 2.0f64.powf(-2.0 * k) * (1.0 - r)) as f32
}

/// Outcome of the effect phase for one creature. Nothing here has been
/// applied yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Decision {
    pub responsiveness: Option<f32>,
    pub clock: Option<u32>,
    pub move_to: Option<Coord>,
}

/// Interpret raw action levels for `creature` against the tick's grid snapshot
pub fn plan_actions<R: Rng + ?Sized>(
    creature: &Creature,
    levels: &[f32],
    grid: &Grid,
    settings: &ActionSettings,
    rng: &mut R,
) -> Decision {
    let enabled = &settings.enabled;
    let mut decision = Decision::default();

    let mut responsiveness = creature.responsiveness;
    if enabled.contains(Action::SetResponsiveness) {
        let ceiling = creature.genome.responsiveness_f32().clamp(0.0, 1.0);
        if ceiling > 0.0 {
            let level = levels[Action::SetResponsiveness.index()];
            responsiveness = ((level / ceiling).tanh() + 1.0) / 2.0;
            decision.responsiveness = Some(responsiveness);
        }
    }

    if enabled.contains(Action::SetOscillatorPeriod) {
        let level = levels[Action::SetOscillatorPeriod.index()] as f64;
        let normalized = (level.tanh() + 1.0) / 2.0;
        let period = 1 + (1.5 + (7.0 * normalized).exp()) as u32;
        if (2..=u8::MAX as u32).contains(&period) {
            decision.clock = Some(period);
        }
    }

    let (move_x, move_y) = movement_vector(creature.last_move_dir, levels, enabled, rng);
    let adjust = response_curve(responsiveness, settings.response_curve_k);
    let move_x = move_x.tanh() * adjust;
    let move_y = move_y.tanh() * adjust;

    let step = Dir {
        x: probabilistic_step(move_x, rng),
        y: probabilistic_step(move_y, rng),
    };
    let target = creature.loc.offset(step);
    if !step.is_center() && grid.is_empty_at(target) {
        decision.move_to = Some(target);
    }

    decision
}

/// Sum every movement contribution into raw (x, y) accumulators
fn movement_vector<R: Rng + ?Sized>(
    last_dir: Dir,
    levels: &[f32],
    enabled: &ActionSet,
    rng: &mut R,
) -> (f32, f32) {
    let level = |action: Action| enabled.level(levels, action);
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut push = |dir: Dir, amount: f32| {
        x += dir.x as f32 * amount;
        y += dir.y as f32 * amount;
    };

    push(Dir::EAST, level(Action::MoveX));
    push(Dir::SOUTH, level(Action::MoveY));
    push(Dir::EAST, level(Action::MoveEast));
    push(Dir::WEST, level(Action::MoveWest));
    push(Dir::NORTH, level(Action::MoveNorth));
    push(Dir::SOUTH, level(Action::MoveSouth));
    push(last_dir, level(Action::MoveForward));
    push(last_dir.rotate90_ccw(), level(Action::MoveLeft));
    push(last_dir.rotate90_cw(), level(Action::MoveRight));

    let turn = level(Action::MoveRightLeft);
    if turn < 0.0 {
        push(last_dir.rotate90_ccw(), -turn);
    } else if turn > 0.0 {
        push(last_dir.rotate90_cw(), turn);
    }

    if enabled.contains(Action::MoveRandom) {
        push(Dir::random(rng), levels[Action::MoveRandom.index()]);
    }

    (x, y)
}

/// Magnitude is the probability of stepping; sign is the direction
#[inline]
fn probabilistic_step<R: Rng + ?Sized>(axis: f32, rng: &mut R) -> i8 {
    if rng.gen::<f32>() < axis.abs() {
        if axis < 0.0 {
            -1
        } else {
            1
        }
    } else {
        0
    }
}
