#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat rules: tower cooldowns, shot strength and hit resolution.
//!
//! The world owns the towers and enemies; this crate only decides what a
//! single cooldown step or a single hit does to them.

use endless_defence_core::TowerKind;

/// Global pacing multiplier applied on top of every tower's fire rate.
pub const FIRE_RATE_SCALE: f32 = 1.35;

/// Readiness of a tower after its cooldown advanced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The tower must keep waiting.
    CoolingDown,
    /// The tower may fire this tick.
    Ready,
}

/// Advances `cooldown` by `dt` seconds and reports whether the tower may fire.
///
/// The cooldown is allowed to go negative; a tower that finds no target keeps
/// its accumulated readiness until the next tick.
pub fn cool_down(cooldown: &mut f32, dt: f32) -> Readiness {
    *cooldown -= dt;
    if *cooldown > 0.0 {
        Readiness::CoolingDown
    } else {
        Readiness::Ready
    }
}

/// Damage dealt by a shot and the cooldown that follows it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Hit points removed from the target.
    pub damage: f32,
    /// Seconds before the tower may fire again.
    pub cooldown: f32,
}

/// Resolves the shot a tower of `kind` at `level` fires.
#[must_use]
pub fn arm(kind: TowerKind, level: u32) -> Shot {
    let rate = kind.fire_rate_at(level) * FIRE_RATE_SCALE;
    Shot {
        damage: kind.damage_at(level),
        cooldown: if rate > 0.0 { 1.0 / rate } else { f32::MAX },
    }
}

/// Result of applying a shot to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// The enemy survived the hit.
    Wounded,
    /// The hit killed the enemy; its reward must be paid.
    Killed,
    /// The enemy was already dead; nothing happened.
    AlreadyDown,
}

/// Applies `damage` to an enemy's hit points.
///
/// [`HitOutcome::Killed`] is reported at most once per enemy: the `alive`
/// flag flips on the killing hit and later hits are ignored.
pub fn apply_hit(hp: &mut f32, alive: &mut bool, damage: f32) -> HitOutcome {
    if !*alive {
        return HitOutcome::AlreadyDown;
    }

    *hp -= damage;
    if *hp <= 0.0 {
        *alive = false;
        HitOutcome::Killed
    } else {
        HitOutcome::Wounded
    }
}
