//! Rebuilding a field from a possibly inconsistent record.
//!
//! Records come from snapshots that may have been written by older builds or
//! edited by hand. Restoring never fails: out-of-range numbers are clamped,
//! records that cannot be placed are dropped, and derived flags are
//! recomputed.

use std::{collections::HashSet, sync::Arc};

use endless_defence_core::{FieldRecord, INTER_WAVE_DELAY};
use endless_defence_system_spawning::wave_definition;

use crate::{
    towers::{TowerRegistry, TowerState},
    Enemy, Field, MapModel,
};

const MAX_GOLD: u32 = 1_000_000_000;
const MAX_BASE_HP: u32 = 1_000;
const MAX_WAVE_INDEX: u32 = 1_000_000;
const MAX_TOWER_LEVEL: u32 = 1_000;
const MAX_TOWER_COOLDOWN: f32 = 10.0;
const MIN_ENEMY_SPEED: f32 = 1.0;
const MAX_ENEMY_SPEED: f32 = 1_000.0;
const MAX_ENEMY_REWARD: u32 = 1_000_000;

/// What had to be discarded while restoring a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Towers dropped for standing on invalid or occupied cells or reusing an id.
    pub dropped_towers: usize,
    /// Enemies dropped for having no hit points left or reusing an id.
    pub dropped_enemies: usize,
    /// Whether the recorded selection named a tower that was not restored.
    pub cleared_selection: bool,
}

impl RestoreReport {
    /// Reports whether the record was restored without discarding anything.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_towers == 0 && self.dropped_enemies == 0 && !self.cleared_selection
    }
}

impl Field {
    /// Rebuilds a field from `record`, repairing whatever is inconsistent.
    ///
    /// The random stream is not part of the record and is seeded from `seed`.
    #[must_use]
    pub fn restore(record: FieldRecord, map: Arc<MapModel>, seed: u64) -> (Self, RestoreReport) {
        let mut field = Field::new(record.id, record.name, map, seed);
        let mut report = RestoreReport::default();

        field.gold = record.gold.min(MAX_GOLD);
        field.max_base_hp = record.max_base_hp.clamp(1, MAX_BASE_HP);
        field.base_hp = record.base_hp.min(field.max_base_hp);
        field.speed = record.speed;
        field.paused = record.paused;
        field.selected_kind = record.selected_tower_kind;

        let wave_index = record.wave.wave_index.min(MAX_WAVE_INDEX);
        let wave = wave_definition(wave_index);
        field.wave.wave_index = wave_index;
        field.wave.spawned_in_wave = record.wave.spawned_in_wave.min(wave.count);
        field.wave.spawn_timer = clamp_finite(record.wave.spawn_timer, 0.0, wave.spawn_interval);
        field.wave.inter_wave_timer =
            clamp_finite(record.wave.inter_wave_timer, 0.0, INTER_WAVE_DELAY);

        field.towers = TowerRegistry::new(record.next_tower_id);
        let mut tower_ids = HashSet::new();
        for tower in record.towers {
            let placeable =
                field.map.is_buildable(tower.cell) && field.towers.at(tower.cell).is_none();
            if !placeable || !tower_ids.insert(tower.id) {
                report.dropped_towers += 1;
                continue;
            }

            let mut state = TowerState::from(tower);
            state.level = state.level.clamp(1, MAX_TOWER_LEVEL);
            state.cooldown = clamp_finite(state.cooldown, 0.0, MAX_TOWER_COOLDOWN);
            field.towers.adopt(state);
        }

        let segments = field.map.segment_count() as f32;
        let mut enemy_ids = HashSet::new();
        field.next_enemy_id = record.next_enemy_id.max(1);
        for enemy in record.enemies {
            let alive = enemy.hp.is_finite() && enemy.hp > 0.0;
            if !alive || !enemy_ids.insert(enemy.id) {
                report.dropped_enemies += 1;
                continue;
            }

            field.next_enemy_id = field.next_enemy_id.max(enemy.id.get().saturating_add(1));
            let max_hp = if enemy.max_hp.is_finite() {
                enemy.max_hp.max(enemy.hp)
            } else {
                enemy.hp
            };
            field.enemies.push(Enemy {
                id: enemy.id,
                kind: enemy.kind,
                hp: enemy.hp,
                max_hp,
                speed: clamp_finite(enemy.speed, MIN_ENEMY_SPEED, MAX_ENEMY_SPEED),
                reward: enemy.reward.clamp(1, MAX_ENEMY_REWARD),
                progress: clamp_finite(enemy.progress, 0.0, segments),
                alive: true,
            });
        }

        field.selected_tower = record
            .selected_tower
            .filter(|tower| field.towers.contains_id(*tower));
        report.cleared_selection =
            record.selected_tower.is_some() && field.selected_tower.is_none();

        field.victory = false;
        field.game_over = record.game_over || field.base_hp == 0;

        (field, report)
    }
}

/// Clamps `value` into `min..=max`, mapping non-finite input onto `min`.
fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}
