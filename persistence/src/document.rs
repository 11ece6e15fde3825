//! Write side of the snapshot document.

use endless_defence_core::{EnemyRecord, FieldRecord, TowerRecord};
use endless_defence_world::{query, Field};
use serde::Serialize;

use crate::SnapshotError;

/// Format version written into, and required from, every snapshot document.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
    version: u32,
    saved_at: u64,
    active_field_index: usize,
    fields: Vec<SavedField>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedField {
    id: u32,
    name: String,
    next_enemy_id: u32,
    next_tower_id: u32,
    current_wave_index: u32,
    spawned_in_wave: u32,
    spawn_timer: f32,
    inter_wave_timer: f32,
    selected_tower_type: &'static str,
    selected_tower_id: Option<u32>,
    gold: u32,
    base_hp: u32,
    max_base_hp: u32,
    game_speed: u32,
    paused: bool,
    game_over: bool,
    victory: bool,
    towers: Vec<SavedTower>,
    enemies: Vec<SavedEnemy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedTower {
    id: u32,
    cell_x: u32,
    cell_y: u32,
    level: u32,
    target_mode: &'static str,
    cooldown: f32,
    tower_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedEnemy {
    id: u32,
    enemy_type: &'static str,
    hp: f32,
    max_hp: f32,
    speed: f32,
    reward: u32,
    progress: f32,
    alive: bool,
}

impl From<FieldRecord> for SavedField {
    fn from(record: FieldRecord) -> Self {
        Self {
            id: record.id.get(),
            name: record.name,
            next_enemy_id: record.next_enemy_id,
            next_tower_id: record.next_tower_id,
            current_wave_index: record.wave.wave_index,
            spawned_in_wave: record.wave.spawned_in_wave,
            spawn_timer: record.wave.spawn_timer,
            inter_wave_timer: record.wave.inter_wave_timer,
            selected_tower_type: record.selected_tower_kind.key(),
            selected_tower_id: record.selected_tower.map(|tower| tower.get()),
            gold: record.gold,
            base_hp: record.base_hp,
            max_base_hp: record.max_base_hp,
            game_speed: record.speed.multiplier(),
            paused: record.paused,
            game_over: record.game_over,
            victory: record.victory,
            towers: record.towers.iter().map(SavedTower::from).collect(),
            enemies: record.enemies.iter().map(SavedEnemy::from).collect(),
        }
    }
}

impl From<&TowerRecord> for SavedTower {
    fn from(tower: &TowerRecord) -> Self {
        Self {
            id: tower.id.get(),
            cell_x: tower.cell.column(),
            cell_y: tower.cell.row(),
            level: tower.level,
            target_mode: tower.target_mode.key(),
            cooldown: tower.cooldown,
            tower_type: tower.kind.key(),
        }
    }
}

impl From<&EnemyRecord> for SavedEnemy {
    fn from(enemy: &EnemyRecord) -> Self {
        Self {
            id: enemy.id.get(),
            enemy_type: enemy.kind.key(),
            hp: enemy.hp,
            max_hp: enemy.max_hp,
            speed: enemy.speed,
            reward: enemy.reward,
            progress: enemy.progress,
            alive: true,
        }
    }
}

/// Serialises the roster into a snapshot document.
///
/// `saved_at` is a caller-supplied timestamp, conventionally milliseconds
/// since the Unix epoch. Only live enemies are written; shot tracers never
/// are.
pub fn encode(fields: &[Field], active: usize, saved_at: u64) -> Result<String, SnapshotError> {
    let document = SnapshotDocument {
        version: SNAPSHOT_VERSION,
        saved_at,
        active_field_index: active,
        fields: fields
            .iter()
            .map(|field| SavedField::from(query::record(field)))
            .collect(),
    };
    serde_json::to_string(&document).map_err(SnapshotError::Encode)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use endless_defence_core::FieldId;
    use endless_defence_world::MapModel;
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn fresh_field_uses_documented_keys() {
        let field = Field::new(FieldId::new(1), "Field A", Arc::new(MapModel::standard()), 0);
        let text = encode(&[field], 0, 1_700_000_000_000).expect("encode");
        let document: Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(document["version"], json!(1));
        assert_eq!(document["savedAt"], json!(1_700_000_000_000u64));
        assert_eq!(document["activeFieldIndex"], json!(0));
        let field = &document["fields"][0];
        assert_eq!(field["id"], json!(1));
        assert_eq!(field["name"], json!("Field A"));
        assert_eq!(field["gold"], json!(180));
        assert_eq!(field["baseHp"], json!(20));
        assert_eq!(field["currentWaveIndex"], json!(0));
        assert_eq!(field["selectedTowerType"], json!("gunner"));
        assert_eq!(field["selectedTowerId"], Value::Null);
        assert_eq!(field["gameSpeed"], json!(1));
        assert_eq!(field["towers"], json!([]));
        assert_eq!(field["enemies"], json!([]));
    }
}
