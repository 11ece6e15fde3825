//! Read side of the snapshot document.
//!
//! Every key is optional and every value is checked by hand, so a document
//! edited by hand or written by an older build still loads. Type-level
//! repairs (unknown names, non-numbers, missing keys) happen here; range and
//! consistency repairs are left to `Field::restore`.

use std::sync::Arc;

use endless_defence_core::{
    field_name, CellCoord, EnemyId, EnemyKind, EnemyRecord, FieldId, FieldRecord, GameSpeed,
    TargetMode, TowerId, TowerKind, TowerRecord, WaveClock, SESSION_COUNT, STARTING_BASE_HP,
    STARTING_GOLD,
};
use endless_defence_world::{derive_field_seed, Field, MapModel};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{document::SNAPSHOT_VERSION, fresh_field, resume_seed, Roster, SnapshotError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default, deserialize_with = "lenient::number")]
    version: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    saved_at: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    active_field_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    fields: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(default, deserialize_with = "lenient::number")]
    next_enemy_id: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    next_tower_id: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    current_wave_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    spawned_in_wave: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    spawn_timer: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    inter_wave_timer: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    selected_tower_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    selected_tower_id: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    gold: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    base_hp: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    max_base_hp: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    game_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    paused: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    game_over: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    victory: Option<bool>,
    #[serde(default, deserialize_with = "lenient::list")]
    towers: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    enemies: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTower {
    #[serde(default, deserialize_with = "lenient::number")]
    id: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    cell_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    cell_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    level: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    target_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    cooldown: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    tower_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnemy {
    #[serde(default, deserialize_with = "lenient::number")]
    id: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    enemy_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    hp: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    max_hp: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    reward: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    progress: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    alive: Option<bool>,
}

mod lenient {
    use super::{Deserialize, Deserializer, Value};

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_f64().filter(|number| number.is_finite()))
    }

    pub(super) fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?.as_bool())
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?
            .as_str()
            .map(str::to_owned))
    }

    pub(super) fn list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }
}

/// Parses a snapshot document into a roster.
///
/// Fails only when the document as a whole is unusable: invalid JSON, a root
/// that is not an object, a version other than [`SNAPSHOT_VERSION`], or an
/// empty field list. Individual fields are repaired instead; see
/// `Field::restore` for the rules.
pub fn decode(text: &str, map: &Arc<MapModel>, seed: u64) -> Result<Roster, SnapshotError> {
    let root: Value = serde_json::from_str(text).map_err(SnapshotError::Malformed)?;
    if !root.is_object() {
        return Err(SnapshotError::NotAnObject);
    }
    let document = RawDocument::deserialize(root).map_err(SnapshotError::Malformed)?;

    if document.version != Some(f64::from(SNAPSHOT_VERSION)) {
        return Err(SnapshotError::VersionMismatch {
            found: document.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    if document.fields.is_empty() {
        return Err(SnapshotError::NoFields);
    }

    let saved_at = document.saved_at.map_or(0, |millis| millis.max(0.0) as u64);
    let seed = resume_seed(seed, saved_at);
    let stored = document.fields.len();
    let mut fields = Vec::with_capacity(SESSION_COUNT);
    for (slot, value) in document.fields.into_iter().take(SESSION_COUNT).enumerate() {
        fields.push(decode_field(slot, value, map, seed));
    }
    let restored = fields.len();
    while fields.len() < SESSION_COUNT {
        fields.push(fresh_field(fields.len(), map, seed));
    }

    let active = document
        .active_field_index
        .map_or(0, |index| whole(index).min(SESSION_COUNT as u32 - 1) as usize);

    info!(stored, restored, active, saved_at, "snapshot_restored");
    Ok(Roster {
        fields,
        active,
        saved_at,
    })
}

fn decode_field(slot: usize, value: Value, map: &Arc<MapModel>, seed: u64) -> Field {
    let raw = if value.is_object() {
        RawField::deserialize(value).ok()
    } else {
        None
    };
    let Some(raw) = raw else {
        warn!(slot, "snapshot_field_unreadable");
        return fresh_field(slot, map, seed);
    };

    let id = FieldId::for_slot(slot);
    let (record, skipped_towers, skipped_enemies) = field_record(slot, raw);
    let (field, report) = Field::restore(record, Arc::clone(map), derive_field_seed(seed, id, 0));

    if skipped_towers + skipped_enemies > 0 || !report.is_clean() {
        warn!(
            slot,
            dropped_towers = skipped_towers + report.dropped_towers,
            dropped_enemies = skipped_enemies + report.dropped_enemies,
            cleared_selection = report.cleared_selection,
            "snapshot_field_repaired"
        );
    } else {
        debug!(slot, "snapshot_field_restored");
    }
    field
}

fn field_record(slot: usize, raw: RawField) -> (FieldRecord, usize, usize) {
    let fresh = WaveClock::default();
    let stored_towers = raw.towers.len();
    let stored_enemies = raw.enemies.len();
    let towers: Vec<TowerRecord> = raw.towers.into_iter().filter_map(tower_record).collect();
    let enemies: Vec<EnemyRecord> = raw.enemies.into_iter().filter_map(enemy_record).collect();
    let skipped_towers = stored_towers - towers.len();
    let skipped_enemies = stored_enemies - enemies.len();

    let record = FieldRecord {
        id: FieldId::for_slot(slot),
        name: field_name(slot),
        next_enemy_id: raw.next_enemy_id.map_or(1, whole),
        next_tower_id: raw.next_tower_id.map_or(1, whole),
        wave: WaveClock {
            wave_index: raw.current_wave_index.map_or(fresh.wave_index, whole),
            spawned_in_wave: raw.spawned_in_wave.map_or(fresh.spawned_in_wave, whole),
            spawn_timer: raw.spawn_timer.map_or(fresh.spawn_timer, |value| value as f32),
            inter_wave_timer: raw
                .inter_wave_timer
                .map_or(fresh.inter_wave_timer, |value| value as f32),
        },
        selected_tower_kind: raw
            .selected_tower_type
            .and_then(|key| key.parse().ok())
            .unwrap_or_default(),
        selected_tower: raw.selected_tower_id.map(|id| TowerId::new(whole(id))),
        gold: raw.gold.map_or(STARTING_GOLD, whole),
        base_hp: raw.base_hp.map_or(STARTING_BASE_HP, whole),
        max_base_hp: raw.max_base_hp.map_or(STARTING_BASE_HP, whole),
        speed: raw
            .game_speed
            .and_then(GameSpeed::from_multiplier)
            .unwrap_or_default(),
        paused: raw.paused.unwrap_or(false),
        game_over: raw.game_over.unwrap_or(false),
        victory: raw.victory.unwrap_or(false),
        towers,
        enemies,
    };
    (record, skipped_towers, skipped_enemies)
}

/// Reads one tower entry; entries without an identity, a cell or a known type are skipped.
fn tower_record(value: Value) -> Option<TowerRecord> {
    let raw = RawTower::deserialize(value).ok()?;
    let kind: TowerKind = raw.tower_type?.parse().ok()?;
    Some(TowerRecord {
        id: TowerId::new(index(raw.id?)?),
        kind,
        cell: CellCoord::new(index(raw.cell_x?)?, index(raw.cell_y?)?),
        level: raw.level.map_or(1, whole),
        target_mode: raw
            .target_mode
            .and_then(|key| key.parse().ok())
            .unwrap_or(TargetMode::First),
        cooldown: raw.cooldown.map_or(0.0, |value| value as f32),
    })
}

/// Reads one enemy entry; dead enemies and entries without an identity, hit
/// points or a known type are skipped.
fn enemy_record(value: Value) -> Option<EnemyRecord> {
    let raw = RawEnemy::deserialize(value).ok()?;
    if raw.alive == Some(false) {
        return None;
    }
    let kind: EnemyKind = raw.enemy_type?.parse().ok()?;
    let hp = raw.hp? as f32;
    Some(EnemyRecord {
        id: EnemyId::new(index(raw.id?)?),
        kind,
        hp,
        max_hp: raw.max_hp.map_or(hp, |value| value as f32),
        speed: raw.speed.map_or(0.0, |value| value as f32),
        reward: raw.reward.map_or(1, whole),
        progress: raw.progress.map_or(0.0, |value| value as f32),
    })
}

/// Rounds a finite number down onto the `u32` range, saturating at both ends.
fn whole(value: f64) -> u32 {
    value.floor() as u32
}

/// Converts an identifier or coordinate, rejecting negative and fractional values.
fn index(value: f64) -> Option<u32> {
    if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endless_defence_world::query;
    use serde_json::json;

    fn decode_value(document: Value) -> Result<Roster, SnapshotError> {
        decode(&document.to_string(), &Arc::new(MapModel::standard()), 5)
    }

    fn field_document(field: Value) -> Value {
        json!({ "version": 1, "savedAt": 0, "activeFieldIndex": 0, "fields": [field] })
    }

    #[test]
    fn rejects_unusable_documents() {
        let map = Arc::new(MapModel::standard());
        assert!(matches!(
            decode("{not json", &map, 0),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(matches!(
            decode("[1, 2]", &map, 0),
            Err(SnapshotError::NotAnObject)
        ));
        assert!(matches!(
            decode_value(json!({ "version": 2, "fields": [{}] })),
            Err(SnapshotError::VersionMismatch {
                found: Some(_),
                expected: 1
            })
        ));
        assert!(matches!(
            decode_value(json!({ "version": "1", "fields": [{}] })),
            Err(SnapshotError::VersionMismatch { found: None, .. })
        ));
        assert!(matches!(
            decode_value(json!({ "version": 1, "fields": [] })),
            Err(SnapshotError::NoFields)
        ));
    }

    #[test]
    fn missing_keys_take_fresh_defaults() {
        let roster = decode_value(field_document(json!({}))).expect("decodes");
        let view = query::field_view(&roster.fields[0]);

        assert_eq!(view.gold, 180);
        assert_eq!(view.base_hp, 20);
        assert_eq!(view.max_base_hp, 20);
        assert_eq!(view.wave_index, 0);
        assert_eq!(view.speed, GameSpeed::Normal);
        assert_eq!(view.selected_tower_kind, TowerKind::Gunner);
        assert_eq!(query::wave_clock(&roster.fields[0]), WaveClock::default());
    }

    #[test]
    fn wrong_types_and_unknown_names_fall_back() {
        let roster = decode_value(field_document(json!({
            "gold": "lots",
            "gameSpeed": 3,
            "selectedTowerType": "laser",
            "paused": "yes",
            "towers": [
                { "id": 1, "cellX": 4, "cellY": 2, "towerType": "gunner", "targetMode": "random", "level": 2 },
                { "id": 2, "cellX": 6, "cellY": 2, "towerType": "laser" },
                { "id": 3, "cellX": -1, "cellY": 2, "towerType": "gunner" },
                "not a tower"
            ],
            "enemies": [
                { "id": 1, "enemyType": "runner", "hp": 10, "progress": 3 },
                { "id": 2, "enemyType": "dragon", "hp": 10 },
                { "id": 3, "enemyType": "grunt", "hp": 10, "alive": false },
                { "id": 4, "enemyType": "grunt" }
            ]
        })))
        .expect("decodes");
        let field = &roster.fields[0];

        assert_eq!(query::gold(field), 180);
        assert_eq!(query::speed(field), GameSpeed::Normal);
        assert_eq!(query::selected_tower_kind(field), TowerKind::Gunner);
        assert_eq!(query::status(field), endless_defence_core::FieldStatus::Running);

        let towers = query::tower_view(field).into_vec();
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].target_mode, TargetMode::First);
        assert_eq!(towers[0].level, 2);

        let enemies = query::enemy_view(field).into_vec();
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].kind, EnemyKind::Runner);
        assert_eq!(enemies[0].hp_ratio, 1.0);
    }

    #[test]
    fn identity_is_positional_and_roster_is_padded() {
        let roster = decode_value(json!({
            "version": 1,
            "activeFieldIndex": 7,
            "fields": [{ "id": 42, "name": "Renamed", "gold": 999 }]
        }))
        .expect("decodes");

        assert_eq!(roster.fields.len(), SESSION_COUNT);
        assert_eq!(roster.active, SESSION_COUNT - 1);
        assert_eq!(query::id(&roster.fields[0]), FieldId::new(1));
        assert_eq!(query::name(&roster.fields[0]), "Field A");
        assert_eq!(query::gold(&roster.fields[0]), 999);
        assert_eq!(query::name(&roster.fields[2]), "Field C");
        assert_eq!(query::gold(&roster.fields[2]), 180);
    }

    #[test]
    fn unreadable_entries_become_fresh_fields_and_extras_are_dropped() {
        let roster = decode_value(json!({
            "version": 1,
            "fields": [{ "gold": 5 }, 17, { "gold": 6 }, { "gold": 7 }]
        }))
        .expect("decodes");

        let gold: Vec<u32> = roster.fields.iter().map(query::gold).collect();
        assert_eq!(gold, vec![5, 180, 6]);
    }

    #[test]
    fn lost_flag_follows_empty_base() {
        let roster = decode_value(field_document(json!({ "baseHp": 0, "victory": true })))
            .expect("decodes");
        let view = query::field_view(&roster.fields[0]);
        assert!(view.game_over);
        assert!(!view.victory);
    }

    #[test]
    fn number_helpers_saturate_and_reject() {
        assert_eq!(whole(-4.0), 0);
        assert_eq!(whole(3.9), 3);
        assert_eq!(whole(1e12), u32::MAX);
        assert_eq!(index(2.0), Some(2));
        assert_eq!(index(2.5), None);
        assert_eq!(index(-1.0), None);
    }
}
