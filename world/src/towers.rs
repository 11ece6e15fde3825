//! Authoritative tower state management utilities.

use endless_defence_core::{CellCoord, TargetMode, TowerId, TowerKind, TowerRecord};

/// Tower stored inside a field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) level: u32,
    pub(crate) target_mode: TargetMode,
    pub(crate) cooldown: f32,
}

impl TowerState {
    pub(crate) fn record(&self) -> TowerRecord {
        TowerRecord {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            level: self.level,
            target_mode: self.target_mode,
            cooldown: self.cooldown,
        }
    }
}

impl From<TowerRecord> for TowerState {
    fn from(record: TowerRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            cell: record.cell,
            level: record.level,
            target_mode: record.target_mode,
            cooldown: record.cooldown,
        }
    }
}

/// Registry that stores towers in build order and allocates identifiers.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: Vec<TowerState>,
    next_tower_id: u32,
}

impl TowerRegistry {
    /// Creates an empty registry whose first tower receives `next_tower_id`.
    pub(crate) fn new(next_tower_id: u32) -> Self {
        Self {
            entries: Vec::new(),
            next_tower_id: next_tower_id.max(1),
        }
    }

    pub(crate) fn next_tower_id(&self) -> u32 {
        self.next_tower_id
    }

    /// Places a fresh level-one tower; the caller validated the cell.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord, cooldown: f32) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.saturating_add(1);
        self.entries.push(TowerState {
            id,
            kind,
            cell,
            level: 1,
            target_mode: TargetMode::default(),
            cooldown,
        });
        id
    }

    /// Re-admits a restored tower, keeping the identifier counter ahead of it.
    pub(crate) fn adopt(&mut self, tower: TowerState) {
        self.next_tower_id = self
            .next_tower_id
            .max(tower.id.get().saturating_add(1));
        self.entries.push(tower);
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        let index = self.entries.iter().position(|tower| tower.id == id)?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.iter().find(|tower| tower.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.iter_mut().find(|tower| tower.id == id)
    }

    pub(crate) fn at(&self, cell: CellCoord) -> Option<&TowerState> {
        self.entries.iter().find(|tower| tower.cell == cell)
    }

    pub(crate) fn contains_id(&self, id: TowerId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.iter_mut()
    }
}
