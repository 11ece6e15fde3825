#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Multi-field session manager.
//!
//! The manager owns a fixed roster of independent fields that all advance on
//! every tick. Player commands are routed to the active field only, a lost
//! active field gates switching until it is restarted, and the roster is
//! written to a [`SnapshotStore`] on a fixed cadence.

mod config;

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use endless_defence_core::{
    CellCoord, Command, Event, FieldId, FieldStatus, FieldView, GameSpeed, TowerId, TowerKind,
};
use endless_defence_persistence::{
    encode, load_roster, resume_seed, SnapshotError, SnapshotStore, StoreError,
};
use endless_defence_system_builder::{Builder, BuilderContext, BuilderInput};
use endless_defence_world::{apply, derive_field_seed, query, Field, MapModel};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

pub use config::{Config, DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_RNG_SEED};

/// Reasons an explicit save failed.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The roster could not be encoded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// The store rejected the document.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One line of the roster overview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Position in the roster.
    pub index: usize,
    /// Identifier of the field.
    pub id: FieldId,
    /// Display name of the field.
    pub name: String,
    /// Coarse lifecycle state.
    pub status: FieldStatus,
    /// Whether the field receives commands.
    pub active: bool,
    /// Index of the current wave.
    pub wave_index: u32,
    /// Remaining base hit points.
    pub base_hp: u32,
}

/// Owns the roster, routes commands and drives autosave.
#[derive(Debug)]
pub struct SessionManager<S> {
    config: Config,
    map: Arc<MapModel>,
    seed: u64,
    fields: Vec<Field>,
    generations: Vec<u32>,
    active: usize,
    store: S,
    since_save: Duration,
    builder: Builder,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl<S: SnapshotStore> SessionManager<S> {
    /// Creates a manager on the standard map, resuming whatever `store` holds.
    #[must_use]
    pub fn new(config: Config, store: S) -> Self {
        Self::with_map(config, Arc::new(MapModel::standard()), store)
    }

    /// Creates a manager on `map`, resuming whatever `store` holds.
    #[must_use]
    pub fn with_map(config: Config, map: Arc<MapModel>, store: S) -> Self {
        let roster = load_roster(&store, &map, config.rng_seed());
        info!(
            fields = roster.fields.len(),
            active = roster.active,
            saved_at = roster.saved_at,
            "session_started"
        );
        Self {
            seed: resume_seed(config.rng_seed(), roster.saved_at),
            config,
            generations: vec![0; roster.fields.len()],
            fields: roster.fields,
            active: roster.active,
            map,
            store,
            since_save: Duration::ZERO,
            builder: Builder::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Configuration the manager was created with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store the roster is saved to.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of fields in the roster.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Index of the field that receives commands.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Field at `index`, for read-only queries.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Field that receives commands.
    #[must_use]
    pub fn active_field(&self) -> &Field {
        &self.fields[self.active]
    }

    /// Render-ready view of the field at `index`.
    #[must_use]
    pub fn field_view(&self, index: usize) -> Option<FieldView> {
        self.fields.get(index).map(query::field_view)
    }

    /// Render-ready view of the active field.
    #[must_use]
    pub fn active_view(&self) -> FieldView {
        query::field_view(self.active_field())
    }

    /// Overview of every field in roster order.
    #[must_use]
    pub fn summary(&self) -> Vec<SessionSummary> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| SessionSummary {
                index,
                id: query::id(field),
                name: query::name(field).to_owned(),
                status: query::status(field),
                active: index == self.active,
                wave_index: query::wave_clock(field).wave_index,
                base_hp: query::base_hp(field),
            })
            .collect()
    }

    /// Index of the active field while it is lost and awaits a restart.
    #[must_use]
    pub fn pending_restart(&self) -> Option<usize> {
        matches!(
            query::status(self.active_field()),
            FieldStatus::GameOver | FieldStatus::Victory
        )
        .then_some(self.active)
    }

    /// Makes the field at `index` the active one.
    ///
    /// Rejected while a restart is pending or when `index` is out of range.
    pub fn set_active_session(&mut self, index: usize) -> bool {
        if let Some(pending) = self.pending_restart() {
            debug!(requested = index, pending, "switch_rejected_restart_pending");
            return false;
        }
        if index >= self.fields.len() {
            debug!(requested = index, "switch_rejected_out_of_range");
            return false;
        }
        self.active = index;
        debug!(active = index, "active_field_changed");
        true
    }

    /// Replaces the field at `index` with a fresh one of the same identity.
    ///
    /// The fresh field starts a random stream no earlier life of the field
    /// used, including lives before the roster was resumed. Rejected only when
    /// `index` is out of range.
    pub fn restart_session(&mut self, index: usize) -> bool {
        let Some(field) = self.fields.get(index) else {
            debug!(requested = index, "restart_rejected_out_of_range");
            return false;
        };
        let id = query::id(field);
        let name = query::name(field).to_owned();
        let generation = self.generations[index].wrapping_add(1);
        self.generations[index] = generation;

        let seed = derive_field_seed(self.seed, id, generation);
        self.fields[index] = Field::new(id, name, Arc::clone(&self.map), seed);
        info!(field = id.get(), generation, "field_restarted");
        true
    }

    /// Requests a tower of `kind` on `cell` of field `index`.
    pub fn build_tower(&mut self, index: usize, cell: CellCoord, kind: TowerKind) {
        self.submit(index, Command::BuildTower { cell, kind });
    }

    /// Selects whatever tower stands on `cell` of field `index`.
    pub fn select_tower_at(&mut self, index: usize, cell: CellCoord) {
        self.submit(index, Command::SelectTowerAt { cell });
    }

    /// Selects `tower` on field `index`, or clears the selection.
    pub fn select_tower(&mut self, index: usize, tower: Option<TowerId>) {
        self.submit(index, Command::SelectTower { tower });
    }

    /// Changes the tower type pointer builds on field `index` use.
    pub fn select_tower_kind(&mut self, index: usize, kind: TowerKind) {
        self.submit(index, Command::SelectTowerKind { kind });
    }

    /// Upgrades the selected tower of field `index`.
    pub fn upgrade_selected(&mut self, index: usize) {
        self.submit(index, Command::UpgradeSelected);
    }

    /// Sells the selected tower of field `index`.
    pub fn sell_selected(&mut self, index: usize) {
        self.submit(index, Command::SellSelected);
    }

    /// Cycles the target mode of the selected tower of field `index`.
    pub fn cycle_target_mode(&mut self, index: usize) {
        self.submit(index, Command::CycleTargetMode);
    }

    /// Changes the speed of field `index`.
    pub fn set_speed(&mut self, index: usize, speed: GameSpeed) {
        self.submit(index, Command::SetSpeed { speed });
    }

    /// Pauses or resumes field `index`.
    pub fn toggle_pause(&mut self, index: usize) {
        self.submit(index, Command::TogglePause);
    }

    /// Translates pointer presses on the active field into commands.
    pub fn pointer(&mut self, input: BuilderInput) {
        let field = &self.fields[self.active];
        let context = BuilderContext {
            halted: query::is_halted(field),
            selected_kind: query::selected_tower_kind(field),
        };
        self.builder.handle(
            context,
            input,
            |cell| query::tower_at(field, cell),
            &mut self.commands,
        );

        let active = self.active;
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            self.submit(active, command);
        }
    }

    /// Advances every field by `dt` of frame time and autosaves when due.
    pub fn tick(&mut self, dt: Duration) {
        for index in 0..self.fields.len() {
            self.run(index, Command::Tick { dt });
        }

        self.since_save = self.since_save.saturating_add(dt);
        if self.since_save >= self.config.autosave_interval() {
            self.since_save = Duration::ZERO;
            if let Err(error) = self.save_now() {
                warn!(error = %error, "autosave_failed");
            }
        }
    }

    /// Writes the roster to the store immediately.
    pub fn save_now(&mut self) -> Result<(), SaveError> {
        let document = encode(&self.fields, self.active, unix_millis())?;
        self.store.save(&document)?;
        trace!(bytes = document.len(), "roster_saved");
        Ok(())
    }

    fn submit(&mut self, index: usize, command: Command) {
        if index != self.active {
            debug!(
                requested = index,
                active = self.active,
                ?command,
                "command_for_inactive_field"
            );
            return;
        }
        self.run(index, command);
    }

    fn run(&mut self, index: usize, command: Command) {
        let field = &mut self.fields[index];
        apply(field, command, &mut self.events);
        let id = query::id(field);
        for event in self.events.drain(..) {
            log_event(id, &event);
        }
    }
}

fn log_event(field: FieldId, event: &Event) {
    let field = field.get();
    match event {
        Event::FieldLost { wave } => info!(field, wave, "field_lost"),
        Event::WaveAdvanced { wave } => debug!(field, wave, "wave_advanced"),
        Event::TowerBuildRejected { kind, cell, reason } => debug!(
            field,
            kind = kind.key(),
            column = cell.column(),
            row = cell.row(),
            reason = ?reason,
            "build_rejected"
        ),
        Event::OrderRejected { order, reason } => {
            debug!(field, order = ?order, reason = ?reason, "order_rejected");
        }
        Event::TimeAdvanced { .. } => {}
        other => trace!(field, event = ?other, "field_event"),
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
