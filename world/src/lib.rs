#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative field state management for Endless Defence.
//!
//! A [`Field`] is one independent game session: gold, base hit points, wave
//! progress, towers and enemies. Every mutation goes through [`apply`], which
//! reports what happened as [`Event`] values. Observers read the field through
//! the [`query`] module.

pub mod map;
mod restore;
mod towers;

use std::sync::Arc;

use endless_defence_core::{
    CellCoord, Command, EnemyId, EnemyKind, EnemyStats, Event, FieldId, GameSpeed, Order,
    OrderError, PlacementError, TowerId, TowerKind, WaveClock, WorldPoint, BUILD_COOLDOWN_MAX,
    BUILD_COOLDOWN_MIN, SHOT_EFFECT_LIFETIME, STARTING_BASE_HP, STARTING_GOLD,
};
use endless_defence_system_movement::{Advance, Movement};
use endless_defence_system_spawning::Spawning;
use endless_defence_system_tower_combat::{apply_hit, arm, cool_down, HitOutcome, Readiness};
use endless_defence_system_tower_targeting::{TargetCandidate, TowerTargeting};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use map::{MapError, MapModel, Tile};
pub use restore::RestoreReport;

use towers::TowerRegistry;

/// Derives the random seed of a field from a roster-wide seed.
///
/// `generation` distinguishes successive lives of the same field so a
/// restarted field does not replay the previous archetype rolls.
#[must_use]
pub fn derive_field_seed(base: u64, field: FieldId, generation: u32) -> u64 {
    let mixed = base
        ^ u64::from(field.get()).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ u64::from(generation).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
    splitmix64(mixed)
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Represents one independent, authoritative game session.
#[derive(Debug)]
pub struct Field {
    id: FieldId,
    name: String,
    map: Arc<MapModel>,
    movement: Movement,
    spawning: Spawning,
    targeting: TowerTargeting,
    rng: ChaCha8Rng,
    gold: u32,
    base_hp: u32,
    max_base_hp: u32,
    wave: WaveClock,
    speed: GameSpeed,
    paused: bool,
    game_over: bool,
    victory: bool,
    selected_kind: TowerKind,
    selected_tower: Option<TowerId>,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    effects: Vec<Effect>,
    scratch: Vec<Command>,
}

impl Field {
    /// Creates a fresh field with starting gold, full base and wave zero.
    #[must_use]
    pub fn new(id: FieldId, name: impl Into<String>, map: Arc<MapModel>, seed: u64) -> Self {
        let movement = Movement::new(map.tile_length(), map.segment_count());
        Self {
            id,
            name: name.into(),
            map,
            movement,
            spawning: Spawning::new(),
            targeting: TowerTargeting::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            gold: STARTING_GOLD,
            base_hp: STARTING_BASE_HP,
            max_base_hp: STARTING_BASE_HP,
            wave: WaveClock::default(),
            speed: GameSpeed::default(),
            paused: false,
            game_over: false,
            victory: false,
            selected_kind: TowerKind::default(),
            selected_tower: None,
            towers: TowerRegistry::new(1),
            enemies: Vec::new(),
            next_enemy_id: 1,
            effects: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn is_halted(&self) -> bool {
        self.paused || self.game_over
    }

    fn decay_effects(&mut self, frame_dt: f32) {
        for effect in &mut self.effects {
            effect.remaining -= frame_dt;
        }
        self.effects.retain(|effect| effect.remaining > 0.0);
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, stats: EnemyStats, out_events: &mut Vec<Event>) {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies.push(Enemy {
            id,
            kind,
            hp: stats.hp,
            max_hp: stats.hp,
            speed: stats.speed,
            reward: stats.reward,
            progress: 0.0,
            alive: true,
        });
        out_events.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn run_spawning(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let wave_before = self.wave.wave_index;
        let mut commands = std::mem::take(&mut self.scratch);
        self.spawning.handle(
            &mut self.wave,
            self.enemies.len(),
            dt,
            &mut self.rng,
            &mut commands,
        );

        for command in commands.drain(..) {
            if let Command::SpawnEnemy { kind, stats } = command {
                self.spawn_enemy(kind, stats, out_events);
            }
        }
        self.scratch = commands;

        if self.wave.wave_index != wave_before {
            out_events.push(Event::WaveAdvanced {
                wave: self.wave.wave_index,
            });
        }
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive) {
            match self.movement.advance(enemy.progress, enemy.speed, dt) {
                Advance::EnRoute { progress } => enemy.progress = progress,
                Advance::Arrived { progress } => {
                    enemy.progress = progress;
                    enemy.alive = false;
                    self.base_hp = self.base_hp.saturating_sub(1);
                    out_events.push(Event::EnemyLeaked {
                        enemy: enemy.id,
                        base_hp: self.base_hp,
                    });
                }
            }
        }
    }

    fn resolve_combat(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let map = &self.map;
        for tower in self.towers.iter_mut() {
            if cool_down(&mut tower.cooldown, dt) == Readiness::CoolingDown {
                continue;
            }

            let origin = map.cell_center(tower.cell);
            let candidates = self
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| TargetCandidate {
                    enemy: enemy.id,
                    position: map.position_at(enemy.progress),
                    progress: enemy.progress,
                    hp: enemy.hp,
                });
            let Some(target) = self.targeting.select(
                tower.target_mode,
                origin,
                tower.kind.range_at(tower.level),
                candidates,
            ) else {
                continue;
            };
            let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|enemy| enemy.id == target.enemy)
            else {
                continue;
            };

            let shot = arm(tower.kind, tower.level);
            tower.cooldown = shot.cooldown;
            self.effects.push(Effect {
                tower: tower.id,
                from: origin,
                to: target.position,
                remaining: SHOT_EFFECT_LIFETIME,
            });
            out_events.push(Event::ShotFired {
                tower: tower.id,
                enemy: enemy.id,
                damage: shot.damage,
            });

            if apply_hit(&mut enemy.hp, &mut enemy.alive, shot.damage) == HitOutcome::Killed {
                self.gold = self.gold.saturating_add(enemy.reward);
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id,
                    reward: enemy.reward,
                });
            }
        }
    }

    fn check_status(&mut self, out_events: &mut Vec<Event>) {
        if self.base_hp == 0 && !self.game_over {
            self.game_over = true;
            self.victory = false;
            out_events.push(Event::FieldLost {
                wave: self.wave.wave_index,
            });
        }
    }

    fn tick(&mut self, frame_dt: f32, out_events: &mut Vec<Event>) {
        self.decay_effects(frame_dt);
        if self.is_halted() || !(frame_dt > 0.0) {
            return;
        }

        let dt = frame_dt * self.speed.multiplier() as f32;
        out_events.push(Event::TimeAdvanced { dt });

        self.run_spawning(dt, out_events);
        self.advance_enemies(dt, out_events);
        self.resolve_combat(dt, out_events);
        self.enemies.retain(|enemy| enemy.alive);
        self.check_status(out_events);
    }

    fn build(&mut self, cell: CellCoord, kind: TowerKind) -> Result<TowerId, PlacementError> {
        if self.is_halted() {
            return Err(PlacementError::Halted);
        }
        placement_check(self, cell, kind)?;

        self.gold -= kind.cost();
        let cooldown = self.rng.gen_range(BUILD_COOLDOWN_MIN..=BUILD_COOLDOWN_MAX);
        let tower = self.towers.insert(kind, cell, cooldown);
        self.selected_tower = Some(tower);
        Ok(tower)
    }

    fn selected_for(&self, order: Order) -> Result<TowerId, (Order, OrderError)> {
        self.selected_tower
            .filter(|tower| self.towers.contains_id(*tower))
            .ok_or((order, OrderError::NoSelection))
    }

    fn upgrade_selected(&mut self, out_events: &mut Vec<Event>) -> Result<(), (Order, OrderError)> {
        let id = self.selected_for(Order::Upgrade)?;
        let Some(tower) = self.towers.get_mut(id) else {
            return Err((Order::Upgrade, OrderError::NoSelection));
        };

        let cost = tower.kind.upgrade_cost(tower.level);
        if self.gold < cost {
            return Err((Order::Upgrade, OrderError::InsufficientGold));
        }

        self.gold -= cost;
        tower.level = tower.level.saturating_add(1);
        out_events.push(Event::TowerUpgraded {
            tower: id,
            level: tower.level,
            cost,
        });
        Ok(())
    }

    fn sell_selected(&mut self, out_events: &mut Vec<Event>) -> Result<(), (Order, OrderError)> {
        let id = self.selected_for(Order::Sell)?;
        let Some(tower) = self.towers.remove(id) else {
            return Err((Order::Sell, OrderError::NoSelection));
        };

        let refund = tower.kind.sell_refund(tower.level);
        self.gold = self.gold.saturating_add(refund);
        self.selected_tower = None;
        out_events.push(Event::TowerSold { tower: id, refund });
        out_events.push(Event::SelectionChanged { tower: None });
        Ok(())
    }

    fn cycle_target_mode(&mut self, out_events: &mut Vec<Event>) -> Result<(), (Order, OrderError)> {
        let id = self.selected_for(Order::CycleTargetMode)?;
        let Some(tower) = self.towers.get_mut(id) else {
            return Err((Order::CycleTargetMode, OrderError::NoSelection));
        };

        tower.target_mode = tower.target_mode.next();
        out_events.push(Event::TargetModeChanged {
            tower: id,
            mode: tower.target_mode,
        });
        Ok(())
    }
}

fn placement_check(
    field: &Field,
    cell: CellCoord,
    kind: TowerKind,
) -> Result<(), PlacementError> {
    if !field.map.contains(cell) {
        return Err(PlacementError::OutOfBounds);
    }
    if !field.map.is_buildable(cell) {
        return Err(PlacementError::NotBuildable);
    }
    if field.towers.at(cell).is_some() {
        return Err(PlacementError::Occupied);
    }
    if field.gold < kind.cost() {
        return Err(PlacementError::InsufficientGold);
    }
    Ok(())
}

/// Applies the provided command to the field, mutating state deterministically.
///
/// Invalid commands leave the field untouched and report a rejection event.
pub fn apply(field: &mut Field, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => field.tick(dt.as_secs_f32(), out_events),
        Command::SpawnEnemy { kind, stats } => field.spawn_enemy(kind, stats, out_events),
        Command::BuildTower { cell, kind } => match field.build(cell, kind) {
            Ok(tower) => {
                out_events.push(Event::TowerBuilt {
                    tower,
                    kind,
                    cell,
                    cost: kind.cost(),
                });
                out_events.push(Event::SelectionChanged { tower: Some(tower) });
            }
            Err(reason) => out_events.push(Event::TowerBuildRejected { kind, cell, reason }),
        },
        Command::SelectTowerAt { cell } => {
            field.selected_tower = field.towers.at(cell).map(|tower| tower.id);
            out_events.push(Event::SelectionChanged {
                tower: field.selected_tower,
            });
        }
        Command::SelectTower { tower } => match tower {
            Some(id) if !field.towers.contains_id(id) => {}
            _ => {
                field.selected_tower = tower;
                out_events.push(Event::SelectionChanged { tower });
            }
        },
        Command::SelectTowerKind { kind } => {
            field.selected_kind = kind;
            field.selected_tower = None;
            out_events.push(Event::SelectionChanged { tower: None });
        }
        Command::UpgradeSelected => {
            if let Err((order, reason)) = field.upgrade_selected(out_events) {
                out_events.push(Event::OrderRejected { order, reason });
            }
        }
        Command::SellSelected => {
            if let Err((order, reason)) = field.sell_selected(out_events) {
                out_events.push(Event::OrderRejected { order, reason });
            }
        }
        Command::CycleTargetMode => {
            if let Err((order, reason)) = field.cycle_target_mode(out_events) {
                out_events.push(Event::OrderRejected { order, reason });
            }
        }
        Command::SetSpeed { speed } => {
            field.speed = speed;
            out_events.push(Event::SpeedChanged { speed });
        }
        Command::TogglePause => {
            field.paused = !field.paused;
            out_events.push(Event::PauseToggled {
                paused: field.paused,
            });
        }
    }
}

/// Enemy walking the path of a field.
#[derive(Clone, Debug, PartialEq)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    hp: f32,
    max_hp: f32,
    speed: f32,
    reward: u32,
    progress: f32,
    alive: bool,
}

/// Tracer left behind by a shot.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Effect {
    tower: TowerId,
    from: WorldPoint,
    to: WorldPoint,
    remaining: f32,
}

/// Query functions that provide read-only access to the field state.
pub mod query {
    use endless_defence_core::{
        CellCoord, EffectSnapshot, EnemyRecord, EnemySnapshot, EnemyView, FieldId, FieldRecord,
        FieldStatus, FieldView, GameSpeed, PlacementError, PlacementPreview, TowerId, TowerKind,
        TowerSnapshot, TowerView, WaveClock,
    };

    use super::{placement_check, Field, MapModel};

    /// Identifier of the field.
    #[must_use]
    pub fn id(field: &Field) -> FieldId {
        field.id
    }

    /// Display name of the field.
    #[must_use]
    pub fn name(field: &Field) -> &str {
        &field.name
    }

    /// Map the field plays on.
    #[must_use]
    pub fn map(field: &Field) -> &MapModel {
        &field.map
    }

    /// Gold available.
    #[must_use]
    pub fn gold(field: &Field) -> u32 {
        field.gold
    }

    /// Remaining base hit points.
    #[must_use]
    pub fn base_hp(field: &Field) -> u32 {
        field.base_hp
    }

    /// Wave progress counters.
    #[must_use]
    pub fn wave_clock(field: &Field) -> WaveClock {
        field.wave
    }

    /// Current simulation speed.
    #[must_use]
    pub fn speed(field: &Field) -> GameSpeed {
        field.speed
    }

    /// Tower type pointer builds use.
    #[must_use]
    pub fn selected_tower_kind(field: &Field) -> TowerKind {
        field.selected_kind
    }

    /// Currently selected tower.
    #[must_use]
    pub fn selected_tower(field: &Field) -> Option<TowerId> {
        field.selected_tower
    }

    /// Reports whether pointer builds are currently ignored.
    #[must_use]
    pub fn is_halted(field: &Field) -> bool {
        field.is_halted()
    }

    /// Coarse lifecycle state of the field.
    #[must_use]
    pub fn status(field: &Field) -> FieldStatus {
        if field.game_over {
            if field.victory {
                FieldStatus::Victory
            } else {
                FieldStatus::GameOver
            }
        } else if field.paused {
            FieldStatus::Paused
        } else {
            FieldStatus::Running
        }
    }

    /// Tower standing on the cell, if any.
    #[must_use]
    pub fn tower_at(field: &Field, cell: CellCoord) -> Option<TowerId> {
        field.towers.at(cell).map(|tower| tower.id)
    }

    /// Describes whether a tower of `kind` could be built on `cell` right now.
    #[must_use]
    pub fn placement_preview(field: &Field, kind: TowerKind, cell: CellCoord) -> PlacementPreview {
        let placeable = !field.is_halted() && placement_check(field, cell, kind).is_ok();
        PlacementPreview {
            kind,
            cell,
            occupant: tower_at(field, cell),
            placeable,
        }
    }

    /// Reason a build of `kind` on `cell` would currently fail.
    pub fn placement_error(
        field: &Field,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<(), PlacementError> {
        if field.is_halted() {
            return Err(PlacementError::Halted);
        }
        placement_check(field, cell, kind)
    }

    /// Captures a read-only view of the enemies walking the path.
    #[must_use]
    pub fn enemy_view(field: &Field) -> EnemyView {
        EnemyView::from_snapshots(
            field
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    kind: enemy.kind,
                    position: field.map.position_at(enemy.progress),
                    progress: enemy.progress,
                    hp: enemy.hp,
                    hp_ratio: if enemy.max_hp > 0.0 {
                        (enemy.hp / enemy.max_hp).clamp(0.0, 1.0)
                    } else {
                        0.0
                    },
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers placed in the field.
    #[must_use]
    pub fn tower_view(field: &Field) -> TowerView {
        TowerView::from_snapshots(
            field
                .towers
                .iter()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    kind: tower.kind,
                    cell: tower.cell,
                    position: field.map.cell_center(tower.cell),
                    level: tower.level,
                    range: tower.kind.range_at(tower.level),
                    target_mode: tower.target_mode,
                    cooldown: tower.cooldown,
                    upgrade_cost: tower.kind.upgrade_cost(tower.level),
                    sell_value: tower.kind.sell_refund(tower.level),
                })
                .collect(),
        )
    }

    /// Shot tracers that have not expired yet.
    #[must_use]
    pub fn effects(field: &Field) -> Vec<EffectSnapshot> {
        field
            .effects
            .iter()
            .map(|effect| EffectSnapshot {
                tower: effect.tower,
                from: effect.from,
                to: effect.to,
                remaining: effect.remaining,
            })
            .collect()
    }

    /// Everything an observer needs to present the field.
    #[must_use]
    pub fn field_view(field: &Field) -> FieldView {
        FieldView {
            id: field.id,
            name: field.name.clone(),
            gold: field.gold,
            base_hp: field.base_hp,
            max_base_hp: field.max_base_hp,
            wave_index: field.wave.wave_index,
            speed: field.speed,
            status: status(field),
            paused: field.paused,
            game_over: field.game_over,
            victory: field.victory,
            selected_tower_kind: field.selected_kind,
            selected_tower: field.selected_tower,
            enemies: enemy_view(field),
            towers: tower_view(field),
            effects: effects(field),
        }
    }

    /// Plain-data description of the field for persistence.
    ///
    /// Only live enemies are recorded; shot tracers are never recorded.
    #[must_use]
    pub fn record(field: &Field) -> FieldRecord {
        FieldRecord {
            id: field.id,
            name: field.name.clone(),
            next_enemy_id: field.next_enemy_id,
            next_tower_id: field.towers.next_tower_id(),
            wave: field.wave,
            selected_tower_kind: field.selected_kind,
            selected_tower: field.selected_tower,
            gold: field.gold,
            base_hp: field.base_hp,
            max_base_hp: field.max_base_hp,
            speed: field.speed,
            paused: field.paused,
            game_over: field.game_over,
            victory: field.victory,
            towers: field.towers.iter().map(|tower| tower.record()).collect(),
            enemies: field
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| EnemyRecord {
                    id: enemy.id,
                    kind: enemy.kind,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                    speed: enemy.speed,
                    reward: enemy.reward,
                    progress: enemy.progress,
                })
                .collect(),
        }
    }
}
