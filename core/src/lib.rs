#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Endless Defence engine.
//!
//! This crate defines the message surface that connects the session manager,
//! the authoritative per-field world, and the pure systems. Callers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and reports what happened through
//! [`Event`] values. Observers read immutable views ([`FieldView`],
//! [`EnemyView`], [`TowerView`]) and never touch the authoritative state.
//!
//! Static balance data lives here as well: the tower catalog
//! ([`TowerKind::stats`]), the enemy archetype multipliers
//! ([`EnemyKind::multipliers`]) and the economy formulas.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Number of independent fields held by a session roster.
pub const SESSION_COUNT: usize = 3;

/// Gold every field starts with.
pub const STARTING_GOLD: u32 = 180;

/// Base hit points every field starts with.
pub const STARTING_BASE_HP: u32 = 20;

/// Delay before the first wave's inter-wave countdown is consulted.
pub const INITIAL_INTER_WAVE_DELAY: f32 = 1.6;

/// Delay inserted between two consecutive waves, in simulated seconds.
pub const INTER_WAVE_DELAY: f32 = 2.0;

/// Lifetime of a shot effect, in unscaled seconds.
pub const SHOT_EFFECT_LIFETIME: f32 = 0.06;

/// Lower bound of the randomised cooldown given to freshly built towers.
pub const BUILD_COOLDOWN_MIN: f32 = 0.05;

/// Upper bound of the randomised cooldown given to freshly built towers.
pub const BUILD_COOLDOWN_MAX: f32 = 0.22;

/// Commands that express all permissible field mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the field by the provided frame time.
    ///
    /// The frame time is unscaled; the field applies its own speed multiplier.
    Tick {
        /// Wall-clock duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the field at the start of the path.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Concrete stats resolved for the enemy.
        stats: EnemyStats,
    },
    /// Requests construction of a tower on the provided cell.
    BuildTower {
        /// Cell that should host the tower.
        cell: CellCoord,
        /// Type of tower to construct.
        kind: TowerKind,
    },
    /// Selects the tower standing on the provided cell, clearing the selection otherwise.
    SelectTowerAt {
        /// Cell to inspect.
        cell: CellCoord,
    },
    /// Selects a tower by identifier, or clears the selection when `None`.
    SelectTower {
        /// Tower to select.
        tower: Option<TowerId>,
    },
    /// Changes the tower type used by subsequent pointer builds.
    SelectTowerKind {
        /// Tower type to remember.
        kind: TowerKind,
    },
    /// Upgrades the selected tower by one level.
    UpgradeSelected,
    /// Sells the selected tower.
    SellSelected,
    /// Advances the selected tower to the next target mode.
    CycleTargetMode,
    /// Changes the simulation speed multiplier.
    SetSpeed {
        /// Requested speed.
        speed: GameSpeed,
    },
    /// Flips the paused flag.
    TogglePause,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation advanced by the provided scaled time.
    TimeAdvanced {
        /// Simulated seconds, already multiplied by the game speed.
        dt: f32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Reports that a tower hit an enemy.
    ShotFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage dealt by the shot.
        damage: f32,
    },
    /// Reports that an enemy was destroyed by a tower.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Gold awarded for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Enemy that leaked.
        enemy: EnemyId,
        /// Base hit points remaining afterwards.
        base_hp: u32,
    },
    /// Announces that the field moved on to the next wave.
    WaveAdvanced {
        /// Index of the wave that just started.
        wave: u32,
    },
    /// Announces that the field's base fell.
    FieldLost {
        /// Wave index at the time of the loss.
        wave: u32,
    },
    /// Confirms that a tower was built.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of the tower.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// Reports that a build request was rejected.
    TowerBuildRejected {
        /// Requested tower type.
        kind: TowerKind,
        /// Requested cell.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level after the upgrade.
        level: u32,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Tower that was removed.
        tower: TowerId,
        /// Gold refunded.
        refund: u32,
    },
    /// Confirms that a tower switched to a new target mode.
    TargetModeChanged {
        /// Tower that changed.
        tower: TowerId,
        /// Mode now in effect.
        mode: TargetMode,
    },
    /// Reports that an order on the selected tower was rejected.
    OrderRejected {
        /// Order that failed.
        order: Order,
        /// Specific reason the order failed.
        reason: OrderError,
    },
    /// Reports the tower selection after a selection command.
    SelectionChanged {
        /// Selected tower, if any.
        tower: Option<TowerId>,
    },
    /// Reports the speed after a speed command.
    SpeedChanged {
        /// Speed now in effect.
        speed: GameSpeed,
    },
    /// Reports the paused flag after a pause command.
    PauseToggled {
        /// Whether the field is paused now.
        paused: bool,
    },
}

/// Orders that act on the currently selected tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Upgrade the selected tower.
    Upgrade,
    /// Sell the selected tower.
    Sell,
    /// Cycle the selected tower's target mode.
    CycleTargetMode,
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The field is paused or lost, so pointer builds are ignored.
    Halted,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is part of the path or blocked terrain.
    NotBuildable,
    /// Another tower already stands on the requested cell.
    Occupied,
    /// The field cannot afford the tower.
    InsufficientGold,
}

/// Reasons an order on the selected tower may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderError {
    /// No tower is selected.
    NoSelection,
    /// The field cannot afford the order.
    InsufficientGold,
}

/// Error returned when parsing a catalog key fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKey {
    key: String,
}

impl UnknownKey {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
        }
    }

    /// The key that could not be matched.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}'", self.key)
    }
}

impl std::error::Error for UnknownKey {}

/// Unique identifier assigned to a field within a roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(u32);

impl FieldId {
    /// Creates a new field identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Identifier of the field occupying the provided roster slot.
    #[must_use]
    pub fn for_slot(slot: usize) -> Self {
        Self(u32::try_from(slot).unwrap_or(u32::MAX - 1).saturating_add(1))
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Display name of the field occupying the provided roster slot.
///
/// Slots beyond the alphabet fall back to a numbered name.
#[must_use]
pub fn field_name(slot: usize) -> String {
    match u8::try_from(slot) {
        Ok(index) if index < 26 => format!("Field {}", char::from(b'A' + index)),
        _ => format!("Field {}", slot + 1),
    }
}

/// Unique identifier assigned to an enemy within a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower within a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous location expressed in fractional cell units.
///
/// `CellPoint::new(2.5, 3.0)` lies halfway between the centres of cells
/// `(2, 3)` and `(3, 3)`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CellPoint {
    column: f32,
    row: f32,
}

impl CellPoint {
    /// Creates a new fractional cell location.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Fractional column of the location.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Fractional row of the location.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }
}

impl From<CellCoord> for CellPoint {
    fn from(cell: CellCoord) -> Self {
        Self::new(cell.column() as f32, cell.row() as f32)
    }
}

/// Location expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Static stats of a tower type at level one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Gold required to build the tower.
    pub cost: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage dealt per shot.
    pub damage: f32,
    /// Shots per second before the global pacing multiplier.
    pub fire_rate: f32,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap, quick-firing all-rounder.
    #[default]
    Gunner,
    /// Short-ranged, heavy-hitting tower.
    Blaster,
    /// Long-ranged, slow, high-damage tower.
    Sniper,
}

impl TowerKind {
    /// Every tower type in catalog order.
    pub const ALL: [TowerKind; 3] = [Self::Gunner, Self::Blaster, Self::Sniper];

    /// Stable key used by snapshots and the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gunner => "gunner",
            Self::Blaster => "blaster",
            Self::Sniper => "sniper",
        }
    }

    /// Catalog entry for the tower type.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Gunner => TowerStats {
                cost: 50,
                range: 130.0,
                damage: 14.0,
                fire_rate: 1.2,
            },
            Self::Blaster => TowerStats {
                cost: 75,
                range: 95.0,
                damage: 26.0,
                fire_rate: 0.75,
            },
            Self::Sniper => TowerStats {
                cost: 110,
                range: 215.0,
                damage: 58.0,
                fire_rate: 0.35,
            },
        }
    }

    /// Gold required to build the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.stats().cost
    }

    /// Targeting radius at the provided level.
    #[must_use]
    pub fn range_at(self, level: u32) -> f32 {
        self.stats().range * (1.0 + 0.12 * level_steps(level))
    }

    /// Damage per shot at the provided level.
    #[must_use]
    pub fn damage_at(self, level: u32) -> f32 {
        self.stats().damage * (1.0 + 0.30 * level_steps(level))
    }

    /// Shots per second at the provided level, before global pacing.
    #[must_use]
    pub fn fire_rate_at(self, level: u32) -> f32 {
        self.stats().fire_rate * (1.0 + 0.08 * level_steps(level))
    }

    /// Gold required to raise a tower from `level` to `level + 1`.
    #[must_use]
    pub fn upgrade_cost(self, level: u32) -> u32 {
        let cost = f64::from(self.cost());
        (cost * (0.8 + f64::from(level) * 0.45)).floor() as u32
    }

    /// Gold refunded when selling a tower of the provided level.
    ///
    /// Upgrade spend is approximated as `(level - 1) * floor(cost * 0.9)`
    /// rather than replaying [`TowerKind::upgrade_cost`] for every level.
    #[must_use]
    pub fn sell_refund(self, level: u32) -> u32 {
        let cost = u64::from(self.cost());
        let per_upgrade = (cost as f64 * 0.9).floor() as u64;
        let upgrades = u64::from(level.saturating_sub(1));
        let total = cost.saturating_add(upgrades.saturating_mul(per_upgrade));
        let refund = (total as f64 * 0.7).floor();
        refund.min(f64::from(u32::MAX)) as u32
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TowerKind {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == value)
            .ok_or_else(|| UnknownKey::new(value))
    }
}

fn level_steps(level: u32) -> f32 {
    level.saturating_sub(1) as f32
}

/// Multiplicative modifiers an archetype applies to a wave's base stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeMultipliers {
    /// Hit point multiplier.
    pub hp: f64,
    /// Speed multiplier.
    pub speed: f64,
    /// Reward multiplier.
    pub reward: f64,
}

/// Enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy that uses the wave's stats unchanged.
    Grunt,
    /// Fragile, fast enemy.
    Runner,
    /// Slow, durable enemy that pays out more.
    Brute,
}

impl EnemyKind {
    /// Every archetype in table order.
    pub const ALL: [EnemyKind; 3] = [Self::Grunt, Self::Runner, Self::Brute];

    /// Stable key used by snapshots.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Runner => "runner",
            Self::Brute => "brute",
        }
    }

    /// Multipliers applied to the wave's base stats.
    #[must_use]
    pub const fn multipliers(self) -> ArchetypeMultipliers {
        match self {
            Self::Grunt => ArchetypeMultipliers {
                hp: 1.0,
                speed: 1.0,
                reward: 1.0,
            },
            Self::Runner => ArchetypeMultipliers {
                hp: 0.65,
                speed: 1.45,
                reward: 0.9,
            },
            Self::Brute => ArchetypeMultipliers {
                hp: 1.9,
                speed: 0.72,
                reward: 1.6,
            },
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EnemyKind {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == value)
            .ok_or_else(|| UnknownKey::new(value))
    }
}

/// Policy a tower uses to choose among in-range enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Enemy furthest along the path.
    #[default]
    First,
    /// Enemy least far along the path.
    Last,
    /// Enemy closest to the tower.
    Nearest,
    /// Enemy with the most hit points.
    Strongest,
    /// Enemy with the fewest hit points.
    Weakest,
}

impl TargetMode {
    /// Every mode in cycling order.
    pub const ALL: [TargetMode; 5] = [
        Self::First,
        Self::Last,
        Self::Nearest,
        Self::Strongest,
        Self::Weakest,
    ];

    /// Mode that follows this one when cycling, wrapping at the end.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::First => Self::Last,
            Self::Last => Self::Nearest,
            Self::Nearest => Self::Strongest,
            Self::Strongest => Self::Weakest,
            Self::Weakest => Self::First,
        }
    }

    /// Stable key used by snapshots.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Nearest => "nearest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TargetMode {
    type Err = UnknownKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.key() == value)
            .ok_or_else(|| UnknownKey::new(value))
    }
}

/// Simulation speed multipliers a field accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameSpeed {
    /// Real time.
    #[default]
    Normal,
    /// Twice real time.
    Double,
    /// Four times real time.
    Quadruple,
}

impl GameSpeed {
    /// Every accepted speed.
    pub const ALL: [GameSpeed; 3] = [Self::Normal, Self::Double, Self::Quadruple];

    /// Factor applied to frame time.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Quadruple => 4,
        }
    }

    /// Resolves a raw multiplier, returning `None` for unsupported values.
    #[must_use]
    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| f64::from(speed.multiplier()) == value)
    }
}

/// Concrete parameters of a single wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveDefinition {
    /// Number of enemies spawned during the wave.
    pub count: u32,
    /// Base hit points before archetype multipliers.
    pub hp: u32,
    /// Base speed in world units per second before archetype multipliers.
    pub speed: f32,
    /// Base reward before archetype multipliers.
    pub reward: u32,
    /// Seconds between two spawns.
    pub spawn_interval: f32,
}

/// Stats resolved for a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting hit points.
    pub hp: f32,
    /// World units travelled per second.
    pub speed: f32,
    /// Gold awarded on death.
    pub reward: u32,
}

/// Wave progress counters tracked by every field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveClock {
    /// Index of the current wave; unbounded.
    pub wave_index: u32,
    /// Enemies spawned so far in the current wave.
    pub spawned_in_wave: u32,
    /// Seconds accumulated toward the next spawn.
    pub spawn_timer: f32,
    /// Seconds left before the next wave starts once the current one is cleared.
    pub inter_wave_timer: f32,
}

impl Default for WaveClock {
    fn default() -> Self {
        Self {
            wave_index: 0,
            spawned_in_wave: 0,
            spawn_timer: 0.0,
            inter_wave_timer: INITIAL_INTER_WAVE_DELAY,
        }
    }
}

/// Plain-data description of a tower used for persistence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerRecord {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Type of the tower.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Current level, at least one.
    pub level: u32,
    /// Current target mode.
    pub target_mode: TargetMode,
    /// Seconds until the next shot.
    pub cooldown: f32,
}

/// Plain-data description of a live enemy used for persistence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyRecord {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at spawn.
    pub max_hp: f32,
    /// World units travelled per second.
    pub speed: f32,
    /// Gold awarded on death.
    pub reward: u32,
    /// Position along the path in segment units.
    pub progress: f32,
}

/// Plain-data description of a whole field used for persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRecord {
    /// Identifier of the field.
    pub id: FieldId,
    /// Display name of the field.
    pub name: String,
    /// Next identifier handed to a spawned enemy.
    pub next_enemy_id: u32,
    /// Next identifier handed to a built tower.
    pub next_tower_id: u32,
    /// Wave progress counters.
    pub wave: WaveClock,
    /// Tower type used by pointer builds.
    pub selected_tower_kind: TowerKind,
    /// Currently selected tower.
    pub selected_tower: Option<TowerId>,
    /// Gold available.
    pub gold: u32,
    /// Remaining base hit points.
    pub base_hp: u32,
    /// Maximum base hit points.
    pub max_base_hp: u32,
    /// Simulation speed.
    pub speed: GameSpeed,
    /// Whether the field is paused.
    pub paused: bool,
    /// Whether the field is lost.
    pub game_over: bool,
    /// Latent victory flag.
    pub victory: bool,
    /// Towers placed in the field.
    pub towers: Vec<TowerRecord>,
    /// Enemies alive in the field.
    pub enemies: Vec<EnemyRecord>,
}

/// Coarse lifecycle state of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldStatus {
    /// Simulation advances every tick.
    Running,
    /// Simulation is frozen until unpaused.
    Paused,
    /// The base fell; terminal until restart.
    GameOver,
    /// Latent terminal state that no rule currently produces.
    Victory,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::GameOver => "defeat",
            Self::Victory => "victory",
        };
        f.write_str(label)
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// World position derived from the path progress.
    pub position: WorldPoint,
    /// Position along the path in segment units.
    pub progress: f32,
    /// Remaining hit points.
    pub hp: f32,
    /// Remaining hit points divided by maximum, clamped to `0..=1`.
    pub hp_ratio: f32,
}

/// Read-only snapshot describing all enemies within a field.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Type of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Centre of the tower in world units.
    pub position: WorldPoint,
    /// Current level.
    pub level: u32,
    /// Targeting radius at the current level.
    pub range: f32,
    /// Current target mode.
    pub target_mode: TargetMode,
    /// Seconds until the next shot; zero or below means ready.
    pub cooldown: f32,
    /// Gold required for the next upgrade.
    pub upgrade_cost: u32,
    /// Gold refunded if sold now.
    pub sell_value: u32,
}

/// Read-only snapshot describing all towers placed within a field.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Transient tracer left behind by a shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSnapshot {
    /// Tower that fired.
    pub tower: TowerId,
    /// Start of the tracer.
    pub from: WorldPoint,
    /// End of the tracer.
    pub to: WorldPoint,
    /// Seconds left before the tracer expires.
    pub remaining: f32,
}

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell proposed for placement.
    pub cell: CellCoord,
    /// Tower currently standing on the cell, if any.
    pub occupant: Option<TowerId>,
    /// Indicates whether a build on the cell would currently succeed.
    pub placeable: bool,
}

/// Everything an observer needs to present a field.
#[derive(Clone, Debug)]
pub struct FieldView {
    /// Identifier of the field.
    pub id: FieldId,
    /// Display name of the field.
    pub name: String,
    /// Gold available.
    pub gold: u32,
    /// Remaining base hit points.
    pub base_hp: u32,
    /// Maximum base hit points.
    pub max_base_hp: u32,
    /// Index of the current wave.
    pub wave_index: u32,
    /// Simulation speed.
    pub speed: GameSpeed,
    /// Coarse lifecycle state.
    pub status: FieldStatus,
    /// Whether the field is paused.
    pub paused: bool,
    /// Whether the field is lost.
    pub game_over: bool,
    /// Latent victory flag.
    pub victory: bool,
    /// Tower type used by pointer builds.
    pub selected_tower_kind: TowerKind,
    /// Currently selected tower.
    pub selected_tower: Option<TowerId>,
    /// Live enemies.
    pub enemies: EnemyView,
    /// Placed towers.
    pub towers: TowerView,
    /// Shot tracers that have not expired yet.
    pub effects: Vec<EffectSnapshot>,
}
