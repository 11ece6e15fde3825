#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating pointer intent into build and selection commands.

use endless_defence_core::{CellCoord, Command, TowerId, TowerKind};

/// Input snapshot distilled from adapter-provided pointer data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Cell under a primary press this frame, if any.
    pub primary: Option<CellCoord>,
    /// Cell under a secondary press this frame, if any.
    pub secondary: Option<CellCoord>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(primary: Option<CellCoord>, secondary: Option<CellCoord>) -> Self {
        Self { primary, secondary }
    }
}

/// Field state the builder needs to interpret a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderContext {
    /// Whether the field is paused or lost; presses are ignored then.
    pub halted: bool,
    /// Tower type a primary press on an empty cell builds.
    pub selected_kind: TowerKind,
}

/// System that turns presses into `SelectTower`, `SelectTowerAt` and
/// `BuildTower` commands.
#[derive(Debug, Default, Clone)]
pub struct Builder;

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits commands for the presses in `input`.
    ///
    /// A primary press on a tower selects it, anywhere else it requests a
    /// build of the selected kind; whether the build succeeds is up to the
    /// world. A secondary press selects whatever stands on the cell, clearing
    /// the selection on empty cells. The `tower_at` closure should mirror the
    /// world's `query::tower_at` helper.
    pub fn handle<F>(
        &mut self,
        context: BuilderContext,
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<TowerId>,
    {
        if context.halted {
            return;
        }

        if let Some(cell) = input.primary {
            match tower_at(cell) {
                Some(tower) => out.push(Command::SelectTower { tower: Some(tower) }),
                None => out.push(Command::BuildTower {
                    cell,
                    kind: context.selected_kind,
                }),
            }
        }

        if let Some(cell) = input.secondary {
            out.push(Command::SelectTowerAt { cell });
        }
    }
}
