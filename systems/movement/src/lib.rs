#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Locomotion system that moves enemies along the fixed waypoint path.
//!
//! Enemies carry a scalar progress measured in path segments. The integer
//! part names the segment being walked and the fractional part the
//! interpolation factor between its two waypoints. Movement never branches,
//! backtracks or collides.

use endless_defence_core::{CellCoord, CellPoint};

/// Outcome of advancing a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// The enemy is still walking the path.
    EnRoute {
        /// Updated progress in segment units.
        progress: f32,
    },
    /// The enemy reached the end of the path this tick.
    Arrived {
        /// Final progress, equal to the segment count.
        progress: f32,
    },
}

impl Advance {
    /// Progress after the advance, regardless of outcome.
    #[must_use]
    pub const fn progress(self) -> f32 {
        match self {
            Self::EnRoute { progress } | Self::Arrived { progress } => progress,
        }
    }
}

/// Pure system converting speed and elapsed time into path progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    tile_length: f32,
    segment_count: u32,
}

impl Movement {
    /// Creates a movement system for a path of `segment_count` segments whose
    /// waypoints are `tile_length` world units apart.
    #[must_use]
    pub const fn new(tile_length: f32, segment_count: u32) -> Self {
        Self {
            tile_length,
            segment_count,
        }
    }

    /// Number of segments in the path.
    #[must_use]
    pub const fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Advances `progress` by `speed * dt / tile_length`.
    ///
    /// Reaching or passing the final waypoint clamps the progress to the
    /// segment count and reports [`Advance::Arrived`].
    #[must_use]
    pub fn advance(&self, progress: f32, speed: f32, dt: f32) -> Advance {
        let end = self.segment_count as f32;
        let mut next = if progress.is_finite() {
            progress.max(0.0)
        } else {
            0.0
        };

        if self.tile_length > 0.0 && speed.is_finite() && speed > 0.0 && dt > 0.0 {
            next += speed * dt / self.tile_length;
        }

        if next >= end {
            Advance::Arrived { progress: end }
        } else {
            Advance::EnRoute { progress: next }
        }
    }
}

/// Interpolates the fractional cell location at `progress` along `path`.
///
/// Progress outside `0..=segments` is clamped onto the path; an empty path
/// yields the origin.
#[must_use]
pub fn point_along(path: &[CellCoord], progress: f32) -> CellPoint {
    let Some(last) = path.last() else {
        return CellPoint::default();
    };

    let segments = path.len().saturating_sub(1);
    let progress = if progress.is_finite() {
        progress.clamp(0.0, segments as f32)
    } else {
        0.0
    };

    let segment = progress.floor() as usize;
    if segment >= segments {
        return CellPoint::from(*last);
    }

    let t = progress - segment as f32;
    let from = CellPoint::from(path[segment]);
    let to = CellPoint::from(path[segment + 1]);
    CellPoint::new(
        from.column() + (to.column() - from.column()) * t,
        from.row() + (to.row() - from.row()) * t,
    )
}
