#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system responsible for emitting enemy spawn commands.
//!
//! Waves never run out: [`wave_definition`] maps any wave index onto the
//! short base table and scales it up once per full pass through the table.

mod archetypes;
mod waves;

pub use archetypes::{archetype_table, select_archetype};
pub use waves::{enemy_stats, wave_definition, BASE_WAVES};

use endless_defence_core::{Command, WaveClock, WaveDefinition, INTER_WAVE_DELAY};
use rand::Rng;

/// Pure system that advances a field's [`WaveClock`] and emits spawn commands.
#[derive(Debug, Default)]
pub struct Spawning;

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the wave clock by `dt` simulated seconds.
    ///
    /// While the current wave still has enemies to release, one
    /// `Command::SpawnEnemy` is emitted per elapsed spawn interval; overrun
    /// carries over to the next call. Once the wave is exhausted and
    /// `enemies_remaining` drops to zero, the inter-wave countdown runs and
    /// the clock moves on to the next wave when it expires.
    pub fn handle<R>(
        &mut self,
        clock: &mut WaveClock,
        enemies_remaining: usize,
        dt: f32,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if !(dt > 0.0) {
            return;
        }

        let wave = wave_definition(clock.wave_index);
        if clock.spawned_in_wave < wave.count {
            clock.spawn_timer += dt;
            let spawn_attempts = resolve_spawn_attempts(clock, &wave);
            for _ in 0..spawn_attempts {
                let kind = select_archetype(clock.wave_index, rng.gen::<f64>());
                out.push(Command::SpawnEnemy {
                    kind,
                    stats: enemy_stats(&wave, kind),
                });
            }
            return;
        }

        if enemies_remaining > 0 {
            return;
        }

        clock.inter_wave_timer -= dt;
        if clock.inter_wave_timer <= 0.0 {
            clock.wave_index = clock.wave_index.saturating_add(1);
            clock.spawned_in_wave = 0;
            clock.spawn_timer = 0.0;
            clock.inter_wave_timer = INTER_WAVE_DELAY;
        }
    }
}

fn resolve_spawn_attempts(clock: &mut WaveClock, wave: &WaveDefinition) -> u32 {
    if !(wave.spawn_interval > 0.0) {
        return 0;
    }

    let mut attempts = 0;
    while clock.spawn_timer >= wave.spawn_interval && clock.spawned_in_wave < wave.count {
        clock.spawn_timer -= wave.spawn_interval;
        clock.spawned_in_wave += 1;
        attempts += 1;
    }
    attempts
}
