use std::time::Duration;

/// Seed used when the caller does not supply one.
pub const DEFAULT_RNG_SEED: u64 = 0x00e1_d1e5_5def_e1ce;

/// Autosave cadence used when the caller does not supply one.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Tunables of a [`crate::SessionManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    autosave_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration.
    ///
    /// `autosave_interval` is measured in unscaled frame time; a zero
    /// interval saves after every tick.
    #[must_use]
    pub const fn new(autosave_interval: Duration, rng_seed: u64) -> Self {
        Self {
            autosave_interval,
            rng_seed,
        }
    }

    /// Time between automatic saves.
    #[must_use]
    pub const fn autosave_interval(&self) -> Duration {
        self.autosave_interval
    }

    /// Seed every field's random stream is derived from.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_RNG_SEED)
    }
}
