use endless_defence_core::{EnemyKind, EnemyStats, WaveDefinition};

/// Base wave table reused cyclically by [`wave_definition`].
pub const BASE_WAVES: [WaveDefinition; 3] = [
    WaveDefinition {
        count: 12,
        hp: 55,
        speed: 84.0,
        reward: 8,
        spawn_interval: 0.72,
    },
    WaveDefinition {
        count: 18,
        hp: 90,
        speed: 95.0,
        reward: 10,
        spawn_interval: 0.58,
    },
    WaveDefinition {
        count: 22,
        hp: 125,
        speed: 108.0,
        reward: 12,
        spawn_interval: 0.52,
    },
];

const COUNT_GROWTH: f64 = 0.12;
const HP_GROWTH: f64 = 0.20;
const SPEED_GROWTH: f64 = 0.05;
const REWARD_GROWTH: f64 = 0.12;
const INTERVAL_DECAY: f64 = 0.05;
const INTERVAL_FLOOR: f64 = 0.45;

/// Resolves the parameters of the wave with the provided index.
///
/// The function is pure: equal indices always produce equal definitions.
#[must_use]
pub fn wave_definition(index: u32) -> WaveDefinition {
    let table_length = BASE_WAVES.len() as u32;
    let base = BASE_WAVES[(index % table_length) as usize];
    let cycle = f64::from(index / table_length);

    let count = (f64::from(base.count) * (1.0 + COUNT_GROWTH * cycle)).floor();
    let hp = (f64::from(base.hp) * (1.0 + HP_GROWTH * cycle)).floor();
    let speed = f64::from(base.speed) * (1.0 + SPEED_GROWTH * cycle);
    let reward = (f64::from(base.reward) * (1.0 + REWARD_GROWTH * cycle)).floor();
    let interval_scale = (1.0 - INTERVAL_DECAY * cycle).max(INTERVAL_FLOOR);

    WaveDefinition {
        count: count as u32,
        hp: hp as u32,
        speed: speed as f32,
        reward: (reward as u32).max(1),
        spawn_interval: (f64::from(base.spawn_interval) * interval_scale) as f32,
    }
}

/// Applies an archetype's multipliers to a wave's base stats.
#[must_use]
pub fn enemy_stats(wave: &WaveDefinition, kind: EnemyKind) -> EnemyStats {
    let multipliers = kind.multipliers();
    let hp = (f64::from(wave.hp) * multipliers.hp).floor();
    let speed = f64::from(wave.speed) * multipliers.speed;
    let reward = (f64::from(wave.reward) * multipliers.reward).floor();

    EnemyStats {
        hp: hp as f32,
        speed: speed as f32,
        reward: (reward as u32).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cycle_matches_base_table() {
        for (index, base) in BASE_WAVES.iter().enumerate() {
            assert_eq!(wave_definition(index as u32), *base);
        }
    }

    #[test]
    fn second_cycle_scales_first_entry() {
        let wave = wave_definition(3);
        assert_eq!(wave.count, 13);
        assert_eq!(wave.hp, 66);
        assert_eq!(wave.reward, 8);
        assert!((wave.speed - 88.2).abs() < 1e-3);
        assert!((wave.spawn_interval - 0.684).abs() < 1e-5);
    }

    #[test]
    fn spawn_interval_never_drops_below_floor() {
        let wave = wave_definition(300);
        assert!((wave.spawn_interval - 0.72 * 0.45).abs() < 1e-5);
        assert!(wave.spawn_interval > 0.0);
    }

    #[test]
    fn archetype_multipliers_floor_hp_and_reward() {
        let wave = BASE_WAVES[1];
        let runner = enemy_stats(&wave, EnemyKind::Runner);
        assert_eq!(runner.hp, 58.0);
        assert_eq!(runner.reward, 9);
        let brute = enemy_stats(&wave, EnemyKind::Brute);
        assert_eq!(brute.hp, 171.0);
        assert_eq!(brute.reward, 16);
    }

    #[test]
    fn reward_is_never_zero() {
        let wave = WaveDefinition {
            reward: 1,
            ..BASE_WAVES[0]
        };
        assert_eq!(enemy_stats(&wave, EnemyKind::Runner).reward, 1);
    }
}
