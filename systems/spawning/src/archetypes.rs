use endless_defence_core::EnemyKind;

const OPENING_WAVE: &[(EnemyKind, f64)] = &[(EnemyKind::Grunt, 1.0)];

const SECOND_WAVE: &[(EnemyKind, f64)] = &[(EnemyKind::Grunt, 0.70), (EnemyKind::Runner, 1.0)];

const LATER_WAVES: &[(EnemyKind, f64)] = &[
    (EnemyKind::Grunt, 0.50),
    (EnemyKind::Runner, 0.80),
    (EnemyKind::Brute, 1.0),
];

/// Cumulative probability table used for the provided wave.
///
/// Entries are ordered; each bound is the cumulative probability up to and
/// including that archetype.
#[must_use]
pub fn archetype_table(wave_index: u32) -> &'static [(EnemyKind, f64)] {
    match wave_index {
        0 => OPENING_WAVE,
        1 => SECOND_WAVE,
        _ => LATER_WAVES,
    }
}

/// Picks the archetype for a roll in `0.0..1.0`.
///
/// The first entry whose cumulative bound exceeds the roll wins; rolls at or
/// above every bound fall through to the last entry.
#[must_use]
pub fn select_archetype(wave_index: u32, roll: f64) -> EnemyKind {
    let table = archetype_table(wave_index);
    table
        .iter()
        .find(|(_, bound)| roll < *bound)
        .or_else(|| table.last())
        .map_or(EnemyKind::Grunt, |(kind, _)| *kind)
}
