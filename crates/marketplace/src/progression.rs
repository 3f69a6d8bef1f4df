//! User progression: experience, levels, and level display colors.
//!
//! All functions here are pure; persistence of the resulting state happens
//! in the same transaction as whatever counter increment triggered it.

/// Highest reachable level. Experience keeps accumulating past the cap
/// without further level-ups.
pub const MAX_LEVEL: i64 = 50;

/// Experience granted to the reviewed user for a 4+ star review.
pub const POSITIVE_REVIEW_BONUS: i64 = 25;

/// Base experience for completing a trade.
pub const TRADE_BASE_EXPERIENCE: i64 = 50;

/// Additional experience per item exchanged in a completed trade.
pub const TRADE_ITEM_EXPERIENCE: i64 = 10;

/// Level indicator colors, one band per 5 levels.
const LEVEL_COLORS: [&str; 10] = [
    "#808080", // grey, levels 1-4
    "#00ff00", // green, 5-9
    "#0000ff", // blue, 10-14
    "#800080", // purple, 15-19
    "#ff00ff", // magenta, 20-24
    "#ff0000", // red, 25-29
    "#ffa500", // orange, 30-34
    "#ffff00", // yellow, 35-39
    "#00ffff", // cyan, 40-44
    "#ffd700", // gold, 45-50
];

/// Experience required to advance from `level` to the next one:
/// `floor(100 * 1.5^(level - 1))`.
pub fn required_experience(level: i64) -> i64 {
    (100.0 * 1.5f64.powi((level - 1) as i32)).floor() as i64
}

/// Experience awarded to each participant for completing a trade with
/// `item_count` items across both offers.
pub fn trade_experience(item_count: usize) -> i64 {
    TRADE_BASE_EXPERIENCE + TRADE_ITEM_EXPERIENCE * item_count as i64
}

/// Add `amount` experience to a `(level, experience)` state and return the
/// new state, applying level-ups until the remainder is below the current
/// requirement. The level never exceeds [`MAX_LEVEL`].
pub fn apply_experience(level: i64, experience: i64, amount: i64) -> (i64, i64) {
    let mut level = level;
    let mut experience = experience + amount;

    while level < MAX_LEVEL && experience >= required_experience(level) {
        experience -= required_experience(level);
        level += 1;
    }

    (level, experience)
}

/// Display color for a level: 10 bands of width 5, levels 1-4 in band 0 and
/// 45-50 in band 9.
pub fn level_color(level: i64) -> &'static str {
    let band = (level / 5).clamp(0, 9);
    LEVEL_COLORS[band as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_experience_scales() {
        assert_eq!(required_experience(1), 100);
        assert_eq!(required_experience(2), 150);
        assert_eq!(required_experience(3), 225);
        assert_eq!(required_experience(4), 337);
    }

    #[test]
    fn test_exact_level_up() {
        // 100 XP at level 1 reaches level 2 with nothing left over.
        assert_eq!(apply_experience(1, 0, 100), (2, 0));
    }

    #[test]
    fn test_leftover_below_next_requirement() {
        // 249 XP at level 1: level 2 with 149 left, below the 150 needed.
        assert_eq!(apply_experience(1, 0, 249), (2, 149));
    }

    #[test]
    fn test_multi_level_jump() {
        // 250 XP clears both the 100 and 150 requirements exactly.
        assert_eq!(apply_experience(1, 0, 250), (3, 0));
    }

    #[test]
    fn test_accumulates_across_calls() {
        let (level, xp) = apply_experience(1, 60, 60);
        assert_eq!((level, xp), (2, 20));
    }

    #[test]
    fn test_never_overshoots_cap() {
        let (level, xp) = apply_experience(49, 0, i64::MAX / 2);
        assert_eq!(level, MAX_LEVEL);
        assert!(xp > 0);

        // Once capped, experience keeps accumulating with no further level-ups.
        let (level, xp) = apply_experience(50, 1_000, 1_000_000);
        assert_eq!(level, MAX_LEVEL);
        assert_eq!(xp, 1_001_000);
    }

    #[test]
    fn test_trade_experience_formula() {
        assert_eq!(trade_experience(0), 50);
        assert_eq!(trade_experience(2), 70);
        assert_eq!(trade_experience(5), 100);
    }

    #[test]
    fn test_level_color_bands() {
        assert_eq!(level_color(1), level_color(4));
        assert_ne!(level_color(5), level_color(4));
        assert_eq!(level_color(5), level_color(9));
        assert_eq!(level_color(45), "#ffd700");
        assert_eq!(level_color(50), "#ffd700");
    }
}
