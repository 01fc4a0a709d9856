use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: i64 = 1000;

/// Percent of the way from the last 1000-XP boundary to the next one
pub fn level_progress_percent(xp: i64) -> f64 {
    xp.rem_euclid(XP_PER_LEVEL) as f64 / 10.0
}

pub fn xp_to_next_level(xp: i64) -> i64 {
    XP_PER_LEVEL - xp.rem_euclid(XP_PER_LEVEL)
}

/// Level thresholds in strictly descending order; first match wins
const LEVEL_TITLES: [(i32, &str); 6] = [
    (30, "Légende Vivante"),
    (25, "Hokage de l'Arène"),
    (20, "Pilier Suprême"),
    (15, "Chasseur de S-Rank"),
    (10, "Otaku d'Elite"),
    (5, "Vagabond des Mondes"),
];

const VOTE_TITLE_THRESHOLD: i64 = 100;
const VOTE_TITLE: &str = "Arbitre de l'Arène";
const DEFAULT_TITLE: &str = "Apprenti Otaku";

/// Display label for a user. XP does not take part in the current thresholds.
pub fn prestige_title(level: i32, _xp: i64, votes_count: i64) -> &'static str {
    LEVEL_TITLES
        .iter()
        .find(|(threshold, _)| level >= *threshold)
        .map(|(_, title)| *title)
        .unwrap_or(if votes_count > VOTE_TITLE_THRESHOLD {
            VOTE_TITLE
        } else {
            DEFAULT_TITLE
        })
}

/// Derived progression block shown on a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level_progress: f64,
    pub xp_to_next_level: i64,
    pub prestige_title: String,
}

impl LevelProgress {
    pub fn compute(level: i32, xp: i64, votes_count: i64) -> Self {
        Self {
            level_progress: level_progress_percent(xp),
            xp_to_next_level: xp_to_next_level(xp),
            prestige_title: prestige_title(level, xp, votes_count).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2450, 45.0)]
    #[case(0, 0.0)]
    #[case(999, 99.9)]
    #[case(1000, 0.0)]
    #[case(12_340, 34.0)]
    fn progress_is_xp_mod_thousand_over_ten(#[case] xp: i64, #[case] expected: f64) {
        assert!((level_progress_percent(xp) - expected).abs() < 1e-9);
    }

    #[test]
    fn xp_to_next_level_counts_down_to_boundary() {
        assert_eq!(xp_to_next_level(2450), 550);
        assert_eq!(xp_to_next_level(0), 1000);
        assert_eq!(xp_to_next_level(1000), 1000);
    }

    #[rstest]
    #[case(30, 0, "Légende Vivante")]
    #[case(42, 500, "Légende Vivante")]
    #[case(25, 0, "Hokage de l'Arène")]
    #[case(20, 0, "Pilier Suprême")]
    #[case(19, 0, "Chasseur de S-Rank")]
    #[case(10, 0, "Otaku d'Elite")]
    #[case(5, 1000, "Vagabond des Mondes")]
    #[case(4, 101, "Arbitre de l'Arène")]
    #[case(4, 100, "Apprenti Otaku")]
    #[case(1, 0, "Apprenti Otaku")]
    fn prestige_title_by_priority(
        #[case] level: i32,
        #[case] votes: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(prestige_title(level, 0, votes), expected);
    }

    #[test]
    fn level_progress_serializes_in_camel_case() {
        let progress = LevelProgress::compute(3, 2450, 12);
        let json = serde_json::to_value(&progress).unwrap();

        assert_eq!(json["levelProgress"], 45.0);
        assert_eq!(json["xpToNextLevel"], 550);
        assert_eq!(json["prestigeTitle"], "Apprenti Otaku");
    }
}
