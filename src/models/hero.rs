use serde::{Deserialize, Serialize};

/// Heroes kept on the record after sorting.
pub const BEST_HEROES_SHOWN: usize = 5;

/// One `heroesGroupBy` entry from the best-heroes query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSummary {
    #[serde(default)]
    pub hero_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroRef>,
    #[serde(default)]
    pub win_count: u32,
    #[serde(default)]
    pub match_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroRef {
    pub id: Option<u32>,
    pub display_name: Option<String>,
    pub short_name: Option<String>,
}

/// `data.player` from the best-heroes query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BestHeroesPlayer {
    pub steam_account_id: Option<u64>,
    pub match_count: Option<u32>,
    pub heroes_group_by: Option<Vec<HeroSummary>>,
}

/// A hero as shown on the page, with its win rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestHero {
    #[serde(flatten)]
    pub summary: HeroSummary,
    /// `winCount / matchCount * 100`; NaN when the hero has no matches.
    pub winrate: f64,
}

impl From<HeroSummary> for BestHero {
    fn from(summary: HeroSummary) -> Self {
        let winrate = summary.win_count as f64 / summary.match_count as f64 * 100.0;
        Self { summary, winrate }
    }
}

/// Orders heroes by match count, most played first. Ties keep API order.
pub fn sort_by_matches(heroes: &mut [HeroSummary]) {
    heroes.sort_by(|a, b| b.match_count.cmp(&a.match_count));
}

/// Top heroes with win rates, from an already sorted list.
pub fn top_heroes(sorted: &[HeroSummary]) -> Vec<BestHero> {
    sorted
        .iter()
        .take(BEST_HEROES_SHOWN)
        .cloned()
        .map(BestHero::from)
        .collect()
}

/// Entry of the `GetAllHeroes` constants query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroConstant {
    pub id: u32,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default)]
    pub stats: Option<HeroStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStats {
    pub primary_attribute: Option<String>,
}
