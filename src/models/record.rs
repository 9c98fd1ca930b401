use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::hero::{top_heroes, BestHero, HeroSummary};
use crate::models::profile::PlayerProfileRaw;
use crate::ranks;

/// The display-ready record pushed to the page. Field names are the ones
/// the content script reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPlayerRecord {
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "isPro")]
    pub is_pro: bool,
    #[serde(rename = "isAnonymous")]
    pub is_anonymous: bool,
    #[serde(rename = "seasonRank")]
    pub season_rank: u32,
    #[serde(rename = "smurfFlag")]
    pub smurf_flag: bool,
    #[serde(rename = "isDotaPlusSubscriber")]
    pub is_dota_plus_subscriber: bool,
    #[serde(rename = "seasonLeaderboardRank")]
    pub season_leaderboard_rank: Option<u32>,
    #[serde(rename = "matchCount")]
    pub match_count: u32,
    #[serde(rename = "winCount")]
    pub win_count: u32,
    #[serde(rename = "firstMatchDate")]
    pub first_match_date: Option<DateTime<Utc>>,
    #[serde(rename = "bestHeroes", skip_serializing_if = "Option::is_none")]
    pub best_heroes: Option<Vec<BestHero>>,
    pub battlepass_level: u32,
    pub guild_name: String,
    pub guild_desc: String,
    pub guild_tag: String,
    #[serde(rename = "medalImage")]
    pub medal_image: String,
    #[serde(rename = "starImage")]
    pub star_image: String,
    #[serde(rename = "leaderboardMedalImage")]
    pub leaderboard_medal_image: String,
}

impl AggregatedPlayerRecord {
    /// Base record from a profile response. Missing flags are `false`,
    /// missing text is `""`, missing counts and levels are `0`; only the
    /// leaderboard rank and first match date stay absent.
    pub fn from_profile(raw: &PlayerProfileRaw) -> Self {
        let account = raw.steam_account.clone().unwrap_or_default();
        let pro = raw.pro_account();
        let is_pro = pro.and_then(|p| p.is_pro).unwrap_or(false);

        let pro_alias = pro
            .filter(|_| is_pro)
            .and_then(|p| p.name.clone())
            .filter(|name| !name.is_empty());
        let player_name = pro_alias
            .or_else(|| account.name.clone().filter(|name| !name.is_empty()))
            .unwrap_or_default();

        let guild = raw.guild().cloned().unwrap_or_default();
        let season_rank = account.season_rank.unwrap_or(0);
        // rank 0 is unranked, like a zero first-match date
        let season_leaderboard_rank = account.season_leaderboard_rank.filter(|rank| *rank != 0);

        Self {
            player_name,
            country_code: account.country_code.unwrap_or_default(),
            is_pro,
            is_anonymous: account.is_anonymous.unwrap_or(false),
            season_rank,
            smurf_flag: account.smurf_flag.map(|f| f.is_set()).unwrap_or(false),
            is_dota_plus_subscriber: account.is_dota_plus_subscriber.unwrap_or(false),
            season_leaderboard_rank,
            match_count: raw.match_count.unwrap_or(0),
            win_count: raw.win_count.unwrap_or(0),
            first_match_date: raw.first_match_date.and_then(epoch_to_date),
            best_heroes: None,
            battlepass_level: raw.battlepass_level().unwrap_or(0),
            guild_name: guild.name.unwrap_or_default(),
            guild_desc: guild.motd.unwrap_or_default(),
            guild_tag: guild.tag.unwrap_or_default(),
            medal_image: ranks::medal_image(season_rank),
            star_image: ranks::star_image(season_rank),
            leaderboard_medal_image: ranks::leaderboard_medal_image(
                season_rank,
                season_leaderboard_rank,
            ),
        }
    }

    /// Attaches the top heroes. `sorted` must already be ordered by match count.
    pub fn merge_best_heroes(&mut self, sorted: &[HeroSummary]) {
        self.best_heroes = Some(top_heroes(sorted));
    }
}

// zero counts as absent, as the page has always treated it
fn epoch_to_date(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
