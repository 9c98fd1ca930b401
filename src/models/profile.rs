use serde::{Deserialize, Serialize};

/// `data.player` from the `playerInfo` query. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProfileRaw {
    pub first_match_date: Option<i64>,
    pub match_count: Option<u32>,
    pub win_count: Option<u32>,
    pub steam_account: Option<SteamAccount>,
    pub simple_summary: Option<SimpleSummary>,
    pub matches: Option<Vec<RecentMatch>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SteamAccount {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub is_anonymous: Option<bool>,
    pub season_rank: Option<u32>,
    pub smurf_flag: Option<Flag>,
    pub country_code: Option<String>,
    pub is_dota_plus_subscriber: Option<bool>,
    pub dota_account_level: Option<u32>,
    pub season_leaderboard_rank: Option<u32>,
    pub guild: Option<GuildMember>,
    pub battlepass: Option<Vec<Battlepass>>,
    pub pro_steam_account: Option<ProSteamAccount>,
}

/// STRATZ reports some flags as numbers (`smurfFlag: 0`) and some as booleans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(i64),
}

impl Flag {
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Number(n) => n != 0,
        }
    }
}

/// STRATZ nests the guild one level down: `guild { guild { ... } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildMember {
    pub guild: Option<Guild>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    pub name: Option<String>,
    pub motd: Option<String>,
    pub logo: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Battlepass {
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProSteamAccount {
    pub is_pro: Option<bool>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleSummary {
    pub match_count: Option<u32>,
    pub last_update_date_time: Option<i64>,
    pub heroes: Option<Vec<SimpleHeroSummary>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleHeroSummary {
    pub hero_id: Option<u32>,
    pub win_count: Option<u32>,
    pub loss_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentMatch {
    pub id: Option<i64>,
    pub analysis_outcome: Option<String>,
    pub duration_seconds: Option<u32>,
    pub end_date_time: Option<i64>,
    pub players: Option<Vec<RecentMatchLine>>,
}

/// The requested player's own line in a recent match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentMatchLine {
    pub is_victory: Option<bool>,
    pub networth: Option<u32>,
    pub level: Option<u32>,
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    pub hero_id: Option<u32>,
    pub experience_per_minute: Option<u32>,
    pub gold_per_minute: Option<u32>,
}

impl PlayerProfileRaw {
    pub fn pro_account(&self) -> Option<&ProSteamAccount> {
        self.steam_account.as_ref()?.pro_steam_account.as_ref()
    }

    pub fn guild(&self) -> Option<&Guild> {
        self.steam_account.as_ref()?.guild.as_ref()?.guild.as_ref()
    }

    pub fn battlepass_level(&self) -> Option<u32> {
        self.steam_account.as_ref()?.battlepass.as_ref()?.first()?.level
    }
}
