use serde_json::json;

use crate::client::{check_graphql_errors, GraphQlFetcher, GraphQlRequest, StratzClient};
use crate::config::ApiConfig;
use crate::error::StratzError;
use crate::models::hero::{BestHeroesPlayer, HeroSummary};
use crate::models::profile::PlayerProfileRaw;

pub const PLAYER_INFO_QUERY: &str = r#"
query playerInfo($steamid: Long!) {
  player(steamAccountId: $steamid) {
    firstMatchDate
    matchCount
    winCount
    simpleSummary {
      matchCount
      lastUpdateDateTime
      heroes { heroId winCount lossCount }
    }
    steamAccount {
      name
      avatar
      isAnonymous
      seasonRank
      smurfFlag
      countryCode
      isDotaPlusSubscriber
      dotaAccountLevel
      seasonLeaderboardRank
      guild { guild { name motd logo tag } }
      battlepass { level }
      proSteamAccount { isPro name }
    }
    matches(request: { isParsed: true, gameModeIds: [1, 22], take: 5, playerList: SINGLE }) {
      id
      analysisOutcome
      durationSeconds
      endDateTime
      players(steamAccountId: $steamid) {
        isVictory networth level assists kills deaths heroId experiencePerMinute goldPerMinute
      }
    }
    MatchGroupBySteamId: matchesGroupBy(request: { take: 5, gameModeIds: [1, 22], playerList: SINGLE, groupBy: STEAM_ACCOUNT_ID }) {
      ... on MatchGroupBySteamAccountIdType {
        matchCount winCount avgImp avgKills avgDeaths avgAssists avgExperiencePerMinute avgGoldPerMinute avgKDA
      }
    }
    MatchGroupByHero: matchesGroupBy(request: { take: 5, gameModeIds: [1, 22], playerList: SINGLE, groupBy: HERO }) {
      ... on MatchGroupByHeroType {
        heroId matchCount winCount avgImp avgKills avgDeaths avgAssists avgExperiencePerMinute avgGoldPerMinute avgKDA
      }
    }
  }
}
"#;

pub const BEST_HEROES_QUERY: &str = r#"
query GetPlayerBestHeroes($steamAccountId: Long!, $take: Int!, $gameVersionId: Short!) {
  player(steamAccountId: $steamAccountId) {
    steamAccountId
    matchCount
    heroesGroupBy: matchesGroupBy(request: { playerList: SINGLE, groupBy: HERO, take: $take }) {
      ... on MatchGroupByHeroType {
        heroId
        hero(gameVersionId: $gameVersionId) { id displayName shortName }
        winCount
        matchCount
      }
    }
  }
}
"#;

pub fn player_info_request(player_id: u64) -> GraphQlRequest {
    GraphQlRequest {
        operation: "playerInfo",
        query: PLAYER_INFO_QUERY,
        variables: Some(json!({ "steamid": player_id })),
    }
}

pub fn best_heroes_request(player_id: u64, take: u32, game_version_id: u16) -> GraphQlRequest {
    GraphQlRequest {
        operation: "bestHeroes",
        query: BEST_HEROES_QUERY,
        variables: Some(json!({
            "steamAccountId": player_id,
            "take": take,
            "gameVersionId": game_version_id,
        })),
    }
}

/// `data.player` of a `playerInfo` response. A null player yields an
/// all-default profile; `errors` without data is a failure.
pub fn parse_player_info(body: &serde_json::Value) -> Result<PlayerProfileRaw, StratzError> {
    check_graphql_errors(body)?;
    match body.pointer("/data/player") {
        Some(player) if !player.is_null() => Ok(serde_json::from_value(player.clone())?),
        _ => Ok(PlayerProfileRaw::default()),
    }
}

/// Hero groupings of a best-heroes response, in API order.
pub fn parse_best_heroes(body: &serde_json::Value) -> Result<Vec<HeroSummary>, StratzError> {
    check_graphql_errors(body)?;
    let player: BestHeroesPlayer = match body.pointer("/data/player") {
        Some(player) if !player.is_null() => serde_json::from_value(player.clone())?,
        _ => return Err(StratzError::GraphQl("best heroes response has no player".into())),
    };
    player
        .heroes_group_by
        .ok_or_else(|| StratzError::GraphQl("best heroes response has no heroesGroupBy".into()))
}

impl StratzClient {
    /// Profile, recent matches and account metadata for a player
    pub async fn player_profile(
        &self,
        config: &ApiConfig,
        player_id: u64,
    ) -> Result<PlayerProfileRaw, StratzError> {
        let body = self.execute(config, &player_info_request(player_id)).await?;
        parse_player_info(&body)
    }

    /// Per-hero match and win counts, in API order
    pub async fn best_heroes(
        &self,
        config: &ApiConfig,
        player_id: u64,
        take: u32,
        game_version_id: u16,
    ) -> Result<Vec<HeroSummary>, StratzError> {
        let body = self
            .execute(config, &best_heroes_request(player_id, take, game_version_id))
            .await?;
        parse_best_heroes(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_variables() {
        let request = best_heroes_request(123456789, 50000, 169);
        let vars = request.variables.unwrap();
        assert_eq!(vars["steamAccountId"], 123456789);
        assert_eq!(vars["take"], 50000);
        assert_eq!(vars["gameVersionId"], 169);

        let request = player_info_request(42);
        assert_eq!(request.variables.unwrap()["steamid"], 42);
        assert!(request.query.contains("proSteamAccount"));
        assert!(request.query.contains("MatchGroupBySteamId: matchesGroupBy"));
        assert!(request.query.contains("MatchGroupByHero: matchesGroupBy"));
    }

    #[test]
    fn test_parse_player_info_null_player() {
        let profile = parse_player_info(&json!({ "data": { "player": null } })).unwrap();
        assert!(profile.steam_account.is_none());
    }

    #[test]
    fn test_parse_player_info_malformed() {
        let body = json!({ "data": { "player": { "matchCount": "lots" } } });
        assert!(matches!(parse_player_info(&body), Err(StratzError::Json(_))));
    }

    #[test]
    fn test_parse_best_heroes() {
        let body = json!({
            "data": { "player": {
                "steamAccountId": 1,
                "heroesGroupBy": [
                    { "heroId": 1, "winCount": 3, "matchCount": 5,
                      "hero": { "id": 1, "displayName": "Anti-Mage", "shortName": "antimage" } },
                    { "heroId": 2, "winCount": 1, "matchCount": 9 }
                ]
            } }
        });
        let heroes = parse_best_heroes(&body).unwrap();
        assert_eq!(heroes.len(), 2);
        assert_eq!(heroes[0].hero.as_ref().unwrap().short_name.as_deref(), Some("antimage"));
        assert_eq!(heroes[1].match_count, 9);
    }

    #[test]
    fn test_parse_best_heroes_missing_group() {
        let body = json!({ "data": { "player": { "heroesGroupBy": null } } });
        assert!(parse_best_heroes(&body).is_err());
        assert!(parse_best_heroes(&json!({ "data": { "player": null } })).is_err());
    }

    #[test]
    fn test_errors_payload_is_rejected() {
        let body = json!({ "data": null, "errors": [{ "message": "steamAccountId is private" }] });
        match parse_player_info(&body) {
            Err(StratzError::GraphQl(message)) => assert_eq!(message, "steamAccountId is private"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse_best_heroes(&body), Err(StratzError::GraphQl(_))));
    }
}
