use crate::client::{check_graphql_errors, GraphQlFetcher, GraphQlRequest, StratzClient};
use crate::config::ApiConfig;
use crate::error::StratzError;
use crate::models::hero::HeroConstant;

pub const HERO_CONSTANTS_QUERY: &str = r#"
query GetAllHeroes {
  constants {
    heroes {
      id
      name
      displayName
      shortName
      stats { primaryAttribute }
    }
  }
}
"#;

pub fn hero_constants_request() -> GraphQlRequest {
    GraphQlRequest {
        operation: "allHeros",
        query: HERO_CONSTANTS_QUERY,
        variables: None,
    }
}

pub fn parse_hero_constants(body: &serde_json::Value) -> Result<Vec<HeroConstant>, StratzError> {
    check_graphql_errors(body)?;
    match body.pointer("/data/constants/heroes") {
        Some(heroes) if !heroes.is_null() => Ok(serde_json::from_value(heroes.clone())?),
        _ => Ok(vec![]),
    }
}

impl StratzClient {
    /// Every hero in the current game version, for id → name lookups
    pub async fn hero_constants(&self, config: &ApiConfig) -> Result<Vec<HeroConstant>, StratzError> {
        let body = self.execute(config, &hero_constants_request()).await?;
        parse_hero_constants(&body)
    }
}
