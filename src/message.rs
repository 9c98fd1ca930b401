use crate::error::StratzError;

/// A message from the content script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMessage {
    /// `{"action": "fetchDotaStats", "steamID": ...}`. The id is the
    /// 32-bit Steam account id ("steamID3"), sent as a number or a string.
    FetchDotaStats { player_id: u64 },
    Ping,
}

impl RuntimeMessage {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, StratzError> {
        match value["action"].as_str() {
            Some("fetchDotaStats") => Ok(RuntimeMessage::FetchDotaStats {
                player_id: parse_player_id(&value["steamID"])?,
            }),
            Some("ping") => Ok(RuntimeMessage::Ping),
            Some(other) => Err(StratzError::UnknownAction(other.to_string())),
            None => Err(StratzError::UnknownAction(String::new())),
        }
    }
}

fn parse_player_id(value: &serde_json::Value) -> Result<u64, StratzError> {
    let id = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
        .ok_or_else(|| StratzError::InvalidPlayerId(value.to_string()))
}
