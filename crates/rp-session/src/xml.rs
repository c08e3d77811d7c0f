//! The rendezvous service's XML response documents.

use serde::Deserialize;

use crate::error::{SessionError, SessionResult};

#[derive(Debug, Deserialize)]
#[serde(rename = "error")]
struct ErrorDoc {
    #[serde(rename = "@msg")]
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "success")]
pub struct NewSessionResponse {
    #[serde(rename = "@sessionId")]
    pub session_id: String,
    #[serde(rename = "@userId")]
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "success")]
pub struct CreateGameResponse {
    #[serde(rename = "@gameId")]
    pub game_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "games")]
pub struct GamesResponse {
    #[serde(rename = "game", default)]
    pub game: Vec<GameEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GameEntry {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@displayName")]
    pub display_name: String,
    #[serde(rename = "@ownerUser")]
    pub owner_user: String,
    #[serde(rename = "@ownerAddr")]
    pub owner_addr: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "success")]
pub struct JoinGameResponse {
    #[serde(rename = "@playerNo")]
    pub player_no: u8,
    #[serde(rename = "@serverAddr")]
    pub server_addr: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "success")]
pub struct ConfirmPlayerResponse {
    #[serde(rename = "@confirmed")]
    pub confirmed: String,
    #[serde(rename = "@addr")]
    pub addr: String,
    #[serde(rename = "@user")]
    pub user: String,
    #[serde(rename = "@playerNo")]
    pub player_no: u8,
}

impl ConfirmPlayerResponse {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed == "true"
    }
}

/// Parses a rendezvous response body as `T`, first checking whether the
/// server sent `<error msg=".."/>` instead.
pub fn parse_response<T>(xml: &str) -> SessionResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let trimmed = xml.trim_start();
    if trimmed.starts_with("<error") {
        let doc: ErrorDoc = quick_xml::de::from_str(trimmed).map_err(|e| SessionError::Xml(e.to_string()))?;
        return Err(SessionError::Protocol(doc.msg));
    }
    quick_xml::de::from_str(trimmed).map_err(|e| SessionError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_session_success() {
        let xml = r#"<success sessionId="abc123" userId="42"/>"#;
        let resp: NewSessionResponse = parse_response(xml).unwrap();
        assert_eq!(resp.session_id, "abc123");
        assert_eq!(resp.user_id, 42);
    }

    #[test]
    fn test_parse_error_document() {
        let xml = r#"<error msg="bad password"/>"#;
        let result: SessionResult<NewSessionResponse> = parse_response(xml);
        match result {
            Err(SessionError::Protocol(msg)) => assert_eq!(msg, "bad password"),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_games_list() {
        let xml = r#"<games><game id="1" displayName="Island2" ownerUser="alice" ownerAddr="1.2.3.4:9999"/></games>"#;
        let resp: GamesResponse = parse_response(xml).unwrap();
        assert_eq!(resp.game.len(), 1);
        assert_eq!(resp.game[0].display_name, "Island2");
    }

    #[test]
    fn test_confirm_player_parses_boolean_attribute() {
        let xml = r#"<success confirmed="true" addr="1.2.3.4:9999" user="bob" playerNo="2"/>"#;
        let resp: ConfirmPlayerResponse = parse_response(xml).unwrap();
        assert!(resp.is_confirmed());
    }
}
