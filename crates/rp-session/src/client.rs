//! A blocking rendezvous client. Every call takes `&mut self`, so only one
//! HTTP request is ever in flight per session — the "single-slot queue"
//! falls out of ordinary borrow checking rather than an explicit queue.

use tracing::{info, warn};

use crate::error::{SessionError, SessionResult};
use crate::state::SessionState;
use crate::xml::{self, ConfirmPlayerResponse, GameEntry, JoinGameResponse};

pub struct RendezvousClient {
    base_url: String,
    state: SessionState,
}

impl RendezvousClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), state: SessionState::Disconnected }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn call(&self, method: &str, url: &str, body: Option<&str>) -> SessionResult<String> {
        let request = match method {
            "PUT" => ureq::put(url),
            "DELETE" => ureq::delete(url),
            _ => ureq::post(url),
        };
        let response = match body {
            Some(b) => request.send_string(b),
            None => request.call(),
        };
        response
            .map_err(|e| SessionError::Http(e.to_string()))?
            .into_string()
            .map_err(|e| SessionError::Http(e.to_string()))
    }

    /// `PUT /api/session/new?name=..&password=..&listenPort=..`
    pub fn login(&mut self, name: &str, password: &str, listen_port: u16) -> SessionResult<()> {
        self.state = SessionState::LoggingIn;
        let url = format!(
            "{}/api/session/new?name={}&password={}&listenPort={}",
            self.base_url, name, password, listen_port
        );
        let body = self.call("PUT", &url, None);
        let body = match body {
            Ok(b) => b,
            Err(e) => {
                self.state = SessionState::InError(e.to_string());
                return Err(e);
            }
        };
        let parsed: SessionResult<xml::NewSessionResponse> = xml::parse_response(&body);
        match parsed {
            Ok(resp) => {
                info!(user_id = resp.user_id, "logged in to rendezvous");
                self.state = SessionState::LoggedIn { session_id: resp.session_id, user_id: resp.user_id };
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::InError(e.to_string());
                Err(e)
            }
        }
    }

    /// `DELETE /api/session/{sessionId}`
    pub fn logout(&mut self) -> SessionResult<()> {
        let session_id = match &self.state {
            SessionState::LoggedIn { session_id, .. }
            | SessionState::JoiningLobby { session_id, .. }
            | SessionState::InGame { session_id, .. } => session_id.clone(),
            other => return Err(SessionError::WrongState(other.clone())),
        };
        let url = format!("{}/api/session/{session_id}", self.base_url);
        self.call("DELETE", &url, None)?;
        self.state = SessionState::Disconnected;
        Ok(())
    }

    /// `POST /game/create-game.php`
    pub fn create_game(&mut self) -> SessionResult<u64> {
        let session_id = self.require_session_id()?;
        let url = format!("{}/game/create-game.php", self.base_url);
        let body = format!(r#"<game sessionId="{session_id}"/>"#);
        let response = self.call("POST", &url, Some(&body))?;
        let parsed: xml::CreateGameResponse = xml::parse_response(&response)?;
        Ok(parsed.game_id)
    }

    /// `POST /game/list-games.php`
    pub fn list_games(&self) -> SessionResult<Vec<GameEntry>> {
        let url = format!("{}/game/list-games.php", self.base_url);
        let response = self.call("POST", &url, None)?;
        let parsed: xml::GamesResponse = xml::parse_response(&response)?;
        Ok(parsed.game)
    }

    /// `POST /game/join-game.php`
    pub fn join_game(&mut self, game_id: u64) -> SessionResult<JoinGameResponse> {
        let (session_id, user_id) = self.require_session()?;
        self.state = SessionState::JoiningLobby { session_id: session_id.clone(), user_id, game_id };
        let url = format!("{}/game/join-game.php", self.base_url);
        let body = format!(r#"<game sessionId="{session_id}" gameId="{game_id}"/>"#);
        let response = self.call("POST", &url, Some(&body))?;
        let parsed: xml::JoinGameResponse = xml::parse_response(&response)?;
        self.state = SessionState::InGame {
            session_id,
            user_id,
            game_id,
            player_no: parsed.player_no,
            server_addr: parsed.server_addr.clone(),
        };
        Ok(parsed)
    }

    /// `POST /game/confirm-player.php` — confirms a peer's `user_id` is a
    /// real, currently-connected account before the joiner dials them directly.
    pub fn confirm_player(&self, game_id: u64, user_id: u64) -> SessionResult<ConfirmPlayerResponse> {
        let (session_id, _) = self.require_session()?;
        let url = format!("{}/game/confirm-player.php", self.base_url);
        let body = format!(r#"<player sessionId="{session_id}" gameId="{game_id}" userId="{user_id}"/>"#);
        let response = self.call("POST", &url, Some(&body))?;
        let parsed: ConfirmPlayerResponse = xml::parse_response(&response)?;
        if !parsed.is_confirmed() {
            warn!(user_id, "rendezvous refused to confirm player");
        }
        Ok(parsed)
    }

    fn require_session_id(&self) -> SessionResult<String> {
        self.require_session().map(|(id, _)| id)
    }

    fn require_session(&self) -> SessionResult<(String, u64)> {
        match &self.state {
            SessionState::LoggedIn { session_id, user_id }
            | SessionState::JoiningLobby { session_id, user_id, .. }
            | SessionState::InGame { session_id, user_id, .. } => Ok((session_id.clone(), *user_id)),
            other => Err(SessionError::WrongState(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_is_disconnected() {
        let client = RendezvousClient::new("http://localhost:9999");
        assert_eq!(*client.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_create_game_before_login_fails() {
        let client = RendezvousClient::new("http://localhost:9999");
        assert!(matches!(client.require_session_id(), Err(SessionError::WrongState(_))));
    }
}
