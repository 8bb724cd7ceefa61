use std::rc::Rc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::http::{Method, Request, Transport};
use super::types::{
    Credentials, EarnRequest, Invite, InviterScore, LeaderboardEntry, PowerUp, Registration,
    TokenResponse, UserPowerUp, UserPowerUpId, UserProfile,
};
use super::ApiError;
use crate::story::{LevelId, Scenario, Story, StoryId};

/// Percent-encode one path segment, leaving only RFC 3986 unreserved bytes as-is.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Typed access to the game backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        ApiClient { transport }
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<T, ApiError> {
        let text = self.call_raw(method, path, token, body)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn call_raw(
        &self,
        method: Method,
        path: String,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        debug!("{:?} {}", method, path);
        let request = Request {
            method,
            path,
            bearer: token.map(str::to_string),
            body,
        };
        let response = self.transport.send(&request)?;
        match response.status {
            200..=299 => Ok(response.body),
            401 | 403 => Err(ApiError::Unauthorized),
            code => Err(ApiError::Status {
                code,
                reason: response.reason,
            }),
        }
    }

    fn json<B: Serialize>(body: &B) -> Result<Option<String>, ApiError> {
        Ok(Some(serde_json::to_string(body)?))
    }

    pub fn story(&self, id: StoryId) -> Result<Story, ApiError> {
        self.call(Method::Get, format!("/stories/{id}"), None, None)
    }

    pub fn level_scenarios(&self, story: StoryId, level: LevelId) -> Result<Vec<Scenario>, ApiError> {
        self.call(
            Method::Get,
            format!("/stories/{story}/levels/{level}/scenarios"),
            None,
            None,
        )
    }

    pub fn top_scores(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.call(Method::Get, "/leaderboard/top-scores".into(), None, None)
    }

    pub fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.call(Method::Get, "/accounts/user".into(), Some(token), None)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let body = Self::json(credentials)?;
        let resp: TokenResponse =
            self.call(Method::Post, "/accounts/login-user".into(), None, body)?;
        Ok(resp.token)
    }

    pub fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let body = Self::json(registration)?;
        let resp: TokenResponse = self.call(Method::Post, "/accounts/register".into(), None, body)?;
        Ok(resp.token)
    }

    pub fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.call_raw(Method::Post, "/accounts/logout".into(), Some(token), None)
            .map(|_| ())
    }

    pub fn inviter_score(&self, invite_token: &str) -> Result<InviterScore, ApiError> {
        self.call(
            Method::Get,
            format!("/game/invites/{}/inviter-score", encode_segment(invite_token)),
            None,
            None,
        )
    }

    pub fn create_invite(&self, token: &str) -> Result<Invite, ApiError> {
        self.call(Method::Post, "/game/invites".into(), Some(token), None)
    }

    pub fn story_power_ups(&self, story: StoryId, token: &str) -> Result<Vec<PowerUp>, ApiError> {
        self.call(
            Method::Get,
            format!("/game/power-ups/by-story/{story}"),
            Some(token),
            None,
        )
    }

    pub fn active_power_ups(&self, token: &str) -> Result<Vec<UserPowerUp>, ApiError> {
        self.call(
            Method::Get,
            "/game/user-power-ups/active".into(),
            Some(token),
            None,
        )
    }

    pub fn earn_power_up(&self, power_up: &PowerUp, token: &str) -> Result<UserPowerUp, ApiError> {
        let body = Self::json(&EarnRequest {
            power_up_id: power_up.id,
        })?;
        self.call(
            Method::Post,
            "/game/user-power-ups/earn".into(),
            Some(token),
            body,
        )
    }

    pub fn use_power_up(&self, id: UserPowerUpId, token: &str) -> Result<(), ApiError> {
        self.call_raw(
            Method::Post,
            format!("/game/user-power-ups/{id}/use"),
            Some(token),
            None,
        )
        .map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::http::Response;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request it was given.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub responses: RefCell<VecDeque<Result<Response, ApiError>>>,
        pub requests: RefCell<Vec<Request>>,
    }

    impl ScriptedTransport {
        pub fn reply(&self, status: u16, body: &str) {
            self.responses.borrow_mut().push_back(Ok(Response {
                status,
                reason: String::new(),
                body: body.to_string(),
            }));
        }

        pub fn fail(&self) {
            self.responses.borrow_mut().push_back(Err(ApiError::Io(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            )));
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &Request) -> Result<Response, ApiError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Malformed("no scripted response".into())))
        }
    }

    pub(crate) fn scripted() -> (Rc<ScriptedTransport>, ApiClient) {
        let transport = Rc::new(ScriptedTransport::default());
        let client = ApiClient::new(transport.clone());
        (transport, client)
    }

    #[test]
    fn fetches_scenarios_for_level() {
        let (transport, client) = scripted();
        transport.reply(
            200,
            r#"[{"id": 1, "description": "Is this photo real?", "actions": [
                {"id": 5, "text": "Reverse image search", "is_correct": true, "points": 3}
            ]}]"#,
        );

        let scenarios = client.level_scenarios(2, 9).unwrap();
        assert_eq!(scenarios[0].actions[0].points, 3);
        assert_eq!(
            transport.requests.borrow()[0].path,
            "/stories/2/levels/9/scenarios"
        );
    }

    #[test]
    fn login_posts_credentials_and_returns_token() {
        let (transport, client) = scripted();
        transport.reply(200, r#"{"token": "t0k"}"#);

        let token = client
            .login(&Credentials {
                username: "ada".into(),
                password: "pw".into(),
            })
            .unwrap();
        assert_eq!(token, "t0k");

        let req = &transport.requests.borrow()[0];
        assert_eq!(req.method, Method::Post);
        assert!(req.body.as_deref().unwrap().contains("\"username\":\"ada\""));
        assert!(req.bearer.is_none());
    }

    #[test]
    fn unauthorized_status_maps_to_unauthorized() {
        let (transport, client) = scripted();
        transport.reply(401, r#"{"detail": "Invalid token."}"#);

        let err = client.current_user("stale").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(
            transport.requests.borrow()[0].bearer.as_deref(),
            Some("stale")
        );
    }

    #[test]
    fn server_error_keeps_status() {
        let (transport, client) = scripted();
        transport.reply(500, "oops");

        let err = client.top_scores().unwrap_err();
        assert!(matches!(err, ApiError::Status { code: 500, .. }));
    }

    #[test]
    fn bad_json_is_a_decode_error() {
        let (transport, client) = scripted();
        transport.reply(200, "<html>");

        assert!(matches!(client.story(1).unwrap_err(), ApiError::Decode(_)));
    }

    #[test]
    fn invite_token_is_percent_encoded() {
        let (transport, client) = scripted();
        transport.reply(200, r#"{"username": "ada", "highest_score": 12}"#);

        let score = client.inviter_score("ab/c d?é").unwrap();
        assert_eq!(score.highest_score, 12);
        assert_eq!(
            transport.requests.borrow()[0].path,
            "/game/invites/ab%2Fc%20d%3F%C3%A9/inviter-score"
        );
        assert_eq!(encode_segment("Abc-1_2.3~"), "Abc-1_2.3~");
    }

    #[test]
    fn use_power_up_ignores_body() {
        let (transport, client) = scripted();
        transport.reply(204, "");

        client.use_power_up(42, "tok").unwrap();
        assert_eq!(
            transport.requests.borrow()[0].path,
            "/game/user-power-ups/42/use"
        );
    }
}
