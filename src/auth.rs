//! User-management client
//!
//! Validates credentials, encodes requests as a urlencoded `{action, info}`
//! form and decodes the backend's JSON reply. The browser transport posts
//! through `fetch`; the sign-in state is mirrored into session storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform;

/// Session storage key holding the signed-in session JSON
pub const SESSION_KEY: &str = "signedIn";

const USERNAME_LEN: (usize, usize) = (4, 25);
const PASSWORD_LEN: (usize, usize) = (8, 64);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username must be {min}-{max} letters, digits, '_' or '.'", min = USERNAME_LEN.0, max = USERNAME_LEN.1)]
    InvalidUsername,
    #[error("password must be {min}-{max} letters, digits or _!@#$%^&*", min = PASSWORD_LEN.0, max = PASSWORD_LEN.1)]
    InvalidPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthAction {
    #[serde(rename = "sign-in")]
    SignIn,
    #[serde(rename = "sign-up")]
    SignUp,
    #[serde(rename = "password-reset")]
    PasswordReset,
    #[serde(rename = "check_session")]
    CheckSession,
    #[serde(rename = "sign-out")]
    SignOut,
}

impl AuthAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "sign-in",
            AuthAction::SignUp => "sign-up",
            AuthAction::PasswordReset => "password-reset",
            AuthAction::CheckSession => "check_session",
            AuthAction::SignOut => "sign-out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sign-in" => Some(AuthAction::SignIn),
            "sign-up" => Some(AuthAction::SignUp),
            "password-reset" => Some(AuthAction::PasswordReset),
            "check_session" => Some(AuthAction::CheckSession),
            "sign-out" => Some(AuthAction::SignOut),
            _ => None,
        }
    }

    /// Whether the action carries credentials
    pub fn needs_credentials(&self) -> bool {
        matches!(
            self,
            AuthAction::SignIn | AuthAction::SignUp | AuthAction::PasswordReset
        )
    }

    /// Sign-up asks for the password twice
    pub fn needs_confirmation(&self) -> bool {
        *self == AuthAction::SignUp
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "Requesting sign in...",
            AuthAction::SignUp => "Requesting sign up...",
            AuthAction::PasswordReset => "Requesting password reset...",
            AuthAction::CheckSession => "Requesting session data...",
            AuthAction::SignOut => "Requesting sign out...",
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn len_in(s: &str, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&s.chars().count())
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if len_in(username, USERNAME_LEN) && username.chars().all(|c| is_word_char(c) || c == '.') {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername)
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let allowed = |c: char| is_word_char(c) || "!@#$%^&*".contains(c);
    if len_in(password, PASSWORD_LEN)
        && password.chars().all(allowed)
        && password.chars().any(is_word_char)
    {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Trim and validate form input. `confirmation` is only present on sign-up.
    pub fn validated(
        username: &str,
        password: &str,
        confirmation: Option<&str>,
    ) -> Result<Self, AuthError> {
        let username = username.trim();
        let password = password.trim();
        validate_username(username)?;
        validate_password(password)?;

        if let Some(confirmation) = confirmation.map(str::trim) {
            validate_password(confirmation)?;
            if confirmation != password {
                return Err(AuthError::PasswordMismatch);
            }
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub action: AuthAction,
    pub credentials: Option<Credentials>,
}

impl AuthRequest {
    pub fn new(action: AuthAction, credentials: Credentials) -> Self {
        Self {
            action,
            credentials: Some(credentials),
        }
    }

    pub fn check_session() -> Self {
        Self {
            action: AuthAction::CheckSession,
            credentials: None,
        }
    }

    pub fn sign_out() -> Self {
        Self {
            action: AuthAction::SignOut,
            credentials: None,
        }
    }

    /// Request for a submitted auth form. Only sign-up reads the confirmation.
    pub fn from_form(
        action: AuthAction,
        username: &str,
        password: &str,
        confirmation: Option<&str>,
    ) -> Result<Self, AuthError> {
        if !action.needs_credentials() {
            return Ok(Self {
                action,
                credentials: None,
            });
        }
        let confirmation = confirmation.filter(|_| action.needs_confirmation());
        let credentials = Credentials::validated(username, password, confirmation)?;
        Ok(Self::new(action, credentials))
    }

    /// Form fields in posting order: `info` (JSON, `{}` without credentials) and `action`
    pub fn form_fields(&self) -> Result<[(&'static str, String); 2], AuthError> {
        let info = match &self.credentials {
            Some(credentials) => serde_json::to_string(credentials).map_err(AuthError::Encode)?,
            None => "{}".to_string(),
        };
        Ok([("info", info), ("action", self.action.as_str().to_string())])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub level: serde_json::Value,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub signed_in: bool,
    #[serde(default)]
    pub session: Option<SessionInfo>,
    #[serde(rename = "exit-reason", default)]
    pub exit_reason: String,
    #[serde(rename = "server-message", default)]
    pub server_message: String,
}

/// What the client should do with its stored session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// Store this session JSON
    SignedIn(String),
    SignedOut,
    Unchanged,
}

impl AuthResponse {
    pub fn parse(text: &str) -> Result<Self, AuthError> {
        serde_json::from_str(text).map_err(AuthError::Decode)
    }

    pub fn session_change(&self, action: AuthAction) -> SessionChange {
        if self.signed_in {
            let json = serde_json::to_string(&self.session).unwrap_or_else(|_| "null".to_string());
            SessionChange::SignedIn(json)
        } else if action == AuthAction::SignOut {
            SessionChange::SignedOut
        } else {
            SessionChange::Unchanged
        }
    }
}

/// Mirror a session change into session storage
pub fn apply_session_change(change: &SessionChange) {
    match change {
        SessionChange::SignedIn(json) => {
            platform::session_storage_set(SESSION_KEY, json);
        }
        SessionChange::SignedOut => platform::session_storage_remove(SESSION_KEY),
        SessionChange::Unchanged => {}
    }
}

/// Whether a signed-in session is stored
pub fn is_signed_in() -> bool {
    platform::session_storage_get(SESSION_KEY).is_some()
}

/// Talks to the user-management endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    endpoint: String,
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENDPOINT)
    }
}

impl AuthClient {
    pub const DEFAULT_ENDPOINT: &'static str = "php/process.php";

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a request, update the stored session and return the reply.
    /// Failures are logged and swallowed.
    #[cfg(target_arch = "wasm32")]
    pub async fn request(&self, request: &AuthRequest) -> Option<AuthResponse> {
        log::info!("{}", request.action.progress_message());
        match self.send(request).await {
            Ok(response) => {
                log::info!(
                    "Auth response: {} ({})",
                    response.exit_reason,
                    response.server_message
                );
                apply_session_change(&response.session_change(request.action));
                Some(response)
            }
            Err(e) => {
                log::error!("Auth request {} failed: {}", request.action.as_str(), e);
                None
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn send(&self, request: &AuthRequest) -> Result<AuthResponse, AuthError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response, UrlSearchParams};

        let js_err = |e: wasm_bindgen::JsValue| AuthError::Transport(format!("{e:?}"));

        let params = UrlSearchParams::new().map_err(js_err)?;
        for (name, value) in request.form_fields()? {
            params.append(name, &value);
        }

        let headers = Headers::new().map_err(js_err)?;
        headers
            .set("Content-Type", "application/x-www-form-urlencoded")
            .map_err(js_err)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_headers(&headers.into());
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_body(&params.into());

        let req = Request::new_with_str_and_init(&self.endpoint, &opts).map_err(js_err)?;
        let window = web_sys::window().ok_or_else(|| AuthError::Transport("no window".into()))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| AuthError::Transport("not a Response".into()))?;

        if !resp.ok() {
            return Err(AuthError::Transport(format!("HTTP {}", resp.status())));
        }

        let text = JsFuture::from(resp.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .ok_or_else(|| AuthError::Transport("response body is not text".into()))?;
        AuthResponse::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("abcd").is_ok());
        assert!(validate_username("john.doe_42").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username(&"a".repeat(26)).is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("dash-ed").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("hunter22").is_ok());
        assert!(validate_password("p@ss!word").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("!@#$%^&*").is_err()); // no word character
        assert!(validate_password("with space1").is_err());
        assert!(validate_password(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_credentials_trim_and_confirm() {
        let c = Credentials::validated("  player_1 ", " secret123 ", Some("secret123")).unwrap();
        assert_eq!(c.username, "player_1");
        assert_eq!(c.password, "secret123");

        assert!(matches!(
            Credentials::validated("player_1", "secret123", Some("secret124")),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            Credentials::validated("pl", "secret123", None),
            Err(AuthError::InvalidUsername)
        ));
    }

    #[test]
    fn test_form_fields() {
        let creds = Credentials::validated("player_1", "secret123", None).unwrap();
        let [info, action] = AuthRequest::new(AuthAction::SignIn, creds).form_fields().unwrap();
        assert_eq!(info, ("info", r#"{"username":"player_1","password":"secret123"}"#.to_string()));
        assert_eq!(action, ("action", "sign-in".to_string()));

        let [info, action] = AuthRequest::check_session().form_fields().unwrap();
        assert_eq!(info.1, "{}");
        assert_eq!(action.1, "check_session");
    }

    #[test]
    fn test_action_names_round_trip_serde() {
        for action in [
            AuthAction::SignIn,
            AuthAction::SignUp,
            AuthAction::PasswordReset,
            AuthAction::CheckSession,
            AuthAction::SignOut,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
            assert_eq!(AuthAction::from_str(action.as_str()), Some(action));
        }
        assert!(AuthAction::SignUp.needs_credentials());
        assert!(!AuthAction::SignOut.needs_credentials());
    }

    #[test]
    fn test_request_from_form() {
        // A stale confirmation field is ignored outside sign-up
        let sign_in =
            AuthRequest::from_form(AuthAction::SignIn, " player_1 ", "hunter2!x", Some("other")).unwrap();
        assert_eq!(sign_in.action, AuthAction::SignIn);
        assert_eq!(
            sign_in.credentials.as_ref().map(|c| c.username.as_str()),
            Some("player_1")
        );

        assert!(matches!(
            AuthRequest::from_form(AuthAction::SignUp, "player_1", "hunter2!x", Some("hunter3!x")),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(AuthRequest::from_form(AuthAction::SignUp, "player_1", "hunter2!x", Some("hunter2!x")).is_ok());

        let sign_out = AuthRequest::from_form(AuthAction::SignOut, "", "", None).unwrap();
        assert_eq!(sign_out, AuthRequest::sign_out());
        assert!(AuthAction::SignUp.needs_confirmation());
        assert!(!AuthAction::PasswordReset.needs_confirmation());
    }

    #[test]
    fn test_parse_signed_in_response() {
        let text = r#"{"success":true,"signed_in":true,"session":{"level":1,"user":"player_1"},
            "exit-reason":"Credentials correct","server-message":"ok"}"#;
        let resp = AuthResponse::parse(text).unwrap();
        assert!(resp.signed_in);
        assert_eq!(resp.exit_reason, "Credentials correct");
        assert_eq!(resp.session.as_ref().map(|s| s.user.as_str()), Some("player_1"));

        match resp.session_change(AuthAction::SignIn) {
            SessionChange::SignedIn(json) => assert!(json.contains("player_1")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sign_out_response_clears_session() {
        let text = r#"{"success":true,"signed_in":false,"session":null,"exit-reason":"Signout succesfull","server-message":""}"#;
        let resp = AuthResponse::parse(text).unwrap();
        assert_eq!(resp.session_change(AuthAction::SignOut), SessionChange::SignedOut);
        assert_eq!(resp.session_change(AuthAction::SignIn), SessionChange::Unchanged);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(AuthResponse::parse("<html>"), Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_native_session_storage_is_empty() {
        #[cfg(not(target_arch = "wasm32"))]
        {
            apply_session_change(&SessionChange::SignedIn("{}".to_string()));
            assert!(!is_signed_in());
        }
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(AuthClient::default().endpoint(), "php/process.php");
    }
}
