//! # Sessions
//!
//! Login is delegated to the user's OIDC issuer (their "pod provider").
//!
//! ## Flow
//! 1. `login` discovers the issuer, registers the app under its client name
//!    and returns the authorization URL to send the browser to
//! 2. The issuer redirects back with `?code=..&state=..`
//! 3. `handle_incoming_redirect` trades the code for tokens, the WebID comes
//!    from the ID token's `webid` claim (or `sub`)
//! 4. `client` hands out a [`PodClient`] carrying the access token
//!
//! ## Notes
//! - PKCE (S256) is always used, the app is a public client
//! - Tokens are plain bearer tokens, issuers that insist on DPoP will reject them
//! - `logout` is local only, the issuer session is left alone
use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    client::{PodClient, check_status},
    error::{PodError, Result},
};

const WELL_KNOWN: &str = ".well-known/openid-configuration";
const SCOPES: &str = "openid offline_access webid";

#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub oidc_issuer: String,
    pub redirect_url: Url,
    pub client_name: String,
    /// Skips dynamic registration, e.g. for a Client ID Document URL.
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub is_logged_in: bool,
    pub web_id: Option<String>,
}

impl SessionInfo {
    fn logged_out() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            is_logged_in: false,
            web_id: None,
        }
    }
}

#[derive(Deserialize)]
struct OidcConfiguration {
    authorization_endpoint: String,
    token_endpoint: String,
    registration_endpoint: Option<String>,
}

#[derive(Deserialize)]
struct Registration {
    client_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    sub: String,
    webid: Option<String>,
}

struct PendingLogin {
    client_id: String,
    redirect_url: Url,
    token_endpoint: String,
    state: String,
    code_verifier: SecretString,
}

pub struct Session {
    http: Client,
    info: SessionInfo,
    pending: Option<PendingLogin>,
    token: Option<SecretString>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            info: SessionInfo::logged_out(),
            pending: None,
            token: None,
        }
    }

    /// Session for an access token obtained elsewhere.
    pub fn from_token(web_id: impl Into<String>, token: SecretString) -> Self {
        Self {
            info: SessionInfo {
                is_logged_in: true,
                web_id: Some(web_id.into()),
                ..SessionInfo::logged_out()
            },
            token: Some(token),
            ..Self::new()
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn is_logged_in(&self) -> bool {
        self.info.is_logged_in
    }

    pub fn client(&self) -> Result<PodClient> {
        match &self.token {
            Some(token) => PodClient::with_token(token),
            None => PodClient::anonymous(),
        }
    }

    /// Returns the URL the user has to visit to log in.
    pub async fn login(&mut self, options: LoginOptions) -> Result<Url> {
        let config = self.discover(&options.oidc_issuer).await?;

        let client_id = match options.client_id {
            Some(client_id) => client_id,
            None => self.register(&config, &options).await?,
        };

        let code_verifier = code_verifier();
        let state = Uuid::new_v4().simple().to_string();

        let mut url = Url::parse(&config.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &client_id)
            .append_pair("redirect_uri", options.redirect_url.as_str())
            .append_pair("scope", SCOPES)
            .append_pair("code_challenge", &code_challenge(&code_verifier))
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &state)
            .append_pair("prompt", "consent");

        info!("Starting login at {}", options.oidc_issuer);

        self.pending = Some(PendingLogin {
            client_id,
            redirect_url: options.redirect_url,
            token_endpoint: config.token_endpoint,
            state,
            code_verifier: SecretString::from(code_verifier),
        });

        Ok(url)
    }

    /// Finishes a login from the URL the issuer redirected back to.
    ///
    /// A URL without a `code` leaves the session as it was.
    pub async fn handle_incoming_redirect(&mut self, url: &Url) -> Result<SessionInfo> {
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        if let Some(error) = params.get("error") {
            self.pending = None;
            let description = params.get("error_description").map_or("", String::as_str);
            return Err(PodError::Auth(format!("{error} {description}").trim().to_string()));
        }

        let Some(code) = params.get("code") else {
            debug!("No authorization code in redirect");
            return Ok(self.info.clone());
        };

        let pending = self
            .pending
            .take()
            .ok_or_else(|| PodError::Auth("no login in progress".to_string()))?;

        if params.get("state") != Some(&pending.state) {
            warn!("Login state mismatch, discarding redirect");
            return Err(PodError::Auth("state mismatch".to_string()));
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", pending.redirect_url.as_str()),
            ("client_id", pending.client_id.as_str()),
            ("code_verifier", pending.code_verifier.expose_secret()),
        ];

        let response = self
            .http
            .post(&pending.token_endpoint)
            .form(&form)
            .send()
            .await?;
        let tokens: TokenResponse = check_status("POST", response)?.json().await?;

        let id_token = tokens
            .id_token
            .ok_or_else(|| PodError::Auth("token response has no ID token".to_string()))?;
        let web_id = web_id_from_id_token(&id_token)?;

        info!("Logged in as {web_id}");

        self.token = Some(SecretString::from(tokens.access_token));
        self.info = SessionInfo {
            session_id: self.info.session_id.clone(),
            is_logged_in: true,
            web_id: Some(web_id),
        };

        Ok(self.info.clone())
    }

    pub fn logout(&mut self) {
        if let Some(web_id) = &self.info.web_id {
            info!("Logging out {web_id}");
        }

        self.token = None;
        self.pending = None;
        self.info = SessionInfo::logged_out();
    }

    async fn discover(&self, issuer: &str) -> Result<OidcConfiguration> {
        let url = format!("{}/{WELL_KNOWN}", issuer.trim_end_matches('/'));
        debug!("Discovering issuer at {url}");

        let response = self.http.get(&url).send().await?;

        Ok(check_status("GET", response)?.json().await?)
    }

    async fn register(&self, config: &OidcConfiguration, options: &LoginOptions) -> Result<String> {
        let endpoint = config.registration_endpoint.as_deref().ok_or_else(|| {
            PodError::Auth("issuer does not support dynamic registration".to_string())
        })?;

        let response = self
            .http
            .post(endpoint)
            .json(&json!({
                "client_name": options.client_name,
                "application_type": "web",
                "redirect_uris": [options.redirect_url.as_str()],
                "grant_types": ["authorization_code", "refresh_token"],
                "response_types": ["code"],
                "token_endpoint_auth_method": "none",
                "scope": SCOPES,
            }))
            .send()
            .await?;
        let registration: Registration = check_status("POST", response)?.json().await?;

        debug!("Registered as {}", registration.client_id);

        Ok(registration.client_id)
    }
}

fn code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes)
}

fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Reads the WebID claim without verifying the signature, the token comes
/// straight from the token endpoint.
fn web_id_from_id_token(id_token: &str) -> Result<String> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| PodError::Auth("malformed ID token".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| PodError::Auth(format!("malformed ID token: {e}")))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)?;

    Ok(claims.webid.unwrap_or(claims.sub))
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::{code_challenge, code_verifier, web_id_from_id_token};

    fn id_token(claims: &str) -> String {
        format!("eyJhbGciOiJFUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_web_id_claim() {
        let token = id_token(r#"{"sub":"abc","webid":"https://alice.example/profile/card#me"}"#);

        assert_eq!(
            web_id_from_id_token(&token).unwrap(),
            "https://alice.example/profile/card#me"
        );
    }

    #[test]
    fn test_sub_fallback() {
        let token = id_token(r#"{"sub":"https://bob.example/card#me"}"#);

        assert_eq!(web_id_from_id_token(&token).unwrap(), "https://bob.example/card#me");
    }

    #[test]
    fn test_malformed_token() {
        assert!(web_id_from_id_token("no-dots").is_err());
        assert!(web_id_from_id_token("a.!!!.c").is_err());
    }

    #[test]
    fn test_pkce_rfc7636_vector() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_code_verifier_length() {
        let verifier = code_verifier();

        assert_eq!(verifier.len(), 43);
        assert_ne!(verifier, code_verifier());
    }
}
