use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use pod::Url;
use secrecy::SecretString;
use tracing::{info, warn};

use crate::error::AppError;

pub struct Config {
    pub port: u16,
    pub app_url: Url,
    pub oidc_issuer: String,
    pub client_name: String,
    pub client_id: Option<String>,
    pub contacts_path: String,
    pub web_id: Option<String>,
    pub access_token: Option<SecretString>,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let port: u16 = try_load("RUST_PORT", "1111")?;
        let app_url = try_load("APP_URL", &format!("http://localhost:{port}"))?;

        Ok(Self {
            port,
            app_url,
            oidc_issuer: try_load("OIDC_ISSUER", "https://login.inrupt.com")?,
            client_name: try_load("CLIENT_NAME", "Solid Contacts")?,
            client_id: var("CLIENT_ID").ok(),
            contacts_path: try_load("CONTACTS_PATH", "vCardContacts/example.ttl")?,
            web_id: var("POD_WEB_ID").ok(),
            access_token: read_secret("POD_ACCESS_TOKEN").map(SecretString::from),
        })
    }

    /// Where the issuer sends the browser back to.
    pub fn redirect_url(&self, path: &str) -> Result<Url, AppError> {
        self.app_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid redirect path {path}: {e}")))
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("Invalid {key} value: {e}"))
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("No {secret_name} secret: {e}");
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{Config, try_load};

    #[test]
    fn test_default_used_when_unset() {
        let port: u16 = try_load("CONTACTS_TEST_UNSET_PORT", "2222").unwrap();

        assert_eq!(port, 2222);
    }

    #[test]
    fn test_invalid_default_is_an_error() {
        assert!(try_load::<u16>("CONTACTS_TEST_UNSET_PORT", "not a port").is_err());
    }

    #[test]
    fn test_redirect_url() {
        let config = Config {
            port: 1111,
            app_url: "http://localhost:1111".parse().unwrap(),
            oidc_issuer: "https://login.inrupt.com".to_string(),
            client_name: "Solid Contacts".to_string(),
            client_id: None,
            contacts_path: "vCardContacts/example.ttl".to_string(),
            web_id: None,
            access_token: None,
        };

        assert_eq!(
            config.redirect_url("/app").unwrap().as_str(),
            "http://localhost:1111/app"
        );
    }
}
