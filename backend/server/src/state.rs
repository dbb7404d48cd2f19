use std::sync::Arc;

use pod::Session;
use tokio::sync::RwLock;
use tracing::info;

use super::{config::Config, contacts::ContactBook, error::AppError};

pub struct AppState {
    pub config: Config,
    pub session: RwLock<Session>,
    pub book: ContactBook,
}

impl AppState {
    pub fn new() -> Result<Arc<Self>, AppError> {
        Ok(Self::with_config(Config::load()?))
    }

    /// Restores a session from `POD_WEB_ID` and the `POD_ACCESS_TOKEN` secret when both are set.
    pub fn with_config(mut config: Config) -> Arc<Self> {
        let session = match (config.web_id.clone(), config.access_token.take()) {
            (Some(web_id), Some(token)) => {
                info!("Restoring session for {web_id}");
                Session::from_token(web_id, token)
            }
            _ => Session::new(),
        };

        Arc::new(Self {
            config,
            session: RwLock::new(session),
            book: ContactBook::new(),
        })
    }
}
