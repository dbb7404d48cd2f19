//! Backend for a Solid contacts manager.
//!
//! The browser UI never talks to the pod directly, it talks to this server which
//! holds the login session and a mirror of the user's contacts.
//!
//!
//!
//! # Flow
//! - `GET /login` sends the user to their pod provider
//! - The provider redirects back to `GET /app`, we find their pod and load `vCardContacts/example.ttl`
//! - The UI reads `GET /contacts` or follows `GET /contacts/stream` for live updates
//! - Writes go through `POST/PUT/DELETE /contacts`, each one saves the whole resource
//! - `POST /logout` drops the session and the mirror
//!
//!
//!
//! # Configuration
//!
//! | Variable           | Default                     |
//! |--------------------|-----------------------------|
//! | `RUST_PORT`        | `1111`                      |
//! | `APP_URL`          | `http://localhost:<port>`   |
//! | `OIDC_ISSUER`      | `https://login.inrupt.com`  |
//! | `CLIENT_NAME`      | `Solid Contacts`            |
//! | `CLIENT_ID`        | none, registers dynamically |
//! | `CONTACTS_PATH`    | `vCardContacts/example.ttl` |
//! | `POD_WEB_ID`       | none                        |
//!
//! `POD_ACCESS_TOKEN` is read from `/run/secrets`, together with `POD_WEB_ID` it
//! restores a session at startup.
//!
//!
//!
//! # Setup
//!
//! Run locally with debug logs.
//! ```sh
//! RUST_LOG=debug cargo run --bin contacts
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod contacts;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    bind_contacts, complete_login_handler, contacts_handler, contacts_stream_handler,
    create_contact_handler, edit_contact_handler, empty_contact_handler, login_handler,
    logout_handler, refresh_handler, remove_contacts_handler, session_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", get(login_handler))
        .route("/app", get(complete_login_handler))
        .route("/logout", post(logout_handler))
        .route("/session", get(session_handler))
        .route(
            "/contacts",
            get(contacts_handler)
                .post(create_contact_handler)
                .delete(remove_contacts_handler),
        )
        .route("/contacts/empty", get(empty_contact_handler))
        .route("/contacts/stream", get(contacts_stream_handler))
        .route("/contacts/refresh", post(refresh_handler))
        .route("/contacts/{key}", put(edit_contact_handler))
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new()?;

    if state.session.read().await.is_logged_in() {
        match bind_contacts(&state).await {
            Ok(Some(contacts_url)) => info!("Loaded contacts from {contacts_url}"),
            Ok(None) => warn!("Restored session has no pod"),
            Err(e) => warn!("Failed to load contacts for restored session: {e}"),
        }
    }

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin([state
            .config
            .app_url
            .origin()
            .ascii_serialization()
            .parse::<HeaderValue>()?])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let address = format!("0.0.0.0:{}", state.config.port);
    let router = app(state).layer(cors);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
