use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    response::{
        IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, stream};
use pod::{Contact, LoginOptions, SessionInfo, Url, get_pod_url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::AppError, state::AppState};

pub const HOME_PATH: &str = "/";
pub const APP_PATH: &str = "/app";

#[derive(Deserialize)]
pub struct LoginQuery {
    issuer: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub info: SessionInfo,
    pub contacts_url: Option<String>,
}

/// Sends the browser to the issuer, or straight to the app when already logged in.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.write().await;

    if session.is_logged_in() {
        return Ok(Redirect::to(APP_PATH));
    }

    let authorize = session
        .login(LoginOptions {
            oidc_issuer: query
                .issuer
                .unwrap_or_else(|| state.config.oidc_issuer.clone()),
            redirect_url: state.config.redirect_url(APP_PATH)?,
            client_name: state.config.client_name.clone(),
            client_id: state.config.client_id.clone(),
        })
        .await?;

    Ok(Redirect::to(authorize.as_str()))
}

/// The issuer redirects here after login.
pub async fn complete_login_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    let url = state.config.redirect_url(&uri.to_string())?;

    let info = state
        .session
        .write()
        .await
        .handle_incoming_redirect(&url)
        .await?;

    if !info.is_logged_in {
        info!("Not logged in, back to {HOME_PATH}");
        return Ok(Redirect::to(HOME_PATH).into_response());
    }

    match bind_contacts(&state).await? {
        Some(contacts_url) => Ok(Json(SessionView {
            info,
            contacts_url: Some(contacts_url.to_string()),
        })
        .into_response()),
        None => Ok(Redirect::to(HOME_PATH).into_response()),
    }
}

pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.write().await.logout();
    state.book.unbind().await;

    Redirect::to(HOME_PATH)
}

pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let info = state.session.read().await.info().clone();
    let contacts_url = state.book.contacts_url().await.map(String::from);

    Json(SessionView { info, contacts_url })
}

pub async fn contacts_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Contact>> {
    Json(state.book.store().get())
}

pub async fn empty_contact_handler() -> Json<Contact> {
    Json(Contact::empty())
}

pub async fn contacts_stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.book.store().subscribe();
    receiver.mark_changed();

    let events = stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let contacts = receiver.borrow_and_update().clone();

        let event = Event::default()
            .json_data(&contacts)
            .map_err(|e| warn!("Failed to encode contacts: {e}"))
            .ok()?;

        Some((Ok::<_, Infallible>(event), receiver))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Contact>>, AppError> {
    state.book.refresh_contacts_state().await?;

    Ok(Json(state.book.store().get()))
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    Json(contact): Json<Contact>,
) -> Result<Json<Vec<Contact>>, AppError> {
    state.book.create_contact_in_pod(&contact).await?;

    Ok(Json(state.book.store().get()))
}

pub async fn edit_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<usize>,
    Json(contact): Json<Contact>,
) -> Result<Json<Vec<Contact>>, AppError> {
    state.book.edit_contact_in_pod(key, &contact).await?;

    Ok(Json(state.book.store().get()))
}

pub async fn remove_contacts_handler(
    State(state): State<Arc<AppState>>,
    Json(keys): Json<Vec<usize>>,
) -> Result<Json<Vec<Contact>>, AppError> {
    state.book.remove_contacts_in_pod(&keys).await?;

    Ok(Json(state.book.store().get()))
}

/// Resolves the logged in user's pod and loads their contacts from it.
pub async fn bind_contacts(state: &AppState) -> Result<Option<Url>, AppError> {
    let (client, pod_url) = {
        let session = state.session.read().await;

        if !session.is_logged_in() {
            return Err(AppError::NotLoggedIn);
        }

        (session.client()?, get_pod_url(&session).await?)
    };

    let Some(pod_url) = pod_url else {
        warn!("No pod found for the logged in user");
        return Ok(None);
    };

    let contacts_url = state
        .book
        .bind(client, &pod_url, &state.config.contacts_path)
        .await?;

    Ok(Some(contacts_url))
}
