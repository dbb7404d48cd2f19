//! # Storage Root Discovery
//!
//! Finds the pod a resource lives in by walking up its URL.
//!
//! ## Per Step
//! 1. `HEAD` the URL, a non-2xx status ends the walk with nothing found
//! 2. A `Link: <http://www.w3.org/ns/pim/space#Storage>; rel="type"` header means
//!    this container is the root
//! 3. Otherwise read the resource as Turtle and look for `<url> pim:storage <root>`,
//!    which is how WebID profiles point at their pod
//! 4. Otherwise drop the last path segment and try the parent container
//!
//! The walk stops at `/`, so it takes at most one step per path segment.
//!
//! ## Example
//! ```text
//! https://pod.example/alice/profile/card#me   HEAD 200, no link, no pim:storage
//! https://pod.example/alice/profile/          HEAD 200, no link
//! https://pod.example/alice/                  Link rel="type" pim:Storage -> root
//! ```
use reqwest::{Url, header::LINK};
use tracing::{debug, info};

use crate::{
    auth::Session,
    client::PodClient,
    error::Result,
    link::{has_storage_type, parse},
    vocab::PIM_STORAGE,
};

pub async fn get_pod_root(client: &PodClient, url: &Url) -> Result<Option<Url>> {
    let mut current = url.clone();

    loop {
        if let Some(root) = probe(client, &current).await? {
            info!("Found storage root {root} for {url}");
            return Ok(Some(root));
        }

        match parent_container(&current) {
            Some(parent) => current = parent,
            None => {
                info!("No storage root above {url}");
                return Ok(None);
            }
        }
    }
}

/// Storage root of the logged in user's WebID.
pub async fn get_pod_url(session: &Session) -> Result<Option<Url>> {
    let Some(web_id) = session.info().web_id.as_deref() else {
        return Ok(None);
    };

    let web_id = Url::parse(web_id)?;
    let client = session.client()?;

    get_pod_root(&client, &web_id).await
}

/// Parent container, `None` once the path is `/`.
pub fn parent_container(url: &Url) -> Option<Url> {
    if url.path() == "/" || url.cannot_be_a_base() {
        return None;
    }

    let mut parent = url.clone();
    parent.set_query(None);
    parent.set_fragment(None);

    parent
        .path_segments_mut()
        .ok()?
        .pop_if_empty()
        .pop()
        .push("");

    Some(parent)
}

/// `url` with a trailing slash and without query or fragment.
pub fn as_container(url: &Url) -> Url {
    let mut container = url.clone();
    container.set_query(None);
    container.set_fragment(None);

    if !container.path().ends_with('/') {
        let path = format!("{}/", container.path());
        container.set_path(&path);
    }

    container
}

enum Probe {
    Found(Url),
    Continue,
    Stop,
}

async fn probe(client: &PodClient, url: &Url) -> Result<Option<Url>> {
    match check_headers(client, url).await? {
        Probe::Found(root) => return Ok(Some(root)),
        Probe::Stop => return Ok(None),
        Probe::Continue => {}
    }

    Ok(check_document(client, url).await)
}

async fn check_headers(client: &PodClient, url: &Url) -> Result<Probe> {
    let response = client.head(url).await?;

    if !response.status().is_success() {
        debug!("HEAD {url} returned {}, giving up", response.status());
        return Ok(Probe::Stop);
    }

    let refs: Vec<_> = response
        .headers()
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse)
        .collect();

    if has_storage_type(&refs) {
        return Ok(Probe::Found(as_container(url)));
    }

    Ok(Probe::Continue)
}

async fn check_document(client: &PodClient, url: &Url) -> Option<Url> {
    let dataset = client
        .get_dataset(url)
        .await
        .map_err(|e| debug!("Could not read {url} as a dataset: {e}"))
        .ok()?;

    let storage = dataset.thing(url.as_str())?.url_value(PIM_STORAGE)?;

    Url::parse(storage)
        .map(|storage| as_container(&storage))
        .map_err(|e| debug!("Ignoring malformed pim:storage {storage}: {e}"))
        .ok()
}
