use reqwest::{
    Client, Response, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, IF_NONE_MATCH},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{
    dataset::Dataset,
    error::{PodError, Result},
    vocab::TEXT_TURTLE,
};

/// Fetch handle for pod resources, authenticated when built from a token.
#[derive(Clone, Debug)]
pub struct PodClient {
    http: Client,
}

impl PodClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn anonymous() -> Result<Self> {
        Ok(Self::new(Client::builder().build()?))
    }

    pub fn with_token(token: &SecretString) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        Ok(Self::new(
            Client::builder().default_headers(headers).build()?,
        ))
    }

    pub async fn head(&self, url: &Url) -> Result<Response> {
        debug!("HEAD {url}");

        Ok(self.http.head(url.clone()).send().await?)
    }

    pub async fn get_dataset(&self, url: &Url) -> Result<Dataset> {
        debug!("GET {url}");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, TEXT_TURTLE)
            .send()
            .await?;
        let response = check_status("GET", response)?;

        let mut base = response.url().clone();
        base.set_fragment(None);

        let body = response.bytes().await?;

        Dataset::from_turtle(&body, base.as_str())
    }

    /// Replaces the resource at `url` with the full serialization of `dataset`.
    pub async fn save_dataset_at(&self, url: &Url, dataset: &Dataset) -> Result<Dataset> {
        self.put_dataset(url, dataset, false).await
    }

    /// Like `save_dataset_at`, but the server refuses (412) if `url` already exists.
    pub async fn create_dataset_at(&self, url: &Url, dataset: &Dataset) -> Result<Dataset> {
        self.put_dataset(url, dataset, true).await
    }

    async fn put_dataset(&self, url: &Url, dataset: &Dataset, create: bool) -> Result<Dataset> {
        debug!("PUT {url} ({} things)", dataset.len());

        let mut request = self
            .http
            .put(url.clone())
            .header(CONTENT_TYPE, TEXT_TURTLE)
            .body(dataset.to_turtle()?);

        if create {
            request = request.header(IF_NONE_MATCH, "*");
        }

        check_status("PUT", request.send().await?)?;

        Ok(dataset.clone())
    }
}

pub(crate) fn check_status(method: &'static str, response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else {
        Err(PodError::Status {
            method,
            url: response.url().to_string(),
            status,
        })
    }
}
