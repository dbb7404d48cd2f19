use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use axum::{
    Router,
    body::Bytes,
    Json,
    extract::State,
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, IF_NONE_MATCH, LINK},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const CONTACTS_PATH: &str = "vCardContacts/example.ttl";

pub const CLIENT_ID: &str = "contacts-app";

/// A pod whose root is `/`, with a WebID at `/profile/card#me` and a single
/// writable resource at `/vCardContacts/example.ttl`. It doubles as the OIDC
/// issuer, up to client registration.
#[derive(Default)]
pub struct MockPod {
    pub base: String,
    pub contacts: Mutex<Option<String>>,
    pub puts: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MockPod {
    pub async fn start() -> Arc<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let pod = Arc::new(Self {
            base: format!("http://{}", listener.local_addr().unwrap()),
            ..Self::default()
        });

        let app = Router::new()
            .route("/", get(root))
            .route("/profile/", get(empty))
            .route("/profile/card", get(card))
            .route("/vCardContacts/example.ttl", get(read).put(write))
            .route("/.well-known/openid-configuration", get(openid_configuration))
            .route("/register", post(register))
            .with_state(pod.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        pod
    }

    pub fn web_id(&self) -> String {
        format!("{}/profile/card#me", self.base)
    }

    pub fn contacts_url(&self) -> String {
        format!("{}/{CONTACTS_PATH}", self.base)
    }

    pub fn set_contacts(&self, body: &str) {
        *self.contacts.lock().unwrap() = Some(body.to_string());
    }

    pub fn stored(&self) -> Option<String> {
        self.contacts.lock().unwrap().clone()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }
}

async fn root() -> impl IntoResponse {
    (
        [(LINK, r#"<http://www.w3.org/ns/pim/space#Storage>; rel="type""#)],
        "",
    )
}

async fn empty() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/turtle")], "")
}

async fn card() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/turtle")],
        "<#me> a <http://xmlns.com/foaf/0.1/Person> .",
    )
}

async fn read(State(pod): State<Arc<MockPod>>) -> Response {
    if pod.fail_reads.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match pod.stored() {
        Some(body) => ([(CONTENT_TYPE, "text/turtle")], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn write(State(pod): State<Arc<MockPod>>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if pod.fail_writes.load(Ordering::SeqCst) {
        return StatusCode::FORBIDDEN;
    }

    if headers.contains_key(IF_NONE_MATCH) && pod.stored().is_some() {
        return StatusCode::PRECONDITION_FAILED;
    }

    pod.puts.fetch_add(1, Ordering::SeqCst);
    *pod.contacts.lock().unwrap() = Some(String::from_utf8_lossy(&body).into_owned());

    StatusCode::CREATED
}

async fn openid_configuration(State(pod): State<Arc<MockPod>>) -> Json<Value> {
    Json(json!({
        "issuer": pod.base,
        "authorization_endpoint": format!("{}/authorize", pod.base),
        "token_endpoint": format!("{}/token", pod.base),
        "registration_endpoint": format!("{}/register", pod.base),
    }))
}

async fn register() -> Json<Value> {
    Json(json!({ "client_id": CLIENT_ID }))
}
