// dashboard/tests/support/mod.rs
#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webnok_dashboard::{
    AuthenticatedFetcher, KeyValueStore, MemoryStore, SessionStore, StorageError,
};

const BACKEND_SECRET: &[u8] = b"backend-secret";

/// A request as the fake backend saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    body: String,
    delay: Duration,
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(String, String), Scripted>,
    requests: Vec<RecordedRequest>,
}

type SharedScript = Arc<Mutex<Script>>;

async fn scripted_response(
    req: HttpRequest,
    body: web::Bytes,
    script: web::Data<SharedScript>,
) -> HttpResponse {
    let route = {
        let mut script = script.lock().unwrap();
        script.requests.push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_string(),
            authorization: req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: String::from_utf8_lossy(&body).to_string(),
        });
        script
            .routes
            .get(&(req.method().to_string(), req.path().to_string()))
            .cloned()
    };

    match route {
        Some(route) => {
            if !route.delay.is_zero() {
                tokio::time::sleep(route.delay).await;
            }
            HttpResponse::build(StatusCode::from_u16(route.status).unwrap())
                .content_type("application/json")
                .body(route.body)
        }
        None => HttpResponse::NotFound().finish(),
    }
}

/// Backend stand-in with per-route scripted responses, bound to a random port
pub struct FakeBackend {
    pub base_url: String,
    script: SharedScript,
    handle: ServerHandle,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let script = SharedScript::default();
        let data = web::Data::new(script.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(scripted_response))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            script,
            handle,
        }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.respond_after(method, path, status, body, Duration::ZERO);
    }

    pub fn respond_after(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: impl Into<String>,
        delay: Duration,
    ) {
        self.script.lock().unwrap().routes.insert(
            (method.to_string(), path.to_string()),
            Scripted {
                status,
                body: body.into(),
                delay,
            },
        );
    }

    pub fn json(&self, path: &str, body: Value) {
        self.respond("GET", path, 200, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Sign claims the way the backend would
pub fn token(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(BACKEND_SECRET)).unwrap()
}

pub fn client_token(sub: &str, role: &str) -> String {
    token(json!({ "sub": sub, "role": role, "exp": 4_000_000_000u64 }))
}

/// Memory store that counts how often the session keys were cleared
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    clears: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.inner.set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_many(keys)
    }
}

pub fn memory_session() -> (SessionStore, MemoryStore) {
    let storage = MemoryStore::new();
    (SessionStore::new(Arc::new(storage.clone())), storage)
}

pub fn fetcher_for(backend: &FakeBackend, session: &SessionStore) -> AuthenticatedFetcher {
    AuthenticatedFetcher::new(backend.base_url.clone(), session.clone())
}

/// Base URL nothing listens on
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
