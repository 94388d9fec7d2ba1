//! In-process portal backend for integration tests. Each test gets its own
//! server on a free port with fresh seed data. It enforces the same role,
//! authorship and routing rules the real backend does, so the client's local
//! checks can be exercised against a second opinion.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use court_reports::client::HttpStore;
use court_reports::config::{AppConfig, SessionConfig};
use court_reports::service::ReportService;

pub const SECRET: &str = "mock-backend-secret";
pub const PASSWORD: &str = "passw0rd";

pub const CLERK: &str = "mdolo";
pub const OTHER_CLERK: &str = "jflomo";
pub const ADMIN: &str = "admin";
pub const CHIEF: &str = "chief";
pub const COURT: &str = "Sanniquellie";
pub const OTHER_COURT: &str = "Ganta";

#[derive(Debug, Clone)]
struct User {
    id: String,
    username: String,
    role: &'static str,
    court: Option<String>,
}

#[derive(Debug, Default)]
struct Store {
    users: Vec<User>,
    courts: Vec<(String, String)>,
    records: HashMap<String, Vec<Value>>,
    uploads: u32,
    /// `METHOD /path` of every authenticated request, in arrival order
    calls: Vec<String>,
    refuse_saves: bool,
}

type Shared = Arc<Mutex<Store>>;

pub struct MockBackend {
    pub base_url: String,
    store: Shared,
}

impl MockBackend {
    pub async fn spawn() -> Result<Self> {
        let store: Shared = Arc::new(Mutex::new(seed()));

        let app = Router::new()
            .route("/api/:collection/upload", post(upload))
            .fallback(dispatch)
            .layer(TraceLayer::new_for_http())
            .with_state(store.clone());

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            store,
        })
    }

    pub fn store(&self) -> Result<HttpStore> {
        Ok(HttpStore::with_base_url(&self.base_url, &AppConfig::from_env().api)?)
    }

    /// Logs `username` in through the backend and returns a ready service.
    /// Reviewers get `court` selected; clerks are bound to their own.
    pub async fn login(&self, username: &str, court: Option<&str>) -> Result<ReportService<HttpStore>> {
        let mut service = ReportService::login(self.store()?, username, PASSWORD, &session_config()).await?;
        if let Some(court) = court {
            service.select_court(court).await?;
        }
        Ok(service)
    }

    /// Raw stored record, bypassing every rule
    pub fn raw(&self, collection: &str, id: &str) -> Option<Value> {
        let store = self.store.lock().ok()?;
        store
            .records
            .get(collection)?
            .iter()
            .find(|r| r["_id"] == id)
            .cloned()
    }

    /// Requests seen so far, as `METHOD /path`
    pub fn calls(&self) -> Vec<String> {
        self.store.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Every later PUT answers 503 until called again with `false`
    pub fn refuse_saves(&self, refuse: bool) {
        if let Ok(mut store) = self.store.lock() {
            store.refuse_saves = refuse;
        }
    }

    pub fn record_count(&self, collection: &str) -> usize {
        self.store
            .lock()
            .map(|s| s.records.get(collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        jwt_secret: Some(SECRET.to_string()),
        expiry_leeway_secs: 0,
    }
}

/// Token signed the way the backend signs them
pub fn mint(id: &str, username: &str, role: &str, court: Option<&str>, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "id": id,
        "username": username,
        "role": role,
        "circuitCourt": court,
        "iat": now,
        "exp": now + exp_offset_secs,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).expect("token encodes")
}

fn seed() -> Store {
    let user = |id: &str, username: &str, role: &'static str, court: Option<&str>| User {
        id: id.to_string(),
        username: username.to_string(),
        role,
        court: court.map(str::to_string),
    };

    Store {
        users: vec![
            user("u-clerk-1", CLERK, "Circuit Clerk", Some(COURT)),
            user("u-clerk-2", OTHER_CLERK, "Circuit Clerk", Some(OTHER_COURT)),
            user("u-admin", ADMIN, "Court Admin", None),
            user("u-chief", CHIEF, "Chief Justice", None),
        ],
        courts: vec![
            ("c-1".to_string(), COURT.to_string()),
            ("c-2".to_string(), OTHER_COURT.to_string()),
        ],
        records: HashMap::new(),
        uploads: 0,
        calls: Vec::new(),
        refuse_saves: false,
    }
}

fn fail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

fn ok(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

struct Caller {
    id: String,
    role: String,
}

impl Caller {
    fn is_clerk(&self) -> bool {
        self.role == "Circuit Clerk"
    }

    fn track(&self) -> Option<&'static str> {
        match self.role.as_str() {
            "Court Admin" => Some("admin"),
            "Chief Justice" => Some("chief"),
            _ => None,
        }
    }
}

fn authenticate(headers: &HeaderMap) -> Result<Caller, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "No token, authorization denied"))?;

    let data = decode::<Value>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &Validation::new(Algorithm::HS256))
        .map_err(|_| fail(StatusCode::UNAUTHORIZED, "Token is not valid"))?;

    Ok(Caller {
        id: data.claims["id"].as_str().unwrap_or_default().to_string(),
        role: data.claims["role"].as_str().unwrap_or_default().to_string(),
    })
}

fn court_of(record: &Value) -> &str {
    record
        .get("court")
        .or_else(|| record.get("circuitCourt"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn flag(record: &Value, key: &str) -> bool {
    record.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn flag_name(track: &str, suffix: &str) -> String {
    match (track, suffix) {
        ("admin", "submitted") => "submittedToAdmin",
        ("chief", "submitted") => "submittedToChief",
        ("admin", _) => "adminViewed",
        _ => "chiefViewed",
    }
    .to_string()
}

/// `submittedBy` comes back populated, as the real backend does
fn populated(store: &Store, record: &Value) -> Value {
    let mut out = record.clone();
    if let Some(author) = record["submittedBy"].as_str() {
        if let Some(user) = store.users.iter().find(|u| u.id == author) {
            out["submittedBy"] = json!({ "_id": user.id, "username": user.username });
        }
    }
    out
}

async fn dispatch(State(store): State<Shared>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let segments: Vec<String> = uri
        .path()
        .trim_matches('/')
        .split('/')
        .map(|s| s.replace("%20", " "))
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => return fail(StatusCode::BAD_REQUEST, "Malformed JSON"),
        }
    };

    let Ok(mut store) = store.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };

    if let (&Method::POST, ["api", "auth", "login"]) = (&method, segments.as_slice()) {
        return login(&store, &body);
    }

    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    store.calls.push(format!("{} {}", method, uri.path()));

    let query: HashMap<String, String> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["api", "courts"]) => {
            let courts: Vec<_> = store.courts.iter().map(|(id, name)| json!({ "_id": id, "name": name })).collect();
            ok(json!(courts))
        }
        (&Method::POST, ["api", "courts"]) => {
            if caller.role != "Court Admin" {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            let name = body["name"].as_str().unwrap_or_default().trim().to_string();
            if store.courts.iter().any(|(_, n)| *n == name) {
                return fail(StatusCode::BAD_REQUEST, "Court already exists");
            }
            let id = format!("c-{}", Uuid::new_v4().simple());
            store.courts.push((id.clone(), name.clone()));
            ok(json!({ "_id": id, "name": name }))
        }
        (&Method::DELETE, ["api", "courts", id]) => {
            if caller.role != "Court Admin" {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            let before = store.courts.len();
            store.courts.retain(|(cid, _)| cid.as_str() != *id);
            if store.courts.len() == before {
                return fail(StatusCode::NOT_FOUND, "Court not found");
            }
            ok(json!({ "msg": "Court deleted" }))
        }
        (&Method::POST, ["api", collection]) => create(&mut store, &caller, collection, body),
        (&Method::GET, ["api", collection, "my"]) => {
            let mine: Vec<Value> = store
                .records
                .get(*collection)
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| r["submittedBy"] == caller.id.as_str() && !flag(r, "removedByClerk"))
                        .map(|r| populated(&store, r))
                        .collect()
                })
                .unwrap_or_default();
            ok(json!(mine))
        }
        (&Method::GET, ["api", collection, track, "all"]) => {
            if caller.track() != Some(*track) {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            let court = query.get("court").cloned().unwrap_or_default();
            let submitted = flag_name(track, "submitted");
            let routed: Vec<Value> = store
                .records
                .get(*collection)
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| flag(r, &submitted) && court_of(r) == court)
                        .map(|r| populated(&store, r))
                        .collect()
                })
                .unwrap_or_default();
            ok(json!(routed))
        }
        (&Method::GET, ["api", collection, id]) => match find(&store, collection, id) {
            Some(record) if caller.is_clerk() && record["submittedBy"] != caller.id.as_str() => {
                fail(StatusCode::FORBIDDEN, "Access denied")
            }
            Some(record) => ok(populated(&store, record)),
            None => fail(StatusCode::NOT_FOUND, "Record not found"),
        },
        (&Method::PUT, ["api", _, _]) if store.refuse_saves => {
            fail(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
        }
        (&Method::PUT, ["api", collection, id]) => replace(&mut store, &caller, collection, id, body),
        (&Method::PATCH, ["api", collection, action, id]) => {
            transition(&mut store, &caller, collection, None, action, id, &body)
        }
        (&Method::PATCH, ["api", collection, track, action, id]) => {
            transition(&mut store, &caller, collection, Some(*track), action, id, &body)
        }
        (&Method::DELETE, ["api", collection, "delete-file"]) => {
            let url = body["url"].as_str().unwrap_or_default().to_string();
            let docket = body["docketId"].as_str().unwrap_or_default().to_string();
            match find_mut(&mut store, collection, &docket) {
                Some(record) if record["submittedBy"] == caller.id.as_str() => {
                    if let Some(list) = record["attachments"].as_array_mut() {
                        list.retain(|a| a["url"] != url.as_str());
                    }
                    ok(json!({ "msg": "File deleted" }))
                }
                Some(_) => fail(StatusCode::FORBIDDEN, "Access denied"),
                None => fail(StatusCode::NOT_FOUND, "Record not found"),
            }
        }
        _ => fail(StatusCode::NOT_FOUND, "Route not found"),
    }
}

fn login(store: &Store, body: &Value) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match store.users.iter().find(|u| u.username == username) {
        Some(user) if password == PASSWORD => {
            let token = mint(&user.id, &user.username, user.role, user.court.as_deref(), 3600);
            ok(json!({
                "token": token,
                "user": { "_id": user.id, "username": user.username, "role": user.role },
            }))
        }
        _ => fail(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

fn find<'a>(store: &'a Store, collection: &str, id: &str) -> Option<&'a Value> {
    store.records.get(collection)?.iter().find(|r| r["_id"] == id)
}

fn find_mut<'a>(store: &'a mut Store, collection: &str, id: &str) -> Option<&'a mut Value> {
    store.records.get_mut(collection)?.iter_mut().find(|r| r["_id"] == id)
}

fn create(store: &mut Store, caller: &Caller, collection: &str, body: Value) -> Response {
    if !caller.is_clerk() {
        return fail(StatusCode::FORBIDDEN, "Only clerks can submit reports");
    }
    let Value::Object(mut fields) = body else {
        return fail(StatusCode::BAD_REQUEST, "Body must be an object");
    };

    let id = Uuid::new_v4().simple().to_string();
    fields.insert("_id".into(), json!(id));
    fields.insert("submittedBy".into(), json!(caller.id));
    for key in ["finalized", "rejected", "submittedToAdmin", "submittedToChief", "adminViewed", "chiefViewed", "removedByClerk"] {
        fields.entry(key).or_insert(json!(false));
    }
    fields.entry("rejectionReason").or_insert(Value::Null);
    fields.entry("attachments").or_insert(json!([]));

    let record = Value::Object(fields);
    store.records.entry(collection.to_string()).or_default().push(record.clone());
    ok(populated(store, &record))
}

fn replace(store: &mut Store, caller: &Caller, collection: &str, id: &str, body: Value) -> Response {
    let Some(record) = find_mut(store, collection, id) else {
        return fail(StatusCode::NOT_FOUND, "Record not found");
    };
    if record["submittedBy"] != caller.id.as_str() {
        return fail(StatusCode::FORBIDDEN, "Access denied");
    }
    if flag(record, "finalized") && !flag(record, "rejected") {
        return fail(StatusCode::BAD_REQUEST, "Finalized reports cannot be edited");
    }
    let Value::Object(fields) = body else {
        return fail(StatusCode::BAD_REQUEST, "Body must be an object");
    };

    let mut merged: Map<String, Value> = record.as_object().cloned().unwrap_or_default();
    for (key, value) in fields {
        if key != "_id" && key != "submittedBy" {
            merged.insert(key, value);
        }
    }
    *record = Value::Object(merged);
    ok(json!({ "msg": "Report updated" }))
}

fn transition(
    store: &mut Store,
    caller: &Caller,
    collection: &str,
    track: Option<&str>,
    action: &str,
    id: &str,
    body: &Value,
) -> Response {
    let Some(record) = find_mut(store, collection, id) else {
        return fail(StatusCode::NOT_FOUND, "Record not found");
    };
    let authored = record["submittedBy"] == caller.id.as_str();

    match (track, action) {
        (None, "submit") => {
            if !authored {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            if !flag(record, "finalized") || flag(record, "rejected") {
                return fail(StatusCode::BAD_REQUEST, "Report must be finalized before submission");
            }
            let recipient = body["recipient"].as_str().unwrap_or_default();
            if recipient != "admin" && recipient != "chief" {
                return fail(StatusCode::BAD_REQUEST, "Invalid recipient");
            }
            record[flag_name(recipient, "submitted")] = json!(true);
        }
        (None, "resubmit") => {
            if !authored {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            if !flag(record, "rejected") {
                return fail(StatusCode::BAD_REQUEST, "Report is not rejected");
            }
            record["rejected"] = json!(false);
            record["rejectionReason"] = json!("");
            record["finalized"] = json!(false);
        }
        (None, "remove") => {
            if !authored {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            record["removedByClerk"] = json!(true);
        }
        (Some(track), "view") | (Some(track), "reject") => {
            if caller.track() != Some(track) || !flag(record, &flag_name(track, "submitted")) {
                return fail(StatusCode::FORBIDDEN, "Access denied");
            }
            if action == "view" {
                record[flag_name(track, "viewed")] = json!(true);
            } else {
                let reason = body["reason"].as_str().unwrap_or_default().trim();
                if reason.is_empty() {
                    return fail(StatusCode::BAD_REQUEST, "Rejection reason is required");
                }
                record["rejected"] = json!(true);
                record["rejectionReason"] = json!(reason);
            }
        }
        _ => return fail(StatusCode::NOT_FOUND, "Route not found"),
    }
    ok(json!({ "msg": "Report updated" }))
}

async fn upload(State(store): State<Shared>, Path(collection): Path<String>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let mut file_name = None;
    let mut docket_id = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                if field.bytes().await.is_err() {
                    return fail(StatusCode::BAD_REQUEST, "Upload interrupted");
                }
            }
            "docketId" => docket_id = field.text().await.ok(),
            _ => {}
        }
    }
    let (Some(file_name), Some(docket_id)) = (file_name, docket_id) else {
        return fail(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    let Ok(mut store) = store.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "store poisoned");
    };
    store.uploads += 1;
    let url = format!("/uploads/{}-{}", store.uploads, file_name);
    let file = json!({ "url": url, "originalname": file_name });

    match find_mut(&mut store, &collection, &docket_id) {
        Some(record) if record["submittedBy"] == caller.id.as_str() => {
            if let Some(list) = record["attachments"].as_array_mut() {
                list.push(file.clone());
            }
            ok(json!({ "file": file }))
        }
        Some(_) => fail(StatusCode::FORBIDDEN, "Access denied"),
        None => fail(StatusCode::NOT_FOUND, "Record not found"),
    }
}
