//! Fixture server for exercising the JSON client over real HTTP.
//!
//! `/echo` reflects whatever it receives, `/fixtures/*` return canned bodies,
//! and `/records` is a small in-memory resource for full verb round-trips.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// What `/echo` saw: method, path and query, lower-cased headers, JSON body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub count: u32,
}

#[derive(Deserialize)]
pub struct CreateRecord {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Deserialize)]
pub struct UpdateRecord {
    pub name: Option<String>,
    pub count: Option<u32>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Record>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/fixtures/object", get(object_fixture))
        .route("/fixtures/text", get(text_fixture))
        .route("/records", get(list_records).post(create_record))
        .route(
            "/records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    // First value wins when a header repeats.
    let headers = headers
        .keys()
        .filter_map(|name| {
            let value = headers.get(name)?;
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            Some((name.as_str().to_string(), value))
        })
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        }))
    };
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    Json(Echo {
        method: method.to_string(),
        path,
        headers,
        body,
    })
}

async fn object_fixture() -> Json<Value> {
    Json(serde_json::json!({ "a": 1 }))
}

async fn text_fixture() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/plain")], "not json")
}

async fn list_records(State(db): State<Db>) -> Json<Vec<Record>> {
    let records = db.read().await;
    Json(records.values().cloned().collect())
}

async fn create_record(
    State(db): State<Db>,
    Json(input): Json<CreateRecord>,
) -> (StatusCode, Json<Record>) {
    let record = Record {
        id: Uuid::new_v4(),
        name: input.name,
        count: input.count,
    };
    db.write().await.insert(record.id, record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn get_record(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record>, StatusCode> {
    let records = db.read().await;
    records.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_record(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateRecord>,
) -> Result<Json<Record>, StatusCode> {
    let mut records = db.write().await;
    let record = records.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        record.name = name;
    }
    if let Some(count) = input.count {
        record.count = count;
    }
    Ok(Json(record.clone()))
}

/// Returns the deleted record so JSON clients always have a body to decode.
async fn delete_record(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record>, StatusCode> {
    let mut records = db.write().await;
    records.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
