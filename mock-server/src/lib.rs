//! Mock JSON API used to exercise `request-client` over real HTTP.
//!
//! Serves an in-memory `things` resource plus a few fixture routes that
//! produce the response shapes the client has to handle: plain text, a
//! non-JSON server error, a slow answer and a bearer-protected endpoint.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thing {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateThing {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateThing {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// What `/echo` saw. Header names are lower-cased by the HTTP stack.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Deserialize)]
struct StallParams {
    ms: u64,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Thing>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/things", get(list_things).post(create_thing))
        .route(
            "/things/{id}",
            get(get_thing).put(replace_thing).patch(update_thing).delete(delete_thing),
        )
        .route("/echo", any(echo))
        .route("/text", get(text))
        .route("/fail", get(fail))
        .route("/stall", get(stall))
        .route("/me", get(me))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

fn not_found(id: Uuid) -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::NOT_FOUND, format!("thing {id} not found"))
}

async fn list_things(State(db): State<Db>) -> Json<Vec<Thing>> {
    let things = db.read().await;
    Json(things.values().cloned().collect())
}

async fn create_thing(
    State(db): State<Db>,
    Json(input): Json<CreateThing>,
) -> (StatusCode, Json<Thing>) {
    let thing = Thing {
        id: Uuid::new_v4(),
        name: input.name,
        tags: input.tags,
    };
    db.write().await.insert(thing.id, thing.clone());
    (StatusCode::CREATED, Json(thing))
}

async fn get_thing(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Thing>> {
    let things = db.read().await;
    things.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

/// Apply `edit` to the stored thing, or answer 404.
async fn edit_thing(db: &Db, id: Uuid, edit: impl FnOnce(&mut Thing)) -> ApiResult<Json<Thing>> {
    let mut things = db.write().await;
    let thing = things.get_mut(&id).ok_or_else(|| not_found(id))?;
    edit(thing);
    Ok(Json(thing.clone()))
}

async fn replace_thing(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateThing>,
) -> ApiResult<Json<Thing>> {
    edit_thing(&db, id, |thing| {
        thing.name = input.name;
        thing.tags = input.tags;
    })
    .await
}

async fn update_thing(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateThing>,
) -> ApiResult<Json<Thing>> {
    edit_thing(&db, id, |thing| {
        if let Some(name) = input.name {
            thing.name = name;
        }
        if let Some(tags) = input.tags {
            thing.tags = tags;
        }
    })
    .await
}

async fn delete_thing(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut things = db.write().await;
    things
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(Echo {
        method: method.to_string(),
        headers,
        body,
    })
}

async fn text() -> &'static str {
    "hello, world"
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>")
}

async fn stall(Query(params): Query<StallParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(Value::Object(Default::default()))
}

async fn me(headers: HeaderMap) -> ApiResult<Json<Value>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    Ok(Json(serde_json::json!({ "token": token })))
}
