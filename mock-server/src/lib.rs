//! In-memory stand-in for the marketplace API, served under `/api/v0`.
//!
//! Seeded with one offer and a fixed credit balance. Every route except the
//! router's fallback requires a bearer token; the token's value is not
//! checked.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const SEED_ASK_ID: u64 = 4242;
pub const SEED_CREDIT: f64 = 1000.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub machine_id: u64,
    pub actual_status: String,
    pub num_gpus: u32,
    pub gpu_name: String,
    pub dph_total: f64,
    pub image_uuid: String,
    pub label: Option<String>,
    #[serde(default)]
    pub ssh_keys: Vec<u64>,
}

#[derive(Clone, Debug)]
pub struct Ask {
    pub machine_id: u64,
    pub num_gpus: u32,
    pub gpu_name: String,
    pub dph_total: f64,
}

#[derive(Deserialize)]
pub struct CreateInstance {
    pub image: String,
    pub label: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateInstance {
    pub state: Option<String>,
    pub label: Option<String>,
}

#[derive(Deserialize)]
pub struct SshKey {
    pub ssh_key: String,
}

#[derive(Deserialize)]
pub struct Prepay {
    pub amount: f64,
}

#[derive(Debug)]
pub struct Market {
    pub asks: HashMap<u64, Ask>,
    pub instances: HashMap<u64, Instance>,
    pub ssh_keys: HashMap<u64, String>,
    pub credit: f64,
    next_id: u64,
}

impl Market {
    pub fn seeded() -> Self {
        let mut asks = HashMap::new();
        asks.insert(
            SEED_ASK_ID,
            Ask {
                machine_id: 77,
                num_gpus: 2,
                gpu_name: "RTX_4090".to_string(),
                dph_total: 0.5,
            },
        );
        Self {
            asks,
            instances: HashMap::new(),
            ssh_keys: HashMap::new(),
            credit: SEED_CREDIT,
            next_id: 1000,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Market>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Market::seeded()));
    let api = Router::new()
        .route("/instances/", get(list_instances))
        .route("/instances/{id}/", put(update_instance).delete(destroy_instance))
        .route("/instances/{id}/ssh", put(attach_ssh))
        .route("/instances/{id}/ssh/{key_id}/", delete(detach_ssh))
        .route("/instances/prepay/{id}/", put(prepay_instance))
        .route("/instances/reboot/{id}/", put(reboot_instance))
        .route("/instances/recycle/{id}/", put(recycle_instance))
        .route("/asks/{id}/", put(create_instance))
        .route("/ssh/", post(create_ssh_key))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db);
    Router::new().nest("/api/v0", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn no_such_instance() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "msg": "no such instance"})),
    )
}

fn ok() -> ApiResult {
    Ok(Json(json!({"success": true})))
}

/// Months of runtime `amount` buys, and the discount that earns.
fn prepay_terms(amount: f64, dph: f64) -> (f64, f64) {
    let timescale = amount / (dph * 24.0 * 30.0);
    let discount_rate = match timescale {
        t if t >= 12.0 => 0.4,
        t if t >= 6.0 => 0.3,
        t if t >= 3.0 => 0.2,
        t if t >= 1.0 => 0.1,
        _ => 0.0,
    };
    (timescale, discount_rate)
}

async fn list_instances(State(db): State<Db>) -> Json<Value> {
    let market = db.read().await;
    let mut instances: Vec<&Instance> = market.instances.values().collect();
    instances.sort_by_key(|i| i.id);
    Json(json!({"instances": instances}))
}

async fn create_instance(State(db): State<Db>, Path(ask_id): Path<u64>, Json(input): Json<CreateInstance>) -> ApiResult {
    let mut market = db.write().await;
    let Some(ask) = market.asks.get(&ask_id).cloned() else {
        return Ok(Json(json!({"success": false, "msg": "no such ask"})));
    };
    let id = market.next_id();
    market.instances.insert(
        id,
        Instance {
            id,
            machine_id: ask.machine_id,
            actual_status: "loading".to_string(),
            num_gpus: ask.num_gpus,
            gpu_name: ask.gpu_name,
            dph_total: ask.dph_total,
            image_uuid: input.image,
            label: input.label,
            ssh_keys: Vec::new(),
        },
    );
    Ok(Json(json!({"success": true, "new_contract": id})))
}

async fn update_instance(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<UpdateInstance>) -> ApiResult {
    let mut market = db.write().await;
    let instance = market.instances.get_mut(&id).ok_or_else(no_such_instance)?;
    if let Some(state) = input.state {
        match state.as_str() {
            "running" | "stopped" => instance.actual_status = state,
            other => return Ok(Json(json!({"success": false, "msg": format!("invalid state {other}")}))),
        }
    }
    if let Some(label) = input.label {
        instance.label = Some(label);
    }
    ok()
}

async fn destroy_instance(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let mut market = db.write().await;
    market.instances.remove(&id).ok_or_else(no_such_instance)?;
    ok()
}

async fn attach_ssh(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<SshKey>) -> ApiResult {
    let mut market = db.write().await;
    if !market.instances.contains_key(&id) {
        return Err(no_such_instance());
    }
    let key_id = market.next_id();
    market.ssh_keys.insert(key_id, input.ssh_key);
    if let Some(instance) = market.instances.get_mut(&id) {
        instance.ssh_keys.push(key_id);
    }
    Ok(Json(json!({"success": true, "key_id": key_id})))
}

async fn detach_ssh(State(db): State<Db>, Path((id, key_id)): Path<(u64, u64)>) -> ApiResult {
    let mut market = db.write().await;
    let instance = market.instances.get_mut(&id).ok_or_else(no_such_instance)?;
    let before = instance.ssh_keys.len();
    instance.ssh_keys.retain(|k| *k != key_id);
    if instance.ssh_keys.len() == before {
        return Ok(Json(json!({"success": false, "msg": "key not attached"})));
    }
    ok()
}

async fn create_ssh_key(State(db): State<Db>, Json(input): Json<SshKey>) -> ApiResult {
    let mut market = db.write().await;
    let key_id = market.next_id();
    market.ssh_keys.insert(key_id, input.ssh_key.clone());
    Ok(Json(json!({"success": true, "id": key_id, "ssh_key": input.ssh_key})))
}

async fn prepay_instance(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<Prepay>) -> ApiResult {
    let mut market = db.write().await;
    let dph = market.instances.get(&id).ok_or_else(no_such_instance)?.dph_total;
    if input.amount > market.credit {
        return Ok(Json(json!({"success": false, "msg": "Insufficient funds"})));
    }
    market.credit -= input.amount;
    let (timescale, discount_rate) = prepay_terms(input.amount, dph);
    Ok(Json(json!({"success": true, "timescale": timescale, "discount_rate": discount_rate})))
}

async fn reboot_instance(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let mut market = db.write().await;
    let instance = market.instances.get_mut(&id).ok_or_else(no_such_instance)?;
    instance.actual_status = "running".to_string();
    ok()
}

async fn recycle_instance(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let mut market = db.write().await;
    let instance = market.instances.get_mut(&id).ok_or_else(no_such_instance)?;
    instance.actual_status = "loading".to_string();
    ok()
}
