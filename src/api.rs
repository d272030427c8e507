use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, Responder, get, web};
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::config::DEFAULT_PAYLOAD_LIMIT;
use crate::error::ApiError;
use crate::store::{KeyStore, UpsertOutcome};

const INDEX_HTML: &str = include_str!("index.html");

/// Largest body accepted by PUT/POST on `/key`, registered as app data.
///
/// Falls back to [`DEFAULT_PAYLOAD_LIMIT`] when the app does not provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimit(pub usize);

// Body of a successful PUT/POST on /key
#[derive(Serialize)]
struct WriteResponse {
    success: bool,
    #[serde(flatten)]
    outcome: UpsertOutcome,
}

// Registers every route on the given app. The KeyStore is expected as app data,
// a PayloadLimit optionally.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(get_empty_key)
        .service(get_key)
        .service(
            web::resource("/key")
                .route(web::get().to(list_keys))
                .route(web::put().to(put_keys))
                .route(web::post().to(post_keys))
                // Any other method falls back to listing keys
                .default_service(web::to(list_keys)),
        )
        .service(
            web::resource("/keystore.json")
                .route(web::get().to(dump_keystore))
                .default_service(web::to(not_found)),
        );
}

// Serialize a response body up front so encoding failures become an ApiError
fn json_response<T: Serialize>(body: &T) -> Result<HttpResponse, ApiError> {
    let body = serde_json::to_vec(body).map_err(|err| {
        error!(error = %err, "error writing response");
        ApiError::Serialize(err)
    })?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

// Parse the request body as a JSON object of key -> value
fn decode_pairs(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.trim_ascii().is_empty() {
        return Err(ApiError::NoKeySpecified);
    }
    serde_json::from_slice(body).map_err(ApiError::InvalidPayload)
}

// Static landing page describing the endpoints
#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

// No id in the path, so there is nothing to look up
#[get("/key/")]
async fn get_empty_key() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body("{}")
}

// Returns {"<id>": value}, with a null value when the key is absent
#[get("/key/{id}")]
async fn get_key(
    id: web::Path<String>,
    store: web::Data<KeyStore>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    debug!(key = %id, "look up");

    let value = store.get(&id).unwrap_or(Value::Null);
    let mut body = Map::new();
    body.insert(id, value);
    json_response(&body)
}

async fn list_keys(store: web::Data<KeyStore>) -> Result<HttpResponse, ApiError> {
    json_response(&store.list_keys())
}

// PUT only creates keys that are not already present
async fn put_keys(
    payload: web::Payload,
    limit: Option<web::Data<PayloadLimit>>,
    store: web::Data<KeyStore>,
) -> Result<HttpResponse, ApiError> {
    let body = read_body(payload, limit_or_default(limit)).await?;
    write_keys(&body, &store, false)
}

// POST overwrites whatever is stored
async fn post_keys(
    payload: web::Payload,
    limit: Option<web::Data<PayloadLimit>>,
    store: web::Data<KeyStore>,
) -> Result<HttpResponse, ApiError> {
    let body = read_body(payload, limit_or_default(limit)).await?;
    write_keys(&body, &store, true)
}

fn limit_or_default(limit: Option<web::Data<PayloadLimit>>) -> usize {
    limit.map_or(DEFAULT_PAYLOAD_LIMIT, |limit| limit.0)
}

// Collect the body ourselves so an oversized request is reported as an ApiError
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, ApiError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(ApiError::Payload)?;
        if body.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn write_keys(body: &[u8], store: &KeyStore, overwrite: bool) -> Result<HttpResponse, ApiError> {
    let pairs = decode_pairs(body)?;
    let outcome = store.upsert(pairs, overwrite);
    if outcome.is_empty() {
        debug!(overwrite, "empty batch, nothing written");
    } else {
        info!(
            overwrite,
            set = outcome.set.len(),
            removed = outcome.removed.len(),
            not_updated = outcome.not_updated.len(),
            "keys written"
        );
    }
    json_response(&WriteResponse {
        success: true,
        outcome,
    })
}

// The whole store as a flat JSON object, no envelope
async fn dump_keystore(store: web::Data<KeyStore>) -> Result<HttpResponse, ApiError> {
    json_response(&store.snapshot())
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().finish()
}
