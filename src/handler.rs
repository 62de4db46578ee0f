//! The request handler: validation, dispatch, and store read-modify-write.
//!
//! Every request runs the same cycle: parse into a [`RestRequest`], load the
//! full store from the backend, apply the operation, and for mutations write
//! the full store back. There is no cross-request coordination, so two
//! concurrent mutations can lose an update; that race is inherited
//! deliberately from the service this replaces.

use crate::config::AppState;
use crate::employee::{EmployeeId, EmployeeRecord, EmployeeStore, Payload};
use crate::logger::{self, AccessLogEntry};
use crate::response;
use crate::rest::{self, BadRequest, RestRequest, MSG_DELETE_MISSING, MSG_INSERT_EXISTS, MSG_UPDATE_MISSING};
use crate::store::Storage;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Validate Content-Length header against max body size.
/// Returns Some(413 response) if too large, None otherwise.
fn check_body_size(headers: &hyper::HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = headers.get("content-length")?.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(response::build_413_response())
        }
        _ => None,
    }
}

pub async fn handle_request<S: Storage>(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState<S>>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    // Full origin-form target: a query string is part of what gets matched.
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    let access_log = state.cached_access_log.load(std::sync::atomic::Ordering::Relaxed);

    if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return Ok(resp);
    }

    // Only POST and PUT carry a payload; other bodies are ignored unread.
    let body = if method == Method::POST || method == Method::PUT {
        match req.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                logger::log_warning(&format!("Failed to read request body: {err}"));
                Bytes::new()
            }
        }
    } else {
        Bytes::new()
    };

    let http_config = &state.config.http;
    let result = match rest::parse(&method, &target, &body) {
        Ok(request) => dispatch(request, &state).await,
        Err(bad) => Err(bad),
    };
    let resp = result.unwrap_or_else(|bad| response::build_bad_request_response(bad.0, http_config));

    if access_log {
        let mut entry =
            AccessLogEntry::new(peer_addr.to_string(), method.to_string(), target);
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp.body().size_hint().lower() as usize;
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(resp)
}

/// Execute a validated request. Business-rule failures (duplicate insert,
/// missing update/delete target) surface as the same terminal [`BadRequest`]
/// the parse phase uses.
async fn dispatch<S: Storage>(
    request: RestRequest,
    state: &AppState<S>,
) -> Result<Response<Full<Bytes>>, BadRequest> {
    match request {
        // Health never touches the store.
        RestRequest::Health => Ok(response::build_text_response("OK", &state.config.http)),
        RestRequest::Read(id) => Ok(handle_read(id, state).await),
        RestRequest::Create(id, payload) => handle_create(id, &payload, state).await,
        RestRequest::Update(id, payload) => handle_update(id, &payload, state).await,
        RestRequest::Delete(id) => handle_delete(id, state).await,
    }
}

/// GET: the record as JSON, or JSON `false` for a miss. A miss is still a
/// 200, not a 404 (kept from the original service).
async fn handle_read<S: Storage>(id: EmployeeId, state: &AppState<S>) -> Response<Full<Bytes>> {
    let store = state.storage.load().await;
    let body = store.get(&id).map_or_else(
        || "false".to_string(),
        |record| {
            serde_json::to_string(record).unwrap_or_else(|err| {
                logger::log_error(&format!("Failed to serialize employee {id}: {err}"));
                "false".to_string()
            })
        },
    );
    response::build_json_response(body, &state.config.http)
}

async fn handle_create<S: Storage>(
    id: EmployeeId,
    payload: &Payload,
    state: &AppState<S>,
) -> Result<Response<Full<Bytes>>, BadRequest> {
    let mut store = state.storage.load().await;
    if store.contains_key(&id) {
        return Err(BadRequest(MSG_INSERT_EXISTS));
    }
    store.insert(id, EmployeeRecord::from_payload(payload));
    persist(state, &store).await;
    Ok(response::build_json_response("true".to_string(), &state.config.http))
}

async fn handle_update<S: Storage>(
    id: EmployeeId,
    payload: &Payload,
    state: &AppState<S>,
) -> Result<Response<Full<Bytes>>, BadRequest> {
    let mut store = state.storage.load().await;
    let Some(existing) = store.get(&id) else {
        return Err(BadRequest(MSG_UPDATE_MISSING));
    };
    let merged = existing.merged_with(payload);
    store.insert(id, merged);
    persist(state, &store).await;
    Ok(response::build_json_response("true".to_string(), &state.config.http))
}

async fn handle_delete<S: Storage>(
    id: EmployeeId,
    state: &AppState<S>,
) -> Result<Response<Full<Bytes>>, BadRequest> {
    let mut store = state.storage.load().await;
    if store.remove(&id).is_none() {
        return Err(BadRequest(MSG_DELETE_MISSING));
    }
    persist(state, &store).await;
    Ok(response::build_json_response("true".to_string(), &state.config.http))
}

/// Write the full store back. A failed write is logged but never reported
/// to the client: the request still answers `true` (kept from the original).
async fn persist<S: Storage>(state: &AppState<S>, store: &EmployeeStore) {
    if let Err(err) = state.storage.save(store).await {
        logger::log_error(&format!("Failed to persist employee store: {err}"));
    }
}
