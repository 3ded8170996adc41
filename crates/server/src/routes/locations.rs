//! HTTP handlers for the four location operations.
//!
//! Handlers only translate the HTTP request into a `LocationRequest`; the
//! identifier transport (query vs. body) is decided by the service from the
//! method.

use std::{collections::HashMap, time::Instant};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Method,
};
use service::location::{LocationRequest, LocationResponse, RequestBody};

use crate::{observability, startup::AppState};

fn to_request(method: Method, params: HashMap<String, String>, body: &Bytes) -> LocationRequest {
    LocationRequest {
        method,
        params,
        body: RequestBody::from_bytes(body),
    }
}

fn finish(operation: &'static str, started: Instant, res: LocationResponse) -> LocationResponse {
    observability::record(operation, res.status, started.elapsed());
    res
}

pub async fn create(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> LocationResponse {
    let started = Instant::now();
    let res = state.locations.create(&to_request(method, params, &body)).await;
    finish("create", started, res)
}

pub async fn get(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> LocationResponse {
    let started = Instant::now();
    let res = state.locations.get(&to_request(method, params, &body)).await;
    finish("get", started, res)
}

pub async fn delete(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> LocationResponse {
    let started = Instant::now();
    let res = state.locations.delete(&to_request(method, params, &body)).await;
    finish("delete", started, res)
}

pub async fn edit(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> LocationResponse {
    let started = Instant::now();
    let res = state.locations.edit(&to_request(method, params, &body)).await;
    finish("edit", started, res)
}
