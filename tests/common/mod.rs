// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use futures_util::future::BoxFuture;
use pmc_tracker::config::Config;
use pmc_tracker::error::FetchError;
use pmc_tracker::routes::create_router;
use pmc_tracker::services::fetcher::{
    AccessToken, ApiRequest, HttpTransport, RateLimitedFetcher, RawResponse, RetryPolicy,
};
use pmc_tracker::AppState;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory Strava stand-in: replays queued responses per request and
/// records every call it receives.
///
/// Responses are keyed by path, or by `path?page=N` for paged requests.
/// Once a key's queue holds a single response it is replayed forever;
/// unscripted requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue `status`/`body` for every request to `path`.
    pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
        self.push(path.to_string(), RawResponse::new(status, body));
        self
    }

    pub fn respond_json(&self, path: &str, body: Value) -> &Self {
        self.respond(path, 200, body.to_string())
    }

    /// Queue a response for one page of a paged listing.
    pub fn respond_page(&self, path: &str, page: u32, body: Value) -> &Self {
        self.push(page_key(path, page), RawResponse::new(200, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls made to `path`, ignoring the query.
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn push(&self, key: String, response: RawResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(response);
    }

    fn next_response(&self, request: &ApiRequest) -> RawResponse {
        let key = match request.query_value("page") {
            Some(page) => format!("{}?page={}", request.path, page),
            None => request.path.clone(),
        };
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => RawResponse::new(404, r#"{"message":"Record Not Found"}"#),
        }
    }
}

impl HttpTransport for ScriptedTransport {
    fn get<'a>(
        &'a self,
        _token: &'a AccessToken,
        request: &'a ApiRequest,
    ) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        self.calls.lock().unwrap().push(request.clone());
        let response = self.next_response(request);
        Box::pin(async move { Ok(response) })
    }
}

fn page_key(path: &str, page: u32) -> String {
    format!("{}?page={}", path, page)
}

#[allow(dead_code)]
pub fn token() -> AccessToken {
    AccessToken::new("test-token")
}

/// Fetcher over `transport` that retries without sleeping.
#[allow(dead_code)]
pub fn test_fetcher(transport: Arc<ScriptedTransport>) -> Arc<RateLimitedFetcher> {
    Arc::new(RateLimitedFetcher::new(transport, RetryPolicy::immediate(5)))
}

/// Summary activity JSON as Strava returns it.
#[allow(dead_code)]
pub fn activity_json(
    id: u64,
    start_date_local: &str,
    weighted_average_watts: Option<f64>,
) -> Value {
    let mut activity = json!({
        "id": id,
        "name": format!("Ride {}", id),
        "sport_type": "Ride",
        "start_date_local": start_date_local,
        "distance": 30000.0,
        "moving_time": 3600,
        "elapsed_time": 3900,
        "total_elevation_gain": 250.0,
        "average_speed": 8.33,
        "max_speed": 15.0,
        "average_heartrate": 140.0,
        "kilojoules": 650.0,
    });
    if let Some(watts) = weighted_average_watts {
        activity["weighted_average_watts"] = json!(watts);
        activity["average_watts"] = json!(watts - 10.0);
    }
    activity
}

/// A page of `count` activities with ids starting at `first_id`.
#[allow(dead_code)]
pub fn activity_page(first_id: u64, count: usize) -> Value {
    Value::Array(
        (0..count as u64)
            .map(|i| activity_json(first_id + i, "2022-03-01T08:00:00Z", Some(200.0)))
            .collect(),
    )
}

#[allow(dead_code)]
pub fn profile_json() -> Value {
    json!({
        "id": 1234567,
        "username": "marathon_mike",
        "firstname": "Mike",
        "lastname": "Miles",
        "city": "Berlin",
        "country": "Germany",
        "ftp": 265,
        "created_at": "2018-04-02T10:00:00Z",
        "profile": "https://example.com/avatar.jpg",
    })
}

/// Create a test app over `transport` with zero retry delays.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(transport: Arc<ScriptedTransport>) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState::new(config, transport));
    (create_router(state.clone()), state)
}
