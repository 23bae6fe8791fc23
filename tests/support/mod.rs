//! Scripted transport and recording observer shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use syncthing_helper::syncthing_client::{
    ApiRequest, FolderEvent, FolderObserver, StreamSettings, Transport,
};
use syncthing_helper::{FolderRecord, MonitorError, SyncthingClient};

pub enum Reply {
    Json(Value),
    Unavailable,
    /// Held open until the sender fires (or is dropped, which fails the request).
    Gate(oneshot::Receiver<Value>),
}

/// Answers requests from per-route queues. A long-poll with nothing queued
/// hangs like an idle daemon; other routes with nothing queued return 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, route: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_json(&self, route: &str, value: Value) {
        self.push(route, Reply::Json(value));
    }

    /// Queue a long-poll reply that completes when the returned sender fires.
    pub fn push_gate(&self, route: &str) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.push(route, Reply::Gate(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, route: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| route_of(request) == route)
            .collect()
    }
}

/// `events/latest` for the cursor seed, `events` for long-polls,
/// `db/status/<id>` for folder status, otherwise the plain path.
pub fn route_of(request: &ApiRequest) -> String {
    match request.path.as_str() {
        "events" if request.query_param("limit").is_some() => "events/latest".to_string(),
        "db/status" => format!(
            "db/status/{}",
            request.query_param("folder").unwrap_or_default()
        ),
        other => other.to_string(),
    }
}

fn unavailable(path: &str) -> MonitorError {
    MonitorError::Status {
        path: path.to_string(),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: ApiRequest) -> Result<Value, MonitorError> {
        let route = route_of(&request);
        self.requests.lock().unwrap().push(request.clone());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|queue| queue.pop_front());

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Unavailable) => Err(unavailable(&request.path)),
            Some(Reply::Gate(rx)) => rx.await.map_err(|_| unavailable(&request.path)),
            None if route == "events" => std::future::pending().await,
            None => Err(MonitorError::Status {
                path: request.path,
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<FolderEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<FolderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn discovered(&self) -> Vec<FolderRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FolderEvent::Discovered(folder) => Some(folder),
                _ => None,
            })
            .collect()
    }

    pub fn state_changes(&self) -> Vec<FolderRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FolderEvent::StateChanged(folder) => Some(folder),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FolderEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl FolderObserver for RecordingObserver {
    fn on_folder_discovered(&self, folder: FolderRecord) {
        self.events.lock().unwrap().push(FolderEvent::Discovered(folder));
    }

    fn on_folder_state_changed(&self, folder: FolderRecord) {
        self.events.lock().unwrap().push(FolderEvent::StateChanged(folder));
    }

    fn on_error(&self, error: &MonitorError) {
        self.events
            .lock()
            .unwrap()
            .push(FolderEvent::Error(error.to_string()));
    }
}

pub fn fast_settings() -> StreamSettings {
    StreamSettings {
        long_poll_timeout: Duration::from_secs(60),
        request_timeout: Duration::from_secs(10),
        initial_backoff: Duration::from_millis(500),
        max_backoff: Duration::from_secs(4),
        max_attempts: None,
    }
}

pub fn client_with(
    transport: &Arc<ScriptedTransport>,
    observer: &Arc<RecordingObserver>,
    settings: StreamSettings,
) -> SyncthingClient {
    SyncthingClient::new(
        "http://127.0.0.1:8384",
        transport.clone(),
        observer.clone(),
        settings,
    )
}

/// Poll `check` until it holds, yielding to the runtime in between.
pub async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..2_000 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}
