//! Asynchronous outbound webhook dispatch
//!
//! `dispatch_*` enqueues and returns; delivery runs on a fixed-size pool
//! of workers, each draining its own bounded queue. Chat jobs for one
//! session always land on the same worker, so dispatches for a session
//! execute in order and two assistant replies cannot interleave within a
//! turn. A full queue drops the event with a warning; nothing in here ever
//! fails the user action that triggered the event.

pub mod payload;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::WebhookConfig;
use crate::store::{ChatMessageRow, Store};

pub use payload::{ChatEvent, ContextEvent};

/// Statuses worth another attempt; anything else non-2xx is terminal.
const RETRYABLE_STATUS: [u16; 4] = [500, 502, 503, 504];

/// Sentinel reply meaning the peer kicked off a workflow without waiting
/// for a real answer.
const WORKFLOW_STARTED: &str = "Workflow was started";

/// Upper bound on the sleep between attempts; the doubling stops here.
const MAX_BACKOFF_SECS: u64 = 60;

#[derive(Debug)]
struct Job {
    url: String,
    timeout: Duration,
    payload: Value,
    /// Set for chat events: session to persist an assistant reply into.
    reply_session: Option<String>,
}

#[derive(Debug, Clone)]
struct RetryPolicy {
    max_attempts: u32,
    backoff_base_secs: u64,
}

pub struct Dispatcher {
    store: Arc<Store>,
    config: WebhookConfig,
    senders: Vec<mpsc::Sender<Job>>,
    next: AtomicUsize,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns the worker pool on the current tokio runtime.
    pub fn new(config: WebhookConfig, store: Arc<Store>) -> Self {
        let client = Client::new();
        let policy = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            backoff_base_secs: config.backoff_base_secs,
        };

        let count = config.workers.max(1);
        let mut senders = Vec::with_capacity(count);
        let mut workers = Vec::with_capacity(count);
        for _ in 0..count {
            let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
            senders.push(tx);
            workers.push(tokio::spawn(worker_loop(
                rx,
                client.clone(),
                store.clone(),
                policy.clone(),
            )));
        }

        Self {
            store,
            config,
            senders,
            next: AtomicUsize::new(0),
            workers,
        }
    }

    /// Fire a context event. Never blocks, never errors back to the
    /// mutation that triggered it.
    pub fn dispatch_context(&self, context_id: i64) {
        let url = match &self.config.context_url {
            Some(u) => u.clone(),
            None => {
                debug!(context_id, "context webhook not configured, skipping");
                return;
            }
        };

        let event = match payload::context_event(&self.store, context_id) {
            Ok(Some(e)) => e,
            Ok(None) => {
                warn!(context_id, "context gone before dispatch, skipping");
                return;
            }
            Err(err) => {
                warn!(context_id, %err, "failed to build context event");
                return;
            }
        };
        let body = match serde_json::to_value(&event) {
            Ok(v) => v,
            Err(err) => {
                warn!(context_id, %err, "failed to serialize context event");
                return;
            }
        };

        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        self.enqueue(
            index,
            Job {
                url,
                timeout: Duration::from_secs(self.config.context_timeout_secs),
                payload: body,
                reply_session: None,
            },
        );
    }

    /// Fire a chat event carrying the prior history. The caller persists
    /// the user message first; the assistant reply, if one comes back, is
    /// persisted by the delivery path.
    pub fn dispatch_chat(&self, session_id: &str, message: &str, history: &[ChatMessageRow]) {
        let url = match &self.config.chat_url {
            Some(u) => u.clone(),
            None => {
                debug!(session_id, "chat webhook not configured, skipping");
                return;
            }
        };

        let event = payload::chat_event(session_id, message, history);
        let body = match serde_json::to_value(&event) {
            Ok(v) => v,
            Err(err) => {
                warn!(session_id, %err, "failed to serialize chat event");
                return;
            }
        };

        // Same session, same worker: per-session dispatch order
        let mut hasher = DefaultHasher::new();
        session_id.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.senders.len();

        self.enqueue(
            index,
            Job {
                url,
                timeout: Duration::from_secs(self.config.chat_timeout_secs),
                payload: body,
                reply_session: Some(session_id.to_string()),
            },
        );
    }

    fn enqueue(&self, index: usize, job: Job) {
        match self.senders[index].try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(url = %job.url, "webhook queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(url = %job.url, "dispatcher stopped, dropping event");
            }
        }
    }

    /// Close the queues and wait for in-flight deliveries to finish.
    pub async fn shutdown(mut self) {
        self.senders.clear();
        for handle in self.workers.drain(..) {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(
    mut rx: mpsc::Receiver<Job>,
    client: Client,
    store: Arc<Store>,
    policy: RetryPolicy,
) {
    while let Some(job) = rx.recv().await {
        deliver(&client, &store, &policy, job).await;
    }
}

/// One dispatch: up to `max_attempts` POSTs with exponential backoff in
/// between. Exhaustion is logged and swallowed.
async fn deliver(client: &Client, store: &Store, policy: &RetryPolicy, job: Job) {
    let max = policy.max_attempts;
    for attempt in 1..=max {
        let result = client
            .post(&job.url)
            .timeout(job.timeout)
            .json(&job.payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!(url = %job.url, attempt, "webhook delivered");
                    if let Some(session_id) = &job.reply_session {
                        handle_chat_reply(store, session_id, response).await;
                    }
                    return;
                }
                if !RETRYABLE_STATUS.contains(&status.as_u16()) {
                    warn!(url = %job.url, %status, "webhook rejected, not retrying");
                    return;
                }
                warn!(url = %job.url, %status, attempt, "retryable webhook failure");
            }
            Err(err) => {
                warn!(url = %job.url, attempt, %err, "webhook transport failure");
            }
        }

        if attempt < max {
            // doubles per attempt; the capped shift keeps arbitrary
            // max_attempts settings from overflowing
            let backoff =
                (policy.backoff_base_secs << (attempt - 1).min(6)).min(MAX_BACKOFF_SECS);
            tokio::time::sleep(Duration::from_secs(backoff)).await;
        }
    }
    warn!(url = %job.url, attempts = max, "webhook delivery failed, giving up");
}

/// Persist the peer's answer as an assistant message, if it sent one.
async fn handle_chat_reply(store: &Store, session_id: &str, response: reqwest::Response) {
    let body: Value = match response.json().await {
        Ok(v) => v,
        Err(err) => {
            warn!(session_id, %err, "unparseable chat reply body, ignoring");
            return;
        }
    };

    match reply_text(&body) {
        Some(text) if !text.is_empty() => {
            if let Err(err) = store.add_chat_message(session_id, "assistant", &text) {
                warn!(session_id, %err, "failed to persist assistant reply");
            }
        }
        _ => debug!(session_id, "chat reply carried no answer"),
    }
}

/// Reply interpretation, in precedence order: the workflow-started
/// sentinel means no answer; then the first non-empty of `response`,
/// `output`, `text`; then the whole body serialized. Replies shaped
/// differently than expected still surface rather than getting lost.
fn reply_text(body: &Value) -> Option<String> {
    if body.get("message").and_then(Value::as_str) == Some(WORKFLOW_STARTED) {
        return None;
    }

    for field in ["response", "output", "text"] {
        if let Some(text) = body.get(field).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    Some(body.to_string())
}
