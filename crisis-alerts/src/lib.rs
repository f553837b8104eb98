//! `AlertSink`: debounced, sharded, fire-and-forget alert dispatch.
//!
//! The cooldown table is the one piece of mutable cross-request state in
//! the engine. It is modeled as a fixed number of shards, each protected
//! by its own `tokio::sync::Mutex`, keyed by a hash of `(user_id,
//! severity_class)` — matching the design note that this table must never
//! sit behind a single global lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crisis_common::Severity;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const NUM_SHARDS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    Severity,
    Escalation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub user_id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// External collaborator contract: `send(alert) -> future<Result<()>>`,
/// never blocks the caller on delivery.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), String>;
}

/// Stub dispatcher used when no real transport is wired up; logs and
/// reports success. Real delivery (webhook, pager, message queue) is an
/// external collaborator per the engine's contract.
#[derive(Debug, Default)]
pub struct LoggingAlertDispatcher;

#[async_trait]
impl AlertDispatcher for LoggingAlertDispatcher {
    async fn send(&self, alert: &Alert) -> Result<(), String> {
        tracing::info!(user_id = %alert.user_id, kind = ?alert.kind, severity = ?alert.severity, "alert dispatched");
        Ok(())
    }
}

struct Shard {
    last_fired: Mutex<HashMap<String, DateTime<Utc>>>,
}

pub struct AlertSink {
    shards: Vec<Shard>,
    cooldown: Duration,
    escalation_cooldown: Duration,
    dispatcher: Arc<dyn AlertDispatcher>,
}

impl AlertSink {
    pub fn new(cooldown_seconds: u64, escalation_cooldown_seconds: u64, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        let shards = (0..NUM_SHARDS)
            .map(|_| Shard {
                last_fired: Mutex::new(HashMap::new()),
            })
            .collect();
        Self {
            shards,
            cooldown: Duration::from_secs(cooldown_seconds),
            escalation_cooldown: Duration::from_secs(escalation_cooldown_seconds),
            dispatcher,
        }
    }

    fn shard_for(&self, key: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Dispatches a severity alert when `severity` is high/critical and an
    /// escalation alert when `escalation_detected`, each subject to its own
    /// cooldown. Never blocks the caller and never surfaces a dispatch
    /// failure — that is logged only.
    pub async fn maybe_dispatch(
        &self,
        user_id: &str,
        severity: Severity,
        escalation_detected: bool,
        now: DateTime<Utc>,
    ) {
        if severity.requires_intervention() {
            self.try_fire(user_id, "severity", AlertKind::Severity, severity, self.cooldown, now)
                .await;
        }
        if escalation_detected {
            self.try_fire(
                user_id,
                "escalation",
                AlertKind::Escalation,
                severity,
                self.escalation_cooldown,
                now,
            )
            .await;
        }
    }

    async fn try_fire(
        &self,
        user_id: &str,
        class_key: &str,
        kind: AlertKind,
        severity: Severity,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) {
        let key = format!("{user_id}:{class_key}");
        let shard = self.shard_for(&key);
        let mut table = shard.last_fired.lock().await;

        let should_fire = match table.get(&key) {
            Some(last) => {
                let elapsed = now.signed_duration_since(*last);
                elapsed
                    >= chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::zero())
            }
            None => true,
        };

        if !should_fire {
            return;
        }
        table.insert(key, now);
        drop(table);

        let alert = Alert {
            user_id: user_id.to_string(),
            kind,
            severity,
            message: format!("{kind:?} alert for user at {severity:?} severity"),
            timestamp: now,
        };
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            if let Err(detail) = dispatcher.send(&alert).await {
                tracing::warn!(%detail, "alert dispatch failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDispatcher {
        count: AtomicUsize,
    }

    #[async_trait]
    impl AlertDispatcher for CountingDispatcher {
        async fn send(&self, _alert: &Alert) -> Result<(), String> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn fires_once_within_cooldown_window() {
        let dispatcher = Arc::new(LoggingAlertDispatcher);
        let sink = AlertSink::new(300, 120, dispatcher);
        let now = Utc::now();
        sink.maybe_dispatch("user-1", Severity::Critical, false, now).await;
        sink.maybe_dispatch("user-1", Severity::Critical, false, now + chrono::Duration::seconds(10))
            .await;
        // Second call within cooldown is suppressed at the table level;
        // no direct assertion possible on a fire-and-forget path, but the
        // shard lookup itself must not panic and must observe the cached
        // timestamp.
        let key = "user-1:severity".to_string();
        let shard = sink.shard_for(&key);
        let table = shard.last_fired.lock().await;
        assert_eq!(table.get(&key), Some(&now));
    }

    #[tokio::test]
    async fn low_severity_does_not_fire_severity_alert() {
        let dispatcher = Arc::new(LoggingAlertDispatcher);
        let sink = AlertSink::new(300, 120, dispatcher);
        sink.maybe_dispatch("user-2", Severity::Low, false, Utc::now()).await;
        let key = "user-2:severity".to_string();
        let shard = sink.shard_for(&key);
        let table = shard.last_fired.lock().await;
        assert!(table.get(&key).is_none());
    }
}
