// token-core/src/events.rs

//! Engine event envelope and the observer list that fans events out.
//!
//! Every component emits through the same `EventBus`. Subscribers are invoked
//! one by one; a subscriber that returns an error or panics is logged and
//! skipped, the remaining subscribers still run and the emitting operation
//! still gets its event back.

use crate::{Amount, HealthStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Default number of events retained for auditing
pub const DEFAULT_HISTORY_LIMIT: usize = 1_000;

/// Broad grouping used by downstream alert routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Launch,
    Liquidity,
    Simulation,
    Risk,
}

/// One alerting metric inside a health alert event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotice {
    pub metric: String,
    pub status: HealthStatus,
    pub message: String,
}

/// Strongly typed payloads for every event the engine can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventPayload {
    PhaseCompleted {
        phase: String,
        next_phase: String,
        total_raised: Amount,
        participants: u64,
    },
    TgeExecuted {
        price: f64,
        market_cap: f64,
        fully_diluted_valuation: f64,
        circulating_supply: Amount,
    },
    FlywheelPhaseChanged {
        from_stage: u8,
        to_stage: u8,
        from_name: String,
        to_name: String,
        tvl: Amount,
    },
    HealthAlert {
        overall: HealthStatus,
        alerts: Vec<AlertNotice>,
    },
    StressTestTriggered {
        scenario: String,
        survived: bool,
        circuit_breakers: Vec<String>,
        drawdown: f64,
    },
    SimulationCompleted {
        scenario: String,
        years: u32,
        iterations: u32,
        final_price: f64,
        seed: u64,
    },
}

impl EventPayload {
    pub fn category(&self) -> EventCategory {
        match self {
            EventPayload::PhaseCompleted { .. } | EventPayload::TgeExecuted { .. } => {
                EventCategory::Launch
            }
            EventPayload::FlywheelPhaseChanged { .. } | EventPayload::HealthAlert { .. } => {
                EventCategory::Liquidity
            }
            EventPayload::SimulationCompleted { .. } => EventCategory::Simulation,
            EventPayload::StressTestTriggered { .. } => EventCategory::Risk,
        }
    }

    /// Stable name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::PhaseCompleted { .. } => "phase_completed",
            EventPayload::TgeExecuted { .. } => "tge_executed",
            EventPayload::FlywheelPhaseChanged { .. } => "flywheel_phase_changed",
            EventPayload::HealthAlert { .. } => "health_alert",
            EventPayload::StressTestTriggered { .. } => "stress_test_triggered",
            EventPayload::SimulationCompleted { .. } => "simulation_completed",
        }
    }
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// Monotonic id assigned by the bus
    pub id: u64,
    /// Emission time
    pub timestamp: DateTime<Utc>,
    /// Typed payload
    pub payload: EventPayload,
}

impl EngineEvent {
    pub fn category(&self) -> EventCategory {
        self.payload.category()
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(u64);

type SubscriberFn = dyn Fn(&EngineEvent) -> anyhow::Result<()> + Send + Sync;

/// Observer list with isolated invocation and a bounded audit history
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriberId, Arc<SubscriberFn>)>>,
    history: Mutex<VecDeque<EngineEvent>>,
    history_limit: usize,
    next_event_id: AtomicU64,
    next_subscriber_id: AtomicU64,
}

impl EventBus {
    /// Create a bus with the default history window
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a bus retaining at most `history_limit` events
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::with_capacity(history_limit.min(DEFAULT_HISTORY_LIMIT))),
            history_limit,
            next_event_id: AtomicU64::new(1),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Convenience constructor for sharing between components
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a subscriber
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&EngineEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Stamp, record and fan out an event
    pub fn emit(&self, payload: EventPayload) -> EngineEvent {
        let event = EngineEvent {
            id: self.next_event_id.fetch_add(1, Ordering::Relaxed),
            timestamp: Utc::now(),
            payload,
        };

        self.record(&event);

        // Snapshot the list so callbacks may (un)subscribe without deadlocking
        let subscribers: Vec<(SubscriberId, Arc<SubscriberFn>)> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        tracing::debug!(
            "Emitting {} event #{} to {} subscribers",
            event.payload.kind(),
            event.id,
            subscribers.len()
        );

        for (id, callback) in subscribers {
            match catch_unwind(AssertUnwindSafe(|| callback(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        "Subscriber {:?} failed on {} event #{}: {}",
                        id,
                        event.payload.kind(),
                        event.id,
                        err
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        "Subscriber {:?} panicked on {} event #{}",
                        id,
                        event.payload.kind(),
                        event.id
                    );
                }
            }
        }

        event
    }

    fn record(&self, event: &EngineEvent) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push_back(event.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    /// Most recent `n` events, oldest first
    pub fn recent(&self, n: usize) -> Vec<EngineEvent> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let skip = history.len().saturating_sub(n);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("history_len", &self.history_len())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
