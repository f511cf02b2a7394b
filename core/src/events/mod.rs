pub mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

pub use crate::config::EventsOutConfig;
pub use writer::{start_event_sink, EventSinkTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentEventKind {
    TaskStart,
    TaskComplete,
    StepStart,
    StepComplete,
    Error,
    Screenshot,
    ApiCall,
}

/// One lifecycle event. Append-only stream; listeners see events for a task
/// in emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(rename = "type")]
    pub kind: AgentEventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    pub payload: Value,
}

impl AgentEvent {
    pub fn new(kind: AgentEventKind, task_id: Option<String>, payload: Value) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            task_id,
            step_id: None,
            payload,
        }
    }

}

/// In-process publish mechanism for lifecycle events: a broadcast channel for
/// live observers (CLI, HTTP server) plus an optional JSON-lines sink file.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AgentEvent>,
    sink: Option<EventSinkTx>,
}

impl EventBus {
    pub fn new(capacity: usize, sink: Option<EventSinkTx>) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, sink }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }

    /// Publish one event. Lagging or absent subscribers never fail the
    /// emitter; sink serialization errors are logged and swallowed.
    pub async fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.sink {
            match serde_json::to_string(&event) {
                Ok(line) => sink.send_line(line).await,
                Err(e) => tracing::warn!("failed to serialize event for sink: {e}"),
            }
        }
        // Err here only means no live subscribers.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_emission_order() {
        let bus = EventBus::new(16, None);
        let mut rx = bus.subscribe();

        for kind in [
            AgentEventKind::TaskStart,
            AgentEventKind::Error,
            AgentEventKind::TaskComplete,
        ] {
            bus.emit(AgentEvent::new(kind, Some("t1".into()), Value::Null))
                .await;
        }

        assert_eq!(rx.recv().await.unwrap().kind, AgentEventKind::TaskStart);
        assert_eq!(rx.recv().await.unwrap().kind, AgentEventKind::Error);
        assert_eq!(rx.recv().await.unwrap().kind, AgentEventKind::TaskComplete);
    }

    #[test]
    fn event_kind_wire_names() {
        let ev = AgentEvent::new(AgentEventKind::ApiCall, None, Value::Null);
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "api_call");
    }
}
