use crate::engine::events::{ExecutionEvent, ExecutionEventKind};
use crate::engine::sink::EventSink;

/// In-memory sink holding the transitions of a single routed request.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Vec<ExecutionEvent>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ExecutionEvent] {
        &self.events
    }

    /// Event kinds in emission order, without ids or timestamps.
    pub fn kinds(&self) -> Vec<ExecutionEventKind> {
        self.events.iter().map(|e| e.kind.clone()).collect()
    }

    pub fn into_events(self) -> Vec<ExecutionEvent> {
        self.events
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&mut self, event: ExecutionEvent) {
        self.events.push(event);
    }
}
