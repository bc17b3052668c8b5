use crate::engine::events::ExecutionEvent;

/// Receives router transitions as they happen.
pub trait EventSink: Send {
    fn emit(&mut self, event: ExecutionEvent);
}

/// Sink for callers that only want the result.
#[derive(Debug, Default)]
pub struct DiscardingEventSink;

impl EventSink for DiscardingEventSink {
    fn emit(&mut self, _event: ExecutionEvent) {}
}
