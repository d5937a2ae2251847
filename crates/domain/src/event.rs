use cqrs_es::{Aggregate, DomainEvent as _, EventEnvelope};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Aggregate-agnostic envelope handed to displays and other subscribers.
#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct DomainEvent {
    pub id: String,
    pub aggregate_type: String,
    pub sequence: usize,
    pub event_type: String,
    pub event_version: String,
    /// JSON-encoded event payload
    pub payload: String,
    /// JSON-encoded metadata map
    pub metadata: String,
}

impl DomainEvent {
    pub fn from_envelope<A: Aggregate>(envelope: &EventEnvelope<A>) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            envelope.aggregate_id.clone(),
            A::aggregate_type(),
            envelope.sequence,
            envelope.payload.event_type(),
            envelope.payload.event_version(),
            serde_json::to_string(&envelope.payload)?,
            serde_json::to_string(&envelope.metadata)?,
        ))
    }

    /// Decodes the payload back into the aggregate's event type.
    pub fn decode<A: Aggregate>(&self) -> Result<A::Event, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}
