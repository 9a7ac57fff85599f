use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed action: {0}")]
    MalformedAction(#[source] serde_json::Error),
    #[error("malformed state snapshot: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),
    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),
}
