use rdkafka::error::KafkaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Operation invoked outside of the `init` .. `close` window
    #[error("{component} is {state}, cannot {operation}")]
    ProcessorState {
        component: &'static str,
        state: &'static str,
        operation: &'static str,
    },

    #[error("store '{store}' unavailable: {reason}")]
    Store { store: String, reason: String },

    #[error("format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid value '{value}' for config key '{key}'")]
    Config { key: String, value: String },

    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("sink closed")]
    SinkClosed,
}
