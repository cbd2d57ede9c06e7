use std::fmt;

use crate::error::Result;
use crate::metrics::{Sensor, StreamsMetrics};
use crate::Config;

/// Task a processor instance is bound to: one subtopology on one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub subtopology: u32,
    pub partition: i32,
}

impl TaskId {
    pub fn new(subtopology: u32, partition: i32) -> Self {
        TaskId { subtopology, partition }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.subtopology, self.partition)
    }
}

/// Position of the input record in its source topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl fmt::Display for RecordMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic=[{}] partition=[{}] offset=[{}]", self.topic, self.partition, self.offset)
    }
}

/// Unit flowing between processors.
///
/// The key is optional because upstream topics may carry records without one;
/// processors that need a key decide what to do with those.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<K, V> {
    pub key: Option<K>,
    pub value: V,
    pub timestamp: i64,
    pub metadata: Option<RecordMetadata>,
}

impl<K, V> Record<K, V> {
    pub fn new(key: K, value: V, timestamp: i64) -> Self {
        Record {
            key: Some(key),
            value,
            timestamp,
            metadata: None,
        }
    }

    pub fn keyless(value: V, timestamp: i64) -> Self {
        Record {
            key: None,
            value,
            timestamp,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Same key, timestamp and metadata, different value
    pub fn with_value<V2>(self, value: V2) -> Record<K, V2> {
        Record {
            key: self.key,
            value,
            timestamp: self.timestamp,
            metadata: self.metadata,
        }
    }
}

/// Runtime handles a processor resolves during `init`
#[derive(Debug, Clone)]
pub struct ProcessorContext {
    client_id: String,
    task_id: TaskId,
    metrics: StreamsMetrics,
}

impl ProcessorContext {
    pub fn new(cfg: &Config, task_id: TaskId, metrics: StreamsMetrics) -> Self {
        ProcessorContext {
            client_id: cfg.client_id().to_string(),
            task_id,
            metrics,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn metrics(&self) -> &StreamsMetrics {
        &self.metrics
    }

    pub fn dropped_records_sensor(&self) -> Sensor {
        self.metrics.dropped_records_sensor(&self.client_id, self.task_id)
    }
}

/// Push stage of a topology.
///
/// Driven sequentially by its task: `init` once, then `process` per record,
/// then `close` once. Each input yields at most one output record.
pub trait Processor {
    type KeyIn;
    type ValueIn;
    type KeyOut;
    type ValueOut;

    fn init(&mut self, context: &ProcessorContext) -> Result<()>;

    fn process(
        &mut self,
        record: Record<Self::KeyIn, Self::ValueIn>,
    ) -> Result<Option<Record<Self::KeyOut, Self::ValueOut>>>;

    fn close(&mut self);
}
