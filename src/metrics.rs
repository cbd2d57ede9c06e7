use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::error::Result;
use crate::process::TaskId;

pub const DROPPED_RECORDS: &str = "ktjoin_dropped_records_total";

/// Counter recorded once per event
#[derive(Debug, Clone)]
pub struct Sensor {
    counter: IntCounter,
}

impl Sensor {
    pub fn record(&self) {
        self.counter.inc();
    }

    pub fn count(&self) -> u64 {
        self.counter.get()
    }
}

/// Task level metrics, labelled by thread (client id) and task.
///
/// Cloning shares the underlying counters; asking twice for the same labels
/// returns the same sensor.
#[derive(Debug, Clone)]
pub struct StreamsMetrics {
    dropped_records: IntCounterVec,
}

impl StreamsMetrics {
    /// Metrics registered into a private registry
    pub fn new() -> Result<Self> {
        Self::register_into(&Registry::new())
    }

    pub fn register_into(registry: &Registry) -> Result<Self> {
        let dropped_records = IntCounterVec::new(
            Opts::new(DROPPED_RECORDS, "Records dropped by join processors, null keys and stale updates"),
            &["thread", "task"],
        )?;
        registry.register(Box::new(dropped_records.clone()))?;
        trace!("Registered {}", DROPPED_RECORDS);
        Ok(StreamsMetrics { dropped_records })
    }

    pub fn dropped_records_sensor(&self, thread: &str, task: TaskId) -> Sensor {
        let task = task.to_string();
        Sensor {
            counter: self.dropped_records.with_label_values(&[thread, task.as_str()]),
        }
    }
}
