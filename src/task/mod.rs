use crate::error::Result;
use crate::metrics::StreamsMetrics;
use crate::process::{Processor, ProcessorContext, TaskId};
use crate::stream::{KSink, KStream};
use crate::Config;

/// Task is a base unit of computation.
/// Each task executes within a single thread and is bound to one partition;
/// records are pushed through its processor strictly one at a time.
pub struct Task {
    cfg: Config,
    name: String,
    task_id: TaskId,
    metrics: StreamsMetrics,
}

/// What happened to the records a task consumed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub consumed: u64,
    pub forwarded: u64,
}

impl Task {
    pub fn new(cfg: Config, name: &str, task_id: TaskId) -> Result<Self> {
        Ok(Task {
            cfg,
            name: name.to_string(),
            task_id,
            metrics: StreamsMetrics::new()?,
        })
    }

    /// Share a metrics registry with other tasks
    pub fn with_metrics(mut self, metrics: StreamsMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &StreamsMetrics {
        &self.metrics
    }

    pub fn context(&self) -> ProcessorContext {
        ProcessorContext::new(&self.cfg, self.task_id, self.metrics.clone())
    }

    /// Runs `processor` until `source` is exhausted.
    ///
    /// The processor is closed on the way out, also when its `init`, the
    /// source, the processor or the sink fails.
    pub async fn run<S, P, O>(&self, mut source: S, mut processor: P, mut sink: O) -> Result<TaskStats>
    where
        S: KStream<Key = P::KeyIn, Value = P::ValueIn>,
        P: Processor,
        O: KSink<Key = P::KeyOut, Value = P::ValueOut>,
    {
        if let Err(e) = processor.init(&self.context()) {
            error!("Task {} failed to initialize: {}", self.name, e);
            processor.close();
            return Err(e);
        }
        info!("Task {} ({}) started", self.name, self.task_id);

        let result = Self::pump(&mut source, &mut processor, &mut sink).await;
        processor.close();

        match &result {
            Ok(stats) => info!("Task {} finished, {:?}", self.name, stats),
            Err(e) => error!("Task {} failed: {}", self.name, e),
        }
        result
    }

    async fn pump<S, P, O>(source: &mut S, processor: &mut P, sink: &mut O) -> Result<TaskStats>
    where
        S: KStream<Key = P::KeyIn, Value = P::ValueIn>,
        P: Processor,
        O: KSink<Key = P::KeyOut, Value = P::ValueOut>,
    {
        let mut stats = TaskStats::default();
        while let Some(record) = source.next().await? {
            stats.consumed += 1;
            if let Some(out) = processor.process(record)? {
                trace!("Forwarding record at {}", out.timestamp);
                sink.send_next(out).await?;
                stats.forwarded += 1;
            }
        }
        Ok(stats)
    }
}
