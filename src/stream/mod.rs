use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::process::Record;

pub mod topic;

/// KStream represents a stream of records
/// Each record having a timestamp
#[async_trait(?Send)]
pub trait KStream {
    type Key;
    type Value;

    /// `None` once the stream is exhausted
    async fn next(&mut self) -> Result<Option<Record<Self::Key, Self::Value>>>;
}

#[async_trait(?Send)]
pub trait KSink {
    type Key;
    type Value;

    async fn send_next(&mut self, record: Record<Self::Key, Self::Value>) -> Result<()>;
}

/// Records handed over by another stage through a channel
pub struct ChannelStream<K, V> {
    rx: mpsc::Receiver<Record<K, V>>,
}

impl<K, V> ChannelStream<K, V> {
    pub fn new(rx: mpsc::Receiver<Record<K, V>>) -> Self {
        ChannelStream { rx }
    }
}

#[async_trait(?Send)]
impl<K: 'static, V: 'static> KStream for ChannelStream<K, V> {
    type Key = K;
    type Value = V;

    async fn next(&mut self) -> Result<Option<Record<K, V>>> {
        Ok(self.rx.recv().await)
    }
}

/// Adapts any `futures` stream of records
pub struct FromStream<S> {
    inner: S,
}

impl<S> FromStream<S> {
    pub fn new(inner: S) -> Self {
        FromStream { inner }
    }
}

#[async_trait(?Send)]
impl<S, K: 'static, V: 'static> KStream for FromStream<S>
where
    S: Stream<Item = Record<K, V>> + Unpin + 'static,
{
    type Key = K;
    type Value = V;

    async fn next(&mut self) -> Result<Option<Record<K, V>>> {
        Ok(self.inner.next().await)
    }
}

pub struct ChannelSink<K, V> {
    tx: mpsc::Sender<Record<K, V>>,
}

impl<K, V> ChannelSink<K, V> {
    pub fn new(tx: mpsc::Sender<Record<K, V>>) -> Self {
        ChannelSink { tx }
    }
}

#[async_trait(?Send)]
impl<K: 'static, V: 'static> KSink for ChannelSink<K, V> {
    type Key = K;
    type Value = V;

    async fn send_next(&mut self, record: Record<K, V>) -> Result<()> {
        self.tx.send(record).await.map_err(|_| Error::SinkClosed)
    }
}

#[async_trait(?Send)]
impl<K: 'static, V: 'static> KSink for Vec<Record<K, V>> {
    type Key = K;
    type Value = V;

    async fn send_next(&mut self, record: Record<K, V>) -> Result<()> {
        self.push(record);
        Ok(())
    }
}
