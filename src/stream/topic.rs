use std::marker::PhantomData;

use bytes::Bytes;
use rdkafka::config::FromClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;

use crate::error::Result;
use crate::format::Format;
use crate::process::{Record, RecordMetadata};
use crate::stream::KStream;
use crate::table::Change;
use crate::Config;

impl RecordMetadata {
    pub fn from_message<M: Message>(message: &M) -> Self {
        RecordMetadata {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        }
    }
}

/// Turns a changelog message into a table change.
///
/// A message without a key becomes a keyless record, one without a payload is
/// a delete. Old values are not known at this point.
pub fn decode_table_record<KF, VF, M>(message: &M) -> Result<Record<KF::Item, Change<VF::Item>>>
where
    KF: Format,
    VF: Format,
    M: Message,
{
    let key = message.key().map(KF::deserialize).transpose()?;
    let value = message.payload().map(VF::deserialize).transpose()?;
    Ok(Record {
        key,
        value: Change::new(value, None, true),
        timestamp: message.timestamp().to_millis().unwrap_or(0),
        metadata: Some(RecordMetadata::from_message(message)),
    })
}

/// Key and payload bytes for a forwarded change, a delete becomes a tombstone
pub fn encode_change<KF, VF>(record: &Record<KF::Item, Change<VF::Item>>) -> Result<(Option<Bytes>, Option<Bytes>)>
where
    KF: Format,
    VF: Format,
{
    let key = record.key.as_ref().map(KF::serialize).transpose()?;
    let payload = record.value.new_value.as_ref().map(VF::serialize).transpose()?;
    Ok((key, payload))
}

/// Changelog topic read as a stream of table changes
pub struct TopicStream<KF, VF> {
    consumer: StreamConsumer,
    _marker: PhantomData<(KF, VF)>,
}

impl<KF: Format, VF: Format> TopicStream<KF, VF> {
    pub fn subscribe(cfg: &Config, topic: &str) -> Result<Self> {
        let consumer: StreamConsumer = StreamConsumer::from_config(&cfg.0)?;
        consumer.subscribe(&[topic])?;
        trace!("Subscribed to {}", topic);
        Ok(TopicStream {
            consumer,
            _marker: PhantomData,
        })
    }
}

#[async_trait(?Send)]
impl<KF, VF> KStream for TopicStream<KF, VF>
where
    KF: Format + 'static,
    VF: Format + 'static,
{
    type Key = KF::Item;
    type Value = Change<VF::Item>;

    async fn next(&mut self) -> Result<Option<Record<Self::Key, Self::Value>>> {
        let message = self.consumer.recv().await?;
        decode_table_record::<KF, VF, _>(&message).map(Some)
    }
}
