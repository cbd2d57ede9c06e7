use std::marker::PhantomData;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::format::Format;

#[derive(Debug)]
pub struct JSON<T>(pub(crate) PhantomData<T>);

impl<T: Serialize + DeserializeOwned> Format for JSON<T> {
    type Item = T;

    fn serialize(v: &T) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(v)?))
    }

    fn deserialize(v: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(v)?)
    }
}
