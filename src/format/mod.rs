use bytes::Bytes;
use std::marker::PhantomData;

use crate::error::Result;

pub mod json;

use json::JSON;

/// Serialization of keys and values crossing a topic boundary
pub trait Format {
    type Item;
    fn serialize(v: &Self::Item) -> Result<Bytes>;
    fn deserialize(v: &[u8]) -> Result<Self::Item>;
}

pub fn json<T>() -> JSON<T> {
    JSON(PhantomData)
}
