pub mod api_versions;
pub mod describe_topic_partitions;
pub mod produce;

use anyhow::Result;
use bytes::{Buf, Bytes};

use super::types::{NullableString, TagBuffer};

/// Request Header v2 (flexible). Both APIs in this broker's scope share this on-wire prefix
/// for decoding purposes, so one struct covers both.
// https://kafka.apache.org/protocol.html#protocol_messages
#[derive(Debug)]
#[allow(dead_code)]
pub struct HeaderV2 {
    pub request_api_key: i16,
    pub request_api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

impl HeaderV2 {
    pub fn from_bytes(src: &mut Bytes) -> Result<Self> {
        let request_api_key = src.get_i16(); // https://kafka.apache.org/protocol.html#protocol_api_keys
        let request_api_version = src.get_i16();
        let correlation_id = src.get_i32();
        let client_id = NullableString::deserialize(src);
        TagBuffer::skip(src)?;

        Ok(Self {
            request_api_key,
            request_api_version,
            correlation_id,
            client_id,
        })
    }
}
