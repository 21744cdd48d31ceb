mod produce;
mod topic_partitions;

use std::fmt;

use anyhow::{Context, Result};
use bytes::Bytes;

use crate::metadata::MetadataStore;
use crate::protocol::{
    request::{
        api_versions::ApiVersionsRequest, describe_topic_partitions::DescribeTopicPartitionsRequest,
        produce::ProduceRequest,
    },
    ApiKey, Response,
};

/// The api key on the wire doesn't map to any `ApiKey` this broker implements. There is no
/// well-defined error response for a request we can't even dispatch, so the caller closes the
/// connection instead.
#[derive(Debug)]
pub struct UnsupportedApiKeyError(pub i16);

impl fmt::Display for UnsupportedApiKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported request api key: {}", self.0)
    }
}

impl std::error::Error for UnsupportedApiKeyError {}

pub fn process(
    raw_api_key: i16,
    store: &MetadataStore,
    msg: &mut Bytes,
) -> Result<Box<dyn Response + Send>> {
    let request_api_key =
        ApiKey::try_from(raw_api_key).map_err(|_| UnsupportedApiKeyError(raw_api_key))?;

    let response: Box<dyn Response + Send> = match request_api_key {
        ApiKey::ApiVersions => {
            let req =
                ApiVersionsRequest::from_bytes(msg).context("deserialize ApiVersionsRequest")?;
            Box::new(req.process())
        }
        ApiKey::DescribeTopicPartitions => {
            let req = DescribeTopicPartitionsRequest::from_bytes(msg)
                .context("deserialize DescribeTopicPartitionsRequest")?;
            Box::new(topic_partitions::process(req, store))
        }
        ApiKey::Produce => {
            let req = ProduceRequest::from_bytes(msg).context("deserialize ProduceRequest")?;
            Box::new(produce::process(req, store))
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};
    use crate::protocol::types::{CompactArray, CompactNullableString, CompactString, TagBuffer};

    fn header(api_key: i16, api_version: i16) -> BytesMut {
        let mut b = BytesMut::new();
        b.put_i16(api_key);
        b.put_i16(api_version);
        b.put_i32(1); // correlation_id
        b.put_i16(-1); // client_id: null
        TagBuffer::write(&mut b);
        b
    }

    #[test]
    fn unsupported_api_key_is_rejected_before_decoding() {
        let store = MetadataStore::default();
        let mut msg = header(999, 0).freeze();
        let err = process(999, &store, &mut msg).unwrap_err();
        assert!(err.downcast_ref::<UnsupportedApiKeyError>().is_some());
    }

    #[test]
    fn dispatches_api_versions() {
        let store = MetadataStore::default();
        let mut msg = header(18, 4);
        msg.extend_from_slice(&CompactString::serialize("kafka-cli"));
        msg.extend_from_slice(&CompactString::serialize("3.7.0"));
        TagBuffer::write(&mut msg);
        let mut msg = msg.freeze();

        let resp = process(18, &store, &mut msg).unwrap();
        let bytes = resp.as_bytes();
        assert_eq!(i32::from_be_bytes(bytes[0..4].try_into().unwrap()), 1);
    }

    #[test]
    fn dispatches_describe_topic_partitions() {
        let store = MetadataStore::default();
        let mut msg = header(75, 0);
        CompactArray::write_len(&mut msg, 1);
        msg.extend_from_slice(&CompactString::serialize("foo"));
        TagBuffer::write(&mut msg);
        msg.put_i32(1); // response_partition_limit
        msg.put_i8(-1); // cursor
        TagBuffer::write(&mut msg);
        let mut msg = msg.freeze();

        let resp = process(75, &store, &mut msg).unwrap();
        assert!(!resp.as_bytes().is_empty());
    }

    #[test]
    fn dispatches_produce() {
        let store = MetadataStore::default();
        let mut msg = header(0, 11);
        msg.extend_from_slice(&CompactNullableString::serialize(None));
        msg.put_i16(1); // acks
        msg.put_i32(1000); // timeout_ms
        CompactArray::write_len(&mut msg, 0); // no topics
        TagBuffer::write(&mut msg);
        let mut msg = msg.freeze();

        let resp = process(0, &store, &mut msg).unwrap();
        assert!(!resp.as_bytes().is_empty());
    }
}
