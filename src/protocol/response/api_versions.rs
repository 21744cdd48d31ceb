use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::{
    types::{self, CompactArray, TagBuffer},
    ApiKey, ErrorCode, Response,
};

use super::HeaderV0;

// The APIVersions response uses the "v0" header format: 4 bytes, just correlation_id.
// https://kafka.apache.org/protocol.html#protocol_messages
// https://kafka.apache.org/protocol.html#The_Messages_ApiVersions
pub struct ApiVersionsResponse {
    header: HeaderV0,
    error_code: ErrorCode,
    api_keys_vec: Vec<ApiVersionsApiKeys>,
    throttle_time_ms: i32,
    bytes: BytesMut,
}

/// Version range this broker supports for each API key it implements.
pub const API_VERSIONS_RANGE: (i16, i16) = (0, 4);
pub const DESCRIBE_TOPIC_PARTITIONS_RANGE: (i16, i16) = (0, 0);
pub const PRODUCE_RANGE: (i16, i16) = (0, 11);

impl ApiVersionsResponse {
    pub fn new(correlation_id: i32, request_api_version: i16) -> Self {
        let header = HeaderV0::new(correlation_id);

        let api_keys_vec = vec![
            ApiVersionsApiKeys {
                api_key: ApiKey::ApiVersions,
                min_version: API_VERSIONS_RANGE.0,
                max_version: API_VERSIONS_RANGE.1,
            },
            ApiVersionsApiKeys {
                api_key: ApiKey::DescribeTopicPartitions,
                min_version: DESCRIBE_TOPIC_PARTITIONS_RANGE.0,
                max_version: DESCRIBE_TOPIC_PARTITIONS_RANGE.1,
            },
            ApiVersionsApiKeys {
                api_key: ApiKey::Produce,
                min_version: PRODUCE_RANGE.0,
                max_version: PRODUCE_RANGE.1,
            },
        ];

        let error_code = if request_api_version <= API_VERSIONS_RANGE.1 {
            ErrorCode::None
        } else {
            ErrorCode::UnsupportedVersion
        };

        let mut resp = Self {
            header,
            error_code,
            api_keys_vec,
            throttle_time_ms: 0,
            bytes: BytesMut::new(),
        };

        resp.serialize();
        resp
    }

    /// Fills the internal `bytes` field with byte representation of the response
    // https://kafka.apache.org/protocol.html#The_Messages_ApiVersions
    fn serialize(&mut self) {
        self.bytes.put(self.header.serialize());

        self.bytes.put_i16(self.error_code.into());
        self.bytes
            .put(CompactArray::serialize(&mut self.api_keys_vec));
        self.bytes.put_i32(self.throttle_time_ms);
        TagBuffer::write(&mut self.bytes);
    }
}

impl Response for ApiVersionsResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct ApiVersionsApiKeys {
    pub api_key: ApiKey,
    pub min_version: i16,
    pub max_version: i16,
}

impl types::Serialize for ApiVersionsApiKeys {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::new();
        b.put_i16(self.api_key.into());
        b.put_i16(self.min_version);
        b.put_i16(self.max_version);
        TagBuffer::write(&mut b);
        b.freeze()
    }
}
