use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::{
    types::{self, CompactArray, CompactNullableString, CompactString, Serialize as _, TagBuffer},
    ErrorCode, Response,
};

use super::HeaderV1;

/// https://kafka.apache.org/protocol.html#The_Messages_Produce
pub struct ProduceResponse {
    header: HeaderV1,
    topics: Vec<ProduceTopicResult>,
    throttle_time_ms: i32,
    bytes: BytesMut,
}

impl ProduceResponse {
    pub fn new(correlation_id: i32, topics: Vec<ProduceTopicResult>) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut resp = Self {
            header,
            topics,
            throttle_time_ms: 0,
            bytes: BytesMut::new(),
        };

        resp.serialize();
        resp
    }

    fn serialize(&mut self) {
        self.bytes.put(self.header.serialize());

        TagBuffer::write(&mut self.bytes);
        self.bytes.put(CompactArray::serialize(&mut self.topics));
        self.bytes.put_i32(self.throttle_time_ms);
        TagBuffer::write(&mut self.bytes);
    }
}

impl Response for ProduceResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct ProduceTopicResult {
    pub name: String,
    pub partitions: Vec<ProducePartitionResult>,
}

impl types::Serialize for ProduceTopicResult {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::new();
        b.put(CompactString::serialize(&self.name));
        b.put(CompactArray::serialize(&mut self.partitions));
        TagBuffer::write(&mut b);
        b.freeze()
    }
}

pub struct ProducePartitionResult {
    pub partition_index: i32,
    pub error_code: ErrorCode,
    pub base_offset: i64,
    pub log_start_offset: i64,
}

impl types::Serialize for ProducePartitionResult {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::new();
        b.put_i32(self.partition_index);
        b.put(self.error_code.serialize());
        b.put_i64(self.base_offset);
        b.put_i64(-1); // log_append_time: unknown, this broker keeps no wall-clock append time
        b.put_i64(self.log_start_offset);
        b.put(CompactArray::serialize(&mut Vec::<RecordErrorEntry>::new()));
        b.put(CompactNullableString::serialize(None));
        TagBuffer::write(&mut b);
        b.freeze()
    }
}

/// Per-record error entries within a partition result; this broker never produces any.
struct RecordErrorEntry;

impl types::Serialize for RecordErrorEntry {
    fn serialize(&mut self) -> Bytes {
        Bytes::new()
    }
}
