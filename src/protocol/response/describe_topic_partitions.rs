use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::{
    types::{self, CompactArray, CompactString, Serialize as _, TagBuffer, Uuid},
    ErrorCode, Response,
};

use super::HeaderV1;

pub struct DescribeTopicPartitionsResponse {
    header: HeaderV1,
    throttle_time_ms: i32,
    topics: Vec<Topic>,
    next_cursor: i8,
    bytes: BytesMut,
}

impl DescribeTopicPartitionsResponse {
    pub fn new(correlation_id: i32, topics: Vec<Topic>) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut resp = Self {
            header,
            throttle_time_ms: 0,
            topics,
            next_cursor: -1,
            bytes: BytesMut::new(),
        };

        resp.serialize();
        resp
    }

    /// Fills the internal `bytes` field with byte representation of the response
    // https://kafka.apache.org/protocol.html#The_Messages_DescribeTopicPartitions
    fn serialize(&mut self) {
        self.bytes.put(self.header.serialize());

        self.bytes.put_i32(self.throttle_time_ms);
        self.bytes.put(CompactArray::serialize(&mut self.topics));
        self.bytes.put_i8(self.next_cursor);
        TagBuffer::write(&mut self.bytes);
    }
}

impl Response for DescribeTopicPartitionsResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct Topic {
    pub error_code: ErrorCode,
    pub name: String,
    pub topic_id: Uuid,
    pub is_internal: bool,
    pub partitions: Vec<Partition>,
    pub topic_authorized_operations: i32,
}

impl types::Serialize for Topic {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::new();
        b.put(self.error_code.serialize());
        b.put(CompactString::serialize(&self.name));
        b.put(self.topic_id.serialize());
        b.put_u8(self.is_internal.into());
        b.put(CompactArray::serialize(&mut self.partitions));
        b.put_i32(self.topic_authorized_operations);
        TagBuffer::write(&mut b);
        b.freeze()
    }
}

/// A single partition entry in a `DescribeTopicPartitions` response. Only `replica_nodes`
/// comes from the metadata store - the broker tracks no in-sync-replica, eligible-leader,
/// or offline-replica state, so those arrays are always empty.
pub struct Partition {
    pub error_code: ErrorCode,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: Vec<i32>,
}

fn serialize_i32_array(items: &[i32]) -> Bytes {
    CompactArray::serialize_primitive(items, |dst, v| dst.put_i32(v))
}

impl types::Serialize for Partition {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::new();
        b.put(self.error_code.serialize());
        b.put_i32(self.partition_index);
        b.put_i32(self.leader_id);
        b.put_i32(self.leader_epoch);
        b.put(serialize_i32_array(&self.replica_nodes));
        b.put(serialize_i32_array(&[])); // isr_nodes
        b.put(serialize_i32_array(&[])); // eligible_leader_replicas
        b.put(serialize_i32_array(&[])); // last_known_elr
        b.put(serialize_i32_array(&[])); // offline_replicas
        TagBuffer::write(&mut b);
        b.freeze()
    }
}
