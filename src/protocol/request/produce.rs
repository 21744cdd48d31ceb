use anyhow::Result;
use bytes::{Buf, Bytes};

use crate::protocol::types::{CompactArray, CompactBytes, CompactNullableString, CompactString, TagBuffer};

use super::HeaderV2;

/// https://kafka.apache.org/protocol.html#The_Messages_Produce
#[derive(Debug)]
#[allow(dead_code)]
pub struct ProduceRequest {
    pub header: HeaderV2,
    pub transactional_id: Option<String>,
    pub acks: i16,
    pub timeout_ms: i32,
    pub topics: Vec<ProduceTopicData>,
}

#[derive(Debug)]
#[allow(dead_code)]
pub struct ProduceTopicData {
    pub name: String,
    pub partitions: Vec<ProducePartitionData>,
}

#[derive(Debug)]
#[allow(dead_code)]
pub struct ProducePartitionData {
    pub partition_id: i32,
    pub records: Bytes,
}

impl ProduceRequest {
    pub fn from_bytes(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::from_bytes(src)?;

        let transactional_id = CompactNullableString::deserialize(src)?;
        let acks = src.get_i16();
        let timeout_ms = src.get_i32();

        let topics_len = CompactArray::read_len(src)?;
        let mut topics = Vec::with_capacity(topics_len);
        for _ in 0..topics_len {
            let name = CompactString::deserialize(src)?;

            let partitions_len = CompactArray::read_len(src)?;
            let mut partitions = Vec::with_capacity(partitions_len);
            for _ in 0..partitions_len {
                let partition_id = src.get_i32();
                let records = CompactBytes::deserialize(src)?;
                TagBuffer::skip(src)?;
                partitions.push(ProducePartitionData {
                    partition_id,
                    records,
                });
            }
            TagBuffer::skip(src)?;

            topics.push(ProduceTopicData { name, partitions });
        }
        TagBuffer::skip(src)?;

        Ok(Self {
            header,
            transactional_id,
            acks,
            timeout_ms,
            topics,
        })
    }
}
