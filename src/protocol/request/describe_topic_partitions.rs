use anyhow::Result;
use bytes::{Buf, Bytes};

use crate::protocol::types::{CompactArray, CompactString, TagBuffer};

use super::HeaderV2;

/// https://kafka.apache.org/protocol.html#The_Messages_DescribeTopicPartitions
#[derive(Debug)]
#[allow(dead_code)]
pub struct DescribeTopicPartitionsRequest {
    pub header: HeaderV2,
    pub topics: Vec<String>,
    pub response_partition_limit: i32,
    pub cursor: i8,
}

impl DescribeTopicPartitionsRequest {
    pub fn from_bytes(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::from_bytes(src)?;

        let topics_len = CompactArray::read_len(src)?;
        let mut topics = Vec::with_capacity(topics_len);
        for _ in 0..topics_len {
            let name = CompactString::deserialize(src)?;
            TagBuffer::skip(src)?; // per-topic tag buffer
            topics.push(name);
        }

        let response_partition_limit = src.get_i32();
        let cursor = src.get_i8(); // nullable pagination cursor; 0xff (-1) means null
        TagBuffer::skip(src)?;

        Ok(Self {
            header,
            topics,
            response_partition_limit,
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    fn encode(topics: &[&str]) -> Bytes {
        let mut b = bytes::BytesMut::new();
        b.put_i16(75); // DescribeTopicPartitions
        b.put_i16(0);
        b.put_i32(1);
        b.put_i16(-1); // client_id: null
        TagBuffer::write(&mut b);

        CompactArray::write_len(&mut b, topics.len());
        for name in topics {
            b.extend_from_slice(&CompactString::serialize(name));
            TagBuffer::write(&mut b);
        }
        b.put_i32(1); // response_partition_limit
        b.put_i8(-1); // cursor: null
        TagBuffer::write(&mut b);
        b.freeze()
    }

    #[test]
    fn decodes_requested_topics_in_request_order() {
        let mut src = encode(&["foo", "bar"]);
        let req = DescribeTopicPartitionsRequest::from_bytes(&mut src).unwrap();
        assert_eq!(req.topics, vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(req.response_partition_limit, 1);
        assert_eq!(req.cursor, -1);
        assert_eq!(src.len(), 0);
    }

    #[test]
    fn decodes_empty_topic_list() {
        let mut src = encode(&[]);
        let req = DescribeTopicPartitionsRequest::from_bytes(&mut src).unwrap();
        assert!(req.topics.is_empty());
    }
}
