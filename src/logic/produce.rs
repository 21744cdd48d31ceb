use crate::metadata::MetadataStore;
use crate::protocol::{
    request::produce::ProduceRequest,
    response::produce::{ProducePartitionResult, ProduceResponse, ProduceTopicResult},
    ErrorCode,
};

/// This broker never durably stores produced records - it only validates the addressed
/// topic/partition against the metadata store and acknowledges accordingly.
pub fn process(req: ProduceRequest, store: &MetadataStore) -> ProduceResponse {
    let topics = req
        .topics
        .into_iter()
        .map(|topic| {
            let topic_info = store.get_topic_info(&topic.name);
            let partitions = topic
                .partitions
                .into_iter()
                .map(|partition| {
                    if store.is_partition_index_available(topic_info.uuid, partition.partition_id)
                    {
                        ProducePartitionResult {
                            partition_index: partition.partition_id,
                            error_code: ErrorCode::None,
                            base_offset: 0,
                            log_start_offset: 0,
                        }
                    } else {
                        ProducePartitionResult {
                            partition_index: partition.partition_id,
                            error_code: ErrorCode::UnknownTopicOrPartition,
                            base_offset: -1,
                            log_start_offset: -1,
                        }
                    }
                })
                .collect();

            ProduceTopicResult {
                name: topic.name,
                partitions,
            }
        })
        .collect();

    ProduceResponse::new(req.header.correlation_id, topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::request::produce::{ProducePartitionData, ProduceTopicData};
    use crate::protocol::request::HeaderV2;
    use bytes::Bytes;

    fn request(topics: Vec<ProduceTopicData>) -> ProduceRequest {
        ProduceRequest {
            header: HeaderV2 {
                request_api_key: 0,
                request_api_version: 11,
                correlation_id: 1,
                client_id: None,
            },
            transactional_id: None,
            acks: 1,
            timeout_ms: 1000,
            topics,
        }
    }

    #[test]
    fn unknown_partition_reports_error_3_with_negative_offsets() {
        let store = MetadataStore::default();
        let resp = process(
            request(vec![ProduceTopicData {
                name: "unknown".to_string(),
                partitions: vec![ProducePartitionData {
                    partition_id: 0,
                    records: Bytes::from_static(&[0xde, 0xad]),
                }],
            }]),
            &store,
        );
        let b = resp.as_bytes();

        // header(5) + body tag buffer(1) + topics array len(1) = 7, then "unknown"(8 bytes).
        let partitions_len_off = 7 + 8;
        assert_eq!(b[partitions_len_off], 0x02); // 1 partition
        let partition_off = partitions_len_off + 1;
        assert_eq!(
            i32::from_be_bytes(b[partition_off..partition_off + 4].try_into().unwrap()),
            0
        );
        let error_off = partition_off + 4;
        assert_eq!(
            i16::from_be_bytes(b[error_off..error_off + 2].try_into().unwrap()),
            3
        );
        let base_offset_off = error_off + 2;
        assert_eq!(
            i64::from_be_bytes(b[base_offset_off..base_offset_off + 8].try_into().unwrap()),
            -1
        );
    }
}
