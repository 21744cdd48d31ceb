use crate::metadata::MetadataStore;
use crate::protocol::{
    request::describe_topic_partitions::DescribeTopicPartitionsRequest,
    response::describe_topic_partitions::{DescribeTopicPartitionsResponse, Partition, Topic},
    types::Uuid,
    ErrorCode,
};

pub fn process(
    req: DescribeTopicPartitionsRequest,
    store: &MetadataStore,
) -> DescribeTopicPartitionsResponse {
    let mut topic_names = req.topics;
    topic_names.sort();

    let topics = topic_names
        .into_iter()
        .map(|name| build_topic(name, store))
        .collect();

    DescribeTopicPartitionsResponse::new(req.header.correlation_id, topics)
}

fn build_topic(name: String, store: &MetadataStore) -> Topic {
    if !store.is_topic_available(&name) {
        return Topic {
            error_code: ErrorCode::UnknownTopicOrPartition,
            name,
            topic_id: Uuid::NIL,
            is_internal: false,
            partitions: Vec::new(),
            topic_authorized_operations: 0,
        };
    }

    let topic_info = store.get_topic_info(&name);
    let partitions = store
        .get_partition_info(topic_info.uuid)
        .iter()
        .map(|p| Partition {
            error_code: ErrorCode::None,
            partition_index: p.partition_id,
            leader_id: p.leader_id,
            leader_epoch: p.leader_epoch,
            replica_nodes: p.replica_nodes.clone(),
        })
        .collect();

    Topic {
        error_code: ErrorCode::None,
        name,
        topic_id: topic_info.uuid,
        is_internal: false,
        partitions,
        topic_authorized_operations: 0,
    }
}
