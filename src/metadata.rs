use std::collections::HashMap;
use std::path::Path;

use bytes::{Buf, Bytes, BytesMut};

use crate::protocol::record_batch::{self, DecodedRecord};
use crate::protocol::types::Uuid;

/// A topic discovered in the cluster-metadata log. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub uuid: Uuid,
}

/// A partition discovered in the cluster-metadata log, referenced by its topic's UUID.
#[derive(Debug, Clone)]
pub struct Partition {
    pub partition_id: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: Vec<i32>,
}

/// Read-only index built once at startup from the cluster-metadata log, then shared by every
/// connection handler for the rest of the process lifetime. Nothing mutates it after `load`
/// returns, so handing out `&MetadataStore` (behind an `Arc`, see `main.rs`) needs no lock.
#[derive(Debug, Default)]
pub struct MetadataStore {
    topics_by_name: HashMap<String, Topic>,
    partitions_by_topic_uuid: HashMap<Uuid, Vec<Partition>>,
}

impl MetadataStore {
    /// Loads and parses the metadata log at `path`. A missing or unreadable file, or a file
    /// that stops parsing cleanly partway through, is not an error: the store simply keeps
    /// whatever batches it managed to decode (possibly none).
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cluster metadata log unreadable, starting with an empty store");
                return Self::default();
            }
        };

        let mut data = BytesMut::with_capacity(file_bytes.len());
        data.extend_from_slice(&file_bytes);
        let mut data = data.freeze();

        let mut store = Self::default();
        while data.remaining() > 0 {
            let mut records = Vec::new();
            if let Err(err) = record_batch::decode_batch(&mut data, &mut records) {
                tracing::warn!(path = %path.display(), error = %err, "stopped parsing cluster metadata log early");
                break;
            }
            store.apply(records);
        }

        tracing::info!(
            topics = store.topics_by_name.len(),
            "loaded cluster metadata log"
        );
        store
    }

    pub(crate) fn apply(&mut self, records: Vec<DecodedRecord>) {
        for record in records {
            match record {
                DecodedRecord::Topic { name, uuid } => {
                    self.topics_by_name.insert(name.clone(), Topic { name, uuid });
                }
                DecodedRecord::Partition {
                    partition_id,
                    topic_uuid,
                    replicas,
                    leader_id,
                    leader_epoch,
                } => {
                    self.partitions_by_topic_uuid
                        .entry(topic_uuid)
                        .or_default()
                        .push(Partition {
                            partition_id,
                            leader_id,
                            leader_epoch,
                            replica_nodes: replicas,
                        });
                }
            }
        }
    }

    pub fn is_topic_available(&self, name: &str) -> bool {
        self.topics_by_name.contains_key(name)
    }

    /// Returns a zero-initialized `Topic` with an all-zero UUID when the name is unknown,
    /// rather than failing - callers (e.g. `DescribeTopicPartitions`) always echo the
    /// requested name back, known or not.
    pub fn get_topic_info(&self, name: &str) -> Topic {
        self.topics_by_name
            .get(name)
            .cloned()
            .unwrap_or_else(|| Topic {
                name: name.to_string(),
                uuid: Uuid::NIL,
            })
    }

    pub fn get_partition_info(&self, uuid: Uuid) -> &[Partition] {
        self.partitions_by_topic_uuid
            .get(&uuid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_partition_size(&self, uuid: Uuid) -> usize {
        self.get_partition_info(uuid).len()
    }

    pub fn is_partition_index_available(&self, uuid: Uuid, partition_id: i32) -> bool {
        self.get_partition_info(uuid)
            .iter()
            .any(|p| p.partition_id == partition_id)
    }
}
