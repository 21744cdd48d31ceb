use anyhow::{anyhow, bail, Result};
use bytes::{Buf, Bytes};

use super::types::{CompactArray, CompactString, TagBuffer, Uuid, VarInt};

/// One decoded record payload recognized by this broker. Unknown record types are skipped
/// entirely (see `decode_batch`) and never produce a `DecodedRecord`.
#[derive(Debug, Clone)]
pub enum DecodedRecord {
    Topic {
        name: String,
        uuid: Uuid,
    },
    Partition {
        partition_id: i32,
        topic_uuid: Uuid,
        replicas: Vec<i32>,
        leader_id: i32,
        leader_epoch: i32,
    },
}

/// Decodes one Kafka-format record batch from the front of `data`, appending any recognized
/// topic/partition records to `out`. Always advances `data` to the start of the next batch,
/// even when a record of an unrecognized type is encountered partway through - at that point
/// the record's true on-wire length can no longer be known, so the rest of the batch is
/// abandoned rather than guessed at.
///
/// https://kafka.apache.org/documentation/#recordbatch
pub fn decode_batch(data: &mut Bytes, out: &mut Vec<DecodedRecord>) -> Result<()> {
    if data.remaining() < 12 {
        bail!("truncated record batch header");
    }
    let remaining_before_batch = data.remaining();
    let _base_offset = data.get_i64();
    let batch_length = data.get_i32();

    let next_batch_remaining = remaining_before_batch
        .checked_sub(12 + batch_length as usize)
        .ok_or_else(|| anyhow!("batch_length {batch_length} overruns the buffer"))?;

    if data.remaining() < batch_length as usize {
        bail!("truncated record batch body");
    }

    let _partition_leader_epoch = data.get_i32();
    let _magic = data.get_i8();
    let _crc = data.get_i32();
    let _attributes = data.get_i16();
    let _last_offset_delta = data.get_i32();
    let _base_timestamp = data.get_i64();
    let _max_timestamp = data.get_i64();
    let _producer_id = data.get_i64();
    let _producer_epoch = data.get_i16();
    let _base_sequence = data.get_i32();
    let record_count = data.get_i32();

    for _ in 0..record_count {
        if data.remaining() <= next_batch_remaining {
            break;
        }
        match decode_record(data)? {
            Some(record) => out.push(record),
            None => break,
        }
    }

    if data.remaining() > next_batch_remaining {
        data.advance(data.remaining() - next_batch_remaining);
    }
    Ok(())
}

/// Decodes a single record. Returns `None` when its value type isn't one this broker
/// understands; the cursor is left mid-record in that case, which is why the caller treats
/// an unknown record as "abandon the rest of this batch" rather than "skip this record".
fn decode_record(src: &mut Bytes) -> Result<Option<DecodedRecord>> {
    let _length = VarInt::deserialize(src)?;
    let _attributes = src.get_i8();
    let _timestamp_delta = VarInt::deserialize(src)?;
    let _offset_delta = VarInt::deserialize(src)?;

    let key_length = VarInt::deserialize(src)?;
    if key_length > 0 {
        src.advance(key_length as usize);
    }

    let _value_length = VarInt::deserialize(src)?;
    let _frame_version = src.get_i8();
    let record_type = src.get_i8();

    let record = match record_type {
        2 => {
            let _version = src.get_i8();
            let name = CompactString::deserialize(src)?;
            let uuid = Uuid::deserialize(src);
            TagBuffer::skip(src)?;
            DecodedRecord::Topic { name, uuid }
        }
        3 => {
            let _version = src.get_i8();
            let partition_id = src.get_i32();
            let topic_uuid = Uuid::deserialize(src);

            let replicas = read_i32_compact_array(src)?;
            let _isr = read_i32_compact_array(src)?;
            let _removing_replicas = read_i32_compact_array(src)?;
            let _adding_replicas = read_i32_compact_array(src)?;

            let leader_id = src.get_i32();
            let leader_epoch = src.get_i32();
            let _partition_epoch = src.get_i32();

            let directories_len = CompactArray::read_len(src)?;
            for _ in 0..directories_len {
                let _ = Uuid::deserialize(src);
            }

            TagBuffer::skip(src)?;
            DecodedRecord::Partition {
                partition_id,
                topic_uuid,
                replicas,
                leader_id,
                leader_epoch,
            }
        }
        _ => return Ok(None),
    };

    // Record-level headers: a compact array, always empty in the batches this broker reads.
    let headers_len = CompactArray::read_len(src)?;
    debug_assert_eq!(headers_len, 0, "record headers are not supported");

    Ok(Some(record))
}

fn read_i32_compact_array(src: &mut Bytes) -> Result<Vec<i32>> {
    let len = CompactArray::read_len(src)?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(src.get_i32());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn topic_record_value(name: &str, uuid: Uuid) -> BytesMut {
        let mut value = BytesMut::new();
        value.put_i8(1); // frame_version
        value.put_i8(2); // type
        value.put_i8(0); // version
        value.extend_from_slice(&CompactString::serialize(name));
        value.extend_from_slice(&uuid.serialize());
        TagBuffer::write(&mut value); // tagged fields on the value itself
        value
    }

    fn partition_record_value(partition_id: i32, topic_uuid: Uuid, replicas: &[i32]) -> BytesMut {
        let mut value = BytesMut::new();
        value.put_i8(1); // frame_version
        value.put_i8(3); // type
        value.put_i8(1); // version
        value.put_i32(partition_id);
        value.extend_from_slice(&topic_uuid.serialize());
        CompactArray::write_len(&mut value, replicas.len());
        for r in replicas {
            value.put_i32(*r);
        }
        CompactArray::write_len(&mut value, 0); // isr
        CompactArray::write_len(&mut value, 0); // removing_replicas
        CompactArray::write_len(&mut value, 0); // adding_replicas
        value.put_i32(1); // leader_id
        value.put_i32(0); // leader_epoch
        value.put_i32(0); // partition_epoch
        CompactArray::write_len(&mut value, 0); // directories
        TagBuffer::write(&mut value);
        value
    }

    fn wrap_record(value: &[u8]) -> BytesMut {
        let mut body = BytesMut::new();
        body.put_i8(0); // attributes
        VarInt::write(&mut body, 0); // timestamp_delta
        VarInt::write(&mut body, 0); // offset_delta
        VarInt::write(&mut body, -1); // key_length (null)
        VarInt::write(&mut body, value.len() as i64);
        body.extend_from_slice(value);
        CompactArray::write_len(&mut body, 0); // headers

        let mut framed = BytesMut::new();
        VarInt::write(&mut framed, body.len() as i64);
        framed.extend_from_slice(&body);
        framed
    }

    fn wrap_batch(records: &[BytesMut]) -> BytesMut {
        let mut body = BytesMut::new();
        body.put_i32(0); // partition_leader_epoch
        body.put_i8(2); // magic
        body.put_i32(0); // crc
        body.put_i16(0); // attributes
        body.put_i32(0); // last_offset_delta
        body.put_i64(0); // base_timestamp
        body.put_i64(0); // max_timestamp
        body.put_i64(-1); // producer_id
        body.put_i16(-1); // producer_epoch
        body.put_i32(0); // base_sequence
        body.put_i32(records.len() as i32);
        for record in records {
            body.extend_from_slice(record);
        }

        let mut batch = BytesMut::new();
        batch.put_i64(0); // base_offset
        batch.put_i32(body.len() as i32); // batch_length
        batch.extend_from_slice(&body);
        batch
    }

    #[test]
    fn decodes_topic_and_partition_records() {
        let uuid = Uuid([9u8; 16]);
        let topic_value = topic_record_value("orders", uuid);
        let partition_value = partition_record_value(0, uuid, &[1, 2, 3]);

        let batch = wrap_batch(&[
            wrap_record(&topic_value),
            wrap_record(&partition_value),
        ]);

        let mut data = batch.freeze();
        let mut out = Vec::new();
        decode_batch(&mut data, &mut out).unwrap();

        assert_eq!(data.remaining(), 0);
        assert_eq!(out.len(), 2);
        match &out[0] {
            DecodedRecord::Topic { name, uuid: got } => {
                assert_eq!(name, "orders");
                assert_eq!(*got, uuid);
            }
            _ => panic!("expected a topic record"),
        }
        match &out[1] {
            DecodedRecord::Partition {
                partition_id,
                topic_uuid,
                replicas,
                leader_id,
                ..
            } => {
                assert_eq!(*partition_id, 0);
                assert_eq!(*topic_uuid, uuid);
                assert_eq!(replicas, &[1, 2, 3]);
                assert_eq!(*leader_id, 1);
            }
            _ => panic!("expected a partition record"),
        }
    }

    #[test]
    fn unknown_record_type_skips_to_next_batch_boundary() {
        let mut unknown_value = BytesMut::new();
        unknown_value.put_i8(1); // frame_version
        unknown_value.put_i8(99); // unrecognized type
        unknown_value.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]); // garbage payload

        let uuid = Uuid([1u8; 16]);
        let topic_value = topic_record_value("after-unknown", uuid);

        let first_batch = wrap_batch(&[wrap_record(&unknown_value)]);
        let second_batch = wrap_batch(&[wrap_record(&topic_value)]);

        let mut data = BytesMut::new();
        data.extend_from_slice(&first_batch);
        data.extend_from_slice(&second_batch);
        let mut data = data.freeze();

        let mut out = Vec::new();
        decode_batch(&mut data, &mut out).unwrap();
        assert!(out.is_empty());

        decode_batch(&mut data, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], DecodedRecord::Topic { name, .. } if name == "after-unknown"));
    }
}
