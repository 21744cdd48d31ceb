pub mod record_batch;
pub mod request;
pub mod response;
pub mod types;

use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use types::Serialize;

/// https://kafka.apache.org/protocol.html#protocol_api_keys
#[derive(Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(i16)]
pub enum ApiKey {
    Produce = 0,
    ApiVersions = 18,
    DescribeTopicPartitions = 75,
}

/// https://kafka.apache.org/protocol.html#protocol_error_codes
#[derive(Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(i16)]
pub enum ErrorCode {
    None = 0,
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
}

impl Serialize for ErrorCode {
    fn serialize(&mut self) -> Bytes {
        let mut b = BytesMut::with_capacity(2);
        b.put_i16((*self).into());
        b.freeze()
    }
}

/// Response Message is a wrapper around API response with prepended message size
// https://kafka.apache.org/protocol.html#protocol_common
pub struct ResponseMessage {
    bytes: BytesMut,
}

impl ResponseMessage {
    /// Calculates the size of the source API response and prepends it to the response
    pub fn from_bytes(src: &[u8]) -> Self {
        let mut bytes = BytesMut::with_capacity(src.len() + 4);

        let msg_size = 0; // placeholder; will be counted later
        bytes.put_i32(msg_size);

        bytes.extend_from_slice(src);

        let resp_size = bytes.len() as i32 - 4;

        let msg_size_ref = bytes
            .first_chunk_mut::<4>()
            .expect("message size element is present in response header");
        *msg_size_ref = (resp_size).to_be_bytes();

        Self { bytes }
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub trait Response {
    fn as_bytes(&self) -> &[u8];
}
