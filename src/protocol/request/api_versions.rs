use anyhow::Result;
use bytes::Bytes;

use crate::protocol::response::api_versions::ApiVersionsResponse;
use crate::protocol::types::{CompactString, TagBuffer};

use super::HeaderV2;

#[derive(Debug)]
#[allow(dead_code)]
pub struct ApiVersionsRequest {
    header: HeaderV2,
    client_software_name: String,
    client_software_version: String,
}

impl ApiVersionsRequest {
    // https://kafka.apache.org/protocol.html#The_Messages_ApiVersions
    pub fn from_bytes(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::from_bytes(src)?;
        let client_software_name = CompactString::deserialize(src)?;
        let client_software_version = CompactString::deserialize(src)?;
        TagBuffer::skip(src)?;

        Ok(Self {
            header,
            client_software_name,
            client_software_version,
        })
    }

    pub fn process(self) -> ApiVersionsResponse {
        ApiVersionsResponse::new(self.header.correlation_id, self.header.request_api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};
    use crate::protocol::types::TagBuffer as TB;

    fn encode(api_version: i16, correlation_id: i32) -> Bytes {
        let mut b = BytesMut::new();
        b.put_i16(18); // ApiVersions
        b.put_i16(api_version);
        b.put_i32(correlation_id);
        b.put_i16(-1); // client_id: null
        TB::write(&mut b); // header tag buffer
        b.extend_from_slice(&CompactString::serialize("kafka-cli"));
        b.extend_from_slice(&CompactString::serialize("3.7.0"));
        TB::write(&mut b); // body tag buffer
        b.freeze()
    }

    #[test]
    fn decodes_header_and_software_fields() {
        let mut src = encode(4, 0x6f89217e);
        let req = ApiVersionsRequest::from_bytes(&mut src).unwrap();
        assert_eq!(req.header.request_api_version, 4);
        assert_eq!(req.header.correlation_id, 0x6f89217e);
        assert_eq!(req.client_software_name, "kafka-cli");
        assert_eq!(req.client_software_version, "3.7.0");
        assert_eq!(src.len(), 0);
    }

    #[test]
    fn process_echoes_correlation_id_and_version() {
        let mut src = encode(4, 7);
        let req = ApiVersionsRequest::from_bytes(&mut src).unwrap();
        let resp = req.process();
        // v0 header: 4-byte correlation_id, no tag buffer. error_code (i16) follows directly.
        let bytes = resp.as_bytes();
        assert_eq!(i32::from_be_bytes(bytes[0..4].try_into().unwrap()), 7);
        assert_eq!(i16::from_be_bytes(bytes[4..6].try_into().unwrap()), 0);
    }

    #[test]
    fn unsupported_version_yields_error_35() {
        let mut src = encode(5, 1);
        let req = ApiVersionsRequest::from_bytes(&mut src).unwrap();
        let resp = req.process();
        let bytes = resp.as_bytes();
        assert_eq!(i16::from_be_bytes(bytes[4..6].try_into().unwrap()), 35);
    }
}
