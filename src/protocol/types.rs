use anyhow::{bail, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

// https://kafka.apache.org/protocol.html#protocol_types
//
// Fixed-width big-endian integers (i8/i16/i32/i64) are read and written with
// `bytes::Buf`/`BufMut` directly (`src.get_i32()`, `buf.put_i32(v)`) rather than wrapped here -
// that's already exactly what those traits do. Everything below covers the variable-length
// and compound encodings the wire format layers on top of them.

/// An unsigned variable-length integer: groups of 7 bits, least-significant group first,
/// continuation bit (0x80) set on every byte but the last.
pub struct UnsignedVarInt;

impl UnsignedVarInt {
    pub fn serialize(value: u64) -> Bytes {
        let mut b = BytesMut::new();
        Self::write(&mut b, value);
        b.freeze()
    }

    pub fn write(dst: &mut BytesMut, mut value: u64) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            dst.put_u8(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Fails on a varint longer than 5 bytes (the most a `u64`'s low 35 bits need) or on
    /// running out of bytes mid-sequence - both are malformed input, not bugs in this broker,
    /// so callers propagate the error rather than this function panicking on it.
    pub fn deserialize(src: &mut Bytes) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            if shift >= 35 {
                bail!("unsigned varint longer than 5 bytes");
            }
            if !src.has_remaining() {
                bail!("truncated unsigned varint");
            }
            let byte = src.get_u8();
            value |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(value)
    }
}

/// A zig-zag encoded signed variable-length integer: `n` maps to `(n << 1) ^ (n >> 63)`
/// before being written as an `UnsignedVarInt`.
pub struct VarInt;

impl VarInt {
    pub fn serialize(value: i64) -> Bytes {
        UnsignedVarInt::serialize(zigzag_encode(value))
    }

    pub fn write(dst: &mut BytesMut, value: i64) {
        UnsignedVarInt::write(dst, zigzag_encode(value));
    }

    pub fn deserialize(src: &mut Bytes) -> Result<i64> {
        let encoded = UnsignedVarInt::deserialize(src)?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }
}

fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// A 16-byte opaque identifier, used for topic and directory UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    pub const NIL: Uuid = Uuid([0u8; 16]);

    pub fn serialize(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }

    pub fn deserialize(src: &mut Bytes) -> Self {
        let mut bytes = [0u8; 16];
        src.copy_to_slice(&mut bytes);
        Uuid(bytes)
    }
}

impl std::fmt::Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex = hex::encode(self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

/// Represents a sequence of characters. First the length N + 1 is given as an UNSIGNED_VARINT.
/// Then N bytes follow which are the UTF-8 encoding of the character sequence. N=0 is null.
pub struct CompactString;

impl CompactString {
    pub fn serialize(s: &str) -> Bytes {
        let mut b = BytesMut::with_capacity(s.len() + 5);
        UnsignedVarInt::write(&mut b, s.len() as u64 + 1);
        b.put(s.as_bytes());
        b.freeze()
    }

    pub fn deserialize(src: &mut Bytes) -> Result<String> {
        let len = UnsignedVarInt::deserialize(src)?;
        let string_len = if len > 0 { (len - 1) as usize } else { 0 };
        let bytes = src.copy_to_bytes(string_len);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Deserialize<String> for CompactString {
    fn deserialize(src: &mut Bytes) -> Result<String> {
        Self::deserialize(src)
    }
}

/// A nullable compact string, where an unsigned varint of 0 means `None` rather than empty.
pub struct CompactNullableString;

impl CompactNullableString {
    pub fn serialize(s: Option<&str>) -> Bytes {
        match s {
            None => Bytes::from_static(&[0]),
            Some(s) => CompactString::serialize(s),
        }
    }

    pub fn deserialize(src: &mut Bytes) -> Result<Option<String>> {
        let len = UnsignedVarInt::deserialize(src)?;
        if len == 0 {
            return Ok(None);
        }
        let bytes = src.copy_to_bytes((len - 1) as usize);
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// A `NULLABLE_STRING`: a 2-byte length prefix, -1 meaning null.
pub struct NullableString;

impl NullableString {
    pub fn deserialize(src: &mut Bytes) -> Option<String> {
        let len = src.get_i16();
        if len < 0 {
            return None;
        }
        let bytes = src.copy_to_bytes(len as usize);
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Raw bytes prefixed by a compact length (unsigned varint, N+1; N=0 is null). Used for
/// record batch payloads that this broker stores opaquely instead of decoding further.
pub struct CompactBytes;

impl CompactBytes {
    pub fn serialize(bytes: &[u8]) -> Bytes {
        let mut b = BytesMut::with_capacity(bytes.len() + 5);
        UnsignedVarInt::write(&mut b, bytes.len() as u64 + 1);
        b.put(bytes);
        b.freeze()
    }

    pub fn deserialize(src: &mut Bytes) -> Result<Bytes> {
        let len = UnsignedVarInt::deserialize(src)?;
        let byte_len = if len > 0 { (len - 1) as usize } else { 0 };
        Ok(src.copy_to_bytes(byte_len))
    }
}

/// Represents a sequence of objects of a given type T. The length N + 1 is given as an
/// UNSIGNED_VARINT; N instances of T follow. A length of 0 denotes a null array.
pub struct CompactArray;

impl CompactArray {
    pub fn serialize<T: Serialize>(items: &mut [T]) -> Bytes {
        let mut b = BytesMut::new();
        UnsignedVarInt::write(&mut b, items.len() as u64 + 1);
        for item in items.iter_mut() {
            b.put(item.serialize());
        }
        b.freeze()
    }

    /// Serializes a slice of `Copy` primitives (e.g. `i32` replica ids), which carry no
    /// trailing tag buffer of their own.
    pub fn serialize_primitive<T: Copy, F: Fn(&mut BytesMut, T)>(
        items: &[T],
        write_one: F,
    ) -> Bytes {
        let mut b = BytesMut::new();
        UnsignedVarInt::write(&mut b, items.len() as u64 + 1);
        for item in items {
            write_one(&mut b, *item);
        }
        b.freeze()
    }

    pub fn deserialize<T, U: Deserialize<T>>(src: &mut Bytes) -> Result<Vec<T>> {
        let items_len = Self::read_len(src)?;
        let mut items = Vec::with_capacity(items_len);
        for _ in 0..items_len {
            items.push(U::deserialize(src)?);
        }
        Ok(items)
    }

    /// Length-only read: the caller consumes the N elements itself. Used when sibling arrays
    /// share one element type that doesn't fit the single `Deserialize<T>` shape (e.g. the
    /// four replica-id arrays in a partition record, which are plain `i32`s with no tag
    /// buffer of their own - unlike struct elements, which serialize their own tag buffer as
    /// part of their encoding).
    pub fn read_len(src: &mut Bytes) -> Result<usize> {
        let len = UnsignedVarInt::deserialize(src)?;
        Ok(if len > 0 { (len - 1) as usize } else { 0 })
    }

    pub fn write_len(dst: &mut BytesMut, len: usize) {
        UnsignedVarInt::write(dst, len as u64 + 1);
    }
}

/// An extensible set of optional trailing fields. This broker never emits any, and the
/// reference cluster-metadata log never sets any either, so reading one just validates and
/// discards whatever is there.
pub struct TagBuffer;

impl TagBuffer {
    pub fn write(dst: &mut BytesMut) {
        dst.put_u8(0);
    }

    pub fn serialize() -> Bytes {
        Bytes::from_static(&[0])
    }

    /// Reads the tagged-field count and, for each tagged field, its `(tag_id, length, bytes)`
    /// triple, discarding the contents.
    pub fn skip(src: &mut Bytes) -> Result<()> {
        let count = UnsignedVarInt::deserialize(src)?;
        for _ in 0..count {
            let _tag_id = UnsignedVarInt::deserialize(src)?;
            let len = UnsignedVarInt::deserialize(src)?;
            src.advance(len as usize);
        }
        Ok(())
    }
}

pub trait Serialize {
    fn serialize(&mut self) -> Bytes;
}

pub trait Deserialize<T> {
    fn deserialize(src: &mut Bytes) -> Result<T>;
}
