//! Codecs for byte arrays.
//!
//! [RawBytes] writes the bytes as they are and reads everything that remains, so it is unbounded.
//! [SizedBytes] precedes the bytes with their length and is always bounded.

use crate::{
    util::{at_least, read_len, write_len},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, LenRange,
};
use bytes::{Buf, BufMut, Bytes};

/// Raw bytes with no framing. Decoding consumes every readable byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawBytes;

impl Format for RawBytes {
    fn name(&self) -> &str {
        "ByteArray"
    }

    fn is_bounded(&self) -> bool {
        false
    }
}

impl Encoder<Bytes> for RawBytes {
    #[inline]
    fn write(&self, value: &Bytes, buf: &mut ByteBuf) -> Result<(), Error> {
        buf.ensure_writable(value.len())?;
        buf.put_slice(value);
        Ok(())
    }
}

impl Decoder<Bytes> for RawBytes {
    #[inline]
    fn read(&self, buf: &mut ByteBuf) -> Result<Bytes, Error> {
        let len = buf.remaining();
        Ok(buf.copy_to_bytes(len))
    }
}

/// Bytes preceded by their length, written with a bounded size codec.
///
/// Wire format: `[len: size codec][bytes: len]`.
#[derive(Clone, Debug)]
pub struct SizedBytes<S = Int32> {
    size: S,
    limit: LenRange,
    name: String,
}

impl<S: Format> SizedBytes<S> {
    /// Creates a codec that writes lengths with `size`.
    ///
    /// Fails if `size` is not bounded.
    pub fn new(size: S) -> Result<Self, Error> {
        size.require_bounded()?;
        Ok(Self::unchecked(size))
    }

    fn unchecked(size: S) -> Self {
        let name = format!("SizedByteArray({})", size.name());
        Self {
            size,
            limit: LenRange::any(),
            name,
        }
    }

    /// Rejects decoded lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl SizedBytes<Int32> {
    /// Bytes preceded by a 4-byte big-endian length.
    pub fn int32() -> Self {
        Self::unchecked(Int32)
    }
}

impl<S: Format> Format for SizedBytes<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<S: Encoder<i32> + Decoder<i32>> Encoder<Bytes> for SizedBytes<S> {
    fn write(&self, value: &Bytes, buf: &mut ByteBuf) -> Result<(), Error> {
        write_len(&self.size, value.len(), buf)?;
        buf.ensure_writable(value.len())?;
        buf.put_slice(value);
        Ok(())
    }
}

impl<S: Decoder<i32>> Decoder<Bytes> for SizedBytes<S> {
    fn read(&self, buf: &mut ByteBuf) -> Result<Bytes, Error> {
        let len = read_len(&self.size, &self.limit, buf)?;
        at_least(buf, len)?;
        Ok(buf.copy_to_bytes(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Int16L, Int8};

    #[test]
    fn test_raw_bytes() {
        let values = [
            Bytes::new(),
            Bytes::from_static(&[1, 2, 3]),
            Bytes::from(vec![7; 300]),
        ];
        for value in values {
            let encoded = RawBytes.encode_to_bytes(&value).unwrap();
            assert_eq!(encoded, value);
            assert_eq!(RawBytes.decode_bytes(encoded).unwrap(), value);
        }
        assert!(!RawBytes.is_bounded());
    }

    #[test]
    fn test_raw_bytes_consumes_everything() {
        let mut buf = ByteBuf::wrap(vec![0u8, 0, 0, 1, 9, 9]);
        assert_eq!(Int32.read(&mut buf).unwrap(), 1);
        assert_eq!(RawBytes.read(&mut buf).unwrap(), Bytes::from_static(&[9, 9]));
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn test_sized_bytes() {
        let codec = SizedBytes::int32();
        assert_eq!(codec.name(), "SizedByteArray(Int32)");
        let values = [
            Bytes::new(),
            Bytes::from_static(&[1, 2, 3]),
            Bytes::from(vec![0; 300]),
        ];
        for value in values {
            let encoded = codec.encode_to_bytes(&value).unwrap();
            assert_eq!(encoded.len(), 4 + value.len());
            assert_eq!(&encoded[..4], &(value.len() as u32).to_be_bytes());
            assert_eq!(codec.decode_exact(encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_sized_bytes_back_to_back() {
        let codec = SizedBytes::new(Int16L).unwrap();
        let mut buf = ByteBuf::new();
        codec.encode(&Bytes::from_static(b"ab"), &mut buf).unwrap();
        codec.encode(&Bytes::from_static(b"cde"), &mut buf).unwrap();
        assert_eq!(buf.readable(), &[2, 0, b'a', b'b', 3, 0, b'c', b'd', b'e']);
        assert_eq!(codec.decode(&mut buf).unwrap(), Bytes::from_static(b"ab"));
        assert_eq!(codec.decode(&mut buf).unwrap(), Bytes::from_static(b"cde"));
    }

    #[test]
    fn test_sized_bytes_errors() {
        assert!(matches!(SizedBytes::new(RawBytes), Err(Error::Unbounded(_))));

        let codec = SizedBytes::int32();
        // Declared length exceeds the available bytes
        assert!(matches!(
            codec.decode_bytes(Bytes::from_static(&[0, 0, 0, 3, 1, 2])),
            Err(Error::EndOfBuffer)
        ));
        // Negative length
        assert!(matches!(
            codec.decode_bytes(Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF])),
            Err(Error::NegativeLength(-1))
        ));
        // Length outside the configured limit
        let limited = SizedBytes::int32().with_limit(..=2);
        assert!(matches!(
            limited.decode_bytes(Bytes::from_static(&[0, 0, 0, 3, 1, 2, 3])),
            Err(Error::InvalidLength(3))
        ));
    }

    #[test]
    fn test_sized_bytes_narrow_size() {
        let codec = SizedBytes::new(Int8).unwrap();
        assert_eq!(codec.name(), "SizedByteArray(Int8)");
        let mut buf = ByteBuf::new();
        codec.encode(&Bytes::from(vec![1; 127]), &mut buf).unwrap();
        assert_eq!(buf.readable_bytes(), 128);
        assert_eq!(codec.decode(&mut buf).unwrap().len(), 127);

        // One byte more no longer fits the length field
        assert!(matches!(
            codec.encode(&Bytes::from(vec![1; 128]), &mut buf),
            Err(Error::LengthOverflow(128))
        ));
        assert_eq!(buf.readable_bytes(), 0);
    }
}
