//! Codecs for arbitrary-precision numbers.

use crate::{
    types::remap::{BiMap, Total},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, Serializer, SizedBytes,
};
use bytes::Bytes;
use num_bigint::BigInt;

/// Codec of [BigInt] returned by [big_int].
pub type BigIntCodec =
    BiMap<SizedBytes<Int32>, Bytes, fn(&BigInt) -> Bytes, Total<fn(Bytes) -> BigInt>>;

fn to_bytes(value: &BigInt) -> Bytes {
    Bytes::from(value.to_signed_bytes_be())
}

fn from_bytes(bytes: Bytes) -> BigInt {
    BigInt::from_signed_bytes_be(&bytes)
}

/// A big integer as its minimal big-endian two's-complement bytes, preceded by a 4-byte length.
pub fn big_int() -> BigIntCodec {
    SizedBytes::int32().bimap(
        "BigInt",
        to_bytes as fn(&BigInt) -> Bytes,
        from_bytes as fn(Bytes) -> BigInt,
    )
}

/// A decimal number equal to `unscaled * 10^-scale`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    pub unscaled: BigInt,
    pub scale: i32,
}

impl BigDecimal {
    pub fn new(unscaled: impl Into<BigInt>, scale: i32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }
}

/// A [BigDecimal] as its unscaled value ([big_int]) followed by its scale ([Int32]).
#[derive(Debug)]
pub struct BigDecimalCodec {
    unscaled: BigIntCodec,
}

impl BigDecimalCodec {
    pub fn new() -> Self {
        Self {
            unscaled: big_int(),
        }
    }
}

impl Default for BigDecimalCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Format for BigDecimalCodec {
    fn name(&self) -> &str {
        "BigDecimal"
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl Encoder<BigDecimal> for BigDecimalCodec {
    fn write(&self, value: &BigDecimal, buf: &mut ByteBuf) -> Result<(), Error> {
        self.unscaled.write(&value.unscaled, buf)?;
        Int32.write(&value.scale, buf)
    }
}

impl Decoder<BigDecimal> for BigDecimalCodec {
    fn read(&self, buf: &mut ByteBuf) -> Result<BigDecimal, Error> {
        let unscaled = self.unscaled.read(buf)?;
        let scale = Int32.read(buf)?;
        Ok(BigDecimal { unscaled, scale })
    }
}
