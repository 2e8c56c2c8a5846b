//! Fixed-width primitive codecs.
//!
//! Every codec here is a unit struct, is bounded, and writes a fixed number of bytes. Codecs
//! without a suffix are big-endian; codecs with an `L` suffix are little-endian.
//!
//! The narrow integer codecs ([Int8], [Int16], [Int24] and their little-endian variants) carry an
//! `i32`: encoding keeps only the low bytes of the value and decoding sign-extends them back.
//! Values outside the declared width therefore do not round-trip.

use crate::{util::at_least, ByteBuf, Decoder, Encoder, Error, Format};
use bytes::{Buf, BufMut};

macro_rules! fixed_codec {
    (
        $(#[$doc:meta])*
        $codec:ident($name:literal): $type:ty, $size:expr,
        write |$wbuf:ident, $value:ident| $write:expr,
        read |$rbuf:ident| $read:expr
    ) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $codec;

        impl $codec {
            /// Number of bytes written per value.
            pub const SIZE: usize = $size;
        }

        impl Format for $codec {
            #[inline]
            fn name(&self) -> &str {
                $name
            }

            #[inline]
            fn is_bounded(&self) -> bool {
                true
            }
        }

        impl Encoder<$type> for $codec {
            #[inline]
            fn write(&self, value: &$type, $wbuf: &mut ByteBuf) -> Result<(), Error> {
                $wbuf.ensure_writable($size)?;
                let $value = *value;
                $write;
                Ok(())
            }
        }

        impl Decoder<$type> for $codec {
            #[inline]
            fn read(&self, $rbuf: &mut ByteBuf) -> Result<$type, Error> {
                at_least($rbuf, $size)?;
                Ok($read)
            }
        }
    };
}

/// Sign-extends the low 24 bits of `raw`.
#[inline]
fn from_i24(raw: u64) -> i32 {
    ((raw as u32) << 8) as i32 >> 8
}

/// Keeps the low 24 bits of `value`.
#[inline]
fn to_i24(value: i32) -> u64 {
    (value as u32 & 0x00FF_FFFF) as u64
}

fixed_codec! {
    /// A single byte: `0x00` is false, `0x01` is true. Any other byte fails to decode.
    Bool("Bool"): bool, 1,
    write |buf, v| buf.put_u8(v as u8),
    read |buf| match buf.get_u8() {
        0 => false,
        1 => true,
        b => return Err(Error::InvalidBool(b)),
    }
}

fixed_codec! {
    /// A single two's-complement byte.
    Byte("Byte"): i8, 1,
    write |buf, v| buf.put_i8(v),
    read |buf| buf.get_i8()
}

fixed_codec! {
    Short16("Short16"): i16, 2,
    write |buf, v| buf.put_i16(v),
    read |buf| buf.get_i16()
}

fixed_codec! {
    Short16L("Short16L"): i16, 2,
    write |buf, v| buf.put_i16_le(v),
    read |buf| buf.get_i16_le()
}

fixed_codec! {
    /// An `i32` stored in one byte.
    Int8("Int8"): i32, 1,
    write |buf, v| buf.put_i8(v as i8),
    read |buf| buf.get_i8() as i32
}

fixed_codec! {
    /// An `i32` stored in two big-endian bytes.
    Int16("Int16"): i32, 2,
    write |buf, v| buf.put_i16(v as i16),
    read |buf| buf.get_i16() as i32
}

fixed_codec! {
    /// An `i32` stored in two little-endian bytes.
    Int16L("Int16L"): i32, 2,
    write |buf, v| buf.put_i16_le(v as i16),
    read |buf| buf.get_i16_le() as i32
}

fixed_codec! {
    /// An `i32` stored in three big-endian bytes.
    Int24("Int24"): i32, 3,
    write |buf, v| buf.put_uint(to_i24(v), 3),
    read |buf| from_i24(buf.get_uint(3))
}

fixed_codec! {
    /// An `i32` stored in three little-endian bytes.
    Int24L("Int24L"): i32, 3,
    write |buf, v| buf.put_uint_le(to_i24(v), 3),
    read |buf| from_i24(buf.get_uint_le(3))
}

fixed_codec! {
    Int32("Int32"): i32, 4,
    write |buf, v| buf.put_i32(v),
    read |buf| buf.get_i32()
}

fixed_codec! {
    Int32L("Int32L"): i32, 4,
    write |buf, v| buf.put_i32_le(v),
    read |buf| buf.get_i32_le()
}

fixed_codec! {
    Long64("Long64"): i64, 8,
    write |buf, v| buf.put_i64(v),
    read |buf| buf.get_i64()
}

fixed_codec! {
    Long64L("Long64L"): i64, 8,
    write |buf, v| buf.put_i64_le(v),
    read |buf| buf.get_i64_le()
}

fixed_codec! {
    /// IEEE-754 single precision, big-endian.
    Float32("Float"): f32, 4,
    write |buf, v| buf.put_f32(v),
    read |buf| buf.get_f32()
}

fixed_codec! {
    /// IEEE-754 single precision, little-endian.
    Float32L("FloatL"): f32, 4,
    write |buf, v| buf.put_f32_le(v),
    read |buf| buf.get_f32_le()
}

fixed_codec! {
    /// IEEE-754 double precision, big-endian.
    Double64("Double"): f64, 8,
    write |buf, v| buf.put_f64(v),
    read |buf| buf.get_f64()
}

fixed_codec! {
    /// IEEE-754 double precision, little-endian.
    Double64L("DoubleL"): f64, 8,
    write |buf, v| buf.put_f64_le(v),
    read |buf| buf.get_f64_le()
}
