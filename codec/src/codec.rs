//! Core codec traits

use crate::{
    types::remap::{BiMap, MapDecoder, MapEncoder, Partial, Total},
    ByteBuf, Error,
};
use bytes::{Buf, Bytes};
use std::{rc::Rc, sync::Arc};
use tracing::warn;

/// Trait describing the wire format of a codec.
pub trait Format {
    /// Human-readable name of the wire format, e.g. `List[Int32](size: Int32)`.
    fn name(&self) -> &str;

    /// Whether decoding consumes exactly the bytes encoding produced.
    ///
    /// An unbounded codec (e.g. a raw byte array) consumes every readable byte and may only be
    /// used as the last item of a frame.
    fn is_bounded(&self) -> bool;

    /// Fails with [Error::Unbounded] if this codec is not bounded.
    ///
    /// Constructors of composite codecs call this for every sub-codec that must delimit itself.
    ///
    /// (Provided method).
    fn require_bounded(&self) -> Result<(), Error> {
        if !self.is_bounded() {
            warn!(codec = self.name(), "rejected unbounded codec");
            return Err(Error::Unbounded(self.name().to_string()));
        }
        Ok(())
    }
}

/// Trait for codecs that can write values of type `T` to a buffer.
pub trait Encoder<T>: Format {
    /// Writes `value` at the write cursor, advancing it by the encoded length.
    ///
    /// On failure the write cursor may be left anywhere after its starting position. Composite
    /// codecs call this on their parts; callers should use [Encoder::encode].
    fn write(&self, value: &T, buf: &mut ByteBuf) -> Result<(), Error>;

    /// Writes `value` at the write cursor. On failure the write cursor is restored.
    ///
    /// (Provided method).
    fn encode(&self, value: &T, buf: &mut ByteBuf) -> Result<(), Error> {
        let mark = buf.writer_index();
        if let Err(err) = self.write(value, buf) {
            buf.set_writer_index(mark)?;
            return Err(err);
        }
        Ok(())
    }

    /// Encodes `value` into a fresh scratch buffer and returns exactly the bytes written.
    ///
    /// (Provided method).
    fn encode_to_bytes(&self, value: &T) -> Result<Bytes, Error> {
        let mut buf = ByteBuf::new();
        self.write(value, &mut buf)?;
        Ok(buf.to_bytes())
    }

    /// Adapts this encoder to values of type `V`.
    ///
    /// The result has the same boundedness.
    ///
    /// (Provided method).
    fn map_encoder<V, F>(self, name: impl Into<String>, f: F) -> MapEncoder<Self, T, F>
    where
        Self: Sized,
        F: Fn(&V) -> T,
    {
        MapEncoder::new(self, name.into(), f)
    }
}

/// Trait for codecs that can read values of type `T` from a buffer.
pub trait Decoder<T>: Format {
    /// Reads a value at the read cursor, advancing it by the encoded length.
    ///
    /// On failure the read cursor may be left anywhere after its starting position. Composite
    /// codecs call this on their parts; callers should use [Decoder::decode].
    fn read(&self, buf: &mut ByteBuf) -> Result<T, Error>;

    /// Reads a value at the read cursor. On failure the read cursor is restored.
    ///
    /// (Provided method).
    fn decode(&self, buf: &mut ByteBuf) -> Result<T, Error> {
        let mark = buf.reader_index();
        match self.read(buf) {
            Ok(value) => Ok(value),
            Err(err) => {
                buf.set_reader_index(mark)?;
                Err(err)
            }
        }
    }

    /// Decodes a value from the start of `input`. Trailing bytes are ignored.
    ///
    /// (Provided method).
    fn decode_bytes(&self, input: Bytes) -> Result<T, Error> {
        self.read(&mut ByteBuf::wrap(input))
    }

    /// Decodes a value from `input`, ensuring the input is fully consumed.
    ///
    /// (Provided method).
    fn decode_exact(&self, input: Bytes) -> Result<T, Error> {
        let mut buf = ByteBuf::wrap(input);
        let value = self.read(&mut buf)?;
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }
        Ok(value)
    }

    /// Adapts this decoder to produce values of type `V`.
    ///
    /// (Provided method).
    fn map_decoder<V, F>(self, name: impl Into<String>, f: F) -> MapDecoder<Self, T, Total<F>>
    where
        Self: Sized,
        F: Fn(T) -> V,
    {
        MapDecoder::new(self, name.into(), Total(f))
    }

    /// Adapts this decoder with a conversion that may reject decoded values.
    ///
    /// (Provided method).
    fn try_map_decoder<V, F>(
        self,
        name: impl Into<String>,
        f: F,
    ) -> MapDecoder<Self, T, Partial<F>>
    where
        Self: Sized,
        F: Fn(T) -> Result<V, Error>,
    {
        MapDecoder::new(self, name.into(), Partial(f))
    }
}

/// Trait for codecs that can both encode and decode values of type `T`.
pub trait Serializer<T>: Encoder<T> + Decoder<T> {
    /// Remaps this codec to values of type `V` through a pair of conversions.
    ///
    /// The result has the same boundedness.
    ///
    /// (Provided method).
    fn bimap<V, E, D>(self, name: impl Into<String>, enc: E, dec: D) -> BiMap<Self, T, E, Total<D>>
    where
        Self: Sized,
        E: Fn(&V) -> T,
        D: Fn(T) -> V,
    {
        BiMap::new(self, name.into(), enc, Total(dec))
    }

    /// Like [Serializer::bimap], but the decode conversion may reject values.
    ///
    /// (Provided method).
    fn try_bimap<V, E, D>(
        self,
        name: impl Into<String>,
        enc: E,
        dec: D,
    ) -> BiMap<Self, T, E, Partial<D>>
    where
        Self: Sized,
        E: Fn(&V) -> T,
        D: Fn(T) -> Result<V, Error>,
    {
        BiMap::new(self, name.into(), enc, Partial(dec))
    }
}

// Automatically implement `Serializer` for codecs that implement `Encoder` and `Decoder`.
impl<T, C: Encoder<T> + Decoder<T>> Serializer<T> for C {}

// Shared and boxed codecs forward to the codec they point to.
macro_rules! impl_forward {
    ($($ptr:ident),*) => {
        $(
            impl<C: Format + ?Sized> Format for $ptr<C> {
                fn name(&self) -> &str {
                    (**self).name()
                }

                fn is_bounded(&self) -> bool {
                    (**self).is_bounded()
                }
            }

            impl<T, C: Encoder<T> + ?Sized> Encoder<T> for $ptr<C> {
                fn write(&self, value: &T, buf: &mut ByteBuf) -> Result<(), Error> {
                    (**self).write(value, buf)
                }
            }

            impl<T, C: Decoder<T> + ?Sized> Decoder<T> for $ptr<C> {
                fn read(&self, buf: &mut ByteBuf) -> Result<T, Error> {
                    (**self).read(buf)
                }
            }
        )*
    };
}

impl_forward!(Box, Arc, Rc);
