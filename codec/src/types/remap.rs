//! Codecs that adapt another codec to a different value type.
//!
//! These are created through [Encoder::map_encoder], [Decoder::map_decoder],
//! [Decoder::try_map_decoder], [Serializer::bimap](crate::Serializer::bimap) and
//! [Serializer::try_bimap](crate::Serializer::try_bimap). Each keeps the boundedness of the codec
//! it wraps and takes the name it is given.

use crate::{ByteBuf, Decoder, Encoder, Error, Format};
use core::{fmt, marker::PhantomData};

/// A conversion applied to decoded values.
pub trait Remap<T, V> {
    fn remap(&self, value: T) -> Result<V, Error>;
}

/// A conversion that always succeeds.
#[derive(Clone, Copy)]
pub struct Total<F>(pub F);

impl<T, V, F: Fn(T) -> V> Remap<T, V> for Total<F> {
    #[inline]
    fn remap(&self, value: T) -> Result<V, Error> {
        Ok((self.0)(value))
    }
}

/// A conversion that may reject a decoded value.
#[derive(Clone, Copy)]
pub struct Partial<F>(pub F);

impl<T, V, F: Fn(T) -> Result<V, Error>> Remap<T, V> for Partial<F> {
    #[inline]
    fn remap(&self, value: T) -> Result<V, Error> {
        (self.0)(value)
    }
}

/// An encoder of `V` that converts each value to `T` before encoding it with `C`.
pub struct MapEncoder<C, T, F> {
    inner: C,
    name: String,
    f: F,
    _marker: PhantomData<fn(T) -> T>,
}

impl<C, T, F> MapEncoder<C, T, F> {
    pub(crate) fn new(inner: C, name: String, f: F) -> Self {
        Self {
            inner,
            name,
            f,
            _marker: PhantomData,
        }
    }
}

impl<C: Format, T, F> Format for MapEncoder<C, T, F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        self.inner.is_bounded()
    }
}

impl<C, T, V, F> Encoder<V> for MapEncoder<C, T, F>
where
    C: Encoder<T>,
    F: Fn(&V) -> T,
{
    fn write(&self, value: &V, buf: &mut ByteBuf) -> Result<(), Error> {
        self.inner.write(&(self.f)(value), buf)
    }
}

/// A decoder of `V` that decodes a `T` with `C` and converts it.
pub struct MapDecoder<C, T, R> {
    inner: C,
    name: String,
    remap: R,
    _marker: PhantomData<fn(T) -> T>,
}

impl<C, T, R> MapDecoder<C, T, R> {
    pub(crate) fn new(inner: C, name: String, remap: R) -> Self {
        Self {
            inner,
            name,
            remap,
            _marker: PhantomData,
        }
    }
}

impl<C: Format, T, R> Format for MapDecoder<C, T, R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        self.inner.is_bounded()
    }
}

impl<C, T, V, R> Decoder<V> for MapDecoder<C, T, R>
where
    C: Decoder<T>,
    R: Remap<T, V>,
{
    fn read(&self, buf: &mut ByteBuf) -> Result<V, Error> {
        self.remap.remap(self.inner.read(buf)?)
    }
}

/// A codec of `V` built from a codec of `T` and conversions in both directions.
pub struct BiMap<C, T, E, D> {
    inner: C,
    name: String,
    enc: E,
    dec: D,
    _marker: PhantomData<fn(T) -> T>,
}

impl<C, T, E, D> BiMap<C, T, E, D> {
    pub(crate) fn new(inner: C, name: String, enc: E, dec: D) -> Self {
        Self {
            inner,
            name,
            enc,
            dec,
            _marker: PhantomData,
        }
    }
}

impl<C: Format, T, E, D> Format for BiMap<C, T, E, D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        self.inner.is_bounded()
    }
}

impl<C, T, V, E, D> Encoder<V> for BiMap<C, T, E, D>
where
    C: Encoder<T>,
    E: Fn(&V) -> T,
{
    fn write(&self, value: &V, buf: &mut ByteBuf) -> Result<(), Error> {
        self.inner.write(&(self.enc)(value), buf)
    }
}

impl<C, T, V, E, D> Decoder<V> for BiMap<C, T, E, D>
where
    C: Decoder<T>,
    D: Remap<T, V>,
{
    fn read(&self, buf: &mut ByteBuf) -> Result<V, Error> {
        self.dec.remap(self.inner.read(buf)?)
    }
}

// Conversions are opaque, so only the name and inner codec are printed.
impl<C: fmt::Debug, T, E, D> fmt::Debug for BiMap<C, T, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiMap")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<C: fmt::Debug, T, F> fmt::Debug for MapEncoder<C, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapEncoder")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<C: fmt::Debug, T, R> fmt::Debug for MapDecoder<C, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDecoder")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<C: Clone, T, F: Clone> Clone for MapEncoder<C, T, F> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.name.clone(), self.f.clone())
    }
}

impl<C: Clone, T, R: Clone> Clone for MapDecoder<C, T, R> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.name.clone(), self.remap.clone())
    }
}

impl<C: Clone, T, E: Clone, D: Clone> Clone for BiMap<C, T, E, D> {
    fn clone(&self) -> Self {
        Self::new(
            self.inner.clone(),
            self.name.clone(),
            self.enc.clone(),
            self.dec.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{ByteBuf, Decoder, Encoder, Error, Format, Int32, RawBytes, Serializer};
    use bytes::Bytes;

    #[derive(Debug, PartialEq)]
    struct UserId(i32);

    #[test]
    fn test_bimap() {
        let codec = Int32.bimap("UserId", |id: &UserId| id.0, UserId);
        assert_eq!(codec.name(), "UserId");
        assert!(codec.is_bounded());

        let encoded = codec.encode_to_bytes(&UserId(258)).unwrap();
        assert_eq!(encoded, Bytes::from_static(&[0, 0, 1, 2]));
        let decoded: UserId = codec.decode_exact(encoded).unwrap();
        assert_eq!(decoded, UserId(258));
    }

    #[test]
    fn test_bimap_keeps_boundedness() {
        let codec = RawBytes.bimap(
            "Blob",
            |v: &Vec<u8>| Bytes::from(v.clone()),
            |b: Bytes| b.to_vec(),
        );
        assert!(!codec.is_bounded());
        assert!(matches!(codec.require_bounded(), Err(Error::Unbounded(name)) if name == "Blob"));
    }

    #[test]
    fn test_try_bimap_rejects() {
        let codec = Int32.try_bimap(
            "Port",
            |port: &u16| i32::from(*port),
            |raw: i32| {
                u16::try_from(raw).map_err(|_| Error::InvalidData("Port", format!("{raw}")))
            },
        );
        let mut buf = ByteBuf::wrap(Bytes::from_static(&[0, 1, 0, 0, 0, 0, 0x1F, 0x90]));
        let rejected: Result<u16, Error> = codec.decode(&mut buf);
        assert!(matches!(rejected, Err(Error::InvalidData("Port", _))));
        assert_eq!(buf.reader_index(), 0);

        buf.set_reader_index(4).unwrap();
        let port: u16 = codec.decode(&mut buf).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_map_encoder_and_decoder() {
        let encoder = Int32.map_encoder("Len", |s: &String| s.len() as i32);
        let decoder = Int32.map_decoder("Doubled", |v: i32| v * 2);
        assert_eq!(encoder.name(), "Len");
        assert!(decoder.is_bounded());

        let mut buf = ByteBuf::new();
        encoder.encode(&"hello".to_string(), &mut buf).unwrap();
        let doubled: i32 = decoder.decode(&mut buf).unwrap();
        assert_eq!(doubled, 10);
    }

    #[test]
    fn test_try_map_decoder() {
        let decoder = Int32.try_map_decoder("Positive", |v: i32| {
            if v > 0 {
                Ok(v as u32)
            } else {
                Err(Error::InvalidData("Positive", format!("{v}")))
            }
        });
        let positive: u32 = decoder
            .decode_bytes(Bytes::from_static(&[0, 0, 0, 5]))
            .unwrap();
        assert_eq!(positive, 5);
        let negative: Result<u32, Error> =
            decoder.decode_bytes(Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(matches!(negative, Err(Error::InvalidData("Positive", _))));
    }
}
