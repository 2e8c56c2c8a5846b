//! Codec that encrypts the encoding of another codec.

use crate::{
    pool::{ObjectPool, QueuePool},
    transform::{Open, Seal, Transform},
    util::{at_least, read_len, write_len},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, LenRange,
};
use bytes::Buf;

/// A value encoded by `C` and passed through pooled transforms.
///
/// Wire format: `[len: Int32][ciphertext: len]`.
///
/// Encoding writes the value to a scratch buffer, then leases a transform from the seal pool and
/// runs it from the scratch buffer straight into the destination's storage. The length is
/// backpatched with the number of bytes the transform actually wrote. Decoding leases from the open
/// pool and decodes `C` from a scratch buffer holding exactly the transform's output.
///
/// Leases are returned to their pool on every path, including failures inside the transform.
/// Encoding into a buffer without writable storage fails with [Error::NoBackingArray].
#[derive(Clone, Debug)]
pub struct Encrypted<C, E, D> {
    inner: C,
    seal: E,
    open: D,
    limit: LenRange,
    name: String,
}

impl<C: Format, E, D> Encrypted<C, E, D> {
    pub fn new(inner: C, seal: E, open: D) -> Self {
        let name = format!("Encrypted({})", inner.name());
        Self {
            inner,
            seal,
            open,
            limit: LenRange::any(),
            name,
        }
    }

    /// Rejects decoded ciphertext lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<C: Format> Encrypted<C, QueuePool<Seal>, QueuePool<Open>> {
    /// Encrypts with ChaCha20-Poly1305 under `key`, pooling up to `capacity` transforms each way.
    pub fn chacha20poly1305(inner: C, key: [u8; 32], capacity: usize) -> Self {
        Self::new(
            inner,
            QueuePool::new(capacity, move || Ok(Seal::new(key))),
            QueuePool::new(capacity, move || Ok(Open::new(key))),
        )
    }
}

impl<C: Format, E, D> Format for Encrypted<C, E, D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<T, C, E, D> Encoder<T> for Encrypted<C, E, D>
where
    C: Encoder<T>,
    E: ObjectPool,
    E::Item: Transform,
{
    fn write(&self, value: &T, buf: &mut ByteBuf) -> Result<(), Error> {
        if buf.array_mut().is_none() {
            return Err(Error::NoBackingArray);
        }
        let mut plain = ByteBuf::new();
        self.inner.write(value, &mut plain)?;

        let mut transform = self.seal.lease()?;
        let expected = transform.output_size(plain.readable_bytes())?;
        buf.ensure_writable(Int32::SIZE + expected)?;
        let size_pos = buf.writer_index();
        Int32.write(&0, buf)?;
        let start = buf.writer_index();
        let storage = buf.array_mut().ok_or(Error::NoBackingArray)?;
        let written = transform.apply(plain.readable(), &mut storage[start..start + expected])?;
        drop(transform);

        buf.set_writer_index(start + written)?;
        buf.rewrite_at(size_pos, |buf| write_len(&Int32, written, buf))
    }
}

impl<T, C, E, D> Decoder<T> for Encrypted<C, E, D>
where
    C: Decoder<T>,
    D: ObjectPool,
    D::Item: Transform,
{
    fn read(&self, buf: &mut ByteBuf) -> Result<T, Error> {
        let len = read_len(&Int32, &self.limit, buf)?;
        at_least(buf, len)?;

        let mut transform = self.open.lease()?;
        let expected = transform.output_size(len)?;
        let mut plain = ByteBuf::fixed(expected);
        let storage = plain.array_mut().ok_or(Error::NoBackingArray)?;
        let written = transform.apply(&buf.readable()[..len], storage)?;
        drop(transform);

        plain.set_writer_index(written)?;
        buf.advance(len);
        self.inner.read(&mut plain)
    }
}
