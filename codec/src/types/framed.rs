//! Length-prefixed framing for arbitrary codecs.
//!
//! [Framed] makes any codec bounded, including codecs that consume every readable byte. The
//! payload is encoded once, directly into the destination buffer, and the length prefix in front
//! of it is backpatched afterwards.

use crate::{
    util::{at_least, read_len, write_len},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, LenRange,
};
use tracing::warn;

/// A value preceded by the length of its encoding.
///
/// Wire format: `[len: size codec][payload: len]`.
///
/// Decoding runs the inner codec over exactly `len` bytes and then skips to the end of the frame,
/// so an inner codec that consumes fewer bytes never desynchronizes what follows. An inner codec
/// that tries to read past the frame fails with [Error::FrameOverrun].
#[derive(Clone, Debug)]
pub struct Framed<C, S = Int32> {
    size: S,
    inner: C,
    limit: LenRange,
    name: String,
}

impl<C: Format, S: Format> Framed<C, S> {
    /// Frames `inner` with lengths written by `size`.
    ///
    /// Fails if `size` is not bounded.
    pub fn new(size: S, inner: C) -> Result<Self, Error> {
        size.require_bounded()?;
        let name = format!("Sized({}, {})", size.name(), inner.name());
        Ok(Self {
            size,
            inner,
            limit: LenRange::any(),
            name,
        })
    }

    /// Rejects decoded frame lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<C: Format> Framed<C, Int32> {
    /// Frames `inner` with a 4-byte big-endian length.
    pub fn int32(inner: C) -> Self {
        let name = format!("Sized(Int32, {})", inner.name());
        Self {
            size: Int32,
            inner,
            limit: LenRange::any(),
            name,
        }
    }
}

impl<C: Format, S: Format> Format for Framed<C, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<T, C: Encoder<T>, S: Encoder<i32> + Decoder<i32>> Encoder<T> for Framed<C, S> {
    fn write(&self, value: &T, buf: &mut ByteBuf) -> Result<(), Error> {
        let size_pos = buf.writer_index();
        self.size.write(&0, buf)?;
        let payload_start = buf.writer_index();
        self.inner.write(value, buf)?;
        let len = buf.writer_index() - payload_start;

        buf.rewrite_at(size_pos, |buf| {
            write_len(&self.size, len, buf)?;
            if buf.writer_index() != payload_start {
                return Err(Error::InvalidData(
                    "Sized",
                    format!("length prefix width changed when writing {len}"),
                ));
            }
            Ok(())
        })
    }
}

impl<T, C: Decoder<T>, S: Decoder<i32>> Decoder<T> for Framed<C, S> {
    fn read(&self, buf: &mut ByteBuf) -> Result<T, Error> {
        let len = read_len(&self.size, &self.limit, buf)?;
        at_least(buf, len)?;
        buf.read_window(len, |frame| self.inner.read(frame))
            .map_err(|err| match err {
                Error::EndOfBuffer => {
                    warn!(codec = self.name(), len, "payload overran frame");
                    Error::FrameOverrun(len)
                }
                err => err,
            })
    }
}
