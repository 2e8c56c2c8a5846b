//! Codec for optional values.

use crate::{Bool, ByteBuf, Decoder, Encoder, Error, Format};

/// An optional value: a [Bool] presence flag, followed by the value if present.
///
/// Wire format: `[0x00]` for `None`, `[0x01][value]` for `Some(value)`.
#[derive(Clone, Debug)]
pub struct Optional<C> {
    inner: C,
    name: String,
}

impl<C: Format> Optional<C> {
    pub fn new(inner: C) -> Self {
        let name = format!("Optional({})", inner.name());
        Self { inner, name }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Format> Format for Optional<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        self.inner.is_bounded()
    }
}

impl<T, C: Encoder<T>> Encoder<Option<T>> for Optional<C> {
    fn write(&self, value: &Option<T>, buf: &mut ByteBuf) -> Result<(), Error> {
        Bool.write(&value.is_some(), buf)?;
        if let Some(inner) = value {
            self.inner.write(inner, buf)?;
        }
        Ok(())
    }
}

impl<T, C: Decoder<T>> Decoder<Option<T>> for Optional<C> {
    fn read(&self, buf: &mut ByteBuf) -> Result<Option<T>, Error> {
        if Bool.read(buf)? {
            Ok(Some(self.inner.read(buf)?))
        } else {
            Ok(None)
        }
    }
}
