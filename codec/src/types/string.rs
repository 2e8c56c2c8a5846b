//! Codecs for strings.
//!
//! Three framings are supported:
//! - [StringCodec]: the encoded characters only. Unbounded.
//! - [SizedString]: a length prefix followed by the encoded characters.
//! - [CString]: the encoded characters followed by a single `0x00` terminator.
//!
//! Each is parameterized by a [Charset].

use crate::{
    util::{at_least, read_len, write_len},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, LenRange,
};
use bytes::{Buf, BufMut};
use tracing::warn;

/// Terminator of a [CString].
const NUL: u8 = 0x00;

/// Character encodings supported by the string codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    /// ISO-8859-1: one byte per character, covering U+0000 to U+00FF.
    Latin1,
}

impl Charset {
    /// Returns the canonical name of the charset.
    pub const fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Returns the number of bytes `s` encodes to.
    pub fn encoded_len(&self, s: &str) -> usize {
        match self {
            Charset::Utf8 => s.len(),
            Charset::Latin1 => s.chars().count(),
        }
    }

    /// Writes the encoded characters of `s`. Nothing is written if `s` cannot be encoded.
    fn write(&self, s: &str, buf: &mut ByteBuf) -> Result<(), Error> {
        match self {
            Charset::Utf8 => {
                buf.ensure_writable(s.len())?;
                buf.put_slice(s.as_bytes());
            }
            Charset::Latin1 => {
                if let Some(c) = s.chars().find(|c| u32::from(*c) > 0xFF) {
                    return Err(Error::Unencodable(c, self.name()));
                }
                buf.ensure_writable(self.encoded_len(s))?;
                for c in s.chars() {
                    buf.put_u8(c as u8);
                }
            }
        }
        Ok(())
    }

    /// Decodes `bytes` into a string.
    fn decode(&self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            Charset::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
            Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Reads and decodes the next `len` bytes.
    fn read(&self, len: usize, buf: &mut ByteBuf) -> Result<String, Error> {
        at_least(buf, len)?;
        let s = self.decode(&buf.readable()[..len])?;
        buf.advance(len);
        Ok(s)
    }
}

/// A string with no framing. Decoding consumes every readable byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringCodec {
    charset: Charset,
}

impl StringCodec {
    pub const fn new(charset: Charset) -> Self {
        Self { charset }
    }
}

impl Format for StringCodec {
    fn name(&self) -> &str {
        match self.charset {
            Charset::Utf8 => "String(UTF-8)",
            Charset::Latin1 => "String(ISO-8859-1)",
        }
    }

    fn is_bounded(&self) -> bool {
        false
    }
}

impl Encoder<String> for StringCodec {
    fn write(&self, value: &String, buf: &mut ByteBuf) -> Result<(), Error> {
        self.charset.write(value, buf)
    }
}

impl Decoder<String> for StringCodec {
    fn read(&self, buf: &mut ByteBuf) -> Result<String, Error> {
        self.charset.read(buf.remaining(), buf)
    }
}

/// A string preceded by its encoded length in bytes.
///
/// Wire format: `[len: size codec][chars: len]`. The length is computed from the string before
/// anything is written, so no backpatching is needed.
#[derive(Clone, Debug)]
pub struct SizedString<S = Int32> {
    size: S,
    charset: Charset,
    limit: LenRange,
    name: String,
}

impl<S: Format> SizedString<S> {
    /// Creates a codec that writes lengths with `size`.
    ///
    /// Fails if `size` is not bounded.
    pub fn new(size: S, charset: Charset) -> Result<Self, Error> {
        size.require_bounded()?;
        Ok(Self::unchecked(size, charset))
    }

    fn unchecked(size: S, charset: Charset) -> Self {
        let name = format!("SizedString({}, {})", size.name(), charset.name());
        Self {
            size,
            charset,
            limit: LenRange::any(),
            name,
        }
    }

    /// Rejects decoded byte lengths outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<S: Format> Format for SizedString<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<S: Encoder<i32> + Decoder<i32>> Encoder<String> for SizedString<S> {
    fn write(&self, value: &String, buf: &mut ByteBuf) -> Result<(), Error> {
        write_len(&self.size, self.charset.encoded_len(value), buf)?;
        self.charset.write(value, buf)
    }
}

impl<S: Decoder<i32>> Decoder<String> for SizedString<S> {
    fn read(&self, buf: &mut ByteBuf) -> Result<String, Error> {
        let len = read_len(&self.size, &self.limit, buf)?;
        self.charset.read(len, buf)
    }
}

/// A null-terminated string.
///
/// Wire format: `[chars][0x00]`. Strings containing `U+0000` cannot be encoded.
///
/// By default, decoding fails with [Error::MissingTerminator] if no terminator is readable. A
/// [CString::lenient] codec instead returns every readable byte as the string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CString {
    charset: Charset,
    lenient: bool,
}

impl CString {
    pub const fn new(charset: Charset) -> Self {
        Self {
            charset,
            lenient: false,
        }
    }

    /// Accepts input that ends without a terminator.
    pub const fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

impl Format for CString {
    fn name(&self) -> &str {
        match self.charset {
            Charset::Utf8 => "CString(UTF-8)",
            Charset::Latin1 => "CString(ISO-8859-1)",
        }
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl Encoder<String> for CString {
    fn write(&self, value: &String, buf: &mut ByteBuf) -> Result<(), Error> {
        if value.contains('\0') {
            return Err(Error::EmbeddedTerminator);
        }
        self.charset.write(value, buf)?;
        buf.ensure_writable(1)?;
        buf.put_u8(NUL);
        Ok(())
    }
}

impl Decoder<String> for CString {
    fn read(&self, buf: &mut ByteBuf) -> Result<String, Error> {
        match buf.readable().iter().position(|&b| b == NUL) {
            Some(len) => {
                let s = self.charset.read(len, buf)?;
                buf.advance(1);
                Ok(s)
            }
            None if self.lenient => {
                let len = buf.remaining();
                warn!(len, "string terminator missing, consuming remaining bytes");
                self.charset.read(len, buf)
            }
            None => Err(Error::MissingTerminator),
        }
    }
}

/// UTF-8 string with no framing.
pub const fn utf8() -> StringCodec {
    StringCodec::new(Charset::Utf8)
}

/// UTF-8 string preceded by a 4-byte big-endian length.
pub fn utf8_sized() -> SizedString<Int32> {
    SizedString::unchecked(Int32, Charset::Utf8)
}

/// Null-terminated ISO-8859-1 string.
pub const fn latin1_cstring() -> CString {
    CString::new(Charset::Latin1)
}
