//! Buffer position utilities shared by codec implementations.

use crate::{ByteBuf, Decoder, Encoder, Error, LenRange};
use tracing::debug;

/// Checks that at least `len` bytes are readable.
#[inline]
pub fn at_least(buf: &ByteBuf, len: usize) -> Result<(), Error> {
    if buf.readable_bytes() < len {
        return Err(Error::EndOfBuffer);
    }
    Ok(())
}

/// Moves the unread bytes of `buf` to the start of its storage.
///
/// Afterwards the read cursor is zero and the write cursor equals the number of unread bytes, so
/// the buffer can be refilled without reallocating. A no-op when the read cursor is already zero.
///
/// When the unread span is longer than the gap in front of it, source and destination overlap.
/// The span is then relocated in steps no longer than the gap: each step copies between two
/// disjoint halves of the storage.
pub fn compact(buf: &mut ByteBuf) -> Result<(), Error> {
    let start = buf.reader_index();
    if start == 0 {
        return Ok(());
    }
    let len = buf.readable_bytes();
    let array = buf.array_mut().ok_or(Error::ReadOnly)?;

    let mut moved = 0;
    while moved < len {
        let step = start.min(len - moved);
        let (head, tail) = array.split_at_mut(start + moved);
        head[moved..moved + step].copy_from_slice(&tail[..step]);
        moved += step;
    }
    debug!(from = start, len, "compacted buffer");

    buf.set_reader_index(0)?;
    buf.set_writer_index(len)
}

/// Writes a length or count through a size codec.
///
/// Fails with [Error::LengthOverflow] if `size` cannot represent `len`: the written field is read
/// back and must decode to the same value, so narrow size codecs never truncate a length.
pub(crate) fn write_len<S: Encoder<i32> + Decoder<i32>>(
    size: &S,
    len: usize,
    buf: &mut ByteBuf,
) -> Result<(), Error> {
    let value = i32::try_from(len).map_err(|_| Error::LengthOverflow(len))?;
    let start = buf.writer_index();
    size.write(&value, buf)?;

    let reader = buf.reader_index();
    buf.set_reader_index(start)?;
    let written = size.read(buf);
    buf.set_reader_index(reader)?;
    if written? != value {
        buf.set_writer_index(start)?;
        return Err(Error::LengthOverflow(len));
    }
    Ok(())
}

/// Reads a length or count through a size codec and checks it against `limit`.
pub(crate) fn read_len<S: Decoder<i32>>(
    size: &S,
    limit: &LenRange,
    buf: &mut ByteBuf,
) -> Result<usize, Error> {
    let len = size.read(buf)?;
    let len = usize::try_from(len).map_err(|_| Error::NegativeLength(len))?;
    limit.check(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{Buf, BufMut};
    use test_case::test_case;

    /// Fills a `capacity` buffer so that its unread span is the last `len` bytes.
    fn tail_filled(capacity: usize, len: usize) -> (ByteBuf, Vec<u8>) {
        let mut buf = ByteBuf::fixed(capacity);
        let content: Vec<u8> = (0..capacity).map(|i| (i % 251) as u8).collect();
        buf.put_slice(&content);
        buf.advance(capacity - len);
        (buf, content[capacity - len..].to_vec())
    }

    #[test_case(64, 1; "single byte")]
    #[test_case(64, 33; "just over half")]
    #[test_case(64, 63; "all but one")]
    #[test_case(64, 32; "exactly half")]
    #[test_case(65, 33; "odd capacity")]
    #[test_case(64, 0; "empty")]
    fn test_compact(capacity: usize, len: usize) {
        let (mut buf, expected) = tail_filled(capacity, len);
        compact(&mut buf).unwrap();
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), len);
        assert_eq!(buf.readable(), &expected[..]);
        assert_eq!(buf.writable_bytes(), capacity - len);
    }

    #[test]
    fn test_compact_middle_span() {
        let mut buf = ByteBuf::fixed(10);
        buf.put_slice(&[0, 1, 2, 3, 4, 5, 6, 7]);
        buf.advance(3);
        compact(&mut buf).unwrap();
        assert_eq!(buf.readable(), &[3, 4, 5, 6, 7]);

        // Refill the reclaimed space
        buf.put_slice(&[8, 9, 10, 11, 12]);
        assert_eq!(buf.readable(), &[3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_compact_noop() {
        let mut buf = ByteBuf::fixed(4);
        buf.put_slice(&[1, 2]);
        compact(&mut buf).unwrap();
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 2);
        assert_eq!(buf.readable(), &[1, 2]);
    }

    #[test]
    fn test_compact_read_only() {
        let mut buf = ByteBuf::wrap(vec![1u8, 2, 3]);
        buf.advance(1);
        assert!(matches!(compact(&mut buf), Err(Error::ReadOnly)));
        assert_eq!(buf.reader_index(), 1);
    }

    #[test_case(127, Some(0x7F); "int8 max")]
    #[test_case(128, None; "int8 overflow")]
    #[test_case(255, None; "int8 unsigned max")]
    fn test_write_len_int8(len: usize, expected: Option<u8>) {
        let mut buf = ByteBuf::new();
        buf.put_u8(0xEE);
        buf.advance(1);
        match (write_len(&crate::Int8, len, &mut buf), expected) {
            (Ok(()), Some(byte)) => assert_eq!(buf.readable(), &[byte]),
            (Err(Error::LengthOverflow(n)), None) => {
                assert_eq!(n, len);
                assert_eq!(buf.writer_index(), 1);
            }
            (result, expected) => panic!("unexpected {result:?} for {expected:?}"),
        }
        assert_eq!(buf.reader_index(), 1);
    }

    #[test]
    fn test_write_len_int16() {
        let mut buf = ByteBuf::new();
        write_len(&crate::Int16, 32767, &mut buf).unwrap();
        assert_eq!(buf.readable(), &[0x7F, 0xFF]);
        assert!(matches!(
            write_len(&crate::Int16L, 32768, &mut buf),
            Err(Error::LengthOverflow(32768))
        ));
        assert_eq!(buf.writer_index(), 2);
        assert!(matches!(
            write_len(&crate::Int32, i32::MAX as usize + 1, &mut buf),
            Err(Error::LengthOverflow(_))
        ));
    }

    #[test]
    fn test_at_least() {
        let buf = ByteBuf::wrap(vec![1u8, 2]);
        assert!(at_least(&buf, 2).is_ok());
        assert!(matches!(at_least(&buf, 3), Err(Error::EndOfBuffer)));
    }
}
