//! Codecs for dates and times.
//!
//! Instants are [DateTime<Utc>]. Local date-times are [NaiveDateTime] values interpreted as UTC
//! and encoded with one of the instant codecs.
//!
//! | Codec | Wire format |
//! |-------|-------------|
//! | `Instant64`, `Instant64L` | milliseconds since the epoch, [Long64] / [Long64L] |
//! | `Instant96`, `Instant96L` | seconds since the epoch ([Long64]) then nanoseconds ([Int32]) |
//! | `LocalTime` | `[hour: 1][minute: 1][second: 1][nanos: Int32]` |
//! | `LocalDate`, `LocalDateL` | days since the epoch, [Long64] / [Long64L] |
//!
//! The 64-bit instants carry epoch milliseconds, not seconds. This matches the wire format of
//! existing encoders and is kept deliberately; use the 96-bit instants for full precision.

use crate::{
    types::remap::{BiMap, Partial},
    util::at_least,
    ByteBuf, Decoder, Encoder, Error, Format, Int32, Int32L, Long64, Long64L, Serializer,
};
use bytes::{Buf, BufMut};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Days from 0001-01-01 (day 1) to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Codec of [DateTime<Utc>] stored as epoch milliseconds through `L`.
pub type Instant64Codec<L> = BiMap<
    L,
    i64,
    fn(&DateTime<Utc>) -> i64,
    Partial<fn(i64) -> Result<DateTime<Utc>, Error>>,
>;

/// Codec of [NaiveDate] stored as epoch days through `L`.
pub type LocalDateCodec<L> =
    BiMap<L, i64, fn(&NaiveDate) -> i64, Partial<fn(i64) -> Result<NaiveDate, Error>>>;

fn to_millis(value: &DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidData("Instant64", format!("{millis} ms is out of range")))
}

fn instant64_with<L: Serializer<i64>>(millis: L, name: &str) -> Instant64Codec<L> {
    millis.try_bimap(
        name,
        to_millis as fn(&DateTime<Utc>) -> i64,
        from_millis as fn(i64) -> Result<DateTime<Utc>, Error>,
    )
}

/// Epoch milliseconds, big-endian. Sub-millisecond precision is dropped.
pub fn instant64() -> Instant64Codec<Long64> {
    instant64_with(Long64, "Instant64")
}

/// Epoch milliseconds, little-endian. Sub-millisecond precision is dropped.
pub fn instant64_l() -> Instant64Codec<Long64L> {
    instant64_with(Long64L, "Instant64L")
}

/// An instant with nanosecond precision: epoch seconds followed by the nanosecond offset.
#[derive(Clone, Copy, Debug)]
pub struct Instant96<L, I> {
    secs: L,
    nanos: I,
    name: &'static str,
}

/// Big-endian [Instant96].
pub const fn instant96() -> Instant96<Long64, Int32> {
    Instant96 {
        secs: Long64,
        nanos: Int32,
        name: "Instant96",
    }
}

/// Little-endian [Instant96].
pub const fn instant96_l() -> Instant96<Long64L, Int32L> {
    Instant96 {
        secs: Long64L,
        nanos: Int32L,
        name: "Instant96L",
    }
}

impl<L, I> Format for Instant96<L, I> {
    fn name(&self) -> &str {
        self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<L: Encoder<i64>, I: Encoder<i32>> Encoder<DateTime<Utc>> for Instant96<L, I> {
    fn write(&self, value: &DateTime<Utc>, buf: &mut ByteBuf) -> Result<(), Error> {
        self.secs.write(&value.timestamp(), buf)?;
        // Below 2e9 even during a leap second
        self.nanos.write(&(value.timestamp_subsec_nanos() as i32), buf)
    }
}

impl<L: Decoder<i64>, I: Decoder<i32>> Decoder<DateTime<Utc>> for Instant96<L, I> {
    fn read(&self, buf: &mut ByteBuf) -> Result<DateTime<Utc>, Error> {
        let secs = self.secs.read(buf)?;
        let nanos = self.nanos.read(buf)?;
        u32::try_from(nanos)
            .ok()
            .and_then(|nanos| DateTime::from_timestamp(secs, nanos))
            .ok_or_else(|| Error::InvalidData(self.name, format!("{secs} s + {nanos} ns")))
    }
}

/// A [NaiveDateTime] interpreted as UTC and stored with an instant codec.
#[derive(Clone, Debug)]
pub struct LocalDateTimeCodec<C> {
    instant: C,
    name: &'static str,
}

impl<C: Format> Format for LocalDateTimeCodec<C> {
    fn name(&self) -> &str {
        self.name
    }

    fn is_bounded(&self) -> bool {
        self.instant.is_bounded()
    }
}

impl<C: Encoder<DateTime<Utc>>> Encoder<NaiveDateTime> for LocalDateTimeCodec<C> {
    fn write(&self, value: &NaiveDateTime, buf: &mut ByteBuf) -> Result<(), Error> {
        self.instant.write(&value.and_utc(), buf)
    }
}

impl<C: Decoder<DateTime<Utc>>> Decoder<NaiveDateTime> for LocalDateTimeCodec<C> {
    fn read(&self, buf: &mut ByteBuf) -> Result<NaiveDateTime, Error> {
        Ok(self.instant.read(buf)?.naive_utc())
    }
}

pub fn local_date_time64() -> LocalDateTimeCodec<Instant64Codec<Long64>> {
    LocalDateTimeCodec {
        instant: instant64(),
        name: "LocalDateTime64",
    }
}

pub fn local_date_time64_l() -> LocalDateTimeCodec<Instant64Codec<Long64L>> {
    LocalDateTimeCodec {
        instant: instant64_l(),
        name: "LocalDateTime64L",
    }
}

pub fn local_date_time96() -> LocalDateTimeCodec<Instant96<Long64, Int32>> {
    LocalDateTimeCodec {
        instant: instant96(),
        name: "LocalDateTime96",
    }
}

pub fn local_date_time96_l() -> LocalDateTimeCodec<Instant96<Long64L, Int32L>> {
    LocalDateTimeCodec {
        instant: instant96_l(),
        name: "LocalDateTime96L",
    }
}

/// A time of day with nanosecond precision.
///
/// Wire format: `[hour: 1][minute: 1][second: 1][nanos: Int32]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalTimeCodec;

impl LocalTimeCodec {
    pub const SIZE: usize = 7;
}

impl Format for LocalTimeCodec {
    fn name(&self) -> &str {
        "LocalTime"
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl Encoder<NaiveTime> for LocalTimeCodec {
    fn write(&self, value: &NaiveTime, buf: &mut ByteBuf) -> Result<(), Error> {
        buf.ensure_writable(Self::SIZE)?;
        buf.put_u8(value.hour() as u8);
        buf.put_u8(value.minute() as u8);
        buf.put_u8(value.second() as u8);
        buf.put_i32(value.nanosecond() as i32);
        Ok(())
    }
}

impl Decoder<NaiveTime> for LocalTimeCodec {
    fn read(&self, buf: &mut ByteBuf) -> Result<NaiveTime, Error> {
        at_least(buf, Self::SIZE)?;
        let hour = u32::from(buf.get_u8());
        let minute = u32::from(buf.get_u8());
        let second = u32::from(buf.get_u8());
        let nanos = buf.get_i32();
        u32::try_from(nanos)
            .ok()
            .and_then(|nanos| NaiveTime::from_hms_nano_opt(hour, minute, second, nanos))
            .ok_or_else(|| {
                Error::InvalidData(
                    "LocalTime",
                    format!("{hour:02}:{minute:02}:{second:02} + {nanos} ns"),
                )
            })
    }
}

fn to_epoch_day(value: &NaiveDate) -> i64 {
    i64::from(value.num_days_from_ce()) - EPOCH_DAYS_FROM_CE
}

fn from_epoch_day(day: i64) -> Result<NaiveDate, Error> {
    day.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(|days| i32::try_from(days).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| Error::InvalidData("LocalDate", format!("epoch day {day} is out of range")))
}

fn local_date_with<L: Serializer<i64>>(days: L, name: &str) -> LocalDateCodec<L> {
    days.try_bimap(
        name,
        to_epoch_day as fn(&NaiveDate) -> i64,
        from_epoch_day as fn(i64) -> Result<NaiveDate, Error>,
    )
}

/// Epoch days, big-endian.
pub fn local_date() -> LocalDateCodec<Long64> {
    local_date_with(Long64, "LocalDate")
}

/// Epoch days, little-endian.
pub fn local_date_l() -> LocalDateCodec<Long64L> {
    local_date_with(Long64L, "LocalDateL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn utc(secs: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, nanos).unwrap()
    }

    #[test]
    fn test_instant64() {
        let codec = instant64();
        assert_eq!(codec.name(), "Instant64");
        let value = utc(1_600_000_000, 123_000_000);
        let encoded = codec.encode_to_bytes(&value).unwrap();
        assert_eq!(&encoded[..], &1_600_000_000_123i64.to_be_bytes());
        let decoded: DateTime<Utc> = codec.decode_exact(encoded).unwrap();
        assert_eq!(decoded, value);

        let codec = instant64_l();
        let encoded = codec.encode_to_bytes(&value).unwrap();
        assert_eq!(&encoded[..], &1_600_000_000_123i64.to_le_bytes());
        let decoded: DateTime<Utc> = codec.decode_exact(encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_instant64_truncates_to_millis() {
        let value = utc(-5, 999_999);
        let encoded = instant64().encode_to_bytes(&value).unwrap();
        let decoded: DateTime<Utc> = instant64().decode_exact(encoded).unwrap();
        assert_eq!(decoded, utc(-5, 0));
    }

    #[test]
    fn test_instant64_out_of_range() {
        let result: Result<DateTime<Utc>, _> =
            instant64().decode_bytes(Bytes::copy_from_slice(&i64::MAX.to_be_bytes()));
        assert!(matches!(result, Err(Error::InvalidData("Instant64", _))));
    }

    fn check_instant96<C: Serializer<DateTime<Utc>>>(codec: C, secs: &[u8], nanos: &[u8]) {
        let value = utc(-1_234_567, 987_654_321);
        let encoded = codec.encode_to_bytes(&value).unwrap();
        assert_eq!(&encoded[..8], secs);
        assert_eq!(&encoded[8..], nanos);
        assert_eq!(codec.decode_exact(encoded).unwrap(), value);
    }

    #[test]
    fn test_instant96() {
        check_instant96(
            instant96(),
            &(-1_234_567i64).to_be_bytes(),
            &987_654_321i32.to_be_bytes(),
        );
        check_instant96(
            instant96_l(),
            &(-1_234_567i64).to_le_bytes(),
            &987_654_321i32.to_le_bytes(),
        );
        assert_eq!(instant96_l().name(), "Instant96L");
    }

    #[test]
    fn test_instant96_invalid_nanos() {
        let mut buf = ByteBuf::new();
        Long64.write(&0, &mut buf).unwrap();
        Int32.write(&-1, &mut buf).unwrap();
        assert!(matches!(
            instant96().decode(&mut buf),
            Err(Error::InvalidData("Instant96", _))
        ));
        assert_eq!(buf.reader_index(), 0);
    }

    #[test]
    fn test_local_date_time() {
        let value = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_nano_opt(23, 59, 58, 123_456_789)
            .unwrap();

        let encoded = local_date_time96().encode_to_bytes(&value).unwrap();
        assert_eq!(encoded.len(), 12);
        let decoded: NaiveDateTime = local_date_time96().decode_exact(encoded).unwrap();
        assert_eq!(decoded, value);

        let encoded = local_date_time96_l().encode_to_bytes(&value).unwrap();
        let decoded: NaiveDateTime = local_date_time96_l().decode_exact(encoded).unwrap();
        assert_eq!(decoded, value);

        // Millisecond codecs drop the sub-millisecond part
        let millis = value.and_utc().timestamp_millis();
        for codec in [
            Box::new(local_date_time64()) as Box<dyn Serializer<NaiveDateTime>>,
            Box::new(local_date_time64_l()),
        ] {
            let encoded = codec.encode_to_bytes(&value).unwrap();
            let decoded = codec.decode_exact(encoded).unwrap();
            assert_eq!(decoded.and_utc().timestamp_millis(), millis);
            assert_eq!(decoded.nanosecond(), 123_000_000);
        }
        assert_eq!(local_date_time64_l().name(), "LocalDateTime64L");
        assert!(local_date_time64().is_bounded());
    }

    #[test]
    fn test_local_time() {
        let codec = LocalTimeCodec;
        let value = NaiveTime::from_hms_nano_opt(13, 5, 59, 1_000_001).unwrap();
        let encoded = codec.encode_to_bytes(&value).unwrap();
        assert_eq!(
            encoded,
            Bytes::from_static(&[13, 5, 59, 0x00, 0x0F, 0x42, 0x41])
        );
        assert_eq!(codec.decode_exact(encoded).unwrap(), value);

        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let encoded = codec.encode_to_bytes(&midnight).unwrap();
        assert_eq!(codec.decode_exact(encoded).unwrap(), midnight);
    }

    #[test]
    fn test_local_time_invalid() {
        assert!(matches!(
            LocalTimeCodec.decode_bytes(Bytes::from_static(&[24, 0, 0, 0, 0, 0, 0])),
            Err(Error::InvalidData("LocalTime", _))
        ));
        assert!(matches!(
            LocalTimeCodec.decode_bytes(Bytes::from_static(&[1, 2, 3])),
            Err(Error::EndOfBuffer)
        ));
    }

    #[test]
    fn test_local_date() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let encoded = local_date().encode_to_bytes(&epoch).unwrap();
        assert_eq!(encoded, Bytes::from_static(&[0; 8]));

        let value = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
        let encoded = local_date().encode_to_bytes(&value).unwrap();
        assert_eq!(&encoded[..], &11_017i64.to_be_bytes());
        let decoded: NaiveDate = local_date().decode_exact(encoded).unwrap();
        assert_eq!(decoded, value);

        let before = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        let encoded = local_date_l().encode_to_bytes(&before).unwrap();
        assert_eq!(&encoded[..], &(-1i64).to_le_bytes());
        let decoded: NaiveDate = local_date_l().decode_exact(encoded).unwrap();
        assert_eq!(decoded, before);
    }

    #[test]
    fn test_local_date_out_of_range() {
        let result: Result<NaiveDate, _> =
            local_date().decode_bytes(Bytes::copy_from_slice(&i64::MIN.to_be_bytes()));
        assert!(matches!(result, Err(Error::InvalidData("LocalDate", _))));
    }
}
