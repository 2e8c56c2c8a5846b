#![no_main]

use arbitrary::Arbitrary;
use bufcodec::{
    latin1_cstring, utf8_sized,
    util::compact,
    ByteBuf, Bool, Byte, Double64, Double64L, Error, Float32, Float32L, Framed, Int16, Int16L,
    Int24, Int24L, Int32, Int32L, Int8, ListCodec, Long64, Long64L, MapCodec, Optional, RawBytes,
    Decoder, Encoder, Serializer, SetCodec, Short16, Short16L, SizedBytes,
};
use bytes::{Buf, BufMut, Bytes};
use libfuzzer_sys::fuzz_target;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::Debug,
};

fn roundtrip<T, C>(codec: &C, value: &T)
where
    T: Debug + PartialEq,
    C: Serializer<T>,
{
    let mut buf = ByteBuf::new();
    codec.encode(value, &mut buf).expect("Failed to encode!");
    let len = buf.readable_bytes();

    // A trailing byte must be left untouched by bounded codecs
    buf.put_u8(0xAA);
    let decoded = codec.decode(&mut buf).expect("Failed to decode!");
    assert_eq!(&decoded, value, "{}", codec.name());
    assert_eq!(buf.reader_index(), len);
    assert_eq!(buf.get_u8(), 0xAA);
}

// NOTE: Separate float cases to handle NaN comparisons
fn roundtrip_f32<C: Serializer<f32>>(codec: &C, v: f32) {
    let encoded = codec.encode_to_bytes(&v).expect("Failed to encode f32!");
    let decoded = codec.decode_exact(encoded).expect("Failed to decode f32!");
    assert_eq!(v.to_bits(), decoded.to_bits());
}

fn roundtrip_f64<C: Serializer<f64>>(codec: &C, v: f64) {
    let encoded = codec.encode_to_bytes(&v).expect("Failed to encode f64!");
    let decoded = codec.decode_exact(encoded).expect("Failed to decode f64!");
    assert_eq!(v.to_bits(), decoded.to_bits());
}

fn roundtrip_narrow(v: i32) {
    for (codec, bits) in [
        (Box::new(Int8) as Box<dyn Serializer<i32>>, 8),
        (Box::new(Int16), 16),
        (Box::new(Int16L), 16),
        (Box::new(Int24), 24),
        (Box::new(Int24L), 24),
    ] {
        // Only the low `bits` survive, sign-extended
        let expected = (v << (32 - bits)) >> (32 - bits);
        let encoded = codec.encode_to_bytes(&v).expect("Failed to encode narrow int!");
        assert_eq!(encoded.len(), bits / 8);
        let decoded = codec.decode_exact(encoded).expect("Failed to decode narrow int!");
        assert_eq!(decoded, expected);
    }
}

fn roundtrip_sized_bytes(data: &[u8]) {
    let value = Bytes::copy_from_slice(data);
    let len = data.len();
    let codec = SizedBytes::int32();
    let encoded = codec.encode_to_bytes(&value).expect("Failed to encode bytes!");

    // Decode with too short a limit
    assert!(matches!(
        codec.clone().with_limit(len + 1..).decode_bytes(encoded.clone()),
        Err(Error::InvalidLength(_))
    ));

    // Decode with an exact limit
    let decoded = codec
        .with_limit(len..=len)
        .decode_exact(encoded)
        .expect("Failed to decode bytes!");
    assert_eq!(decoded, value);
}

fn roundtrip_framed(data: &[u8], trailer: i32) {
    let codec = Framed::int32(RawBytes);
    let value = Bytes::copy_from_slice(data);
    let mut buf = ByteBuf::new();
    codec.encode(&value, &mut buf).expect("Failed to encode frame!");
    Int32.encode(&trailer, &mut buf).expect("Failed to encode trailer!");

    assert_eq!(codec.decode(&mut buf).expect("Failed to decode frame!"), value);
    assert_eq!(Int32.decode(&mut buf).expect("Failed to decode trailer!"), trailer);
}

fn roundtrip_cstring(s: String) {
    let codec = latin1_cstring();
    let value: String = s.chars().map(|c| char::from(c as u32 as u8)).collect();
    let mut buf = ByteBuf::new();
    match codec.encode(&value, &mut buf) {
        Ok(()) => roundtrip(&codec, &value),
        Err(Error::EmbeddedTerminator) => {
            assert!(value.contains('\0'));
            assert_eq!(buf.writer_index(), 0);
        }
        Err(err) => panic!("unexpected error: {err}"),
    }
}

fn compact_preserves(data: &[u8], consumed: usize) {
    let mut buf = ByteBuf::with_capacity(data.len());
    buf.put_slice(data);
    let consumed = consumed.min(data.len());
    buf.advance(consumed);
    compact(&mut buf).expect("Failed to compact!");
    assert_eq!(buf.reader_index(), 0);
    assert_eq!(buf.readable(), &data[consumed..]);
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    // Primitives
    Bool(bool),
    Byte(i8),
    Short(i16),
    Narrow(i32),
    Int(i32),
    Long(i64),
    F32(f32),
    F64(f64),

    // Byte arrays and strings
    SizedBytes(&'a [u8]),
    String(String),
    CString(String),
    Framed(&'a [u8], i32),

    // Composites
    Optional(Option<i64>),
    List(Vec<i32>),
    Strings(Vec<String>),
    Set(HashSet<i16>),
    BTreeSet(BTreeSet<i64>),
    Map(HashMap<u8, i32>),
    BTreeMap(BTreeMap<String, Option<i32>>),

    // Buffer
    Compact(&'a [u8], usize),
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::Bool(v) => roundtrip(&Bool, &v),
        FuzzInput::Byte(v) => roundtrip(&Byte, &v),
        FuzzInput::Short(v) => {
            roundtrip(&Short16, &v);
            roundtrip(&Short16L, &v);
        }
        FuzzInput::Narrow(v) => roundtrip_narrow(v),
        FuzzInput::Int(v) => {
            roundtrip(&Int32, &v);
            roundtrip(&Int32L, &v);
        }
        FuzzInput::Long(v) => {
            roundtrip(&Long64, &v);
            roundtrip(&Long64L, &v);
        }
        FuzzInput::F32(v) => {
            roundtrip_f32(&Float32, v);
            roundtrip_f32(&Float32L, v);
        }
        FuzzInput::F64(v) => {
            roundtrip_f64(&Double64, v);
            roundtrip_f64(&Double64L, v);
        }
        FuzzInput::SizedBytes(v) => roundtrip_sized_bytes(v),
        FuzzInput::String(v) => roundtrip(&utf8_sized(), &v),
        FuzzInput::CString(v) => roundtrip_cstring(v),
        FuzzInput::Framed(v, trailer) => roundtrip_framed(v, trailer),
        FuzzInput::Optional(v) => roundtrip(&Optional::new(Long64L), &v),
        FuzzInput::List(v) => roundtrip(&ListCodec::new(Int32, Int32L).unwrap(), &v),
        FuzzInput::Strings(v) => roundtrip(&ListCodec::new(Int32, utf8_sized()).unwrap(), &v),
        FuzzInput::Set(v) => roundtrip(&SetCodec::new(Int32, Short16).unwrap(), &v),
        FuzzInput::BTreeSet(v) => roundtrip(&SetCodec::new(Int32L, Long64).unwrap(), &v),
        FuzzInput::Map(v) => {
            let v: HashMap<i8, i32> = v.into_iter().map(|(k, v)| (k as i8, v)).collect();
            roundtrip(&MapCodec::new(Int32, Byte, Int32).unwrap(), &v)
        }
        FuzzInput::BTreeMap(v) => {
            let codec = MapCodec::new(Int32, utf8_sized(), Optional::new(Int32L)).unwrap();
            roundtrip(&codec, &v)
        }
        FuzzInput::Compact(data, consumed) => compact_preserves(data, consumed),
    };
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
