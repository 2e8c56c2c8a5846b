#![no_main]

use arbitrary::Arbitrary;
use bufcodec::{
    latin1_cstring, types::time::LocalTimeCodec, utf8_sized, BigDecimal, BigDecimalCodec, ByteBuf,
    Decoder, Framed, Int16, Int32, Int8, LenRange, ListCodec, MapCodec, Optional, RawBytes,
    SetCodec,
};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use std::collections::{BTreeMap, HashSet};

/// Decodes untrusted input and checks that failures leave the cursor where it was.
fn decode<T, C: Decoder<T>>(codec: &C, data: &[u8]) {
    let mut buf = ByteBuf::wrap(Bytes::copy_from_slice(data));
    match codec.decode(&mut buf) {
        Ok(_) => assert!(buf.reader_index() <= data.len()),
        Err(_) => assert_eq!(buf.reader_index(), 0),
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    List(&'a [u8]),
    Set(&'a [u8]),
    Map(&'a [u8]),
    Framed(&'a [u8]),
    Strings(&'a [u8]),
    CString(&'a [u8]),
    Numbers(&'a [u8]),
    Time(&'a [u8]),
}

fn fuzz(input: FuzzInput) {
    let limit = LenRange::up_to(1024);
    match input {
        FuzzInput::List(data) => {
            let codec = ListCodec::new(Int32, Int16).unwrap().with_limit(limit);
            decode::<Vec<i32>, _>(&codec, data);
        }
        FuzzInput::Set(data) => {
            let codec = SetCodec::new(Int8, Int32).unwrap();
            decode::<HashSet<i32>, _>(&codec, data);
        }
        FuzzInput::Map(data) => {
            let codec = MapCodec::new(Int16, utf8_sized(), Optional::new(Int32)).unwrap();
            decode::<BTreeMap<String, Option<i32>>, _>(&codec, data);
        }
        FuzzInput::Framed(data) => {
            let inner = Framed::new(Int8, ListCodec::new(Int8, Int32).unwrap()).unwrap();
            let codec = Framed::int32(inner).with_limit(limit);
            decode::<Vec<i32>, _>(&codec, data);
            decode::<Bytes, _>(&Framed::new(Int16, RawBytes).unwrap(), data);
        }
        FuzzInput::Strings(data) => decode::<String, _>(&utf8_sized().with_limit(limit), data),
        FuzzInput::CString(data) => {
            decode::<String, _>(&latin1_cstring(), data);
            decode::<String, _>(&latin1_cstring().lenient(), data);
        }
        FuzzInput::Numbers(data) => decode::<BigDecimal, _>(&BigDecimalCodec::new(), data),
        FuzzInput::Time(data) => decode(&LocalTimeCodec, data),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
