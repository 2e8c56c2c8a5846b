//! Compose typed binary codecs over a position-tracked byte buffer.
//!
//! # Overview
//!
//! A codec converts values of one type to and from a compact binary layout inside a [ByteBuf].
//! Codecs are small immutable values that can be combined into codecs for larger types:
//! - Primitives: fixed-width integers (8 to 64 bits, both endiannesses), floats, booleans
//! - Byte arrays and strings, raw or preceded by their length, and null-terminated strings
//! - Big integers, big decimals, instants, dates and times
//! - Combinators: [Serializer::bimap], [Encoder::map_encoder], [Decoder::map_decoder], [Optional]
//! - Framing: [Framed] prefixes any codec with the length of its encoding
//! - Aggregates: [ListCodec], [SetCodec], [MapCodec]
//! - Encryption: [Encrypted] passes an encoding through pooled transforms
//!
//! Every codec has a [Format::name] describing its wire format and reports whether it is
//! [bounded](Format::is_bounded): whether decoding consumes exactly the bytes encoding produced.
//! Unbounded codecs (like [RawBytes]) consume the rest of the buffer, so aggregates and length
//! prefixes refuse them at construction.
//!
//! # Atomicity
//!
//! [Encoder::encode] and [Decoder::decode] either complete or leave the buffer cursor where it
//! was. Composite codecs call the raw [Encoder::write] and [Decoder::read] on their parts and
//! rely on the outermost call to restore the cursor.
//!
//! # Untrusted Input
//!
//! Lengths and counts read from the wire are checked against a [LenRange] before anything is
//! allocated, and aggregates never pre-allocate more elements than there are readable bytes.
//!
//! # Example
//!
//! ```
//! use bufcodec::{
//!     types::string::utf8_sized, ByteBuf, Decoder, Encoder, Error, Format, Int16, Int32,
//!     ListCodec, Optional, Serializer,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Port(u16);
//!
//! // A port is stored as an `Int32` and rejected if out of range
//! let port = Int32.try_bimap(
//!     "Port",
//!     |p: &Port| i32::from(p.0),
//!     |raw: i32| {
//!         u16::try_from(raw)
//!             .map(Port)
//!             .map_err(|_| Error::InvalidData("Port", raw.to_string()))
//!     },
//! );
//! let ports = ListCodec::new(Int16, port).unwrap();
//! assert_eq!(ports.name(), "List[Port](size: Int16)");
//!
//! let mut buf = ByteBuf::new();
//! ports.encode(&vec![Port(80), Port(443)], &mut buf).unwrap();
//! Optional::new(utf8_sized()).encode(&Some("host".to_string()), &mut buf).unwrap();
//!
//! let decoded: Vec<Port> = ports.decode(&mut buf).unwrap();
//! assert_eq!(decoded, vec![Port(80), Port(443)]);
//! let host: Option<String> = Optional::new(utf8_sized()).decode(&mut buf).unwrap();
//! assert_eq!(host.as_deref(), Some("host"));
//! assert_eq!(buf.readable_bytes(), 0);
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod pool;
pub mod transform;
pub mod types;
pub mod util;

// Re-export main types and traits
pub use buffer::ByteBuf;
pub use codec::{Decoder, Encoder, Format, Serializer};
pub use config::LenRange;
pub use error::Error;
pub use types::{
    bignum::{big_int, BigDecimal, BigDecimalCodec},
    bytes::{RawBytes, SizedBytes},
    collections::{ListCodec, MapCodec, SetCodec},
    encrypted::Encrypted,
    framed::Framed,
    optional::Optional,
    primitives::{
        Bool, Byte, Double64, Double64L, Float32, Float32L, Int16, Int16L, Int24, Int24L, Int32,
        Int32L, Int8, Long64, Long64L, Short16, Short16L,
    },
    string::{latin1_cstring, utf8, utf8_sized, CString, Charset, SizedString, StringCodec},
};
