//! Codec implementations, from fixed-width primitives to composite codecs.

pub mod bignum;
pub mod bytes;
pub mod collections;
pub mod encrypted;
pub mod framed;
pub mod optional;
pub mod primitives;
pub mod remap;
pub mod string;
pub mod time;
