//! Codecs for lists, sets and maps.
//!
//! Every aggregate is written as `[count: size codec][element]*count` (map entries are a key
//! followed by its value). Elements are written in the container's iteration order, so only
//! [BTreeSet] and [BTreeMap] produce deterministic output.
//!
//! The size codec and every element codec must be bounded; constructors fail with
//! [Error::Unbounded] otherwise. Decoding never pre-allocates more elements than there are
//! readable bytes, and fails with [Error::CountMismatch] if duplicate elements or keys collapse a
//! set or map below its declared count.

use crate::{
    util::{read_len, write_len},
    ByteBuf, Decoder, Encoder, Error, Format, Int32, LenRange,
};
use bytes::Buf;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    hash::Hash,
};
use tracing::warn;

/// Reads a count and returns it with a safe pre-allocation size.
fn read_count<S: Decoder<i32>>(
    size: &S,
    limit: &LenRange,
    buf: &mut ByteBuf,
) -> Result<(usize, usize), Error> {
    let count = read_len(size, limit, buf)?;
    Ok((count, count.min(buf.remaining())))
}

/// Fails if fewer distinct entries were decoded than declared.
fn check_count(codec: &str, declared: usize, decoded: usize) -> Result<(), Error> {
    if declared != decoded {
        warn!(codec, declared, decoded, "aggregate lost duplicate entries");
        return Err(Error::CountMismatch { declared, decoded });
    }
    Ok(())
}

/// A sequence of values.
#[derive(Clone, Debug)]
pub struct ListCodec<C, S = Int32> {
    size: S,
    item: C,
    limit: LenRange,
    name: String,
}

impl<C: Format, S: Format> ListCodec<C, S> {
    /// Fails if `size` or `item` is not bounded.
    pub fn new(size: S, item: C) -> Result<Self, Error> {
        size.require_bounded()?;
        item.require_bounded()?;
        let name = format!("List[{}](size: {})", item.name(), size.name());
        Ok(Self {
            size,
            item,
            limit: LenRange::any(),
            name,
        })
    }

    /// Rejects decoded counts outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<C: Format, S: Format> Format for ListCodec<C, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

impl<T, C: Encoder<T>, S: Encoder<i32> + Decoder<i32>> Encoder<Vec<T>> for ListCodec<C, S> {
    fn write(&self, value: &Vec<T>, buf: &mut ByteBuf) -> Result<(), Error> {
        write_len(&self.size, value.len(), buf)?;
        for item in value {
            self.item.write(item, buf)?;
        }
        Ok(())
    }
}

impl<T, C: Decoder<T>, S: Decoder<i32>> Decoder<Vec<T>> for ListCodec<C, S> {
    fn read(&self, buf: &mut ByteBuf) -> Result<Vec<T>, Error> {
        let (count, hint) = read_count(&self.size, &self.limit, buf)?;
        let mut list = Vec::with_capacity(hint);
        for _ in 0..count {
            list.push(self.item.read(buf)?);
        }
        Ok(list)
    }
}

/// A set of distinct values.
#[derive(Clone, Debug)]
pub struct SetCodec<C, S = Int32> {
    size: S,
    item: C,
    limit: LenRange,
    name: String,
}

impl<C: Format, S: Format> SetCodec<C, S> {
    /// Fails if `size` or `item` is not bounded.
    pub fn new(size: S, item: C) -> Result<Self, Error> {
        size.require_bounded()?;
        item.require_bounded()?;
        let name = format!("Set[{}](size: {})", item.name(), size.name());
        Ok(Self {
            size,
            item,
            limit: LenRange::any(),
            name,
        })
    }

    /// Rejects decoded counts outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<C: Format, S: Format> Format for SetCodec<C, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

/// A map from keys to values.
#[derive(Clone, Debug)]
pub struct MapCodec<K, V, S = Int32> {
    size: S,
    key: K,
    value: V,
    limit: LenRange,
    name: String,
}

impl<K: Format, V: Format, S: Format> MapCodec<K, V, S> {
    /// Fails if `size`, `key` or `value` is not bounded.
    pub fn new(size: S, key: K, value: V) -> Result<Self, Error> {
        size.require_bounded()?;
        key.require_bounded()?;
        value.require_bounded()?;
        let name = format!(
            "Map[{}, {}](size: {})",
            key.name(),
            value.name(),
            size.name()
        );
        Ok(Self {
            size,
            key,
            value,
            limit: LenRange::any(),
            name,
        })
    }

    /// Rejects decoded counts outside `limit`.
    pub fn with_limit(mut self, limit: impl Into<LenRange>) -> Self {
        self.limit = limit.into();
        self
    }
}

impl<K: Format, V: Format, S: Format> Format for MapCodec<K, V, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

macro_rules! impl_set {
    ($set:ident, [$($bound:tt)+], $new:expr) => {
        impl<T, C, S> Encoder<$set<T>> for SetCodec<C, S>
        where
            T: $($bound)+,
            C: Encoder<T>,
            S: Encoder<i32> + Decoder<i32>,
        {
            fn write(&self, value: &$set<T>, buf: &mut ByteBuf) -> Result<(), Error> {
                write_len(&self.size, value.len(), buf)?;
                for item in value {
                    self.item.write(item, buf)?;
                }
                Ok(())
            }
        }

        impl<T, C, S> Decoder<$set<T>> for SetCodec<C, S>
        where
            T: $($bound)+,
            C: Decoder<T>,
            S: Decoder<i32>,
        {
            fn read(&self, buf: &mut ByteBuf) -> Result<$set<T>, Error> {
                let (count, hint) = read_count(&self.size, &self.limit, buf)?;
                let mut set = $new(hint);
                for _ in 0..count {
                    set.insert(self.item.read(buf)?);
                }
                check_count(&self.name, count, set.len())?;
                Ok(set)
            }
        }
    };
}

macro_rules! impl_map {
    ($map:ident, [$($bound:tt)+], $new:expr) => {
        impl<KT, VT, K, V, S> Encoder<$map<KT, VT>> for MapCodec<K, V, S>
        where
            KT: $($bound)+,
            K: Encoder<KT>,
            V: Encoder<VT>,
            S: Encoder<i32> + Decoder<i32>,
        {
            fn write(&self, value: &$map<KT, VT>, buf: &mut ByteBuf) -> Result<(), Error> {
                write_len(&self.size, value.len(), buf)?;
                for (k, v) in value {
                    self.key.write(k, buf)?;
                    self.value.write(v, buf)?;
                }
                Ok(())
            }
        }

        impl<KT, VT, K, V, S> Decoder<$map<KT, VT>> for MapCodec<K, V, S>
        where
            KT: $($bound)+,
            K: Decoder<KT>,
            V: Decoder<VT>,
            S: Decoder<i32>,
        {
            fn read(&self, buf: &mut ByteBuf) -> Result<$map<KT, VT>, Error> {
                let (count, hint) = read_count(&self.size, &self.limit, buf)?;
                let mut map = $new(hint);
                for _ in 0..count {
                    let k = self.key.read(buf)?;
                    let v = self.value.read(buf)?;
                    map.insert(k, v);
                }
                check_count(&self.name, count, map.len())?;
                Ok(map)
            }
        }
    };
}

impl_set!(HashSet, [Eq + Hash], HashSet::with_capacity);
impl_set!(BTreeSet, [Ord], |_| BTreeSet::new());
impl_map!(HashMap, [Eq + Hash], HashMap::with_capacity);
impl_map!(BTreeMap, [Ord], |_| BTreeMap::new());
