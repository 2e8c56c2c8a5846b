//! Pools of reusable resources.
//!
//! Codecs that need an expensive, stateful resource per call (such as a cipher) borrow it from an
//! [ObjectPool] through a [Lease], which returns the resource to the pool when dropped. The
//! resource is therefore released on every exit path, including errors and panics.

use crate::Error;
use crossbeam_queue::ArrayQueue;
use std::{
    fmt,
    mem::ManuallyDrop,
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tracing::trace;

/// A source of reusable items.
///
/// Implementations synchronize internally: `acquire` and `release` take `&self` and may be called
/// from many threads.
pub trait ObjectPool {
    type Item;

    /// Takes an item from the pool. Does not retry.
    fn acquire(&self) -> Result<Self::Item, Error>;

    /// Returns an item previously obtained from [ObjectPool::acquire].
    fn release(&self, item: Self::Item);

    /// Acquires an item that is released when the returned guard is dropped.
    ///
    /// (Provided method).
    fn lease(&self) -> Result<Lease<'_, Self>, Error> {
        let item = self.acquire()?;
        trace!("leased pooled item");
        Ok(Lease {
            pool: self,
            item: ManuallyDrop::new(item),
        })
    }
}

impl<P: ObjectPool + ?Sized> ObjectPool for Arc<P> {
    type Item = P::Item;

    fn acquire(&self) -> Result<Self::Item, Error> {
        (**self).acquire()
    }

    fn release(&self, item: Self::Item) {
        (**self).release(item)
    }
}

/// An item borrowed from an [ObjectPool].
pub struct Lease<'a, P: ObjectPool + ?Sized> {
    pool: &'a P,
    item: ManuallyDrop<P::Item>,
}

impl<P: ObjectPool + ?Sized> Deref for Lease<'_, P> {
    type Target = P::Item;

    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

impl<P: ObjectPool + ?Sized> DerefMut for Lease<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.item
    }
}

impl<P: ObjectPool + ?Sized> Drop for Lease<'_, P> {
    fn drop(&mut self) {
        // SAFETY: `item` is never accessed again after being taken here.
        let item = unsafe { ManuallyDrop::take(&mut self.item) };
        self.pool.release(item);
        trace!("released pooled item");
    }
}

type Factory<T> = Box<dyn Fn() -> Result<T, Error> + Send + Sync>;

/// A pool holding at most `capacity` items, created on demand by a factory.
///
/// Idle items are kept in a lock-free queue. When every item is leased, [ObjectPool::acquire]
/// fails with [Error::PoolExhausted] instead of waiting.
pub struct QueuePool<T> {
    idle: ArrayQueue<T>,
    factory: Factory<T>,
    live: AtomicUsize,
}

impl<T> QueuePool<T> {
    /// Creates an empty pool.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(
        capacity: usize,
        factory: impl Fn() -> Result<T, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            idle: ArrayQueue::new(capacity),
            factory: Box::new(factory),
            live: AtomicUsize::new(0),
        }
    }

    /// Returns the maximum number of items the pool creates.
    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }

    /// Returns the number of items created and not discarded.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Returns the number of items waiting to be acquired.
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

impl<T> ObjectPool for QueuePool<T> {
    type Item = T;

    fn acquire(&self) -> Result<T, Error> {
        if let Some(item) = self.idle.pop() {
            return Ok(item);
        }

        // Reserve a slot before creating a new item
        let capacity = self.capacity();
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < capacity).then_some(live + 1)
            })
            .map_err(|_| Error::PoolExhausted)?;
        match (self.factory)() {
            Ok(item) => {
                trace!(live = self.live(), "created pooled item");
                Ok(item)
            }
            Err(err) => {
                self.live.fetch_sub(1, Ordering::AcqRel);
                Err(err)
            }
        }
    }

    fn release(&self, item: T) {
        if self.idle.push(item).is_err() {
            // Only reachable if items from elsewhere are released here
            self.live.fetch_sub(1, Ordering::AcqRel);
            trace!("discarded pooled item");
        }
    }
}

impl<T> fmt::Debug for QueuePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuePool")
            .field("capacity", &self.capacity())
            .field("live", &self.live())
            .field("idle", &self.idle())
            .finish()
    }
}
