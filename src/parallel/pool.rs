//! Fixed-size worker pool running synchronous fork-join rounds
//!
//! Every round splits `0..items` into contiguous chunks. Workers claim
//! chunks from a shared cursor until none are left, then meet at a
//! [`Rendezvous`] before the next round starts, so no work of round `r + 1`
//! can overlap work of round `r`.
//!
//! A panic in `work` abandons the rendezvous so the remaining workers stop
//! at their next barrier, and the panic is re-raised by `run_rounds`.

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::trace;

use super::rendezvous::Rendezvous;
use crate::error::{NbodyError, Result};

/// Default number of items claimed at once
pub const DEFAULT_CHUNK_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
    chunk_size: usize,
}

impl WorkerPool {
    pub fn new(threads: usize, chunk_size: usize) -> Result<Self> {
        if threads == 0 {
            return Err(NbodyError::validation("thread count must be positive"));
        }
        if chunk_size == 0 {
            return Err(NbodyError::validation("chunk size must be positive"));
        }
        Ok(Self {
            threads,
            chunk_size,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Run `rounds` rounds of `work(round, chunk)` over `0..items`.
    ///
    /// The calling thread takes part as one of the workers. Never uses more
    /// workers than there are items.
    pub fn run_rounds<F>(&self, rounds: usize, items: usize, work: F) -> Result<()>
    where
        F: Fn(usize, Range<usize>) + Sync,
    {
        if rounds == 0 || items == 0 {
            return Ok(());
        }

        let workers = self.threads.min(items);
        let chunk = self.chunk_size;
        let barrier = Rendezvous::new(workers)?;
        // two cursors alternate between rounds; the releaser of round r
        // resets the one round r used, which is next needed in round r + 2
        let cursors = [AtomicUsize::new(0), AtomicUsize::new(0)];

        let worker = || {
            let _guard = AbandonOnPanic(&barrier);
            for round in 0..rounds {
                let cursor = &cursors[round % 2];
                loop {
                    let start = cursor.fetch_add(chunk, Ordering::Relaxed);
                    if start >= items {
                        break;
                    }
                    work(round, start..(start + chunk).min(items));
                }
                if barrier.wait().is_releaser() {
                    cursor.store(0, Ordering::Relaxed);
                    trace!(round, "round complete");
                }
                if barrier.is_abandoned() {
                    return;
                }
            }
        };

        thread::scope(|scope| {
            for _ in 1..workers {
                scope.spawn(&worker);
            }
            worker();
        });
        Ok(())
    }
}

struct AbandonOnPanic<'a>(&'a Rendezvous);

impl Drop for AbandonOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abandon();
        }
    }
}

/// Slice shared across pool workers that write disjoint parts of it.
///
/// Callers must guarantee that no two live borrows handed out by
/// [`slice_mut`](Self::slice_mut) overlap, and that nothing read through
/// [`slice`](Self::slice) is written while that borrow is alive.
pub struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for SharedSlice<'_, T> {}
unsafe impl<T: Send + Sync> Sync for SharedSlice<'_, T> {}

impl<'a, T> SharedSlice<'a, T> {
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Safety
    /// No live mutable borrow may overlap `range`.
    pub unsafe fn slice(&self, range: Range<usize>) -> &[T] {
        assert!(range.start <= range.end && range.end <= self.len, "range out of bounds");
        std::slice::from_raw_parts(self.ptr.add(range.start), range.end - range.start)
    }

    /// # Safety
    /// No other live borrow may overlap `range`.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slice_mut(&self, range: Range<usize>) -> &mut [T] {
        assert!(range.start <= range.end && range.end <= self.len, "range out of bounds");
        std::slice::from_raw_parts_mut(self.ptr.add(range.start), range.end - range.start)
    }
}
