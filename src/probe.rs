//! Heap capacity probing.
use core::ptr::NonNull;

use crate::{
    ramtest::check_memory_region,
    report::DiagSink,
    source::{HeapSource, WORD_SIZE},
};

/// An owned, contiguous memory block obtained from a [`HeapSource`].
///
/// The block stays owned by whoever holds this handle until it's passed back
/// to the source via [`HeapSource::release`] ([`Self::into_raw`] recovers the
/// slice pointer the source handed out).
#[derive(Debug)]
pub struct Block {
    ptr: NonNull<u8>,
    len: usize,
}

impl Block {
    fn from_raw(slice: NonNull<[u8]>) -> Self {
        Self {
            ptr: slice.cast(),
            len: slice.len(),
        }
    }

    /// The block's length in bytes. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The block's base address.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Recover the slice pointer for [`HeapSource::release`].
    #[inline]
    pub fn into_raw(self) -> NonNull<[u8]> {
        NonNull::slice_from_raw_parts(self.ptr, self.len)
    }
}

/// Acquire the largest block `source` will grant at or below `max_bytes`.
///
/// Starts at `max_bytes` and, after every refusal, retries with a request one
/// machine word smaller. Allocator exhaustion is the expected terminating
/// condition of this search, not an error.
///
/// Returns `None` exactly when no block could be obtained; a returned block
/// is never larger than `max_bytes` and never empty.
pub fn acquire_largest<S: HeapSource>(source: &mut S, max_bytes: usize) -> Option<Block> {
    // The candidate size goes through a signed intermediate: the decrement
    // below may step past zero before the loop guard sees it.
    let mut candidate = isize::try_from(max_bytes).unwrap_or(isize::MAX);

    while candidate > 0 {
        // Safety: the returned block is wrapped in a `Block` and eventually
        //         passed back to `source` by the caller, or leaked
        if let Some(slice) = unsafe { source.acquire(candidate as usize) } {
            return Some(Block::from_raw(slice));
        }
        candidate -= WORD_SIZE as isize;
    }

    None
}

#[doc = svgbobdoc::transform!(
/// Measures how much memory a [`HeapSource`] can actually grant.
///
/// One invocation of [`Self::probe`] performs exactly one pass:
///
/// ```svgbob
/// ,-----------------,  first block   ,----------,  chain full or  ,-----------,
/// | SEARCHING-FIRST | -------------> | CHAINING | --------------> | RELEASING |
/// '--------+--------'                '----------'    exhausted    '-----+-----'
///          |                                                            |
///          | no block at all                                            v
///          '----------------------> "total = 0"                 "total = Σ sizes"
/// ```
///
)]
///
/// The first finder call is bounded by the caller-supplied upper bound; every
/// later call is bounded by the fixed `ceiling` passed to [`Self::new`]
/// (typically the platform's total RAM size), because once the first large
/// block is claimed, each remaining allocator fragment may still be anywhere
/// up to the full RAM size. Every block is integrity-tested with
/// [`check_memory_region`] as soon as it's acquired, and all of them are
/// released before the pass returns, in strict reverse acquisition order, so
/// allocator state is fully restored.
///
/// `MAX_CHAIN` bounds the number of blocks acquired after the first one. The
/// bookkeeping is owned by the prober itself instead of being stored inside
/// the first (tested!) block, so pick it from the platform ceiling:
/// `ceiling / WORD_SIZE` slots can never be exceeded, and far fewer are
/// needed against any real allocator.
///
/// The prober assumes exclusive, uncontended access to the source; a probe is
/// destructive to allocator state while it runs (it claims everything it can
/// reach) and is not meant to race with other allocation activity.
#[derive(Debug)]
pub struct HeapProbe<S, D, const MAX_CHAIN: usize> {
    source: S,
    diag: D,
    ceiling: usize,
}

impl<S: HeapSource, D: DiagSink, const MAX_CHAIN: usize> HeapProbe<S, D, MAX_CHAIN> {
    /// Construct a prober.
    ///
    /// `ceiling` is the upper bound used for every finder call after the
    /// first one; pass the platform's total RAM size.
    #[inline]
    pub fn new(source: S, diag: D, ceiling: usize) -> Self {
        Self {
            source,
            diag,
            ceiling,
        }
    }

    /// Borrow the probed source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Borrow the diagnostic sink.
    #[inline]
    pub fn diag(&self) -> &D {
        &self.diag
    }

    /// Take the source and the sink back out.
    #[inline]
    pub fn into_inner(self) -> (S, D) {
        (self.source, self.diag)
    }

    /// Probe how much memory the source can grant, up to `max_bytes` for the
    /// first block.
    ///
    /// Returns the cumulative number of bytes granted across all requests of
    /// the pass. Integrity failures are reported through the sink but do not
    /// stop the probe; the figure is maximized either way.
    pub fn probe(&mut self, max_bytes: usize) -> usize {
        let mut total = 0;

        let first = match acquire_largest(&mut self.source, max_bytes) {
            Some(block) => block,
            None => return 0,
        };

        // The first block is tested before anything else is stored anywhere.
        // Safety: `first` is exclusively owned, writable, and `WORD_SIZE`-
        //         aligned per the `HeapSource` contract
        unsafe { check_memory_region(first.as_ptr(), first.len(), &mut self.diag) };
        total += first.len();

        const NO_BLOCK: Option<Block> = None;
        let mut chain = [NO_BLOCK; MAX_CHAIN];
        let mut chained = 0;

        while chained < MAX_CHAIN {
            let block = match acquire_largest(&mut self.source, self.ceiling) {
                Some(block) => block,
                None => break,
            };

            // Safety: same as for `first`
            unsafe { check_memory_region(block.as_ptr(), block.len(), &mut self.diag) };
            total += block.len();

            chain[chained] = Some(block);
            chained += 1;
        }

        // Last acquired, first released: allocators with stack-like internal
        // assumptions see their operations mirrored exactly.
        while chained > 0 {
            chained -= 1;
            if let Some(block) = chain[chained].take() {
                // Safety: `block` was acquired from `self.source` above and
                //         is released exactly once
                unsafe { self.source.release(block.into_raw()) };
            }
        }

        // Safety: ditto
        unsafe { self.source.release(first.into_raw()) };

        total
    }
}
