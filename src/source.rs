//! Allocator abstraction probed by this crate.
use core::{alloc::Layout, ptr::NonNull};

/// The machine word size in bytes.
///
/// This is the granularity of the whole subsystem: [`acquire_largest`] shrinks
/// its candidate request by one word per refusal, and
/// [`check_memory_region`] tests the region one word-sized cell at a time.
///
/// [`acquire_largest`]: crate::acquire_largest
/// [`check_memory_region`]: crate::check_memory_region
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();

/// A dynamic memory allocator that can be probed.
///
/// Exhaustion is signaled by returning `None` from [`Self::acquire`]. It is
/// the expected terminating condition of a probe, not an error, so there is
/// no error type here.
///
/// # Safety
///
/// Implementations must uphold the following:
///
///  - A block returned by `acquire` is valid for reads and writes of the
///    requested number of bytes, is aligned to [`WORD_SIZE`] bytes, and is
///    exclusively owned by the caller until it's passed back to `release`.
///
///  - Blocks returned by `acquire` do not overlap each other while
///    outstanding.
///
pub unsafe trait HeapSource {
    /// Attempt to acquire a block of at least `size_bytes` bytes.
    ///
    /// Returns `None` if the allocator cannot satisfy the request. Requests
    /// of zero bytes may be refused unconditionally.
    ///
    /// # Safety
    ///
    /// The returned block must be passed to [`Self::release`] on the same
    /// source exactly once, or leaked.
    unsafe fn acquire(&mut self, size_bytes: usize) -> Option<NonNull<[u8]>>;

    /// Release a block previously returned by [`Self::acquire`].
    ///
    /// # Safety
    ///
    /// `block` must denote a block previously acquired from `self` (same
    /// base address and length) that has not been released yet.
    unsafe fn release(&mut self, block: NonNull<[u8]>);
}

/// Wraps a [`core::alloc::GlobalAlloc`] to be used as a [`HeapSource`].
///
/// Every request carries a [`WORD_SIZE`]-byte alignment so that acquired
/// blocks can be handed to [`check_memory_region`] directly.
///
/// [`check_memory_region`]: crate::check_memory_region
#[derive(Debug, Default, Copy, Clone)]
pub struct GlobalAllocAsHeapSource<T>(pub T);

unsafe impl<T: core::alloc::GlobalAlloc> HeapSource for GlobalAllocAsHeapSource<T> {
    unsafe fn acquire(&mut self, size_bytes: usize) -> Option<NonNull<[u8]>> {
        if size_bytes == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size_bytes, WORD_SIZE).ok()?;
        // Safety: `layout` has a non-zero size
        NonNull::new(self.0.alloc(layout))
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, size_bytes))
    }

    unsafe fn release(&mut self, block: NonNull<[u8]>) {
        // Safety: `block` was acquired with this size and alignment, so the
        //         layout is valid
        let layout = Layout::from_size_align_unchecked(block.len(), WORD_SIZE);
        self.0.dealloc(block.cast().as_ptr(), layout);
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use self::unix::LibcSource;
    }
}
