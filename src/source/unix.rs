use core::ptr::NonNull;

use super::HeapSource;

/// A [`HeapSource`] backed by `libc::malloc` and `libc::free`.
///
/// This matches what the probe faces on a typical embedded C runtime, where
/// the heap is reached through `malloc`/`free` and exhaustion shows up as a
/// null return.
#[derive(Debug, Default, Copy, Clone)]
pub struct LibcSource(());

impl LibcSource {
    pub const fn new() -> Self {
        Self(())
    }
}

unsafe impl HeapSource for LibcSource {
    #[inline]
    unsafe fn acquire(&mut self, size_bytes: usize) -> Option<NonNull<[u8]>> {
        if size_bytes == 0 {
            // `malloc(0)` may return a unique non-null pointer with no usable
            // bytes behind it, which would break "`None` iff zero granted"
            return None;
        }

        let ptr = libc::malloc(size_bytes);

        // `malloc` aligns to at least `max_align_t`, which covers `WORD_SIZE`
        NonNull::new(ptr as *mut u8).map(|ptr| NonNull::slice_from_raw_parts(ptr, size_bytes))
    }

    #[inline]
    unsafe fn release(&mut self, block: NonNull<[u8]>) {
        libc::free(block.cast().as_ptr() as *mut libc::c_void);
    }
}
