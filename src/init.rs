//! Constant construction of heap sources.

/// Provides a constant default value.
///
/// Heap sources implement this so that a firmware image can construct them in
/// `const` context, before any heap exists to probe.
pub trait Init {
    /// `Self`'s default value.
    const INIT: Self;
}

impl<T: Init> Init for crate::GlobalAllocAsHeapSource<T> {
    const INIT: Self = Self(T::INIT);
}

#[cfg(unix)]
impl Init for crate::LibcSource {
    const INIT: Self = Self::new();
}

#[cfg(any(test, feature = "std"))]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl Init for std::alloc::System {
    const INIT: Self = Self;
}
