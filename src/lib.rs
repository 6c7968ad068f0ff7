//! This crate implements the memory diagnostic core of an embedded test
//! firmware: finding out how much memory a dynamic allocator can actually
//! hand out, and verifying that the handed-out memory works.
//!
//!  - **[`HeapProbe`] measures usable heap capacity.** A single allocation
//!    request is capped by the allocator's internal bookkeeping overhead and
//!    by fragmentation, so the prober chains many best-effort requests and
//!    sums their sizes, which gets much closer to the true figure than one
//!    request ever could.
//!
//!  - **[`check_memory_region`] verifies a memory region** with a walking-one
//!    bit pattern (normal and inverted), reporting the first failing cell's
//!    address and contents through a line-oriented [`DiagSink`].
//!
//!  - **The allocator is provided by an application.** Anything that can
//!    grant and take back contiguous byte blocks can be probed through the
//!    [`HeapSource`] trait: the global allocator, a pool allocator, or a
//!    bare-metal heap.
//!
//!  - **This crate supports `#![no_std]`.** It can be used in bare-metal and
//!    RTOS-based applications.
//!
//! The probe is diagnostic, not a gatekeeper: integrity failures are reported
//! and probing continues, so one run gathers as much information as possible.
//!
//! # Examples
//!
//! ```rust
//! use ramprobe::{FmtSink, GlobalAllocAsHeapSource, HeapProbe};
//!
//! let source = GlobalAllocAsHeapSource(std::alloc::System);
//! let mut probe: HeapProbe<_, _, 16> =
//!     HeapProbe::new(source, FmtSink(String::new()), 1 << 16);
//!
//! let total = probe.probe(1 << 20);
//! assert!(total > 0);
//!
//! let (_, FmtSink(report)) = probe.into_inner();
//! assert!(report.contains("Checking RAM"));
//! ```
#![no_std]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

mod init;
mod probe;
mod ramtest;
mod report;
mod source;
pub use self::{init::*, probe::*, ramtest::*, report::*, source::*};

#[cfg(any(test, feature = "std"))]
extern crate std;
