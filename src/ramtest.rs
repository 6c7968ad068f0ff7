//! The bit-pattern memory integrity test.
use crate::{report::DiagSink, source::WORD_SIZE};

/// A repeating non-zero "walking one" bit sequence: a single set bit that
/// moves up one position per step and wraps back to bit 0 after leaving the
/// most significant bit.
struct WalkingOnes {
    value: usize,
}

impl WalkingOnes {
    const fn new() -> Self {
        Self { value: 1 }
    }

    #[inline]
    fn next_value(&mut self) -> usize {
        let value = self.value;
        self.value <<= 1;
        if self.value == 0 {
            self.value = 1;
        }
        value
    }
}

/// The first cell of a verify pass whose read-back differed from the
/// expected pattern.
#[derive(Debug, PartialEq, Eq)]
struct Mismatch {
    /// Word index within the tested region.
    word: usize,
    /// What the cell actually contained.
    actual: usize,
}

/// Write the walking-one sequence (or its complement) into `words` cells
/// starting at `base`.
///
/// # Safety
///
/// `base` must be aligned to [`WORD_SIZE`] bytes and valid for writes of
/// `words` words.
unsafe fn fill_words(base: *mut usize, words: usize, invert: bool) {
    let mut pattern = WalkingOnes::new();
    for i in 0..words {
        let value = pattern.next_value();
        let value = if invert { !value } else { value };
        base.add(i).write_volatile(value);
    }
}

/// Re-read `words` cells starting at `base` and compare each against the
/// independently regenerated walking-one sequence (or its complement),
/// stopping at the first mismatch.
///
/// The expected value is recomputed, never re-read from memory, so a cell
/// that fails to hold its pattern cannot corrupt the comparison baseline.
///
/// # Safety
///
/// `base` must be aligned to [`WORD_SIZE`] bytes and valid for reads of
/// `words` words.
unsafe fn verify_words(base: *mut usize, words: usize, invert: bool) -> Option<Mismatch> {
    let mut pattern = WalkingOnes::new();
    for i in 0..words {
        let value = pattern.next_value();
        let expected = if invert { !value } else { value };
        let actual = base.add(i).read_volatile();
        if actual != expected {
            return Some(Mismatch { word: i, actual });
        }
    }
    None
}

/// Verify that every word-sized cell of a memory region can store and return
/// data written to it.
///
/// The region is tested in four passes over its whole words, in address
/// order: write a walking-one pattern, read it back and compare, then (only
/// if the whole region matched) write and verify the complemented pattern.
/// Each verify pass halts at its first mismatching cell, and the failing
/// address together with the contents actually found there is reported
/// through `diag`:
///
/// ```text
/// *** Checking RAM, from 0x20001000 to 0x20002000.
/// !!! RAM check failure at location 0x20001440 (contents 0x10).
/// ```
///
/// A fault is purely observational: the routine reports it and returns
/// normally, leaving the caller to decide whether it's fatal. On a fully
/// working region the header line is the only output.
///
/// A null `base`, or a region shorter than one word, is a vacuous pass and
/// produces no output. `len_bytes` need not be a multiple of [`WORD_SIZE`];
/// trailing bytes beyond the last whole word are left untouched.
///
/// The region's previous contents are destroyed.
///
/// # Safety
///
/// Unless `base` is null or `len_bytes < WORD_SIZE`, `base` must be aligned
/// to [`WORD_SIZE`] bytes and valid for reads and writes of `len_bytes`
/// bytes, with no other references to the region live for the duration of
/// the call.
pub unsafe fn check_memory_region(base: *mut u8, len_bytes: usize, diag: &mut impl DiagSink) {
    if base.is_null() {
        return;
    }

    let words = len_bytes / WORD_SIZE;
    if words == 0 {
        return;
    }

    let base = base as *mut usize;
    debug_assert!(base as usize % WORD_SIZE == 0);

    diag.line(format_args!(
        "*** Checking RAM, from {:#x} to {:#x}.",
        base as usize,
        base.add(words) as usize,
    ));

    fill_words(base, words, false);
    let mut mismatch = verify_words(base, words, false);

    // The inverted passes are gated on a clean first verify: a region that
    // already failed would report the same cell twice.
    if mismatch.is_none() {
        fill_words(base, words, true);
        mismatch = verify_words(base, words, true);
    }

    if let Some(mismatch) = mismatch {
        report_mismatch(base, &mismatch, diag);
    }
}

fn report_mismatch(base: *mut usize, mismatch: &Mismatch, diag: &mut impl DiagSink) {
    diag.line(format_args!(
        "!!! RAM check failure at location {:#x} (contents {:#x}).",
        base.wrapping_add(mismatch.word) as usize,
        mismatch.actual,
    ));
}

#[cfg(test)]
mod tests;
