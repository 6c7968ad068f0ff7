extern crate std;

use quickcheck_macros::quickcheck;

use super::*;
use crate::tests::CaptureSink;

const USIZE_BITS: usize = WORD_SIZE * 8;

#[test]
fn walking_ones_cycle() {
    let mut pattern = WalkingOnes::new();

    for step in 0..USIZE_BITS * 2 + 3 {
        assert_eq!(pattern.next_value(), 1 << (step % USIZE_BITS));
    }
}

#[test]
fn clean_region_reports_only_header() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut sink = CaptureSink::new();

    let mut buf = [0usize; 64];
    unsafe {
        check_memory_region(
            buf.as_mut_ptr() as *mut u8,
            core::mem::size_of_val(&buf),
            &mut sink,
        )
    };

    assert_eq!(sink.lines.len(), 1);
    assert_eq!(sink.count_containing("Checking RAM"), 1);
    assert_eq!(sink.count_containing("RAM check failure"), 0);
}

#[test]
fn null_region_is_silent() {
    let mut sink = CaptureSink::new();
    unsafe { check_memory_region(core::ptr::null_mut(), 4096, &mut sink) };
    assert!(sink.lines.is_empty());
}

#[test]
fn zero_length_region_is_silent() {
    let mut sink = CaptureSink::new();
    let mut word = 0usize;
    unsafe { check_memory_region(&mut word as *mut usize as *mut u8, 0, &mut sink) };
    assert!(sink.lines.is_empty());
    assert_eq!(word, 0);
}

#[test]
fn sub_word_region_is_silent() {
    let mut sink = CaptureSink::new();
    let mut word = 0usize;
    unsafe { check_memory_region(&mut word as *mut usize as *mut u8, WORD_SIZE - 1, &mut sink) };
    assert!(sink.lines.is_empty());
    assert_eq!(word, 0);
}

#[test]
fn trailing_bytes_left_untouched() {
    let mut sink = CaptureSink::new();

    // 4 whole words plus 3 stray bytes; the fifth word must survive
    let mut buf = [0usize, 0, 0, 0, 0x5a5a_5a5a];
    unsafe {
        check_memory_region(
            buf.as_mut_ptr() as *mut u8,
            WORD_SIZE * 4 + 3,
            &mut sink,
        )
    };

    assert_eq!(buf[4], 0x5a5a_5a5a);
    assert_eq!(sink.lines.len(), 1);
}

#[test]
fn verify_halts_at_first_corrupt_word() {
    let mut buf = [0usize; 8];
    let base = buf.as_mut_ptr();

    unsafe {
        fill_words(base, 8, false);

        // Corrupt words 2 and 3; only word 2 may be reported
        let old = base.add(2).read_volatile();
        base.add(2).write_volatile(old ^ 0x10);
        let old = base.add(3).read_volatile();
        base.add(3).write_volatile(old ^ 0x10);

        let mismatch = verify_words(base, 8, false).expect("corruption went undetected");
        assert_eq!(mismatch.word, 2);
        assert_eq!(mismatch.actual, (1usize << 2) ^ 0x10);
    }
}

#[test]
fn inverted_verify_detects_corruption() {
    let mut buf = [0usize; 8];
    let base = buf.as_mut_ptr();

    unsafe {
        fill_words(base, 8, true);
        let old = base.add(1).read_volatile();
        base.add(1).write_volatile(old ^ 0x4000);

        let mismatch = verify_words(base, 8, true).expect("corruption went undetected");
        assert_eq!(mismatch.word, 1);
        assert_eq!(mismatch.actual, !(1usize << 1) ^ 0x4000);
    }
}

#[test]
fn four_word_region_failure_is_localized() {
    // 16-byte region, word 2 refuses the expected pattern: the failure must
    // land on word 2 and word 3 must never be inspected as a mismatch
    let mut buf = [0usize; 4];
    let base = buf.as_mut_ptr();

    unsafe {
        fill_words(base, 4, false);
        base.add(2).write_volatile(!0);

        let mismatch = verify_words(base, 4, false).expect("corruption went undetected");
        assert_eq!(mismatch.word, 2);
        assert_eq!(mismatch.actual, !0);
    }
}

#[test]
fn failure_report_names_address_and_contents() {
    let mut sink = CaptureSink::new();
    let mut buf = [0usize; 4];
    let base = buf.as_mut_ptr();

    report_mismatch(
        base,
        &Mismatch {
            word: 2,
            actual: 0x1234,
        },
        &mut sink,
    );

    assert_eq!(sink.lines.len(), 1);
    let line = &sink.lines[0];
    assert!(line.contains("RAM check failure"));
    assert!(line.contains(&std::format!("{:#x}", base.wrapping_add(2) as usize)));
    assert!(line.contains("0x1234"));
}

#[quickcheck]
fn verify_reports_exactly_the_first_corrupt_word(
    words: usize,
    corrupt: usize,
    delta: usize,
    invert: bool,
) -> quickcheck::TestResult {
    let words = words % 64 + 1;
    let corrupt = corrupt % words;
    if delta == 0 {
        return quickcheck::TestResult::discard();
    }

    let mut buf = std::vec![0usize; words];
    let base = buf.as_mut_ptr();

    unsafe {
        fill_words(base, words, invert);
        let old = base.add(corrupt).read_volatile();
        base.add(corrupt).write_volatile(old ^ delta);

        let mismatch = verify_words(base, words, invert).expect("corruption went undetected");
        assert_eq!(mismatch.word, corrupt);
        assert_eq!(mismatch.actual, old ^ delta);
    }

    quickcheck::TestResult::passed()
}

#[quickcheck]
fn pristine_pattern_verifies(words: usize, invert: bool) {
    let words = words % 256;
    let mut buf = std::vec![0usize; words];
    let base = buf.as_mut_ptr();

    unsafe {
        fill_words(base, words, invert);
        assert_eq!(verify_words(base, words, invert), None);
    }
}
