//! Diagnostic text output.
use core::fmt;

/// A line-oriented sink for diagnostic text.
///
/// The sink is append-only, and the order of lines reflects the temporal
/// order of the checks that produced them. Test harnesses may rely on this
/// ordering.
pub trait DiagSink {
    /// Emit one line of diagnostic text.
    fn line(&mut self, args: fmt::Arguments<'_>);
}

/// Adapts any [`fmt::Write`] into a [`DiagSink`], terminating each line with
/// `'\n'`.
///
/// Write errors are swallowed: diagnostics are best-effort and a failing sink
/// must not stop a probe.
#[derive(Debug, Default)]
pub struct FmtSink<W>(pub W);

impl<W: fmt::Write> DiagSink for FmtSink<W> {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.0.write_fmt(args);
        let _ = self.0.write_char('\n');
    }
}
