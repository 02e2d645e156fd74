#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The run completed. Failed requests are reported in the summary, not here.
    Success = 0,

    /// Invalid CLI/config input (bad flags, zero workers, unreadable scenario file, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, worker panics, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
