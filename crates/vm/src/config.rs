//! Execution limits.

use std::time::Duration;

/// Default maximum call depth, counting `<main>`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default instruction budget per run.
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 100_000_000;

/// Default wall-clock limit per run.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

/// Default cap on the byte length of any string a run builds.
pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Default cap on the byte length of a run's collected output.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 64 * 1024 * 1024;

/// Limits applied to a single run.
///
/// ```
/// use oker_vm::VmConfig;
/// use std::time::Duration;
///
/// let config = VmConfig::default()
///     .with_max_call_depth(64)
///     .with_time_limit(Some(Duration::from_millis(500)));
/// assert_eq!(config.max_call_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Frames allowed on the frame stack at once.
    pub max_call_depth: usize,
    /// Instructions executed before `ExecutionTimeout`.
    pub max_instructions: u64,
    /// Wall-clock limit. `None` disables the clock check.
    pub time_limit: Option<Duration>,
    /// Longest string, in bytes, that concatenation or a builtin may produce.
    pub max_string_len: usize,
    /// Longest output, in bytes, that `say` may accumulate.
    pub max_output_len: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

impl VmConfig {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_instructions(mut self, steps: u64) -> Self {
        self.max_instructions = steps;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_max_string_len(mut self, bytes: usize) -> Self {
        self.max_string_len = bytes;
        self
    }

    pub fn with_max_output_len(mut self, bytes: usize) -> Self {
        self.max_output_len = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VmConfig::default();
        assert_eq!(config.max_call_depth, 1024);
        assert_eq!(config.max_instructions, 100_000_000);
        assert_eq!(config.time_limit, Some(Duration::from_secs(10)));
        assert_eq!(config.max_string_len, 16 * 1024 * 1024);
        assert_eq!(config.max_output_len, 64 * 1024 * 1024);
    }

    #[test]
    fn setters_chain() {
        let config = VmConfig::default()
            .with_max_call_depth(8)
            .with_max_instructions(50)
            .with_time_limit(None)
            .with_max_string_len(100)
            .with_max_output_len(1000);
        assert_eq!(config.max_call_depth, 8);
        assert_eq!(config.max_instructions, 50);
        assert_eq!(config.time_limit, None);
        assert_eq!(config.max_string_len, 100);
        assert_eq!(config.max_output_len, 1000);
    }
}
