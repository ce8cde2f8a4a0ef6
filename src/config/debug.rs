//! Debug/perf feature flags, carried from the teacher's `LogFlags` pattern
//! and trimmed to what this engine's [`crate::trace_time!`] macro reads.

pub struct DebugFlags {
    /// Gates `trace_time!`: when false every instrumented block becomes a
    /// no-op wrapper with zero timing overhead.
    pub enable_perf_logging: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    enable_perf_logging: cfg!(debug_assertions),
};
