//! Shared utilities for the rendering engine.

/// Millisecond clock and optional frame limiter.
pub mod frame_timing;
