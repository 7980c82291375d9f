// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod board;
pub mod history;
pub mod progress;
pub mod registry;
pub mod runtime;
pub mod sprint;
pub mod storage;
pub mod util;
pub mod workspace;

/// Countdown resolution: the sprint timer advances in whole seconds.
pub const TICK_RATE_MS: u64 = 1000;
