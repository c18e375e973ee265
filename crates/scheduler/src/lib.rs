//! Rankcast Scheduler
//!
//! Drives fetch -> render on a fixed interval, starting with one immediate
//! refresh. Ticks never overlap and a failed tick only costs that tick.

pub mod refresh;

pub use refresh::{RefreshScheduler, RefreshTask, TickCounts, TickReport};
