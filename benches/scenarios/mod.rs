//! Real-world scenario benchmarks.
//!
//! These drive the full engine the way a host callback does: fixed pool,
//! timestamped events, one block at a time.

mod poly;

pub use poly::bench_poly;
