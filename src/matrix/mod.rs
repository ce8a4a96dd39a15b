//! Matrix storage, the naive reference multiply, and result comparison.
//!
//! The naive multiply is the correctness and speed baseline for the tiled
//! implementation in [`crate::blocked`].

pub mod equality;
pub mod naive_ijk;
pub mod storage;

pub use storage::{Alignment, Matrix};
