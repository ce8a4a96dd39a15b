//! Cache-blocked GEMM.
//!
//! Breaks the multiplication into square tiles small enough that one tile
//! each of A, B and C stays in the L1 data cache while it is being worked on.
//!
//! - `tile`: derives the tile width from the L1d size
//! - `tiled`: the blocked multiply itself

pub mod tile;
pub mod tiled;
