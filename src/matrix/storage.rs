//! Owned, contiguous N×N matrix storage.
//!
//! One allocation per matrix, row `i` starting at element `i * n`. The
//! alignment of that allocation is picked once at construction time, which
//! is all that separates the "aligned" and "unaligned" benchmark builds.

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use std::slice;

use rand::Rng;
use rand::distributions::Standard;

use crate::error::{BenchError, Result};

/// Cache line size assumed for [`Alignment::CacheLine`].
pub const CACHE_LINE_BYTES: usize = 64;

/// Alignment policy for matrix storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Whatever `f64` needs (8 bytes).
    Natural,
    /// Every matrix starts on a 64-byte boundary.
    #[default]
    CacheLine,
}

impl Alignment {
    pub fn bytes(self) -> usize {
        match self {
            Alignment::Natural => mem::align_of::<f64>(),
            Alignment::CacheLine => CACHE_LINE_BYTES,
        }
    }
}

/// Square row-major `f64` matrix backed by a single heap allocation.
///
/// The storage is zeroed on allocation and never resized. Multipliers only
/// ever borrow it; the allocation is released when the matrix is dropped.
pub struct Matrix {
    ptr: NonNull<f64>,
    n: usize,
    layout: Layout,
}

impl Matrix {
    /// Allocate a zero-filled `n × n` matrix.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `n == 0`, `Allocation` if the size overflows or the
    /// allocator returns null.
    pub fn zeros(n: usize, alignment: Alignment) -> Result<Self> {
        if n == 0 {
            return Err(BenchError::InvalidInput {
                what: "matrix dimension",
                value: n.to_string(),
            });
        }

        let align = alignment.bytes();
        let bytes = n
            .checked_mul(n)
            .and_then(|len| len.checked_mul(mem::size_of::<f64>()));
        let failed = |bytes: usize| BenchError::Allocation { n, bytes, align };

        let bytes = bytes.ok_or_else(|| failed(usize::MAX))?;
        let layout = Layout::from_size_align(bytes, align).map_err(|_| failed(bytes))?;

        // SAFETY: `layout` has a non-zero size since n >= 1.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<f64>()).ok_or_else(|| failed(bytes))?;

        Ok(Self { ptr, n, layout })
    }

    /// Build a matrix from row-major data of length `n * n`.
    pub fn from_row_major(n: usize, data: &[f64], alignment: Alignment) -> Result<Self> {
        assert_eq!(
            data.len(),
            n * n,
            "expected {}x{}={} elements",
            n,
            n,
            n * n
        );
        let mut m = Self::zeros(n, alignment)?;
        m.as_mut_slice().copy_from_slice(data);
        Ok(m)
    }

    pub fn identity(n: usize, alignment: Alignment) -> Result<Self> {
        let mut m = Self::zeros(n, alignment)?;
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }

    /// Side length N.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Alignment of the backing allocation, in bytes.
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    pub fn as_slice(&self) -> &[f64] {
        // SAFETY: ptr points to n*n initialised f64s owned by self.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.n * self.n) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.n * self.n) }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.as_slice()[i * self.n..(i + 1) * self.n]
    }

    /// Reset every element to 0.0. Required before each multiply, since the
    /// multipliers accumulate into their output.
    pub fn fill_zeros(&mut self) {
        self.as_mut_slice().fill(0.0);
    }

    /// Fill with values drawn uniformly from `[0, 1)`.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for v in self.as_mut_slice() {
            *v = rng.sample(Standard);
        }
    }
}

impl Drop for Matrix {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeros` with exactly this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), self.layout) };
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(j < self.n, "column {} out of range for N={}", j, self.n);
        &self.as_slice()[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(j < self.n, "column {} out of range for N={}", j, self.n);
        let n = self.n;
        &mut self.as_mut_slice()[i * n + j]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("n", &self.n)
            .field("align", &self.layout.align())
            .finish()
    }
}
