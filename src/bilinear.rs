//! Sparse rank-3 tensors acting as bilinear operators $B: RR^n times RR^n -> RR^n$.

use crate::linalg::{CsrMatrix, Vector};

/// $B(a, b)_i = sum_(j,k) c_(i j k) a_j b_k$, stored as nonzero quadruplets.
#[derive(Debug, Clone, Default)]
pub struct BilinearOperator {
  dim: usize,
  entries: Vec<(usize, usize, usize, f64)>,
}

impl BilinearOperator {
  pub fn zeros(dim: usize) -> Self {
    Self::new(dim, Vec::new())
  }
  pub fn new(dim: usize, entries: Vec<(usize, usize, usize, f64)>) -> Self {
    assert!(entries
      .iter()
      .all(|&(i, j, k, _)| i < dim && j < dim && k < dim));
    Self { dim, entries }
  }

  pub fn dim(&self) -> usize {
    self.dim
  }
  pub fn nnz(&self) -> usize {
    self.entries.len()
  }
  pub fn entries(&self) -> &[(usize, usize, usize, f64)] {
    &self.entries
  }

  pub fn push(&mut self, i: usize, j: usize, k: usize, c: f64) {
    assert!(i < self.dim && j < self.dim && k < self.dim);
    if c != 0.0 {
      self.entries.push((i, j, k, c));
    }
  }

  /// Matrix of $b -> s B(a, b)$.
  pub fn freeze_first(&self, a: &Vector, scale: f64) -> CsrMatrix {
    assert_eq!(a.len(), self.dim);
    let mut coo = nas::CooMatrix::new(self.dim, self.dim);
    for &(i, j, k, c) in &self.entries {
      let v = scale * c * a[j];
      if v != 0.0 {
        coo.push(i, k, v);
      }
    }
    CsrMatrix::from(&coo)
  }

  /// Matrix of $a -> s B(a, b)$.
  pub fn freeze_second(&self, b: &Vector, scale: f64) -> CsrMatrix {
    assert_eq!(b.len(), self.dim);
    let mut coo = nas::CooMatrix::new(self.dim, self.dim);
    for &(i, j, k, c) in &self.entries {
      let v = scale * c * b[k];
      if v != 0.0 {
        coo.push(i, j, v);
      }
    }
    CsrMatrix::from(&coo)
  }

  pub fn apply(&self, a: &Vector, b: &Vector) -> Vector {
    assert_eq!(a.len(), self.dim);
    assert_eq!(b.len(), self.dim);
    let mut out = Vector::zeros(self.dim);
    for &(i, j, k, c) in &self.entries {
      out[i] += c * a[j] * b[k];
    }
    out
  }
}
