use crate::{util, Error, Result};

use faer::solvers::SpSolver;

pub type CsrMatrix = nas::CsrMatrix<f64>;
pub type CscMatrix = nas::CscMatrix<f64>;
pub type Vector = na::DVector<f64>;

/// Concatenates a square 2x2 block grid of equally sized blocks.
///
/// Rows flagged in `identity_rows` are replaced by the corresponding
/// rows of the identity matrix.
pub fn block2x2_with_identity_rows(
  blocks: [[&CsrMatrix; 2]; 2],
  identity_rows: &[bool],
) -> CscMatrix {
  let n = blocks[0][0].nrows();
  assert!(blocks
    .iter()
    .flatten()
    .all(|b| b.nrows() == n && b.ncols() == n));
  assert_eq!(identity_rows.len(), 2 * n);

  let mut coo = nas::CooMatrix::new(2 * n, 2 * n);
  for (iblock, row) in blocks.iter().enumerate() {
    for (jblock, block) in row.iter().enumerate() {
      let row_offset = iblock * n;
      let col_offset = jblock * n;
      for (r, c, &v) in block.triplet_iter() {
        let r = row_offset + r;
        if !identity_rows[r] {
          coo.push(r, col_offset + c, v);
        }
      }
    }
  }
  for i in util::flags_to_indicies(identity_rows) {
    coo.push(i, i, 1.0);
  }

  CscMatrix::from(&coo)
}

pub fn diagonal(mat: &CsrMatrix) -> Vector {
  let mut diagonal = Vector::zeros(mat.nrows().min(mat.ncols()));
  for (r, c, &v) in mat.triplet_iter() {
    if r == c {
      diagonal[r] += v;
    }
  }
  diagonal
}

pub fn stack(upper: &Vector, lower: &Vector) -> Vector {
  Vector::from_iterator(
    upper.len() + lower.len(),
    upper.iter().chain(lower.iter()).copied(),
  )
}

/// Splits a vector of even length into its two halves.
pub fn split(stacked: &Vector) -> (Vector, Vector) {
  assert!(stacked.len() % 2 == 0);
  let n = stacked.len() / 2;
  (
    stacked.rows(0, n).into_owned(),
    stacked.rows(n, n).into_owned(),
  )
}

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: CscMatrix) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

pub struct FaerLu {
  raw: faer::sparse::linalg::solvers::Lu<usize, f64>,
  nrows: usize,
}
impl FaerLu {
  pub fn new(a: CscMatrix) -> Result<Self> {
    let nrows = a.nrows();
    let raw = nalgebra2faer(a)
      .sp_lu()
      .map_err(|err| Error::Factorization(format!("{err:?}")))?;
    Ok(Self { raw, nrows })
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }

  pub fn solve(&self, b: &Vector) -> Vector {
    let b = faer::col::from_slice(b.as_slice());
    Vector::from_vec(self.raw.solve(b).as_slice().to_vec())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn csr(n: usize, triplets: &[(usize, usize, f64)]) -> CsrMatrix {
    let mut coo = nas::CooMatrix::new(n, n);
    for &(r, c, v) in triplets {
      coo.push(r, c, v);
    }
    CsrMatrix::from(&coo)
  }

  #[test]
  fn block_grid_with_identity_rows() {
    let a = csr(2, &[(0, 0, 1.0), (1, 1, 2.0), (0, 1, 5.0)]);
    let b = csr(2, &[(0, 1, 3.0)]);
    let c = csr(2, &[(1, 0, 4.0)]);
    let d = csr(2, &[(0, 0, 6.0), (1, 1, 7.0)]);

    let flags = [false, true, false, false];
    let block = block2x2_with_identity_rows([[&a, &b], [&c, &d]], &flags);
    let dense = na::DMatrix::from(&block);

    #[rustfmt::skip]
    let expected = na::DMatrix::from_row_slice(4, 4, &[
      1.0, 5.0, 0.0, 3.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 6.0, 0.0,
      4.0, 0.0, 0.0, 7.0,
    ]);
    assert_eq!(dense, expected);
  }

  #[test]
  fn lu_solves_nonsymmetric_system() {
    let a = csr(
      3,
      &[
        (0, 0, 4.0),
        (0, 1, 1.0),
        (1, 0, -2.0),
        (1, 1, 5.0),
        (1, 2, 1.0),
        (2, 1, 3.0),
        (2, 2, 6.0),
      ],
    );
    let x = Vector::from_vec(vec![1.0, -2.0, 0.5]);
    let b = &a * &x;

    let lu = FaerLu::new(CscMatrix::from(&a)).unwrap();
    let computed = lu.solve(&b);
    assert!((computed - x).norm() < 1e-12);
  }

  #[test]
  fn stack_then_split() {
    let upper = Vector::from_vec(vec![1.0, 2.0]);
    let lower = Vector::from_vec(vec![3.0, 4.0]);
    let stacked = stack(&upper, &lower);
    assert_eq!(stacked.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    let (u, l) = split(&stacked);
    assert_eq!(u, upper);
    assert_eq!(l, lower);
  }
}
