use crate::krylov::KrylovError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
  #[error("sparse LU factorization of the velocity jacobian failed: {0}")]
  Factorization(String),
  #[error("pressure schur complement solve failed: {0}")]
  Krylov(#[from] KrylovError),
  #[error("newton failed to converge in {iterations} iterations (residual norm {residual_norm:e})")]
  NewtonNotConverged {
    iterations: usize,
    residual_norm: f64,
  },
  #[error("expected vector of length {expected}, found {found}")]
  DimensionMismatch { expected: usize, found: usize },
}

impl Error {
  pub fn check_len(expected: usize, vector: &na::DVector<f64>) -> Result<()> {
    if vector.len() == expected {
      Ok(())
    } else {
      Err(Self::DimensionMismatch {
        expected,
        found: vector.len(),
      })
    }
  }
}
