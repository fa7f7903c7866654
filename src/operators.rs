//! Discrete operators consumed by the nonlinear solver and the interface of
//! whatever discretization provides them.

use crate::{
  bilinear::BilinearOperator,
  linalg::{self, CsrMatrix, Vector},
};

/// Global Galerkin operators over an $N$-dimensional DOF space.
///
/// The gradient matrices double as weak divergence: the continuity residual
/// is $G_x u + G_y v$.
#[derive(Debug, Clone)]
pub struct GlobalOperators {
  pub mass: CsrMatrix,
  pub stiffness: CsrMatrix,
  pub grad_x: CsrMatrix,
  pub grad_y: CsrMatrix,
  /// $C_x(a, b)_i = integral phi_i a partial_x b$
  pub conv_x: BilinearOperator,
  /// $C_y(a, b)_i = integral phi_i a partial_y b$
  pub conv_y: BilinearOperator,
}

impl GlobalOperators {
  pub fn ndofs(&self) -> usize {
    self.mass.nrows()
  }

  pub fn mass_diagonal(&self) -> Vector {
    linalg::diagonal(&self.mass)
  }

  /// All operators are square and conform to the same DOF space.
  pub fn is_conformal(&self) -> bool {
    let n = self.ndofs();
    [&self.mass, &self.stiffness, &self.grad_x, &self.grad_y]
      .iter()
      .all(|m| m.nrows() == n && m.ncols() == n)
      && self.conv_x.dim() == n
      && self.conv_y.dim() == n
  }
}

/// A discretization of the rectangle that supplies nodes, operators and
/// point evaluation of discrete fields.
pub trait OperatorProvider {
  fn ndofs(&self) -> usize;
  /// `2 x N` matrix of node coordinates.
  fn global_nodes(&self) -> na::Matrix2xX<f64>;
  fn assemble_operators(&self) -> GlobalOperators;
  /// Evaluates the discrete field `coeffs` at every column of `points`.
  fn interpolate(&self, coeffs: &Vector, points: &na::Matrix2xX<f64>) -> Vector;
}
