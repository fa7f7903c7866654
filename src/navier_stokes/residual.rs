use super::{jacobian::Jacobian, problem::NavierStokesProblem};
use crate::{
  linalg::{CsrMatrix, Vector},
  util, Error, Result,
};

/// Momentum and continuity residuals, or their directional derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct Residuals {
  pub u: Vector,
  pub v: Vector,
  pub cont: Vector,
}

impl Residuals {
  /// 2-norm of the three residuals stacked into one vector.
  pub fn norm(&self) -> f64 {
    util::stacked_norm([&self.u, &self.v, &self.cont])
  }
  pub fn max_norm(&self) -> f64 {
    util::max_norm([&self.u, &self.v, &self.cont])
  }
}

impl std::ops::Neg for Residuals {
  type Output = Self;
  fn neg(self) -> Self {
    Self {
      u: -self.u,
      v: -self.v,
      cont: -self.cont,
    }
  }
}

/// Convective system matrix of one Newton iterate, together with the
/// velocity it was built from.
///
/// Only obtainable from [`NavierStokesProblem::residuals`], so a Jacobian
/// always linearizes around the state whose residual was just evaluated.
pub struct SystemContext<'a> {
  pub(super) problem: &'a NavierStokesProblem,
  /// $K + "Re" (C_x(u, dot) + C_y(v, dot))$
  pub(super) sys: CsrMatrix,
  pub(super) u: Vector,
  pub(super) v: Vector,
}

impl<'a> SystemContext<'a> {
  pub fn system_matrix(&self) -> &CsrMatrix {
    &self.sys
  }

  /// Analytic Newton Jacobian of the momentum residuals.
  pub fn jacobian(self) -> Jacobian<'a> {
    Jacobian::new(self)
  }
}

impl NavierStokesProblem {
  /// Residuals of the discrete equations at `(u, v, p)` for temperature `t`.
  ///
  /// Boundary rows of the momentum residuals hold the Dirichlet defect,
  /// boundary rows of the continuity residual the pressure Neumann rows and
  /// the reference row the reference pressure.
  pub fn residuals(
    &self,
    u: &Vector,
    v: &Vector,
    p: &Vector,
    t: &Vector,
  ) -> Result<(Residuals, SystemContext<'_>)> {
    let n = self.ndofs();
    for field in [u, v, p, t] {
      Error::check_len(n, field)?;
    }
    let ops = &self.ops;

    let conv = &ops.conv_x.freeze_first(u, self.reynolds) + &ops.conv_y.freeze_first(v, self.reynolds);
    let sys = &ops.stiffness + &conv;

    let mut res_u = &sys * u + &ops.grad_x * p;
    let mut res_v = &sys * v + &ops.grad_y * p - self.buoyancy(t);
    let mut res_cont = &ops.grad_x * u + &ops.grad_y * v;

    let (u_dir, v_dir) = (self.boundary.u_values(), self.boundary.v_values());
    for &i in self.boundary.dofs() {
      res_u[i] = u[i] - u_dir[i];
      res_v[i] = v[i] - v_dir[i];
    }
    self.patch_continuity(&mut res_cont, p);

    let residuals = Residuals {
      u: res_u,
      v: res_v,
      cont: res_cont,
    };
    let context = SystemContext {
      problem: self,
      sys,
      u: u.clone(),
      v: v.clone(),
    };
    Ok((residuals, context))
  }
}
