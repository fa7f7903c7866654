use super::{
  problem::NavierStokesProblem,
  residual::{Residuals, SystemContext},
};
use crate::{
  linalg::{CsrMatrix, Vector},
  Error, Result,
};

/// Blocks of the momentum Jacobian
/// $mat(J_(u u), J_(u v); J_(v u), J_(v v))$ without boundary rows.
pub struct Jacobian<'a> {
  problem: &'a NavierStokesProblem,
  uu: CsrMatrix,
  uv: CsrMatrix,
  vu: CsrMatrix,
  vv: CsrMatrix,
}

impl<'a> Jacobian<'a> {
  pub(super) fn new(context: SystemContext<'a>) -> Self {
    let SystemContext { problem, sys, u, v } = context;
    let ops = &problem.ops;
    let re = problem.reynolds;

    // chain rule through the velocity dependence of the system matrix
    let uu = &sys + &ops.conv_x.freeze_second(&u, re);
    let vv = &sys + &ops.conv_y.freeze_second(&v, re);
    let uv = ops.conv_y.freeze_second(&u, re);
    let vu = ops.conv_x.freeze_second(&v, re);

    Self {
      problem,
      uu,
      uv,
      vu,
      vv,
    }
  }

  pub fn problem(&self) -> &'a NavierStokesProblem {
    self.problem
  }

  /// `[[uu, uv], [vu, vv]]`
  pub fn blocks(&self) -> [[&CsrMatrix; 2]; 2] {
    [[&self.uu, &self.uv], [&self.vu, &self.vv]]
  }

  /// Linearized residuals in direction `(du, dv, dp)` and optionally `dt`.
  pub fn apply(&self, du: &Vector, dv: &Vector, dp: &Vector, dt: Option<&Vector>) -> Result<Residuals> {
    let n = self.problem.ndofs();
    for dir in [du, dv, dp].into_iter().chain(dt) {
      Error::check_len(n, dir)?;
    }
    Ok(self.apply_unchecked(du, dv, dp, dt))
  }

  pub(super) fn apply_unchecked(
    &self,
    du: &Vector,
    dv: &Vector,
    dp: &Vector,
    dt: Option<&Vector>,
  ) -> Residuals {
    let problem = self.problem;
    let ops = &problem.ops;

    let mut dres_u = &self.uu * du + &self.uv * dv + &ops.grad_x * dp;
    let mut dres_v = &self.vu * du + &self.vv * dv + &ops.grad_y * dp;
    let mut dres_cont = &ops.grad_x * du + &ops.grad_y * dv;
    if let Some(dt) = dt {
      dres_v -= problem.buoyancy(dt);
    }

    for &i in problem.boundary.dofs() {
      dres_u[i] = du[i];
      dres_v[i] = dv[i];
    }
    problem.patch_continuity(&mut dres_cont, dp);

    Residuals {
      u: dres_u,
      v: dres_v,
      cont: dres_cont,
    }
  }
}
