//! Segregated solve of the linearized saddle-point system.
//!
//! The velocity block is factorized directly, the velocity unknowns are
//! eliminated, and the remaining pressure Schur complement is solved
//! matrix-free with LGMRES.

use super::{jacobian::Jacobian, residual::Residuals, FlowField};
use crate::{
  diagnostics::Diagnostic,
  krylov::{FnOperator, Lgmres, LinearOperator},
  linalg::{self, FaerLu, Vector},
  Result,
};

use std::time::Instant;

pub struct SegregatedSolver<'j, 'a> {
  jacobian: &'j Jacobian<'a>,
  velocity_lu: FaerLu,
}

impl<'j, 'a> SegregatedSolver<'j, 'a> {
  /// Factorizes the velocity block of `jacobian` with identity boundary rows.
  pub fn new(jacobian: &'j Jacobian<'a>) -> Result<Self> {
    let problem = jacobian.problem();
    let timer = Instant::now();

    let velocity_mat =
      linalg::block2x2_with_identity_rows(jacobian.blocks(), &problem.boundary.velocity_mask());
    let nnz = velocity_mat.nnz();
    let velocity_lu = FaerLu::new(velocity_mat)?;

    if problem.diagnostics.contains(Diagnostic::LuSuccess) {
      tracing::info!(
        "NavierStokes LU: Succeeded in {:.2}sec with {} nonzeros",
        timer.elapsed().as_secs_f64(),
        nnz
      );
    }

    Ok(Self {
      jacobian,
      velocity_lu,
    })
  }

  /// Solves the velocity block for the stacked right-hand side `(ru, rv)`.
  pub fn solve_velocity(&self, ru: &Vector, rv: &Vector) -> (Vector, Vector) {
    let duv = self.velocity_lu.solve(&linalg::stack(ru, rv));
    linalg::split(&duv)
  }

  /// Continuity component of the Jacobian with the velocity eliminated.
  fn schur_apply(&self, dp: &Vector) -> Vector {
    let zeros = Vector::zeros(dp.len());
    let Residuals { u: ru, v: rv, .. } = self.jacobian.apply_unchecked(&zeros, &zeros, dp, None);
    let (fx, fy) = self.solve_velocity(&ru, &rv);
    self.jacobian.apply_unchecked(&-fx, &-fy, dp, None).cont
  }

  /// Newton increment `(du, dv, dp)` with linearized residuals `dres`.
  pub fn solve_step(&self, dres: &Residuals) -> Result<FlowField> {
    let problem = self.jacobian.problem();
    let n = problem.ndofs();
    let zeros = Vector::zeros(n);

    let (vel_u, vel_v) = self.solve_velocity(&dres.u, &dres.v);
    let b_schur = &dres.cont - self.jacobian.apply_unchecked(&vel_u, &vel_v, &zeros, None).cont;

    let schur = FnOperator::new(n, |dp: &Vector| self.schur_apply(dp));

    let inner_m = problem.lgmres.restart.inner_m(n);
    let lgmres = Lgmres::new(problem.mtol * (n as f64).sqrt(), inner_m)
      .with_outer_k(problem.lgmres.outer_k)
      .with_max_restarts(problem.lgmres.max_restarts);

    let log_iterations = problem.diagnostics.contains(Diagnostic::LgmresIteration);
    let outcome = lgmres.solve(&schur, &problem.precon, &b_schur, None, |restart, res| {
      if log_iterations {
        tracing::info!("NavierStokes LGMRES: {restart}\t{res}");
      }
    })?;
    let dp = outcome.solution;

    if problem.diagnostics.contains(Diagnostic::LgmresSuccess) {
      let nevals = schur.nevals();
      let max_norm = (schur.apply(&dp) - &b_schur).amax();
      tracing::info!(
        "NavierStokes LGMRES: Converged in {nevals} evaluations with max-norm {max_norm}"
      );
    }

    let Residuals { u: bu, v: bv, .. } = self.jacobian.apply_unchecked(&zeros, &zeros, &dp, None);
    let (du, dv) = self.solve_velocity(&(&dres.u - bu), &(&dres.v - bv));

    Ok(FlowField { u: du, v: dv, p: dp })
  }
}
