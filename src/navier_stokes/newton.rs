use super::{problem::NavierStokesProblem, segregated::SegregatedSolver, FlowField};
use crate::{diagnostics::Diagnostic, linalg::Vector, Error, Result};

/// Converged Newton iterate.
#[derive(Debug, Clone)]
pub struct NewtonSolution {
  pub field: FlowField,
  /// Number of Newton updates applied.
  pub iterations: usize,
  /// Stacked 2-norm of the residuals at the returned iterate.
  pub residual_norm: f64,
}

impl NavierStokesProblem {
  /// Newton iteration from `initial` (zero if `None`) until the stacked
  /// residual norm drops below $"mtol_newton" sqrt(3 N)$.
  pub fn solve(&self, t: &Vector, initial: Option<FlowField>) -> Result<NewtonSolution> {
    let n = self.ndofs();
    let mut field = initial.unwrap_or_else(|| FlowField::zeros(n));
    field.check_len(n)?;
    Error::check_len(n, t)?;

    let tolerance = self.mtol_newton * ((3 * n) as f64).sqrt();
    let mut k = 0;
    loop {
      let (residuals, context) = self.residuals(&field.u, &field.v, &field.p, t)?;
      let norm = residuals.norm();
      if self.diagnostics.contains(Diagnostic::NewtonIteration) {
        tracing::info!("NavierStokes NEWTON: {k}\t{norm}");
      }

      if norm <= tolerance {
        if self.diagnostics.contains(Diagnostic::NewtonSuccess) {
          tracing::info!(
            "NavierStokes NEWTON: Converged in {k} iterations with max-norm {}",
            residuals.max_norm()
          );
        }
        return Ok(NewtonSolution {
          field,
          iterations: k,
          residual_norm: norm,
        });
      }
      if self.max_newton_iters.is_some_and(|max| k >= max) {
        return Err(Error::NewtonNotConverged {
          iterations: k,
          residual_norm: norm,
        });
      }

      let jacobian = context.jacobian();
      let step = SegregatedSolver::new(&jacobian)?.solve_step(&-residuals)?;
      field += &step;
      k += 1;
    }
  }
}
