use super::{
  boundary::BoundaryConditions,
  params::{LgmresParams, NavierStokesParams},
};
use crate::{
  diagnostics::DiagnosticSet,
  krylov::DiagonalPreconditioner,
  linalg::Vector,
  operators::GlobalOperators,
  Error, Result,
};

/// Discrete operators, boundary data and solver settings of one steady
/// Navier-Stokes problem. Immutable once built; every Newton step works on
/// its own [`super::SystemContext`].
#[derive(Debug, Clone)]
pub struct NavierStokesProblem {
  pub(super) ops: GlobalOperators,
  pub(super) boundary: BoundaryConditions,
  pub(super) reynolds: f64,
  pub(super) gr_over_re: f64,
  pub(super) mtol: f64,
  pub(super) mtol_newton: f64,
  pub(super) lgmres: LgmresParams,
  pub(super) max_newton_iters: Option<usize>,
  pub(super) diagnostics: DiagnosticSet,
  pub(super) precon: DiagonalPreconditioner,
}

impl NavierStokesProblem {
  pub fn new(ops: GlobalOperators, nodes: &na::Matrix2xX<f64>, params: &NavierStokesParams) -> Result<Self> {
    params.validate()?;
    if !ops.is_conformal() {
      return Err(Error::InvalidConfig(
        "global operators do not share one DOF space".into(),
      ));
    }
    if nodes.ncols() != ops.ndofs() {
      return Err(Error::DimensionMismatch {
        expected: ops.ndofs(),
        found: nodes.ncols(),
      });
    }

    let boundary = BoundaryConditions::from_nodes(nodes, params.lengths, &params.edges);
    let precon = mass_preconditioner(&ops, boundary.reference_dof());

    Ok(Self {
      ops,
      boundary,
      reynolds: params.reynolds,
      gr_over_re: params.gr_over_re(),
      mtol: params.mtol,
      mtol_newton: params.mtol_newton,
      lgmres: params.lgmres.clone(),
      max_newton_iters: params.max_newton_iters,
      diagnostics: params.diagnostics.clone(),
      precon,
    })
  }

  pub fn ndofs(&self) -> usize {
    self.ops.ndofs()
  }
  pub fn operators(&self) -> &GlobalOperators {
    &self.ops
  }
  pub fn boundary(&self) -> &BoundaryConditions {
    &self.boundary
  }
  pub fn reynolds(&self) -> f64 {
    self.reynolds
  }
  pub fn mtol(&self) -> f64 {
    self.mtol
  }
  pub fn mtol_newton(&self) -> f64 {
    self.mtol_newton
  }

  /// $"Gr" / "Re" M T$
  pub(super) fn buoyancy(&self, t: &Vector) -> Vector {
    self.gr_over_re * (&self.ops.mass * t)
  }

  /// Overwrites the continuity rows of boundary DOFs with the homogeneous
  /// Neumann rows $K p$, then pins the reference DOF.
  pub(super) fn patch_continuity(&self, cont: &mut Vector, p: &Vector) {
    let kp = &self.ops.stiffness * p;
    for &i in self.boundary.dofs() {
      cont[i] = kp[i];
    }
    let iref = self.boundary.reference_dof();
    cont[iref] = p[iref];
  }
}

/// Inverse mass diagonal, identity on the reference DOF.
fn mass_preconditioner(ops: &GlobalOperators, reference_dof: usize) -> DiagonalPreconditioner {
  let mut inv_diagonal = ops.mass_diagonal().map(|m| 1.0 / m);
  inv_diagonal[reference_dof] = 1.0;
  DiagonalPreconditioner::new(inv_diagonal)
}
