//! Steady Navier-Stokes with Boussinesq buoyancy
//!
//! $"Re" (u dot nabla) u = -nabla p + nabla^2 u + "Gr"/"Re" T e_y$, $nabla dot u = 0$
//!
//! on $[0, L_x] times [0, L_y]$ with no normal flow and tangential Dirichlet
//! velocities on the edges, and an artificial homogeneous Neumann condition
//! on the pressure.

pub mod boundary;
pub mod jacobian;
pub mod newton;
pub mod params;
pub mod problem;
pub mod residual;
pub mod segregated;

pub use boundary::BoundaryConditions;
pub use jacobian::Jacobian;
pub use newton::NewtonSolution;
pub use params::{EdgeVelocities, LgmresParams, NavierStokesParams, RestartSize};
pub use problem::NavierStokesProblem;
pub use residual::{Residuals, SystemContext};
pub use segregated::SegregatedSolver;

use crate::{
  linalg::Vector,
  operators::OperatorProvider,
  sem::{RectGrid, SpectralElementSpace},
  Error, Result,
};

/// Velocity and pressure as global DOF vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
  pub u: Vector,
  pub v: Vector,
  pub p: Vector,
}

impl FlowField {
  pub fn zeros(ndofs: usize) -> Self {
    Self {
      u: Vector::zeros(ndofs),
      v: Vector::zeros(ndofs),
      p: Vector::zeros(ndofs),
    }
  }

  pub fn check_len(&self, ndofs: usize) -> Result<()> {
    for field in [&self.u, &self.v, &self.p] {
      Error::check_len(ndofs, field)?;
    }
    Ok(())
  }
}

impl std::ops::AddAssign<&FlowField> for FlowField {
  fn add_assign(&mut self, step: &FlowField) {
    self.u += &step.u;
    self.v += &step.v;
    self.p += &step.p;
  }
}

/// Solution sampled at plotting points.
#[derive(Debug, Clone)]
pub struct SampledFlow {
  pub u: Vector,
  pub v: Vector,
  pub p: Vector,
  pub newton_iterations: usize,
}

/// Ties a discretization to a [`NavierStokesProblem`].
pub struct NavierStokesSolver<S = SpectralElementSpace> {
  provider: S,
  nodes: na::Matrix2xX<f64>,
  problem: NavierStokesProblem,
}

impl NavierStokesSolver<SpectralElementSpace> {
  /// Spectral element discretization with `params.nelems` elements of order
  /// `params.order`.
  pub fn new(params: NavierStokesParams) -> Result<Self> {
    params.validate()?;
    let grid = RectGrid::new(params.lengths, params.nelems);
    let space = SpectralElementSpace::new(params.order, grid);
    Self::with_provider(space, &params)
  }

  pub fn space(&self) -> &SpectralElementSpace {
    &self.provider
  }
}

impl<S: OperatorProvider> NavierStokesSolver<S> {
  pub fn with_provider(provider: S, params: &NavierStokesParams) -> Result<Self> {
    params.validate()?;
    let nodes = provider.global_nodes();
    let ops = provider.assemble_operators();
    let problem = NavierStokesProblem::new(ops, &nodes, params)?;
    Ok(Self {
      provider,
      nodes,
      problem,
    })
  }

  pub fn ndofs(&self) -> usize {
    self.problem.ndofs()
  }
  pub fn nodes(&self) -> &na::Matrix2xX<f64> {
    &self.nodes
  }
  pub fn problem(&self) -> &NavierStokesProblem {
    &self.problem
  }

  /// Samples `f(x, y)` at the global nodes.
  pub fn global_vector<F>(&self, f: F) -> Vector
  where
    F: Fn(f64, f64) -> f64,
  {
    Vector::from_iterator(
      self.ndofs(),
      self.nodes.column_iter().map(|c| f(c[0], c[1])),
    )
  }

  pub fn solve(&self, t: &Vector, initial: Option<FlowField>) -> Result<NewtonSolution> {
    self.problem.solve(t, initial)
  }

  pub fn interpolate(&self, coeffs: &Vector, points: &na::Matrix2xX<f64>) -> Result<Vector> {
    Error::check_len(self.ndofs(), coeffs)?;
    Ok(self.provider.interpolate(coeffs, points))
  }

  /// Solves for the temperature `t_func` and samples `(u, v, p)` at `points`.
  pub fn run<F>(&self, t_func: F, points: &na::Matrix2xX<f64>) -> Result<SampledFlow>
  where
    F: Fn(f64, f64) -> f64,
  {
    let t = self.global_vector(t_func);
    let solution = self.solve(&t, None)?;
    let field = &solution.field;
    Ok(SampledFlow {
      u: self.interpolate(&field.u, points)?,
      v: self.interpolate(&field.v, points)?,
      p: self.interpolate(&field.p, points)?,
      newton_iterations: solution.iterations,
    })
  }
}
