use crate::{diagnostics::DiagnosticSet, Error, Result};

/// Tangential Dirichlet velocities on the four edges of the rectangle.
/// Normal components are always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeVelocities {
  /// $v(0, y)$
  pub v_west: f64,
  /// $v(L_x, y)$
  pub v_east: f64,
  /// $u(x, 0)$
  pub u_south: f64,
  /// $u(x, L_y)$
  pub u_north: f64,
}

/// Size of the inner Krylov subspace of one LGMRES cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestartSize {
  /// Fraction of the number of pressure DOFs, truncated.
  FractionOfDofs(f64),
  Fixed(usize),
}

impl RestartSize {
  pub fn inner_m(self, ndofs: usize) -> usize {
    match self {
      Self::FractionOfDofs(fraction) => ((fraction * ndofs as f64) as usize).max(1),
      Self::Fixed(m) => m,
    }
  }
}

impl Default for RestartSize {
  fn default() -> Self {
    Self::FractionOfDofs(0.3)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LgmresParams {
  pub restart: RestartSize,
  /// Number of error approximations carried over between cycles.
  pub outer_k: usize,
  pub max_restarts: usize,
}

impl Default for LgmresParams {
  fn default() -> Self {
    Self {
      restart: RestartSize::default(),
      outer_k: 3,
      max_restarts: 1000,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NavierStokesParams {
  pub lengths: [f64; 2],
  pub reynolds: f64,
  pub grashof: f64,
  /// Polynomial order $P$ per element and direction.
  pub order: usize,
  pub nelems: [usize; 2],
  pub edges: EdgeVelocities,
  /// Tolerance on root mean square residuals of the pressure solve.
  pub mtol: f64,
  /// Tolerance on root mean square residuals of the Newton iteration.
  pub mtol_newton: f64,
  pub lgmres: LgmresParams,
  /// `None` iterates until convergence.
  pub max_newton_iters: Option<usize>,
  pub diagnostics: DiagnosticSet,
}

impl Default for NavierStokesParams {
  fn default() -> Self {
    Self {
      lengths: [1.0, 1.0],
      reynolds: 100.0,
      grashof: 0.0,
      order: 4,
      nelems: [4, 4],
      edges: EdgeVelocities::default(),
      mtol: 1e-7,
      mtol_newton: 1e-5,
      lgmres: LgmresParams::default(),
      max_newton_iters: None,
      diagnostics: DiagnosticSet::default(),
    }
  }
}

impl NavierStokesParams {
  pub fn with_lengths(mut self, lx: f64, ly: f64) -> Self {
    self.lengths = [lx, ly];
    self
  }
  pub fn with_reynolds(mut self, reynolds: f64) -> Self {
    self.reynolds = reynolds;
    self
  }
  pub fn with_grashof(mut self, grashof: f64) -> Self {
    self.grashof = grashof;
    self
  }
  pub fn with_discretization(mut self, order: usize, nelems_x: usize, nelems_y: usize) -> Self {
    self.order = order;
    self.nelems = [nelems_x, nelems_y];
    self
  }
  pub fn with_edges(mut self, edges: EdgeVelocities) -> Self {
    self.edges = edges;
    self
  }
  pub fn with_tolerances(mut self, mtol: f64, mtol_newton: f64) -> Self {
    self.mtol = mtol;
    self.mtol_newton = mtol_newton;
    self
  }
  pub fn with_lgmres(mut self, lgmres: LgmresParams) -> Self {
    self.lgmres = lgmres;
    self
  }
  pub fn with_max_newton_iters(mut self, max_newton_iters: usize) -> Self {
    self.max_newton_iters = Some(max_newton_iters);
    self
  }
  pub fn with_diagnostics(mut self, diagnostics: DiagnosticSet) -> Self {
    self.diagnostics = diagnostics;
    self
  }

  /// Buoyancy prefactor $"Gr" / "Re"$, zero for Stokes flow.
  pub fn gr_over_re(&self) -> f64 {
    if self.reynolds == 0.0 {
      0.0
    } else {
      self.grashof / self.reynolds
    }
  }

  pub fn validate(&self) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidConfig(msg));

    if self.reynolds == 0.0 && self.grashof != 0.0 {
      return invalid("cannot have Re == 0 and Gr != 0".into());
    }
    if !self.reynolds.is_finite() || self.reynolds < 0.0 {
      return invalid(format!("Reynolds number must be finite and >= 0, got {}", self.reynolds));
    }
    if !self.grashof.is_finite() {
      return invalid(format!("Grashof number must be finite, got {}", self.grashof));
    }
    if self.order == 0 {
      return invalid("polynomial order must be >= 1".into());
    }
    if self.nelems.contains(&0) {
      return invalid(format!("element counts must be >= 1, got {:?}", self.nelems));
    }
    if self.lengths.iter().any(|&l| !(l.is_finite() && l > 0.0)) {
      return invalid(format!("domain lengths must be positive, got {:?}", self.lengths));
    }
    if !(self.mtol > 0.0 && self.mtol_newton > 0.0) {
      return invalid(format!(
        "tolerances must be positive, got mtol={} mtol_newton={}",
        self.mtol, self.mtol_newton
      ));
    }
    match self.lgmres.restart {
      RestartSize::FractionOfDofs(f) if !(f > 0.0 && f <= 1.0) => {
        return invalid(format!("restart fraction must lie in (0, 1], got {f}"));
      }
      RestartSize::Fixed(0) => return invalid("restart size must be >= 1".into()),
      _ => {}
    }
    if self.max_newton_iters == Some(0) {
      return invalid("Newton iteration cap must be >= 1".into());
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_params_are_valid() {
    let params = NavierStokesParams::default();
    assert!(params.validate().is_ok());
    assert_eq!(params.lgmres.restart.inner_m(1000), 300);
    assert_eq!(params.gr_over_re(), 0.0);
  }

  #[test]
  fn stokes_flow_rejects_buoyancy() {
    let params = NavierStokesParams::default()
      .with_reynolds(0.0)
      .with_grashof(1.0);
    assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));
    assert_eq!(params.gr_over_re(), 0.0);

    let stokes = NavierStokesParams::default().with_reynolds(0.0);
    assert!(stokes.validate().is_ok());
  }

  #[test]
  fn degenerate_discretizations_are_rejected() {
    let cases = [
      NavierStokesParams::default().with_discretization(0, 2, 2),
      NavierStokesParams::default().with_discretization(3, 0, 2),
      NavierStokesParams::default().with_lengths(1.0, -1.0),
      NavierStokesParams::default().with_lgmres(LgmresParams {
        restart: RestartSize::FractionOfDofs(1.5),
        ..Default::default()
      }),
    ];
    for params in cases {
      assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));
    }
  }

  #[test]
  fn restart_size_is_at_least_one() {
    assert_eq!(RestartSize::FractionOfDofs(0.3).inner_m(2), 1);
    assert_eq!(RestartSize::Fixed(17).inner_m(2), 17);
  }
}
