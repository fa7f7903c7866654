//! Matrix-free Krylov iteration.
//!
//! Operators only need to know how to act on a vector, so implicit operators
//! such as Schur complements never have to be materialized.

use crate::linalg::Vector;

use std::{cell::Cell, collections::VecDeque};

pub trait LinearOperator {
  fn dim(&self) -> usize;
  fn apply(&self, x: &Vector) -> Vector;
}

/// Approximate inverse applied to residual-like vectors.
pub trait Preconditioner {
  fn apply(&self, r: &Vector) -> Vector;
}

/// Wraps a closure as a [`LinearOperator`] and counts its evaluations.
pub struct FnOperator<F> {
  dim: usize,
  f: F,
  nevals: Cell<usize>,
}
impl<F> FnOperator<F>
where
  F: Fn(&Vector) -> Vector,
{
  pub fn new(dim: usize, f: F) -> Self {
    Self {
      dim,
      f,
      nevals: Cell::new(0),
    }
  }
  pub fn nevals(&self) -> usize {
    self.nevals.get()
  }
}
impl<F> LinearOperator for FnOperator<F>
where
  F: Fn(&Vector) -> Vector,
{
  fn dim(&self) -> usize {
    self.dim
  }
  fn apply(&self, x: &Vector) -> Vector {
    self.nevals.set(self.nevals.get() + 1);
    (self.f)(x)
  }
}

impl LinearOperator for nas::CsrMatrix<f64> {
  fn dim(&self) -> usize {
    assert_eq!(self.nrows(), self.ncols());
    self.nrows()
  }
  fn apply(&self, x: &Vector) -> Vector {
    self * x
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreconditioner;
impl Preconditioner for IdentityPreconditioner {
  fn apply(&self, r: &Vector) -> Vector {
    r.clone()
  }
}

/// Scales every component by a fixed factor.
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner {
  inv_diagonal: Vector,
}
impl DiagonalPreconditioner {
  pub fn new(inv_diagonal: Vector) -> Self {
    Self { inv_diagonal }
  }
  /// Jacobi-type scaling $z_i = r_i / d_i$.
  pub fn from_diagonal(diagonal: &Vector) -> Self {
    Self::new(diagonal.map(|d| 1.0 / d))
  }
  pub fn inv_diagonal(&self) -> &Vector {
    &self.inv_diagonal
  }
}
impl Preconditioner for DiagonalPreconditioner {
  fn apply(&self, r: &Vector) -> Vector {
    r.component_mul(&self.inv_diagonal)
  }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KrylovError {
  #[error("LGMRES failed to converge in {restarts} restarts (residual norm {residual_norm:e})")]
  NotConverged { restarts: usize, residual_norm: f64 },
  #[error("operator of dimension {operator} applied to right-hand side of length {rhs}")]
  DimensionMismatch { operator: usize, rhs: usize },
}

#[derive(Debug, Clone)]
pub struct LgmresOutcome {
  pub solution: Vector,
  /// Number of completed outer cycles.
  pub restarts: usize,
  /// Number of operator applications, including residual evaluations.
  pub matvecs: usize,
  /// 2-norm of the true residual $b - A x$ at return.
  pub residual_norm: f64,
}

/// Restarted GMRES with error-approximation augmentation (LGMRES).
///
/// Each cycle runs `inner_m` steps of right-preconditioned flexible Arnoldi
/// and then extends the Krylov basis with the (at most `outer_k`) most recent
/// solution corrections, which counteracts the stagnation typical of plain
/// restarted GMRES. Convergence is declared once the true residual satisfies
/// $norm(b - A x) <= "atol"$.
#[derive(Debug, Clone)]
pub struct Lgmres {
  pub atol: f64,
  pub inner_m: usize,
  pub outer_k: usize,
  pub max_restarts: usize,
}

impl Lgmres {
  pub fn new(atol: f64, inner_m: usize) -> Self {
    Self {
      atol,
      inner_m: inner_m.max(1),
      outer_k: 3,
      max_restarts: 1000,
    }
  }
  pub fn with_outer_k(mut self, outer_k: usize) -> Self {
    self.outer_k = outer_k;
    self
  }
  pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
    self.max_restarts = max_restarts;
    self
  }

  /// `callback` receives the restart index and the true residual norm
  /// at the start of every cycle.
  pub fn solve(
    &self,
    a: &impl LinearOperator,
    precon: &impl Preconditioner,
    b: &Vector,
    x0: Option<&Vector>,
    mut callback: impl FnMut(usize, f64),
  ) -> Result<LgmresOutcome, KrylovError> {
    let n = a.dim();
    if b.len() != n {
      return Err(KrylovError::DimensionMismatch {
        operator: n,
        rhs: b.len(),
      });
    }

    let mut x = x0.cloned().unwrap_or_else(|| Vector::zeros(n));
    let mut matvecs = 0;
    // Normalized corrections $z$ together with $A z$.
    let mut outer: VecDeque<(Vector, Vector)> = VecDeque::with_capacity(self.outer_k + 1);

    let mut residual_norm = f64::INFINITY;
    for restart in 0..=self.max_restarts {
      let r = b - a.apply(&x);
      matvecs += 1;
      residual_norm = r.norm();
      callback(restart, residual_norm);
      if !residual_norm.is_finite() {
        return Err(KrylovError::NotConverged {
          restarts: restart,
          residual_norm,
        });
      }

      if residual_norm <= self.atol {
        return Ok(LgmresOutcome {
          solution: x,
          restarts: restart,
          matvecs,
          residual_norm,
        });
      }
      if restart == self.max_restarts {
        break;
      }

      let cycle = self.cycle(a, precon, r, residual_norm, &outer);
      matvecs += cycle.matvecs;
      if !is_finite(&cycle.dx) || !is_finite(&cycle.adx) {
        return Err(KrylovError::NotConverged {
          restarts: restart,
          residual_norm,
        });
      }

      let dx_norm = cycle.dx.norm();
      if dx_norm > 0.0 {
        x += &cycle.dx;
        outer.push_back((cycle.dx / dx_norm, cycle.adx / dx_norm));
        while outer.len() > self.outer_k {
          outer.pop_front();
        }
      }
    }

    Err(KrylovError::NotConverged {
      restarts: self.max_restarts,
      residual_norm,
    })
  }

  fn cycle(
    &self,
    a: &impl LinearOperator,
    precon: &impl Preconditioner,
    r: Vector,
    r_norm: f64,
    outer: &VecDeque<(Vector, Vector)>,
  ) -> Cycle {
    const BREAKDOWN: f64 = 1e-300;

    let nsteps = self.inner_m + outer.len();
    let mut matvecs = 0;

    let mut vs: Vec<Vector> = Vec::with_capacity(nsteps + 1);
    let mut zs: Vec<Vector> = Vec::with_capacity(nsteps);
    vs.push(r / r_norm);

    // Hessenberg matrix before and after the givens rotations.
    let mut hessenberg = na::DMatrix::<f64>::zeros(nsteps + 1, nsteps);
    let mut triangular = na::DMatrix::<f64>::zeros(nsteps + 1, nsteps);
    let mut cs = vec![0.0; nsteps];
    let mut sn = vec![0.0; nsteps];
    let mut g = Vector::zeros(nsteps + 1);
    g[0] = r_norm;

    let mut k = 0;
    for j in 0..nsteps {
      let (z, mut w) = if j < self.inner_m {
        let z = precon.apply(&vs[j]);
        let w = a.apply(&z);
        matvecs += 1;
        (z, w)
      } else {
        outer[j - self.inner_m].clone()
      };

      // modified gram-schmidt
      for (i, v) in vs.iter().enumerate() {
        let h = w.dot(v);
        hessenberg[(i, j)] = h;
        w.axpy(-h, v, 1.0);
      }
      let w_norm = w.norm();
      hessenberg[(j + 1, j)] = w_norm;
      zs.push(z);
      k = j + 1;

      let mut column = hessenberg.column(j).clone_owned();
      for i in 0..j {
        let upper = cs[i] * column[i] + sn[i] * column[i + 1];
        column[i + 1] = -sn[i] * column[i] + cs[i] * column[i + 1];
        column[i] = upper;
      }
      let denom = column[j].hypot(column[j + 1]);
      (cs[j], sn[j]) = if denom > 0.0 {
        (column[j] / denom, column[j + 1] / denom)
      } else {
        (1.0, 0.0)
      };
      column[j] = cs[j] * column[j] + sn[j] * column[j + 1];
      column[j + 1] = 0.0;
      triangular.set_column(j, &column);
      g[j + 1] = -sn[j] * g[j];
      g[j] *= cs[j];

      if !w_norm.is_finite() || w_norm <= BREAKDOWN {
        break;
      }
      vs.push(w / w_norm);
      if g[j + 1].abs() <= self.atol {
        break;
      }
    }

    // back substitution
    let mut y = Vector::zeros(k);
    for i in (0..k).rev() {
      let mut sum = g[i];
      for l in i + 1..k {
        sum -= triangular[(i, l)] * y[l];
      }
      let diag = triangular[(i, i)];
      y[i] = if diag.abs() > BREAKDOWN { sum / diag } else { 0.0 };
    }

    let mut dx = Vector::zeros(vs[0].len());
    for (z, &yi) in zs.iter().zip(y.iter()) {
      dx.axpy(yi, z, 1.0);
    }
    // $A Z y = V H y$
    let hy = hessenberg.view((0, 0), (k + 1, k)) * &y;
    let mut adx = Vector::zeros(dx.len());
    for (v, &c) in vs.iter().zip(hy.iter()) {
      adx.axpy(c, v, 1.0);
    }

    Cycle { dx, adx, matvecs }
  }
}

fn is_finite(x: &Vector) -> bool {
  x.iter().all(|c| c.is_finite())
}

struct Cycle {
  dx: Vector,
  adx: Vector,
  matvecs: usize,
}

#[cfg(test)]
mod test {
  use super::*;

  /// Nonsymmetric, diagonally dominant convection-diffusion stencil.
  fn convection_diffusion(n: usize) -> nas::CsrMatrix<f64> {
    let mut coo = nas::CooMatrix::new(n, n);
    for i in 0..n {
      coo.push(i, i, 4.0 + i as f64 / n as f64);
      if i > 0 {
        coo.push(i, i - 1, -1.7);
      }
      if i + 1 < n {
        coo.push(i, i + 1, -0.3);
      }
    }
    nas::CsrMatrix::from(&coo)
  }

  fn rhs(n: usize) -> Vector {
    Vector::from_fn(n, |i, _| (i as f64 * 0.7).sin() + 0.1)
  }

  #[test]
  fn converges_on_nonsymmetric_system() {
    let n = 60;
    let a = convection_diffusion(n);
    let b = rhs(n);
    let atol = 1e-10;

    let outcome = Lgmres::new(atol, 10)
      .solve(&a, &IdentityPreconditioner, &b, None, |_, _| {})
      .unwrap();
    let residual = (&b - &a * &outcome.solution).norm();
    assert!(residual <= atol, "residual {residual}");
    assert!((residual - outcome.residual_norm).abs() < 1e-14);
  }

  #[test]
  fn diagonal_preconditioner_and_initial_guess() {
    let n = 40;
    let a = convection_diffusion(n);
    let b = rhs(n);
    let diag = crate::linalg::diagonal(&a);
    let precon = DiagonalPreconditioner::from_diagonal(&diag);

    let exact = Lgmres::new(1e-12, n)
      .solve(&a, &IdentityPreconditioner, &b, None, |_, _| {})
      .unwrap()
      .solution;

    let mut residuals = Vec::new();
    let outcome = Lgmres::new(1e-10, 5)
      .solve(&a, &precon, &b, Some(&exact), |_, res| residuals.push(res))
      .unwrap();
    assert_eq!(outcome.restarts, 0);
    assert_eq!(residuals.len(), 1);

    let outcome = Lgmres::new(1e-10, 5)
      .solve(&a, &precon, &b, None, |_, res| residuals.push(res))
      .unwrap();
    assert!((outcome.solution - exact).norm() < 1e-8);
  }

  #[test]
  fn matrix_free_operator_counts_evaluations() {
    let n = 20;
    let a = convection_diffusion(n);
    let op = FnOperator::new(n, |x: &Vector| &a * x);
    let outcome = Lgmres::new(1e-10, n)
      .solve(&op, &IdentityPreconditioner, &rhs(n), None, |_, _| {})
      .unwrap();
    assert_eq!(op.nevals(), outcome.matvecs);
  }

  #[test]
  fn exhausted_budget_is_an_error() {
    let n = 50;
    let a = convection_diffusion(n);
    let result = Lgmres::new(1e-14, 1)
      .with_outer_k(0)
      .with_max_restarts(1)
      .solve(&a, &IdentityPreconditioner, &rhs(n), None, |_, _| {});
    assert!(matches!(
      result,
      Err(KrylovError::NotConverged { restarts: 1, .. })
    ));
  }

  #[test]
  fn non_finite_operator_stops_at_once() {
    let n = 10;
    let op = FnOperator::new(n, |x: &Vector| x.map(|_| f64::NAN));
    let result = Lgmres::new(1e-8, 5).solve(&op, &IdentityPreconditioner, &rhs(n), None, |_, _| {});
    assert!(matches!(
      result,
      Err(KrylovError::NotConverged { restarts: 0, .. })
    ));
    assert_eq!(op.nevals(), 1);
  }

  #[test]
  fn non_finite_cycle_stops_at_once() {
    let n = 10;
    let inner_m = 5;
    let a = convection_diffusion(n);
    let calls = Cell::new(0);
    // finite for the initial residual and the first Arnoldi step only
    let op = FnOperator::new(n, |x: &Vector| {
      calls.set(calls.get() + 1);
      if calls.get() > 2 {
        x.map(|_| f64::NAN)
      } else {
        &a * x
      }
    });
    let result =
      Lgmres::new(1e-8, inner_m).solve(&op, &IdentityPreconditioner, &rhs(n), None, |_, _| {});
    assert!(matches!(
      result,
      Err(KrylovError::NotConverged { restarts: 0, .. })
    ));
    assert!(op.nevals() <= inner_m + 1, "{} evaluations", op.nevals());
  }

  #[test]
  fn wrong_rhs_length_is_rejected() {
    let a = convection_diffusion(4);
    let b = Vector::zeros(5);
    let result = Lgmres::new(1e-10, 4).solve(&a, &IdentityPreconditioner, &b, None, |_, _| {});
    assert!(matches!(
      result,
      Err(KrylovError::DimensionMismatch { operator: 4, rhs: 5 })
    ));
  }
}
