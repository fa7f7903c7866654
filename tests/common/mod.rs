#![allow(dead_code)]

use semflow::{
  linalg::Vector,
  navier_stokes::{EdgeVelocities, NavierStokesParams, Residuals},
};

/// Deterministic, well spread values in $[-1, 1]$.
pub fn pseudo_random(n: usize, seed: f64) -> Vector {
  Vector::from_fn(n, |i, _| ((i as f64 + 1.0) * seed).sin() * ((i as f64) * 0.37 + seed).cos())
}

pub fn lid_driven(reynolds: f64, order: usize, nelems: usize) -> NavierStokesParams {
  NavierStokesParams::default()
    .with_reynolds(reynolds)
    .with_discretization(order, nelems, nelems)
    .with_edges(EdgeVelocities {
      u_north: 1.0,
      ..Default::default()
    })
}

pub fn residual_diff(a: &Residuals, b: &Residuals) -> Residuals {
  Residuals {
    u: &a.u - &b.u,
    v: &a.v - &b.v,
    cont: &a.cont - &b.cont,
  }
}

pub fn scaled(r: &Residuals, s: f64) -> Residuals {
  Residuals {
    u: s * &r.u,
    v: s * &r.v,
    cont: s * &r.cont,
  }
}
