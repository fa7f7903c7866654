//! Buoyancy driven flow in a closed box with a linear temperature profile
//! between a hot west wall and a cold east wall.

extern crate nalgebra as na;

use semflow::{
  diagnostics::{Diagnostic, DiagnosticSet},
  navier_stokes::{NavierStokesParams, NavierStokesSolver},
};

fn main() {
  tracing_subscriber::fmt::init();

  let lx = 2.0;
  let ly = 1.0;
  let params = NavierStokesParams::default()
    .with_lengths(lx, ly)
    .with_reynolds(1.0)
    .with_grashof(1000.0)
    .with_discretization(6, 6, 3)
    .with_diagnostics(DiagnosticSet::default().with(Diagnostic::LgmresSuccess));
  let solver = NavierStokesSolver::new(params).unwrap();

  let temperature = |x: f64, _: f64| 1.0 - x / lx;

  let npoints = 9;
  let points = na::Matrix2xX::from_fn(npoints, |i, j| match i {
    0 => lx * (j as f64 + 0.5) / npoints as f64,
    _ => 0.5 * ly,
  });

  let sampled = solver.run(temperature, &points).unwrap();
  println!("converged in {} newton iterations", sampled.newton_iterations);
  println!("{:>6} {:>12} {:>12} {:>12}", "x", "u", "v", "p");
  for (j, point) in points.column_iter().enumerate() {
    println!(
      "{:>6.3} {:>12.4e} {:>12.4e} {:>12.4e}",
      point[0], sampled.u[j], sampled.v[j], sampled.p[j]
    );
  }
}
