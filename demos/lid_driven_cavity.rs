//! Lid driven cavity at Re = 100 compared against the centreline profile of
//! Ghia, Ghia & Shin (1982).

extern crate nalgebra as na;

use semflow::{
  diagnostics::DiagnosticSet,
  navier_stokes::{EdgeVelocities, NavierStokesParams, NavierStokesSolver},
};

fn main() {
  tracing_subscriber::fmt::init();

  let params = NavierStokesParams::default()
    .with_reynolds(100.0)
    .with_discretization(8, 4, 4)
    .with_edges(EdgeVelocities {
      u_north: 1.0,
      ..Default::default()
    })
    .with_diagnostics(DiagnosticSet::all());
  let solver = NavierStokesSolver::new(params).unwrap();
  println!("ndofs = {}", solver.ndofs());

  #[rustfmt::skip]
  let ghia = [
    (0.0000, 0.00000), (0.0547, -0.03717), (0.1016, -0.06434),
    (0.1719, -0.10150), (0.2813, -0.15662), (0.4531, -0.21090),
    (0.5000, -0.20581), (0.6172, -0.13641), (0.7344, 0.00332),
    (0.8516, 0.23151), (0.9531, 0.68717), (1.0000, 1.00000),
  ];
  let points = na::Matrix2xX::from_columns(
    &ghia
      .iter()
      .map(|&(y, _)| na::Vector2::new(0.5, y))
      .collect::<Vec<_>>(),
  );

  let sampled = solver.run(|_, _| 0.0, &points).unwrap();
  println!("converged in {} newton iterations", sampled.newton_iterations);

  print_seperator();
  println!("| {:>6} | {:>10} | {:>10} | {:>9} |", "y", "u", "Ghia", "error");
  print_seperator();
  for (&(y, expected), &u) in ghia.iter().zip(sampled.u.iter()) {
    println!(
      "| {:>6.4} | {:>10.5} | {:>10.5} | {:>9.2e} |",
      y,
      u,
      expected,
      (u - expected).abs()
    );
  }
  print_seperator();
}

fn print_seperator() {
  println!("{}", "-".repeat(48));
}
