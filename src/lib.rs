//! Steady incompressible Navier-Stokes with Boussinesq buoyancy on a rectangle,
//! discretized with tensor-product spectral elements and solved by Newton's
//! method with a segregated velocity-pressure linear solve.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod bilinear;
pub mod diagnostics;
pub mod error;
pub mod krylov;
pub mod linalg;
pub mod navier_stokes;
pub mod operators;
pub mod sem;
pub mod util;

pub use error::{Error, Result};

pub type DofIdx = usize;
