//! Continuous tensor-product spectral elements on a rectangle.

pub mod assemble;
pub mod gll;
pub mod interpolate;
pub mod space;

pub use space::{DofHandler, RectGrid, SpectralElementSpace};

use crate::{
  linalg::Vector,
  operators::{GlobalOperators, OperatorProvider},
};

impl OperatorProvider for SpectralElementSpace {
  fn ndofs(&self) -> usize {
    SpectralElementSpace::ndofs(self)
  }
  fn global_nodes(&self) -> na::Matrix2xX<f64> {
    SpectralElementSpace::global_nodes(self)
  }
  fn assemble_operators(&self) -> GlobalOperators {
    assemble::assemble_operators(self)
  }
  fn interpolate(&self, coeffs: &Vector, points: &na::Matrix2xX<f64>) -> Vector {
    interpolate::interpolate(self, coeffs, points)
  }
}
