//! Element matrices under GLL collocation quadrature and their assembly.

use super::{gll::ReferenceInterval, space::SpectralElementSpace};
use crate::{
  bilinear::BilinearOperator,
  linalg::CsrMatrix,
  operators::GlobalOperators,
};

pub type ElMat = na::DMatrix<f64>;

/// Quadrature data of one element of size `hx * hy`.
struct ElementGeometry<'a> {
  reference: &'a ReferenceInterval,
  /// Jacobian determinant of the map from the reference square.
  jacobian: f64,
  /// $2 / h$ per direction.
  scale: [f64; 2],
}

impl<'a> ElementGeometry<'a> {
  fn new(reference: &'a ReferenceInterval, elem_size: [f64; 2]) -> Self {
    let [hx, hy] = elem_size;
    Self {
      reference,
      jacobian: hx * hy / 4.0,
      scale: [2.0 / hx, 2.0 / hy],
    }
  }

  fn n1(&self) -> usize {
    self.reference.nnodes()
  }
  fn local(&self, a: usize, b: usize) -> usize {
    b * self.n1() + a
  }
  fn quad_weight(&self, a: usize, b: usize) -> f64 {
    let w = self.reference.weights();
    w[a] * w[b] * self.jacobian
  }
}

/// Diagonal mass matrix $integral phi_i phi_j$.
pub fn mass_elmat(reference: &ReferenceInterval, elem_size: [f64; 2]) -> ElMat {
  let geo = ElementGeometry::new(reference, elem_size);
  let n1 = geo.n1();
  let mut elmat = ElMat::zeros(n1 * n1, n1 * n1);
  for b in 0..n1 {
    for a in 0..n1 {
      let i = geo.local(a, b);
      elmat[(i, i)] = geo.quad_weight(a, b);
    }
  }
  elmat
}

/// Stiffness matrix $integral nabla phi_i dot nabla phi_j$.
pub fn stiffness_elmat(reference: &ReferenceInterval, elem_size: [f64; 2]) -> ElMat {
  let geo = ElementGeometry::new(reference, elem_size);
  let n1 = geo.n1();
  let d = reference.derivative();
  let w = reference.weights();

  // 1D reference stiffness $sum_e w_e D_(e a) D_(e c)$
  let stiff1d = ElMat::from_fn(n1, n1, |a, c| (0..n1).map(|e| w[e] * d[(e, a)] * d[(e, c)]).sum());

  let [sx, sy] = geo.scale;
  let mut elmat = ElMat::zeros(n1 * n1, n1 * n1);
  for b in 0..n1 {
    for a in 0..n1 {
      let i = geo.local(a, b);
      for c in 0..n1 {
        elmat[(i, geo.local(c, b))] += geo.jacobian * sx * sx * w[b] * stiff1d[(a, c)];
        elmat[(i, geo.local(a, c))] += geo.jacobian * sy * sy * w[a] * stiff1d[(b, c)];
      }
    }
  }
  elmat
}

/// Gradient matrices $integral phi_i partial_x phi_j$ and $integral phi_i partial_y phi_j$.
pub fn gradient_elmats(reference: &ReferenceInterval, elem_size: [f64; 2]) -> [ElMat; 2] {
  let geo = ElementGeometry::new(reference, elem_size);
  let n1 = geo.n1();
  let d = reference.derivative();
  let [sx, sy] = geo.scale;

  let mut grad_x = ElMat::zeros(n1 * n1, n1 * n1);
  let mut grad_y = ElMat::zeros(n1 * n1, n1 * n1);
  for b in 0..n1 {
    for a in 0..n1 {
      let i = geo.local(a, b);
      let weight = geo.quad_weight(a, b);
      for c in 0..n1 {
        grad_x[(i, geo.local(c, b))] = weight * sx * d[(a, c)];
        grad_y[(i, geo.local(a, c))] = weight * sy * d[(b, c)];
      }
    }
  }
  [grad_x, grad_y]
}

/// Assembly algorithm for the Galerkin matrix of an elementwise constant element matrix.
pub fn assemble_galmat(space: &SpectralElementSpace, elmat: &ElMat) -> CsrMatrix {
  let ndofs = space.ndofs();
  let dofh = space.dof_handler();
  let mut galmat = nas::CooMatrix::new(ndofs, ndofs);
  for ielem in 0..dofh.nelems() {
    let dofs = dofh.local2global(ielem);
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      for (jlocal, &jglobal) in dofs.iter().enumerate() {
        let val = elmat[(ilocal, jlocal)];
        if val != 0.0 {
          galmat.push(iglobal, jglobal, val);
        }
      }
    }
  }
  CsrMatrix::from(&galmat)
}

/// Convection tensor $integral phi_i phi_j partial phi_k$.
///
/// Under collocation the product $phi_i phi_j$ only survives at quadrature
/// node $i = j$, so the tensor inherits the pattern of the gradient matrix.
pub fn assemble_convection(space: &SpectralElementSpace, grad_elmat: &ElMat) -> BilinearOperator {
  let dofh = space.dof_handler();
  let mut conv = BilinearOperator::zeros(space.ndofs());
  for ielem in 0..dofh.nelems() {
    let dofs = dofh.local2global(ielem);
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      for (klocal, &kglobal) in dofs.iter().enumerate() {
        conv.push(iglobal, iglobal, kglobal, grad_elmat[(ilocal, klocal)]);
      }
    }
  }
  conv
}

pub fn assemble_operators(space: &SpectralElementSpace) -> GlobalOperators {
  let reference = space.reference();
  let elem_size = space.grid().elem_size();

  let mass = assemble_galmat(space, &mass_elmat(reference, elem_size));
  let stiffness = assemble_galmat(space, &stiffness_elmat(reference, elem_size));
  let [grad_x_elmat, grad_y_elmat] = gradient_elmats(reference, elem_size);

  tracing::debug!(
    "assembled spectral element operators: ndofs={}, nelems={}",
    space.ndofs(),
    space.dof_handler().nelems()
  );

  GlobalOperators {
    mass,
    stiffness,
    grad_x: assemble_galmat(space, &grad_x_elmat),
    grad_y: assemble_galmat(space, &grad_y_elmat),
    conv_x: assemble_convection(space, &grad_x_elmat),
    conv_y: assemble_convection(space, &grad_y_elmat),
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::sem::space::RectGrid;

  fn space() -> SpectralElementSpace {
    SpectralElementSpace::new(4, RectGrid::new([2.0, 1.5], [3, 2]))
  }

  #[test]
  fn mass_integrates_area() {
    let ops = assemble_operators(&space());
    let area: f64 = ops.mass.values().iter().sum();
    assert!((area - 3.0).abs() < 1e-12);
    assert!(ops.is_conformal());
  }

  #[test]
  fn stiffness_is_symmetric_and_annihilates_constants() {
    let space = space();
    let ops = assemble_operators(&space);
    let ones = na::DVector::from_element(space.ndofs(), 1.0);
    assert!((&ops.stiffness * &ones).amax() < 1e-11);

    let dense = na::DMatrix::from(&ops.stiffness);
    assert!((&dense - dense.transpose()).amax() < 1e-11);
  }

  /// $integral nabla phi_i dot nabla x^2 = -integral phi_i 2$ away from the boundary.
  #[test]
  fn stiffness_reproduces_laplacian() {
    let space = space();
    let ops = assemble_operators(&space);
    let f = space.global_vector(|x, y| x * x + 3.0 * y * y);
    let kf = &ops.stiffness * &f;
    let mf = -8.0 * ops.mass_diagonal();

    let [nx, ny] = space.nnodes_axis();
    for iy in 1..ny - 1 {
      for ix in 1..nx - 1 {
        let i = space.node_idx(ix, iy);
        assert!((kf[i] - mf[i]).abs() < 1e-10, "node {i}");
      }
    }
  }

  #[test]
  fn gradients_of_linear_functions() {
    let space = space();
    let ops = assemble_operators(&space);
    let x = space.global_vector(|x, _| x);
    let y = space.global_vector(|_, y| y);
    let m = ops.mass_diagonal();

    assert!((&ops.grad_x * &x - &m).amax() < 1e-12);
    assert!((&ops.grad_y * &y - &m).amax() < 1e-12);
    assert!((&ops.grad_x * &y).amax() < 1e-12);
    assert!((&ops.grad_y * &x).amax() < 1e-12);
  }

  #[test]
  fn convection_of_linear_fields() {
    let space = space();
    let ops = assemble_operators(&space);
    let a = space.global_vector(|x, y| 1.0 + x * y);
    let x = space.global_vector(|x, _| x);
    let m = ops.mass_diagonal();

    // $integral phi_i a partial_x x = a_i m_i$
    let conv = ops.conv_x.apply(&a, &x);
    assert!((conv - a.component_mul(&m)).amax() < 1e-12);

    let frozen = ops.conv_y.freeze_first(&a, 1.0);
    let y = space.global_vector(|_, y| y);
    assert!((&frozen * &y - a.component_mul(&m)).amax() < 1e-12);
  }
}
