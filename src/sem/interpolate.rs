use super::space::SpectralElementSpace;
use crate::linalg::Vector;

use itertools::iproduct;

/// Element-local coefficient vectors in local node order.
pub fn scatter(space: &SpectralElementSpace, global: &Vector) -> Vec<Vector> {
  let dofh = space.dof_handler();
  (0..dofh.nelems())
    .map(|ielem| {
      let dofs = dofh.local2global(ielem);
      Vector::from_iterator(dofs.len(), dofs.iter().map(|&i| global[i]))
    })
    .collect()
}

/// Element containing coordinate `x` along `axis` and the matching
/// reference coordinate in $[-1, 1]$. Points outside the domain are clamped
/// to the nearest element.
fn locate(space: &SpectralElementSpace, axis: usize, x: f64) -> (usize, f64) {
  let h = space.grid().elem_size()[axis];
  let nelems = space.grid().nelems()[axis];
  let ielem = ((x / h).floor().max(0.0) as usize).min(nelems - 1);
  let origin = ielem as f64 * h;
  let xi = 2.0 * (x - origin) / h - 1.0;
  (ielem, xi)
}

/// Evaluates the discrete field at every column of `points`.
pub fn interpolate(
  space: &SpectralElementSpace,
  coeffs: &Vector,
  points: &na::Matrix2xX<f64>,
) -> Vector {
  assert_eq!(coeffs.len(), space.ndofs());
  let n1 = space.reference().nnodes();
  let nelems_x = space.grid().nelems()[0];
  let local = scatter(space, coeffs);

  Vector::from_iterator(
    points.ncols(),
    points.column_iter().map(|p| {
      let (ex, xi) = locate(space, 0, p[0]);
      let (ey, eta) = locate(space, 1, p[1]);
      let lx = space.reference().basis_at(xi);
      let ly = space.reference().basis_at(eta);
      let elem = &local[ey * nelems_x + ex];

      iproduct!(0..n1, 0..n1)
        .map(|(b, a)| elem[b * n1 + a] * lx[a] * ly[b])
        .sum::<f64>()
    }),
  )
}
