use super::params::EdgeVelocities;
use crate::{linalg::Vector, util, DofIdx};

/// Dirichlet velocity data on all boundary nodes and the DOF whose pressure
/// is pinned to zero.
///
/// Every boundary node carries a value for both velocity components, so
/// one mask serves `u` and `v`.
#[derive(Debug, Clone)]
pub struct BoundaryConditions {
  mask: Vec<bool>,
  dofs: Vec<DofIdx>,
  u: Vector,
  v: Vector,
  reference_dof: DofIdx,
}

impl BoundaryConditions {
  /// Detects the edges of $[0, L_x] times [0, L_y]$ on the node coordinates.
  /// South and north values take precedence in the corners.
  pub fn from_nodes(nodes: &na::Matrix2xX<f64>, lengths: [f64; 2], edges: &EdgeVelocities) -> Self {
    let ndofs = nodes.ncols();
    let mut u = vec![None; ndofs];
    let mut v = vec![None; ndofs];

    for (idof, coord) in nodes.column_iter().enumerate() {
      let (x, y) = (coord[0], coord[1]);
      if util::is_close(x, 0.0) {
        u[idof] = Some(0.0);
        v[idof] = Some(edges.v_west);
      }
      if util::is_close(x, lengths[0]) {
        u[idof] = Some(0.0);
        v[idof] = Some(edges.v_east);
      }
      if util::is_close(y, 0.0) {
        u[idof] = Some(edges.u_south);
        v[idof] = Some(0.0);
      }
      if util::is_close(y, lengths[1]) {
        u[idof] = Some(edges.u_north);
        v[idof] = Some(0.0);
      }
    }

    let mask: Vec<bool> = u.iter().map(Option::is_some).collect();
    Self {
      dofs: util::flags_to_indicies(&mask),
      mask,
      u: Vector::from_iterator(ndofs, u.into_iter().map(|u| u.unwrap_or(0.0))),
      v: Vector::from_iterator(ndofs, v.into_iter().map(|v| v.unwrap_or(0.0))),
      reference_dof: ndofs / 2,
    }
  }

  pub fn ndofs(&self) -> usize {
    self.mask.len()
  }
  pub fn mask(&self) -> &[bool] {
    &self.mask
  }
  pub fn dofs(&self) -> &[DofIdx] {
    &self.dofs
  }
  pub fn is_boundary(&self, idof: DofIdx) -> bool {
    self.mask[idof]
  }
  /// Dirichlet values of `u`, zero away from the boundary.
  pub fn u_values(&self) -> &Vector {
    &self.u
  }
  /// Dirichlet values of `v`, zero away from the boundary.
  pub fn v_values(&self) -> &Vector {
    &self.v
  }
  pub fn reference_dof(&self) -> DofIdx {
    self.reference_dof
  }

  /// Mask over the stacked `(u, v)` space.
  pub fn velocity_mask(&self) -> Vec<bool> {
    let n = self.ndofs();
    let stacked: Vec<_> = self.dofs.iter().flat_map(|&i| [i, n + i]).collect();
    util::indicies_to_flags(&stacked, 2 * n)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::sem::{RectGrid, SpectralElementSpace};

  fn edges() -> EdgeVelocities {
    EdgeVelocities {
      v_west: 2.0,
      v_east: 3.0,
      u_south: 4.0,
      u_north: 5.0,
    }
  }

  #[test]
  fn edges_and_corners() {
    let space = SpectralElementSpace::new(2, RectGrid::new([2.0, 1.0], [2, 2]));
    let bc = BoundaryConditions::from_nodes(&space.global_nodes(), [2.0, 1.0], &edges());
    let [nx, ny] = space.nnodes_axis();

    assert_eq!(bc.dofs().len(), 2 * nx + 2 * ny - 4);
    assert_eq!(bc.reference_dof(), space.ndofs() / 2);
    assert!(!bc.is_boundary(bc.reference_dof()));

    let west = space.node_idx(0, 2);
    assert_eq!((bc.u_values()[west], bc.v_values()[west]), (0.0, 2.0));
    let east = space.node_idx(nx - 1, 1);
    assert_eq!((bc.u_values()[east], bc.v_values()[east]), (0.0, 3.0));
    let south = space.node_idx(3, 0);
    assert_eq!((bc.u_values()[south], bc.v_values()[south]), (4.0, 0.0));

    let north_west = space.node_idx(0, ny - 1);
    assert_eq!((bc.u_values()[north_west], bc.v_values()[north_west]), (5.0, 0.0));
    let south_east = space.node_idx(nx - 1, 0);
    assert_eq!((bc.u_values()[south_east], bc.v_values()[south_east]), (4.0, 0.0));

    let interior = space.node_idx(1, 1);
    assert!(!bc.is_boundary(interior));
  }

  #[test]
  fn velocity_mask_repeats_boundary() {
    let space = SpectralElementSpace::new(2, RectGrid::new([1.0, 1.0], [1, 1]));
    let bc = BoundaryConditions::from_nodes(&space.global_nodes(), [1.0, 1.0], &edges());
    let mask = bc.velocity_mask();
    assert_eq!(mask.len(), 18);
    assert_eq!(mask.iter().filter(|&&b| b).count(), 16);
    assert!(!mask[4] && !mask[13]);
  }
}
