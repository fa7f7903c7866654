use super::gll::ReferenceInterval;
use crate::DofIdx;

use itertools::iproduct;

pub type ElementIdx = usize;

/// Axis-aligned rectangle $[0, L_x] times [0, L_y]$ split into a uniform
/// grid of `nelems_x * nelems_y` quadrilateral elements.
#[derive(Debug, Clone)]
pub struct RectGrid {
  lengths: [f64; 2],
  nelems: [usize; 2],
}

impl RectGrid {
  pub fn new(lengths: [f64; 2], nelems: [usize; 2]) -> Self {
    assert!(lengths.iter().all(|&l| l > 0.0));
    assert!(nelems.iter().all(|&n| n > 0));
    Self { lengths, nelems }
  }
  pub fn lengths(&self) -> [f64; 2] {
    self.lengths
  }
  pub fn nelems(&self) -> [usize; 2] {
    self.nelems
  }
  pub fn elem_size(&self) -> [f64; 2] {
    [
      self.lengths[0] / self.nelems[0] as f64,
      self.lengths[1] / self.nelems[1] as f64,
    ]
  }
  pub fn nelems_total(&self) -> usize {
    self.nelems[0] * self.nelems[1]
  }
}

/// Maps the element-local tensor-product nodes to global DOFs.
///
/// Element $(e_x, e_y)$ has linear index $e_y N_(e x) + e_x$, its local node
/// $(a, b)$ has linear index $b (P + 1) + a$.
#[derive(Debug, Clone)]
pub struct DofHandler {
  local2global_idx: Vec<Vec<DofIdx>>,
}
impl DofHandler {
  pub fn new(order: usize, nelems: [usize; 2]) -> Self {
    let nnodes_x = nelems[0] * order + 1;
    let local2global_idx = iproduct!(0..nelems[1], 0..nelems[0])
      .map(|(ey, ex)| {
        iproduct!(0..=order, 0..=order)
          .map(|(b, a)| (ey * order + b) * nnodes_x + ex * order + a)
          .collect()
      })
      .collect();
    Self { local2global_idx }
  }

  pub fn local2global(&self, ielem: ElementIdx) -> &[DofIdx] {
    &self.local2global_idx[ielem]
  }
  pub fn nelems(&self) -> usize {
    self.local2global_idx.len()
  }
}

/// Continuous nodal spectral-element space of polynomial order $P$ per
/// direction on a [`RectGrid`].
#[derive(Debug, Clone)]
pub struct SpectralElementSpace {
  grid: RectGrid,
  reference: ReferenceInterval,
  dof_handler: DofHandler,
}

impl SpectralElementSpace {
  pub fn new(order: usize, grid: RectGrid) -> Self {
    let reference = ReferenceInterval::new(order);
    let dof_handler = DofHandler::new(order, grid.nelems());
    Self {
      grid,
      reference,
      dof_handler,
    }
  }

  pub fn grid(&self) -> &RectGrid {
    &self.grid
  }
  pub fn reference(&self) -> &ReferenceInterval {
    &self.reference
  }
  pub fn dof_handler(&self) -> &DofHandler {
    &self.dof_handler
  }
  pub fn order(&self) -> usize {
    self.reference.order()
  }

  pub fn nnodes_axis(&self) -> [usize; 2] {
    let [nx, ny] = self.grid.nelems();
    [nx * self.order() + 1, ny * self.order() + 1]
  }
  /// $N = (N_(e x) P + 1)(N_(e y) P + 1)$
  pub fn ndofs(&self) -> usize {
    let [nx, ny] = self.nnodes_axis();
    nx * ny
  }

  /// Global node index of the node in column `ix` and row `iy`.
  pub fn node_idx(&self, ix: usize, iy: usize) -> DofIdx {
    iy * self.nnodes_axis()[0] + ix
  }

  /// Lower left corner of element `(ex, ey)`.
  pub fn elem_origin(&self, ex: usize, ey: usize) -> [f64; 2] {
    let [hx, hy] = self.grid.elem_size();
    [ex as f64 * hx, ey as f64 * hy]
  }

  fn axis_coords(&self, axis: usize) -> Vec<f64> {
    let h = self.grid.elem_size()[axis];
    let nelems = self.grid.nelems()[axis];
    let order = self.order();
    let mut coords = Vec::with_capacity(nelems * order + 1);
    for e in 0..nelems {
      let origin = e as f64 * h;
      let skip = if e == 0 { 0 } else { 1 };
      coords.extend(
        self
          .reference
          .nodes()
          .iter()
          .skip(skip)
          .map(|&xi| origin + (xi + 1.0) * h / 2.0),
      );
    }
    // snap the far edge so boundary detection does not depend on roundoff
    if let Some(last) = coords.last_mut() {
      *last = self.grid.lengths()[axis];
    }
    coords
  }

  /// Global node coordinates as `2 x N` matrix, one column per DOF.
  pub fn global_nodes(&self) -> na::Matrix2xX<f64> {
    let xs = self.axis_coords(0);
    let ys = self.axis_coords(1);
    let mut nodes = na::Matrix2xX::zeros(self.ndofs());
    for (iy, &y) in ys.iter().enumerate() {
      for (ix, &x) in xs.iter().enumerate() {
        let idof = self.node_idx(ix, iy);
        nodes[(0, idof)] = x;
        nodes[(1, idof)] = y;
      }
    }
    nodes
  }

  /// Node coordinates per element, as `2 x (P+1)^2` matrices in local order.
  pub fn element_nodes(&self) -> Vec<na::Matrix2xX<f64>> {
    let global = self.global_nodes();
    (0..self.dof_handler.nelems())
      .map(|ielem| {
        let dofs = self.dof_handler.local2global(ielem);
        na::Matrix2xX::from_fn(dofs.len(), |r, c| global[(r, dofs[c])])
      })
      .collect()
  }

  /// Samples `f(x, y)` at every global node.
  pub fn global_vector<F>(&self, f: F) -> na::DVector<f64>
  where
    F: Fn(f64, f64) -> f64,
  {
    let nodes = self.global_nodes();
    na::DVector::from_iterator(
      self.ndofs(),
      nodes.column_iter().map(|c| f(c[0], c[1])),
    )
  }
}
