//! Gauss-Lobatto-Legendre nodal basis on the reference interval $[-1, 1]$.

use std::f64::consts::PI;

/// Legendre polynomial $P_n$ and its derivative, by three-term recurrence.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
  if n == 0 {
    return (1.0, 0.0);
  }
  let (mut p_prev, mut p) = (1.0, x);
  let (mut dp_prev, mut dp) = (0.0, 1.0);
  for k in 1..n {
    let k = k as f64;
    let p_next = ((2.0 * k + 1.0) * x * p - k * p_prev) / (k + 1.0);
    let dp_next = dp_prev + (2.0 * k + 1.0) * p;
    (p_prev, p) = (p, p_next);
    (dp_prev, dp) = (dp, dp_next);
  }
  (p, dp)
}

/// The `order + 1` roots of $(1 - x^2) P'_N(x)$ in increasing order.
pub fn gll_nodes(order: usize) -> Vec<f64> {
  assert!(order >= 1, "GLL nodes need polynomial order >= 1");
  let n = order;
  let nn1 = (n * (n + 1)) as f64;

  // chebyshev-lobatto initial guess
  let mut nodes: Vec<f64> = (0..=n)
    .map(|j| -(PI * j as f64 / n as f64).cos())
    .collect();
  nodes[0] = -1.0;
  nodes[n] = 1.0;

  for x in nodes.iter_mut().take(n).skip(1) {
    for _ in 0..100 {
      let (p, dp) = legendre_and_derivative(n, *x);
      let update = (1.0 - *x * *x) * dp / (nn1 * p);
      *x += update;
      if update.abs() < 1e-15 {
        break;
      }
    }
  }
  nodes
}

/// $w_j = 2 / (N (N + 1) P_N(x_j)^2)$
pub fn gll_weights(nodes: &[f64]) -> Vec<f64> {
  let n = nodes.len() - 1;
  let nn1 = (n * (n + 1)) as f64;
  nodes
    .iter()
    .map(|&x| {
      let (p, _) = legendre_and_derivative(n, x);
      2.0 / (nn1 * p * p)
    })
    .collect()
}

fn barycentric_weights(nodes: &[f64]) -> Vec<f64> {
  (0..nodes.len())
    .map(|j| {
      let prod: f64 = (0..nodes.len())
        .filter(|&k| k != j)
        .map(|k| nodes[j] - nodes[k])
        .product();
      1.0 / prod
    })
    .collect()
}

/// $D_(i j) = l'_j (x_i)$ for the Lagrange basis $l_j$ on `nodes`.
///
/// The diagonal is the negative off-diagonal row sum, so constants are
/// differentiated to exactly zero.
pub fn lagrange_derivative_matrix(nodes: &[f64]) -> na::DMatrix<f64> {
  let n = nodes.len();
  let bary = barycentric_weights(nodes);
  let mut d = na::DMatrix::zeros(n, n);
  for i in 0..n {
    let mut diag = 0.0;
    for j in (0..n).filter(|&j| j != i) {
      let v = bary[j] / bary[i] / (nodes[i] - nodes[j]);
      d[(i, j)] = v;
      diag -= v;
    }
    d[(i, i)] = diag;
  }
  d
}

/// All Lagrange basis functions on `nodes` evaluated at `x`.
pub fn lagrange_basis(nodes: &[f64], x: f64) -> na::DVector<f64> {
  na::DVector::from_fn(nodes.len(), |j, _| {
    (0..nodes.len())
      .filter(|&k| k != j)
      .map(|k| (x - nodes[k]) / (nodes[j] - nodes[k]))
      .product()
  })
}

/// Nodes, weights and differentiation matrix of one polynomial order.
#[derive(Debug, Clone)]
pub struct ReferenceInterval {
  nodes: Vec<f64>,
  weights: Vec<f64>,
  derivative: na::DMatrix<f64>,
}

impl ReferenceInterval {
  pub fn new(order: usize) -> Self {
    let nodes = gll_nodes(order);
    let weights = gll_weights(&nodes);
    let derivative = lagrange_derivative_matrix(&nodes);
    Self {
      nodes,
      weights,
      derivative,
    }
  }

  pub fn order(&self) -> usize {
    self.nodes.len() - 1
  }
  pub fn nnodes(&self) -> usize {
    self.nodes.len()
  }
  pub fn nodes(&self) -> &[f64] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
  pub fn derivative(&self) -> &na::DMatrix<f64> {
    &self.derivative
  }
  pub fn basis_at(&self, x: f64) -> na::DVector<f64> {
    lagrange_basis(&self.nodes, x)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn nodes_contain_endpoints_and_are_symmetric() {
    for order in 1..=8 {
      let nodes = gll_nodes(order);
      assert_eq!(nodes.len(), order + 1);
      assert_eq!(nodes[0], -1.0);
      assert_eq!(nodes[order], 1.0);
      for i in 0..=order {
        assert!((nodes[i] + nodes[order - i]).abs() < 1e-14);
      }
      for j in 1..order {
        let (_, dp) = legendre_and_derivative(order, nodes[j]);
        assert!(dp.abs() < 1e-11, "interior node {j} is no root of P'_{order}");
      }
    }
  }

  #[test]
  fn known_order_two_rule() {
    let nodes = gll_nodes(2);
    let weights = gll_weights(&nodes);
    assert!(nodes[1].abs() < 1e-15);
    let expected = [1.0 / 3.0, 4.0 / 3.0, 1.0 / 3.0];
    for (w, e) in weights.iter().zip(expected) {
      assert!((w - e).abs() < 1e-14);
    }
  }

  /// GLL quadrature with N+1 nodes integrates polynomials of degree 2N-1 exactly.
  #[test]
  fn quadrature_exactness() {
    for order in 1..=7 {
      let nodes = gll_nodes(order);
      let weights = gll_weights(&nodes);
      for degree in 0..=(2 * order - 1) {
        let quad: f64 = nodes
          .iter()
          .zip(&weights)
          .map(|(x, w)| w * x.powi(degree as i32))
          .sum();
        let exact = if degree % 2 == 0 {
          2.0 / (degree + 1) as f64
        } else {
          0.0
        };
        assert!(
          (quad - exact).abs() < 1e-13,
          "order={order} degree={degree}: {quad} vs {exact}"
        );
      }
    }
  }

  #[test]
  fn derivative_matrix_is_exact_on_polynomials() {
    for order in 1..=8 {
      let reference = ReferenceInterval::new(order);
      let x = na::DVector::from_row_slice(reference.nodes());
      let f = x.map(|x| x.powi(order as i32));
      let df_exact = x.map(|x| order as f64 * x.powi(order as i32 - 1));
      let df = reference.derivative() * &f;
      assert!((df - df_exact).amax() < 1e-11, "order={order}");

      let ones = na::DVector::from_element(order + 1, 1.0);
      assert!((reference.derivative() * ones).amax() < 1e-12);
    }
  }

  #[test]
  fn lagrange_basis_is_cardinal_and_partitions_unity() {
    let reference = ReferenceInterval::new(5);
    for (i, &x) in reference.nodes().iter().enumerate() {
      let basis = reference.basis_at(x);
      for (j, &b) in basis.iter().enumerate() {
        let expected = if i == j { 1.0 } else { 0.0 };
        assert!((b - expected).abs() < 1e-14);
      }
    }
    let basis = reference.basis_at(0.123);
    assert!((basis.sum() - 1.0).abs() < 1e-13);
  }
}
