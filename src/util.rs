pub fn indicies_to_flags(indicies: &[usize], len: usize) -> Vec<bool> {
  let mut flags = vec![false; len];
  indicies.iter().for_each(|&i| flags[i] = true);
  flags
}

pub fn flags_to_indicies(flags: &[bool]) -> Vec<usize> {
  flags
    .iter()
    .enumerate()
    .filter_map(|(i, &flag)| flag.then_some(i))
    .collect()
}

/// $abs(a - b) <= "atol" + "rtol" abs(b)$ with `atol = 1e-8`, `rtol = 1e-5`.
pub fn is_close(a: f64, b: f64) -> bool {
  const RTOL: f64 = 1e-5;
  const ATOL: f64 = 1e-8;
  (a - b).abs() <= ATOL + RTOL * b.abs()
}

pub fn max_norm<'a>(vectors: impl IntoIterator<Item = &'a na::DVector<f64>>) -> f64 {
  vectors
    .into_iter()
    .map(|v| v.amax())
    .fold(0.0, f64::max)
}

pub fn stacked_norm<'a>(vectors: impl IntoIterator<Item = &'a na::DVector<f64>>) -> f64 {
  vectors
    .into_iter()
    .map(|v| v.norm_squared())
    .sum::<f64>()
    .sqrt()
}
