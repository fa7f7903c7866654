//! Opt-in progress reporting.
//!
//! Every topic only gates a `tracing` event. Enabling or disabling topics
//! never changes what the solver computes.

use indexmap::IndexSet;

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
  /// Timing and size of the velocity LU factorization.
  LuSuccess,
  /// True residual after every LGMRES restart.
  LgmresIteration,
  /// Summary of a converged LGMRES solve.
  LgmresSuccess,
  /// Residual norm at every Newton iteration.
  NewtonIteration,
  /// Summary of a converged Newton solve.
  NewtonSuccess,
}

impl Diagnostic {
  pub const ALL: [Self; 5] = [
    Self::LuSuccess,
    Self::LgmresIteration,
    Self::LgmresSuccess,
    Self::NewtonIteration,
    Self::NewtonSuccess,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::LuSuccess => "LU_suc",
      Self::LgmresIteration => "LGMRES_iter",
      Self::LgmresSuccess => "LGMRES_suc",
      Self::NewtonIteration => "NEWTON_iter",
      Self::NewtonSuccess => "NEWTON_suc",
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnostic topic `{0}`")]
pub struct UnknownDiagnostic(pub String);

impl FromStr for Diagnostic {
  type Err = UnknownDiagnostic;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|d| d.name() == s)
      .ok_or_else(|| UnknownDiagnostic(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSet(IndexSet<Diagnostic>);

impl DiagnosticSet {
  pub fn none() -> Self {
    Self(IndexSet::new())
  }
  pub fn all() -> Self {
    Self(Diagnostic::ALL.into_iter().collect())
  }

  /// Parses topic names such as `["LU_suc", "NEWTON_iter"]`.
  pub fn parse<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, UnknownDiagnostic> {
    names
      .into_iter()
      .map(str::parse)
      .collect::<Result<IndexSet<_>, _>>()
      .map(Self)
  }

  pub fn with(mut self, topic: Diagnostic) -> Self {
    self.0.insert(topic);
    self
  }

  pub fn contains(&self, topic: Diagnostic) -> bool {
    self.0.contains(&topic)
  }

  pub fn iter(&self) -> impl Iterator<Item = Diagnostic> + '_ {
    self.0.iter().copied()
  }
}

impl Default for DiagnosticSet {
  fn default() -> Self {
    Self::none()
      .with(Diagnostic::NewtonSuccess)
      .with(Diagnostic::NewtonIteration)
  }
}

impl FromIterator<Diagnostic> for DiagnosticSet {
  fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

#[cfg(test)]
mod test {
  use super::{Diagnostic, DiagnosticSet};

  #[test]
  fn parse_topic_names() {
    let set = DiagnosticSet::parse(["LU_suc", "LGMRES_suc"]).unwrap();
    assert!(set.contains(Diagnostic::LuSuccess));
    assert!(set.contains(Diagnostic::LgmresSuccess));
    assert!(!set.contains(Diagnostic::NewtonIteration));

    assert!(DiagnosticSet::parse(["LU_success"]).is_err());
  }

  #[test]
  fn default_is_newton_only() {
    let set = DiagnosticSet::default();
    let topics: Vec<_> = set.iter().collect();
    assert_eq!(
      topics,
      vec![Diagnostic::NewtonSuccess, Diagnostic::NewtonIteration]
    );
  }
}
