use thiserror::Error;


/// Everything that can go wrong in this crate.

#[derive(Debug, Error)]
pub enum Error {
  #[error("Input sequence is empty")]
  EmptyInput,

  #[error("Shape mismatch: expected {expected}, found {found}")]
  ShapeMismatch {
    expected: String,
    found: String,
  },

  #[error("Label {label} is out of range for {classes} classes")]
  LabelOutOfRange {
    label: u64,
    classes: usize,
  },

  #[error("Unknown activation '{0}'")]
  UnknownActivation(String),

  #[error("Malformed npy file: {0}")]
  Npy(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn shape(expected: impl std::fmt::Display, found: impl std::fmt::Display) -> Self {
    Self::ShapeMismatch {
      expected: expected.to_string(),
      found: found.to_string(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
