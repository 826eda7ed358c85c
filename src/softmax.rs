//! The softmax transform, turning a vector of logits into a probability
//! distribution over the same index set.
//!
//! There are two ways to use it, and they must not be mixed up:
//!
//! - **Display**: [softmax] applies the textbook formula
//!   `a[j] = exp(z[j]) / sum_k exp(z[k])` and is meant for showing
//!   predictions to a human. For logits beyond roughly 88 (`f32`) or 709
//!   (`f64`) the exponential overflows and the result turns into NaN.
//!
//! - **Training**: a loss should never be computed from the output of
//!   [softmax]. Feed the raw logits to a loss that fuses the normalisation
//!   into its own log-sum-exp, such as
//!   [sparse_categorical_crossentropy](crate::loss::sparse_categorical_crossentropy)
//!   with `from_logits` enabled. [softmax_stable] and [log_softmax] are the
//!   overflow-free building blocks for that path.
//!
//! ```
//! use digitnet::softmax::{ softmax, argmax };
//!
//! let a = softmax(&[1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert!((a.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! assert_eq!(argmax(&a).unwrap(), 3);
//! ```

use log::warn;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
  error::{ Error, Result },
  scalar::Real,
  tensor::Tensor,
};


/// Normalised exponentials of `z`, computed directly.
///
/// Returns [Error::EmptyInput] for an empty slice. Overflow for very large
/// logits is not an error: the NaN it produces is returned as is.

pub fn softmax<R: Real>(z: &[R]) -> Result<Vec<R>> {
  if z.is_empty() { return Err(Error::EmptyInput) }
  let e: Vec<R> = z.iter().map(|v| v.exp() ).collect();
  let sum: R = e.iter().copied().sum();
  let a: Vec<R> = e.into_iter().map(|v| v / sum ).collect();
  if a.iter().any(|v| !v.is_finite() ) {
    warn!("softmax produced non-finite probabilities; use the stable variant for large logits");
  }
  Ok(a)
}

/// Same distribution as [softmax], with the maximum subtracted from every
/// logit before exponentiating so that no term exceeds one.

pub fn softmax_stable<R: Real>(z: &[R]) -> Result<Vec<R>> {
  let max = greatest(z)?;
  let e: Vec<R> = z.iter().map(|&v| (v - max).exp() ).collect();
  let sum: R = e.iter().copied().sum();
  Ok(e.into_iter().map(|v| v / sum ).collect())
}

/// `ln(softmax(z))`, computed as `z - logsumexp(z)` without ever
/// materialising the probabilities.

pub fn log_softmax<R: Real>(z: &[R]) -> Result<Vec<R>> {
  let lse = logsumexp(z)?;
  Ok(z.iter().map(|&v| v - lse ).collect())
}

/// `ln(sum(exp(z)))`, shifted by the maximum.

pub fn logsumexp<R: Real>(z: &[R]) -> Result<R> {
  let max = greatest(z)?;
  let sum: R = z.iter().map(|&v| (v - max).exp() ).sum();
  Ok(max + sum.ln())
}

/// Index of the greatest value, as `np.argmax` picks it. The first one
/// wins on ties, and the first NaN wins over everything.

pub fn argmax<T: PartialOrd>(values: &[T]) -> Result<usize> {
  if values.is_empty() { return Err(Error::EmptyInput) }
  let mut best = 0;
  for (i, value) in values.iter().enumerate() {
    // NaN is the only value not comparable to itself
    if value.partial_cmp(value).is_none() { return Ok(i) }
    if *value > values[best] { best = i }
  }
  Ok(best)
}

fn greatest<R: Real>(z: &[R]) -> Result<R> {
  z.iter()
    .copied()
    .reduce(|acc, v| if v > acc { v } else { acc } )
    .ok_or(Error::EmptyInput)
}

impl<R: Real> Tensor<R> {
  /// Display-mode [softmax] applied to every row of the last dimension.
  ///
  /// Rows are independent; with the `rayon` feature they are
  /// transformed in parallel.

  pub fn softmax_rows(&self) -> Result<Self> {
    let n = self.dims().last().copied().unwrap_or(1);
    if n == 0 || self.size() == 0 { return Err(Error::EmptyInput) }
    let data = self.to_vec();

    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<R>> = data.par_chunks(n).map(softmax).collect::<Result<_>>()?;

    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<R>> = data.chunks(n).map(softmax).collect::<Result<_>>()?;

    Ok(Tensor::new(self.dims(), rows.concat()))
  }
}
