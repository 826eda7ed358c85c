use serde::{ Serialize, Deserialize };

use crate::{
  error::{ Error, Result },
  scalar::{ Real, Unsigned },
  softmax::log_softmax,
  tensor::Tensor,
  ops::BaseOps,
};


/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` before taking
/// their logarithm.

pub const EPSILON: f64 = 1e-7;


/// How per-example losses are combined.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reduction {
  #[default]
  Mean,
  Sum,
  None,
}


/// Cross-entropy between integer class labels and a batch of predictions.
///
/// With `from_logits` set, the predictions are raw logits and the softmax is
/// fused into the loss as `logsumexp(z) - z[label]`, which stays finite for
/// any finite logits. This is the mode to use during training. Without it,
/// predictions are expected to already be probabilities.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseCategoricalCrossentropy {
  pub from_logits: bool,
  pub reduction: Reduction,
}

impl Default for SparseCategoricalCrossentropy {
  fn default() -> Self {
    Self::new(false)
  }
}

impl SparseCategoricalCrossentropy {
  pub fn new(from_logits: bool) -> Self {
    Self { from_logits, reduction: Reduction::default() }
  }

  pub fn with_reduction(mut self, reduction: Reduction) -> Self {
    self.reduction = reduction;
    self
  }

  /// Evaluate the loss of `output` (`[batch, classes]`) against
  /// `labels` (`[batch]` or `[batch, 1]`).

  pub fn compute<R, L>(&self, output: &Tensor<R>, labels: &Tensor<L>) -> Result<Tensor<R>>
  where
    R: Real,
    L: Unsigned,
  {
    if output.rank() != 2 {
      return Err(Error::shape("[batch, classes]", output.shape()))
    }
    let (batch, classes) = (output.dims()[0], output.dims()[1]);
    if batch == 0 || classes == 0 { return Err(Error::EmptyInput) }
    if labels.size() != batch || labels.rank() > 2 {
      return Err(Error::shape(format!("{batch} labels"), labels.shape()))
    }

    let labels = labels.param_iter()
      .map(|label| label.to_usize()
        .filter(|&i| i < classes )
        .ok_or_else(|| Error::LabelOutOfRange {
          label: label.to_u64().unwrap_or(u64::MAX),
          classes,
        })
      )
      .collect::<Result<Vec<_>>>()?;

    let losses = output.iter()
      .zip(labels)
      .map(|(row, label)| self.example(&row.to_vec(), label) )
      .collect::<Result<Vec<R>>>()?;

    Ok(match self.reduction {
      Reduction::None => Tensor::from_vec(losses),
      Reduction::Sum => Tensor::scalar(losses.into_iter().sum()),
      Reduction::Mean => {
        let n = R::from(batch).unwrap_or_else(R::one);
        Tensor::scalar(losses.into_iter().sum::<R>() / n)
      },
    })
  }

  fn example<R: Real>(&self, row: &[R], label: usize) -> Result<R> {
    if self.from_logits {
      Ok(-log_softmax(row)?[label])
    } else {
      let eps = R::from(EPSILON).unwrap_or_else(R::epsilon);
      let p = row[label].max(eps).min(R::one() - eps);
      Ok(-p.ln())
    }
  }
}

/// Shorthand for [SparseCategoricalCrossentropy::compute] with mean reduction.

pub fn sparse_categorical_crossentropy<R: Real, L: Unsigned>(
  output: &Tensor<R>,
  labels: &Tensor<L>,
  from_logits: bool,
) -> Result<R> {
  SparseCategoricalCrossentropy::new(from_logits)
    .compute(output, labels)
    .map(|loss| loss.item() )
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::softmax::softmax;

  #[test]
  fn uniform_logits() {
    let logits = Tensor::<f64>::zeros(&[4, 10]);
    let labels = Tensor::vec(&[0_u8, 3, 7, 9]);
    let loss = sparse_categorical_crossentropy(&logits, &labels, true).unwrap();
    assert!((loss - 10.0_f64.ln()).abs() < 1e-12);
  }

  #[test]
  fn logits_and_probabilities_agree() {
    let logits = Tensor::new(&[2,3], vec![1.0_f64, 2.0, 0.5, -1.0, 0.0, 3.0]);
    let labels = Tensor::new(&[2,1], vec![1_u8, 2]);
    let probabilities = logits.softmax_rows().unwrap();
    let fused = sparse_categorical_crossentropy(&logits, &labels, true).unwrap();
    let plain = sparse_categorical_crossentropy(&probabilities, &labels, false).unwrap();
    assert!((fused - plain).abs() < 1e-9);

    let expected = -(softmax(&[1.0_f64, 2.0, 0.5]).unwrap()[1].ln() + softmax(&[-1.0_f64, 0.0, 3.0]).unwrap()[2].ln()) / 2.0;
    assert!((fused - expected).abs() < 1e-12);
  }

  #[test]
  fn large_logits_stay_finite() {
    let logits = Tensor::new(&[1,3], vec![1000.0_f64, 0.0, -1000.0]);
    let labels = Tensor::vec(&[1_u8]);
    let fused = sparse_categorical_crossentropy(&logits, &labels, true).unwrap();
    assert!((fused - 1000.0).abs() < 1e-9);

    // Display-mode probabilities are NaN here, which is why the loss
    // must be given the raw logits
    let probabilities = logits.softmax_rows().unwrap();
    assert!(probabilities.param_iter().any(|p| p.is_nan() ));
  }

  #[test]
  fn clipped_probabilities() {
    let probabilities = Tensor::new(&[1,2], vec![0.0_f64, 1.0]);
    let labels = Tensor::vec(&[0_u8]);
    let loss = sparse_categorical_crossentropy(&probabilities, &labels, false).unwrap();
    assert!((loss + EPSILON.ln()).abs() < 1e-9);
  }

  #[test]
  fn reductions() {
    let logits = Tensor::new(&[2,2], vec![0.0_f64, 0.0, 0.0, 0.0]);
    let labels = Tensor::vec(&[0_usize, 1]);
    let loss = SparseCategoricalCrossentropy::new(true);

    let each = loss.with_reduction(Reduction::None).compute(&logits, &labels).unwrap();
    assert_eq!(each.dims(), &[2]);
    let sum = loss.with_reduction(Reduction::Sum).compute(&logits, &labels).unwrap();
    assert!((sum.item() - 2.0 * 2.0_f64.ln()).abs() < 1e-12);
  }

  #[test]
  fn invalid_labels() {
    let logits = Tensor::<f64>::zeros(&[2, 3]);
    assert!(matches!(
      sparse_categorical_crossentropy(&logits, &Tensor::vec(&[0_u8, 3]), true),
      Err(Error::LabelOutOfRange { label: 3, classes: 3 })
    ));
    assert!(matches!(
      sparse_categorical_crossentropy(&logits, &Tensor::vec(&[0_u8]), true),
      Err(Error::ShapeMismatch { .. })
    ));
    assert!(matches!(
      sparse_categorical_crossentropy(&Tensor::<f64>::zeros(&[0, 3]), &Tensor::<u8>::zeros(&[0]), true),
      Err(Error::EmptyInput)
    ));
  }
}
