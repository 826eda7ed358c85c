use num_traits::NumOps;

use crate::Shape;
use crate::scalar::{ Inner, Numeric, Real };


/// Low-level compute kernels, implemented per scalar type.
///
/// `a` is an `m x k` matrix and `b` a `k x n` matrix, both addressed through
/// row and column strides starting at the given offsets. The row-major
/// `m x n` product is written to `c`.

pub trait Cops: Sized {
  #[allow(clippy::too_many_arguments)]
  fn gemm(
    m: usize, k: usize, n: usize,
    a: &[Self], a_offset: usize, rsa: isize, csa: isize,
    b: &[Self], b_offset: usize, rsb: isize, csb: isize,
    c: &mut [Self],
  );
}


/// Shape-level operations that are implemented for any [Inner] type.

pub trait BaseOps<I: Inner>: Clone {
  fn scalar(item: I) -> Self;
  fn shape(&self) -> &Shape;
  fn broadcast(&self, shape: &Shape) -> Self;
  fn reshape(&self, dims: &[usize]) -> Self;
  fn unsqueeze(&self, dim: isize) -> Self;
  fn transpose(&self, dim1: isize, dim2: isize) -> Self;
}


/// Reductions and products over [Numeric] inner types.
///
/// Reductions collapse every dimension from `dim` onwards, so `sum(0)`
/// yields a scalar while `sum(-1)` sums each row of the last dimension.

pub trait NumericOps<I: Numeric>: NumOps + NumOps<I, Self> + Sized {
  fn sum(&self, dim: isize) -> Self;
  fn mm(&self, rhs: &Self) -> Self;
  fn max(&self, dim: isize) -> Self;
}


/// Elementwise transcendental functions and activations.

pub trait RealOps<I: Real>: std::ops::Neg {
  fn exp(&self) -> Self;
  fn log(&self) -> Self;
  fn relu(&self) -> Self;
  fn sigmoid(&self) -> Self;
}


/// High-level operations, implemented exclusively on top of
/// the lower level operation traits.

pub trait Hops<I>: BaseOps<I> + NumericOps<I> + RealOps<I>
where
  I: Real,
  for<'a> &'a Self: NumOps<&'a Self, Self> + NumOps<I, Self>,
{
  /// `ln(sum(exp(x)))` along `dim`, shifted by the maximum so that
  /// large inputs do not overflow.

  fn logsumexp(&self, dim: isize) -> Self {
    let max = self.max(dim);
    let shifted = self - &max.unsqueeze(-1);
    shifted.exp().sum(dim).log() + max
  }

  /// Numerically stable softmax along `dim`.

  fn softmax(&self, dim: isize) -> Self {
    let exp = (self - &self.max(dim).unsqueeze(-1)).exp();
    &exp / &exp.sum(dim).unsqueeze(-1)
  }

  fn log_softmax(&self, dim: isize) -> Self {
    self - &self.logsumexp(dim).unsqueeze(-1)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tensor;

  #[test]
  fn softmax() {
    let a = Tensor::arrange(&[3,2], 1.0, 1.0).softmax(-1);
    for row in a.iter() {
      assert!((row.sum(0).item() - 1.0_f64).abs() < 1e-12);
    }
  }

  #[test]
  fn softmax_large_logits() {
    let a = Tensor::vec(&[1000.0, 1000.0]).softmax(-1);
    assert_eq!(a, Tensor::vec(&[0.5, 0.5]));
  }

  #[test]
  fn logsumexp() {
    let a = Tensor::vec(&[0.0_f64, 0.0]).logsumexp(-1);
    assert!((a.item() - 2.0_f64.ln()).abs() < 1e-12);

    let big = Tensor::vec(&[800.0_f64, 800.0]).logsumexp(-1);
    assert!((big.item() - (800.0 + 2.0_f64.ln())).abs() < 1e-9);
  }

  #[test]
  fn log_softmax() {
    let a = Tensor::new(&[2,3], vec![1.0_f64, 2.0, 3.0, -5.0, 0.0, 5.0]);
    let log = a.log_softmax(-1);
    let direct = a.softmax(-1).log();
    for (l, d) in log.param_iter().zip(direct.param_iter()) {
      assert!((l - d).abs() < 1e-12);
    }
  }
}
