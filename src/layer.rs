use rand::Rng;
use serde::{ Serialize, Deserialize };

use crate::{
  activation::Activation,
  error::{ Error, Result },
  scalar::Real,
  tensor::Tensor,
  ops::{ BaseOps, NumericOps },
};


/// Description of a fully connected layer. It holds no weights;
/// those live in a matching [DenseParams] owned by the caller.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dense {
  pub units: usize,
  pub activation: Activation,
  pub name: String,
}

impl Dense {
  pub fn new(units: usize, activation: Activation) -> Self {
    Self { units, activation, name: String::new() }
  }

  pub fn named(mut self, name: &str) -> Self {
    self.name = name.to_string();
    self
  }

  /// Weight and bias element count when fed `input_dim` features.

  pub fn param_count(&self, input_dim: usize) -> usize {
    input_dim * self.units + self.units
  }
}


/// Weights `[s_in, s_out]` and bias `[s_out]` of one dense layer.

#[derive(Debug, Clone, PartialEq)]
pub struct DenseParams<R: Real> {
  pub weights: Tensor<R>,
  pub bias: Tensor<R>,
}

impl<R: Real> DenseParams<R> {
  pub fn new(weights: Tensor<R>, bias: Tensor<R>) -> Result<Self> {
    if weights.rank() != 2 {
      return Err(Error::shape("[s_in, s_out] weights", weights.shape()))
    }
    if bias.dims() != [weights.dims()[1]] {
      return Err(Error::shape(format!("bias of [{}]", weights.dims()[1]), bias.shape()))
    }
    Ok(Self { weights, bias })
  }

  /// Glorot (Xavier) uniform weights in `±sqrt(6 / (s_in + s_out))`
  /// and a zero bias.

  pub fn glorot_uniform(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
    let fan = R::from(inputs + outputs).unwrap_or_else(R::one).max(R::one());
    let limit = (R::from(6.0).unwrap_or_else(R::one) / fan).sqrt();
    Self {
      weights: Tensor::uniform(&[inputs, outputs], -limit, limit, rng),
      bias: Tensor::zeros(&[outputs]),
    }
  }

  pub fn inputs(&self) -> usize {
    self.weights.dims()[0]
  }

  pub fn outputs(&self) -> usize {
    self.weights.dims()[1]
  }
}


/// Layer operations that extend [Tensor].

pub trait Layer<R: Real> {
  /// `activation(x · W + b)` for `x` of shape `[batch, s_in]` or `[s_in]`.
  fn dense(&self, params: &DenseParams<R>, activation: Activation) -> Self;
}

impl<R: Real> Layer<R> for Tensor<R> {
  fn dense(&self, params: &DenseParams<R>, activation: Activation) -> Self {
    activation.apply(&(self.mm(&params.weights) + &params.bias))
  }
}
