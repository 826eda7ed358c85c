use std::str::FromStr;

use serde::{ Serialize, Deserialize };

use crate::{
  error::Error,
  scalar::Real,
  tensor::Tensor,
  ops::{ Hops, RealOps },
};


/// Nonlinearity applied to a dense layer's output.
///
/// `Linear` is no activation at all. Output layers that feed a
/// `from_logits` loss should use it, so that they produce raw logits.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
  #[default]
  Linear,
  Relu,
  Sigmoid,
  Softmax,
}

impl Activation {
  pub fn apply<R: Real>(&self, z: &Tensor<R>) -> Tensor<R> {
    match self {
      Self::Linear => z.clone(),
      Self::Relu => z.relu(),
      Self::Sigmoid => z.sigmoid(),
      Self::Softmax => z.softmax(-1),
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Linear => "linear",
      Self::Relu => "relu",
      Self::Sigmoid => "sigmoid",
      Self::Softmax => "softmax",
    }
  }
}

impl std::fmt::Display for Activation {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Activation {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    match name {
      "linear" => Ok(Self::Linear),
      "relu" => Ok(Self::Relu),
      "sigmoid" => Ok(Self::Sigmoid),
      "softmax" => Ok(Self::Softmax),
      _ => Err(Error::UnknownActivation(name.to_string())),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn apply() {
    let z = Tensor::new(&[2,2], vec![-1.0_f64, 2.0, 0.0, -3.0]);
    assert_eq!(Activation::Linear.apply(&z), z);
    assert_eq!(Activation::Relu.apply(&z), Tensor::new(&[2,2], vec![0.0, 2.0, 0.0, 0.0]));
    assert_eq!(Activation::Sigmoid.apply(&z).at(&[1, 0]).item(), 0.5);

    let p = Activation::Softmax.apply(&z);
    for row in p.iter() {
      assert!((row.to_vec().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
  }

  #[test]
  fn names() {
    for activation in [Activation::Linear, Activation::Relu, Activation::Sigmoid, Activation::Softmax] {
      assert_eq!(activation.to_string().parse::<Activation>().unwrap(), activation);
    }
    assert!(matches!("tanh".parse::<Activation>(), Err(Error::UnknownActivation(_))));
  }
}
