use itertools::Itertools;
use log::{ debug, trace };
use serde::{ Serialize, Deserialize };

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
  activation::Activation,
  config::Config,
  data::Dataset,
  error::{ Error, Result },
  layer::{ Dense, DenseParams, Layer },
  scalar::Real,
  tensor::Tensor,
  ops::BaseOps,
};


/// Rows fed through the network at once.
pub const BATCH_SIZE: usize = 32;


/// A stack of dense layers applied in order.
///
/// The model only describes the architecture. Weights are held in a
/// separate [Params] value, so that one model can be evaluated with any
/// number of parameter sets.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequential {
  pub name: String,
  pub input_dim: usize,
  pub layers: Vec<Dense>,
}

/// One [DenseParams] per layer of a [Sequential].

#[derive(Debug, Clone, PartialEq)]
pub struct Params<R: Real> {
  pub layers: Vec<DenseParams<R>>,
}

impl<R: Real> Params<R> {
  pub fn new(layers: Vec<DenseParams<R>>) -> Self {
    Self { layers }
  }
}

/// An example the model got wrong.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misprediction {
  pub index: usize,
  pub label: usize,
  pub predicted: usize,
}

impl Sequential {
  pub fn new(name: &str, input_dim: usize) -> Self {
    Self { name: name.to_string(), input_dim, layers: vec![] }
  }

  pub fn add(mut self, layer: Dense) -> Self {
    self.layers.push(layer);
    self
  }

  /// Digit classifier for 20x20 images: two ReLU layers and a linear
  /// output layer producing one logit per digit.

  pub fn digits() -> Self {
    Self::new("my_model", 400)
      .add(Dense::new(25, Activation::Relu).named("L1"))
      .add(Dense::new(15, Activation::Relu).named("L2"))
      .add(Dense::new(10, Activation::Linear).named("L3"))
  }

  pub fn output_dim(&self) -> usize {
    self.layers.last().map(|layer| layer.units ).unwrap_or(self.input_dim)
  }

  /// `(s_in, s_out)` of every layer.

  pub fn layer_dims(&self) -> Vec<(usize, usize)> {
    let inputs = std::iter::once(self.input_dim).chain(self.layers.iter().map(|layer| layer.units ));
    inputs.zip(self.layers.iter()).map(|(s_in, layer)| (s_in, layer.units) ).collect()
  }

  /// Shapes of each layer's weights and bias.

  pub fn weight_shapes(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
    self.layer_dims().into_iter()
      .map(|(s_in, s_out)| (vec![s_in, s_out], vec![s_out]) )
      .collect()
  }

  pub fn param_counts(&self) -> Vec<usize> {
    self.layer_dims().into_iter()
      .zip(&self.layers)
      .map(|((s_in, _), layer)| layer.param_count(s_in) )
      .collect()
  }

  pub fn param_count(&self) -> usize {
    self.param_counts().iter().sum()
  }

  /// Layer table in the format Keras prints.

  pub fn summary(&self) -> String {
    self.to_string()
  }

  fn layer_name(&self, i: usize) -> String {
    match self.layers[i].name.as_str() {
      "" if i == 0 => "dense".to_string(),
      "" => format!("dense_{i}"),
      name => name.to_string(),
    }
  }

  /// Fresh Glorot-uniform parameters. The same seed always yields the
  /// same parameters.

  pub fn init_params<R: Real>(&self, config: &Config) -> Params<R> {
    let mut rng = config.rng();
    let layers = self.layer_dims().into_iter()
      .map(|(s_in, s_out)| DenseParams::glorot_uniform(s_in, s_out, &mut rng) )
      .collect();
    debug!("Initialized {} parameters of {} with seed {}", self.param_count(), self.name, config.seed);
    Params::new(layers)
  }

  pub fn check_params<R: Real>(&self, params: &Params<R>) -> Result<()> {
    if params.layers.len() != self.layers.len() {
      return Err(Error::shape(
        format!("{} layers", self.layers.len()),
        format!("{} layers", params.layers.len()),
      ))
    }
    for (i, ((s_in, s_out), p)) in self.layer_dims().into_iter().zip(&params.layers).enumerate() {
      if p.weights.dims() != [s_in, s_out] {
        return Err(Error::shape(
          format!("{} weights of [{s_in}, {s_out}]", self.layer_name(i)),
          p.weights.shape(),
        ))
      }
      if p.bias.dims() != [s_out] {
        return Err(Error::shape(
          format!("{} bias of [{s_out}]", self.layer_name(i)),
          p.bias.shape(),
        ))
      }
    }
    Ok(())
  }

  /// Raw logits for `x`, either a single example `[input_dim]` or a batch
  /// `[m, input_dim]`. The output layer is linear, so these are never
  /// probabilities.

  pub fn forward<R: Real>(&self, params: &Params<R>, x: &Tensor<R>) -> Result<Tensor<R>> {
    self.check_params(params)?;
    if x.rank() == 0 || x.rank() > 2 || x.dims()[x.rank() - 1] != self.input_dim {
      return Err(Error::shape(format!("[m, {}] inputs", self.input_dim), x.shape()))
    }
    if x.size() == 0 { return Err(Error::EmptyInput) }
    if x.rank() == 1 { return Ok(self.forward_batch(params, x)) }

    let batches = x.chunks(BATCH_SIZE);

    #[cfg(feature = "rayon")]
    let outputs: Vec<Tensor<R>> = batches.par_iter()
      .map(|batch| self.forward_batch(params, batch) )
      .collect();

    #[cfg(not(feature = "rayon"))]
    let outputs: Vec<Tensor<R>> = batches.iter()
      .map(|batch| self.forward_batch(params, batch) )
      .collect();

    Ok(Tensor::stack(&outputs))
  }

  fn forward_batch<R: Real>(&self, params: &Params<R>, x: &Tensor<R>) -> Tensor<R> {
    trace!("Forward pass of {:?} through {}", x.dims(), self.name);
    self.layers.iter()
      .zip(&params.layers)
      .fold(x.clone(), |a, (layer, p)| a.dense(p, layer.activation) )
  }

  /// Display-mode softmax of the logits, one distribution per row.

  pub fn predict_proba<R: Real>(&self, params: &Params<R>, x: &Tensor<R>) -> Result<Tensor<R>> {
    self.forward(params, x)?.softmax_rows()
  }

  /// Most likely class of every row. Softmax preserves order, so this is
  /// taken straight from the logits.

  pub fn predict_labels<R: Real>(&self, params: &Params<R>, x: &Tensor<R>) -> Result<Vec<usize>> {
    Ok(self.forward(params, x)?.argmax().to_vec())
  }

  /// Every example of `dataset` whose predicted class differs from its label.

  pub fn errors<R: Real>(&self, params: &Params<R>, dataset: &Dataset) -> Result<Vec<Misprediction>> {
    let predicted = self.predict_labels(params, &inputs(dataset))?;
    Ok(predicted.into_iter()
      .zip(dataset.y.param_iter())
      .enumerate()
      .filter(|&(_, (p, label))| p != label as usize )
      .map(|(index, (predicted, label))| Misprediction { index, label: label as usize, predicted } )
      .collect())
  }

  /// Share of `dataset` classified correctly.

  pub fn accuracy<R: Real>(&self, params: &Params<R>, dataset: &Dataset) -> Result<R> {
    let predicted = Tensor::from_vec(self.predict_labels(params, &inputs(dataset))?);
    Ok(predicted.accuracy(&dataset.y.vectorize(usize::from)))
  }
}

fn inputs<R: Real>(dataset: &Dataset) -> Tensor<R> {
  dataset.x.vectorize(|v| R::from(v).unwrap_or_else(R::nan) )
}

impl std::fmt::Display for Sequential {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let rule = "_".repeat(65);
    let double = "=".repeat(65);
    let row = |a: &str, b: &str, c: &str| format!("{a:<29}{b:<26}{c}");
    let total = thousands(self.param_count());

    writeln!(f, "Model: \"{}\"", self.name)?;
    writeln!(f, "{rule}")?;
    writeln!(f, "{}", row("Layer (type)", "Output Shape", "Param #"))?;
    writeln!(f, "{double}")?;
    for (i, (layer, count)) in self.layers.iter().zip(self.param_counts()).enumerate() {
      let name = format!("{} (Dense)", self.layer_name(i));
      writeln!(f, "{}", row(&name, &format!("(None, {})", layer.units), &count.to_string()))?;
      writeln!(f, "{}", if i + 1 == self.layers.len() { &double } else { &rule })?;
    }
    writeln!(f, "Total params: {total}")?;
    writeln!(f, "Trainable params: {total}")?;
    writeln!(f, "Non-trainable params: 0")?;
    write!(f, "{rule}")
  }
}

fn thousands(n: usize) -> String {
  let digits: Vec<char> = n.to_string().chars().collect();
  digits.rchunks(3).rev().map(|group| group.iter().collect::<String>() ).join(",")
}


#[cfg(test)]
mod tests {
  use super::*;

  fn tiny() -> (Sequential, Params<f64>) {
    let model = Sequential::new("tiny", 2).add(Dense::new(2, Activation::Linear).named("out"));
    let params = Params::new(vec![DenseParams::new(
      Tensor::new(&[2,2], vec![1.0, 0.0, 0.0, 1.0]),
      Tensor::zeros(&[2]),
    ).unwrap()]);
    (model, params)
  }

  #[test]
  fn summary() {
    let model = Sequential::digits();
    assert_eq!(model.param_counts(), vec![10025, 390, 160]);
    assert_eq!(model.param_count(), 10575);
    assert_eq!(model.output_dim(), 10);

    let summary = model.summary();
    assert!(summary.starts_with("Model: \"my_model\"\n"));
    assert!(summary.contains("\nL1 (Dense)                   (None, 25)                10025\n"));
    assert!(summary.contains("\nL2 (Dense)                   (None, 15)                390\n"));
    assert!(summary.contains("\nL3 (Dense)                   (None, 10)                160\n"));
    assert!(summary.contains("\nTotal params: 10,575\n"));
  }

  #[test]
  fn default_layer_names() {
    let model = Sequential::new("auto", 3)
      .add(Dense::new(2, Activation::Relu))
      .add(Dense::new(1, Activation::Sigmoid));
    let summary = model.to_string();
    assert!(summary.contains("\ndense (Dense) "));
    assert!(summary.contains("\ndense_1 (Dense) "));
  }

  #[test]
  fn thousands_separator() {
    assert_eq!(thousands(0), "0");
    assert_eq!(thousands(160), "160");
    assert_eq!(thousands(10575), "10,575");
    assert_eq!(thousands(1234567), "1,234,567");
  }

  #[test]
  fn weight_shapes() {
    let shapes = Sequential::digits().weight_shapes();
    assert_eq!(shapes, vec![
      (vec![400, 25], vec![25]),
      (vec![25, 15], vec![15]),
      (vec![15, 10], vec![10]),
    ]);

    let params: Params<f32> = Sequential::digits().init_params(&Config::default());
    for ((w, b), p) in shapes.iter().zip(&params.layers) {
      assert_eq!(p.weights.dims(), &w[..]);
      assert_eq!(p.bias.dims(), &b[..]);
    }
  }

  #[test]
  fn seeded_init() {
    let model = Sequential::digits();
    let a: Params<f64> = model.init_params(&Config::default());
    let b: Params<f64> = model.init_params(&Config::default());
    let c: Params<f64> = model.init_params(&Config::default().with_seed(1));
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn zero_input_is_uniform() {
    let model = Sequential::digits();
    let params: Params<f64> = model.init_params(&Config::default());
    let x = Tensor::zeros(&[3, 400]);

    let logits = model.forward(&params, &x).unwrap();
    assert_eq!(logits, Tensor::zeros(&[3, 10]));

    let p = model.predict_proba(&params, &x).unwrap();
    assert!(p.param_iter().all(|v| (v - 0.1).abs() < 1e-12 ));
    assert_eq!(model.predict_labels(&params, &x).unwrap(), vec![0, 0, 0]);
  }

  #[test]
  fn batches_match_single_rows() {
    let model = Sequential::digits();
    let config = Config::default();
    let params: Params<f64> = model.init_params(&config);
    let x = Tensor::uniform(&[70, 400], 0.0, 1.0, &mut Config::default().with_seed(5).rng());

    let logits = model.forward(&params, &x).unwrap();
    assert_eq!(logits.dims(), &[70, 10]);
    for i in [0, 31, 32, 69] {
      let single = model.forward(&params, &x.at(&[i])).unwrap();
      let batched = logits.at(&[i]).to_vec();
      assert!(single.param_iter().zip(batched).all(|(a, b)| (a - b).abs() < 1e-12 ));
    }
  }

  #[test]
  fn bad_inputs() {
    let model = Sequential::digits();
    let params: Params<f64> = model.init_params(&Config::default());
    assert!(matches!(model.forward(&params, &Tensor::zeros(&[2, 399])), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(model.forward(&params, &Tensor::zeros(&[0, 400])), Err(Error::EmptyInput)));

    let mut broken = params.clone();
    broken.layers[1].bias = Tensor::zeros(&[14]);
    match model.check_params(&broken) {
      Err(Error::ShapeMismatch { expected, .. }) => assert!(expected.starts_with("L2 ")),
      other => panic!("unexpected {other:?}"),
    }

    broken.layers.pop();
    assert!(model.check_params(&broken).is_err());
  }

  #[test]
  fn errors() {
    let (model, params) = tiny();
    let dataset = Dataset::new(
      Tensor::new(&[3,2], vec![1.0, 0.0, 0.0, 1.0, 3.0, 5.0]),
      Tensor::vec(&[0, 0, 1]),
    ).unwrap();

    let errors = model.errors(&params, &dataset).unwrap();
    assert_eq!(errors, vec![Misprediction { index: 1, label: 0, predicted: 1 }]);
    let accuracy: f64 = model.accuracy(&params, &dataset).unwrap();
    assert!((accuracy - 2.0 / 3.0).abs() < 1e-12);
  }
}
