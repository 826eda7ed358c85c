use std::path::Path;

use log::debug;
use rand::Rng;

mod npy;

pub use npy::{ NpyArray, NpyData };

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  ops::BaseOps,
};


/// Grey levels from background to full ink.
const RAMP: &[u8] = b" .:-=+*#%@";


/// Labelled digit images, one flattened image per row of `x`.

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  /// Pixel intensities, `[m, pixels]`.
  pub x: Tensor<f64>,
  /// Class labels, `[m]`.
  pub y: Tensor<u8>,
}

impl Dataset {
  pub fn new(x: Tensor<f64>, y: Tensor<u8>) -> Result<Self> {
    if x.rank() != 2 {
      return Err(Error::shape("[m, pixels] images", x.shape()))
    }
    let dims = y.dims().to_vec();
    let y = match dims[..] {
      [_] => y,
      [m, 1] => y.view(&[m]),
      _ => return Err(Error::shape("[m] labels", y.shape())),
    };
    if y.size() != x.dims()[0] {
      return Err(Error::shape(format!("{} labels", x.dims()[0]), y.shape()))
    }
    Ok(Self { x, y })
  }

  /// Read `X.npy` and `y.npy` from `dir`.

  pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    let x = NpyArray::read(dir.join("X.npy"))?;
    let y = NpyArray::read(dir.join("y.npy"))?;

    let x = match x.data {
      NpyData::Float(values) => Tensor::new(&x.shape, values),
      NpyData::Int(_) => return Err(Error::Npy("images must be stored as floats".into())),
    };
    let labels = match &y.data {
      NpyData::Int(values) => values.iter()
        .map(|&v| u8::try_from(v).ok() )
        .collect::<Option<Vec<_>>>(),
      NpyData::Float(values) => values.iter()
        .map(|&v| (v.fract() == 0.0 && (0.0..=255.0).contains(&v)).then(|| v as u8 ) )
        .collect::<Option<Vec<_>>>(),
    }.ok_or_else(|| Error::Npy("labels must be integers in 0..=255".into()) )?;

    let dataset = Self::new(x, Tensor::new(&y.shape, labels))?;
    debug!("Loaded {} images of {} pixels from {}", dataset.len(), dataset.x.dims()[1], dir.display());
    Ok(dataset)
  }

  pub fn len(&self) -> usize {
    self.x.dims()[0]
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn image(&self, index: usize) -> Tensor<f64> {
    self.x.at(&[index])
  }

  pub fn label(&self, index: usize) -> u8 {
    self.y.at(&[index]).item()
  }

  /// `n` row indices drawn uniformly, with replacement.

  pub fn sample(&self, n: usize, rng: &mut impl Rng) -> Result<Vec<usize>> {
    if self.is_empty() { return Err(Error::EmptyInput) }
    Ok((0..n).map(|_| rng.gen_range(0, self.len()) ).collect())
  }
}


/// Draw a square image as lines of text.
///
/// Images are stored column by column, so the pixel grid is transposed
/// on the way out. Intensities are clamped to `[0, 1]`.

pub fn render_digit(image: &Tensor<f64>) -> Result<String> {
  let pixels = image.to_vec();
  let side = (pixels.len() as f64).sqrt().round() as usize;
  if pixels.is_empty() { return Err(Error::EmptyInput) }
  if side * side != pixels.len() {
    return Err(Error::shape("a square image", image.shape()))
  }
  let top = (RAMP.len() - 1) as f64;
  let lines: Vec<String> = (0..side)
    .map(|row| (0..side)
      .map(|col| {
        let value = pixels[col * side + row].clamp(0.0, 1.0);
        RAMP[(value * top).round() as usize] as char
      })
      .collect())
    .collect();
  Ok(lines.join("\n"))
}
