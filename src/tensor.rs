use std::sync::Arc;
use std::ops::Range;

use rand::Rng;
use num_traits::NumCast;
use serde::{ Serialize, Deserialize };

mod cops;
mod lops;

use crate::{
  internal::*,
  shape::Shape,
  scalar::{ Inner, Numeric, Real, Integer },
  ops::Hops,
};


/// Multidimensional array.
///
/// Tensors may contain any type that satisfies [Inner], but
/// additional methods are available for [Numeric], [Real]
/// and [Integer] inner types.
///
/// Storage is immutable and shared between views: indexing, slicing,
/// reshaping, transposing and broadcasting hand out new shapes over the same
/// data. Every operation that computes something returns a fresh tensor, so
/// tensors can be sent across threads and read concurrently.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor<T: Inner> {
  shape: Shape,
  data: Arc<Vec<T>>,
}

impl<T: Real> Hops<T> for Tensor<T> {}

impl<T: Inner> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    if self.shape.squeeze().dims != rhs.shape.squeeze().dims { return false }
    self.param_iter().zip(rhs.param_iter()).all(|(a, b)| a == b )
  }
}

impl<T: Inner> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    assert_eq!(shape.size(), data.len(),
      "{} doesn't match data length {}", shape, data.len());
    Self { shape, data: Arc::new(data) }
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Self {
    Self::from_shape(Shape::new(shape), data)
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::new(&[vec.len()], vec.to_vec())
  }

  pub fn from_vec(vec: Vec<T>) -> Self {
    Self::new(&[vec.len()], vec)
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::new(shape, vec![filler; shape.iter().product()])
  }

  /// Build a tensor with a new leading dimension from equally shaped rows.

  pub fn rows(rows: &[Tensor<T>]) -> Self {
    assert!(!rows.is_empty(), "Cannot build a tensor from zero rows");
    let mut dims = rows[0].shape.dims.clone();
    dims.insert(0, rows.len());
    let data = rows.iter()
      .map(|row| row.to_vec() )
      .collect::<Vec<_>>()
      .concat();
    Self::new(&dims, data)
  }

  /// Concatenate tensors along their first dimension.

  pub fn stack(chunks: &[Tensor<T>]) -> Self {
    assert!(!chunks.is_empty(), "Cannot stack zero tensors");
    let mut dims = chunks[0].shape.dims.clone();
    dims[0] = chunks.iter().map(|chunk| chunk.shape[0] ).sum();
    let data = chunks.iter()
      .map(|chunk| chunk.to_vec() )
      .collect::<Vec<_>>()
      .concat();
    Self::new(&dims, data)
  }

  pub fn dims(&self) -> &[usize] {
    &self.shape.dims
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  /// Elements in row-major order, copied out of (possibly strided) storage.

  pub fn to_vec(&self) -> Vec<T> {
    self.param_iter().collect()
  }

  /// Borrow the elements directly when this view is contiguous.

  pub fn as_slice(&self) -> Option<&[T]> {
    self.shape.contiguous().then(|| {
      &self.data[self.shape.offset..self.shape.offset + self.size()]
    })
  }

  pub fn contiguous(&self) -> Self {
    if self.shape.contiguous() {
      self.clone()
    } else {
      self.detach()
    }
  }

  /// Copy into fresh storage of exactly this view's size.

  pub fn detach(&self) -> Self {
    Self::new(&self.shape.dims, self.to_vec())
  }

  pub fn zip<O,F>(&self, rhs: &Self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn((T, T)) -> O,
  {
    let lhs_shape = self.shape.broadcast(&rhs.shape);
    let rhs_shape = rhs.shape.broadcast(&self.shape);
    let data = lhs_shape.iter()
      .zip(rhs_shape.iter())
      .map(|(i, j)| cb((self.data[i], rhs.data[j])) )
      .collect();
    Tensor::new(&lhs_shape.dims, data)
  }

  pub fn vectorize<O,F>(&self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: FnMut(T) -> O,
  {
    let data = self.param_iter().map(cb).collect();
    Tensor::new(&self.shape.dims, data)
  }

  /// Collapse every dimension from `dim` onwards into a single value,
  /// computed from the contiguous group of elements it covers.

  pub fn collapse<O,F>(&self, dim: isize, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn(&[T]) -> O,
  {
    let dim = negative_index(dim, self.rank(), false);
    let outer = &self.shape.dims[..dim.min(self.rank())];
    let group: usize = self.shape.dims[dim.min(self.rank())..].iter().product();
    let data = if group == 0 {
      (0..outer.iter().product::<usize>()).map(|_| cb(&[]) ).collect()
    } else {
      self.to_vec().chunks(group).map(cb).collect()
    };
    Tensor::new(outer, data)
  }

  /// Iterate over views of the first dimension.

  pub fn iter(&self) -> impl Iterator<Item = Tensor<T>> + '_ {
    assert!(self.rank() > 0, "Cannot iterate over a scalar");
    (0..self.shape[0]).map(move |i| self.at(&[i]) )
  }

  pub fn param_iter(&self) -> impl Iterator<Item = T> + '_ {
    self.shape.iter().map(move |i| self.data[i] )
  }

  pub fn at(&self, indices: &[usize]) -> Self {
    Self { shape: self.shape.take(indices), data: self.data.clone() }
  }

  pub fn range(&self, range: Range<usize>) -> Self {
    Self { shape: self.shape.range(range), data: self.data.clone() }
  }

  pub fn item(&self) -> T {
    assert!(self.size() == 1,
      "Can't extract item from non-scalar {}", self.shape);
    self.data[self.shape.offset]
  }

  pub fn view(&self, dims: &[usize]) -> Self {
    Self { shape: self.shape.view(dims), data: self.data.clone() }
  }

  pub fn squeeze(&self) -> Self {
    Self { shape: self.shape.squeeze(), data: self.data.clone() }
  }

  pub fn equal(&self, rhs: &Self) -> Tensor<bool> {
    self.zip(rhs, |(a, b)| a == b )
  }

  /// Split the first dimension into views of at most `size` rows.

  pub fn chunks(&self, size: usize) -> Vec<Tensor<T>> {
    assert!(size > 0, "Chunk size must be positive");
    let len = self.shape[0];
    (0..len)
      .step_by(size)
      .map(|start| self.range(start..(start + size).min(len)) )
      .collect()
  }
}

impl<T: Numeric> Tensor<T> {
  pub fn ones(shape: &[usize]) -> Self {
    Self::fill(shape, T::one())
  }

  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  pub fn arrange(shape: &[usize], start: T, step: T) -> Self {
    let mut value = start;
    Self::init(shape, || {
      let out = value;
      value += step;
      out
    })
  }

  fn init(shape: &[usize], mut cb: impl FnMut() -> T) -> Self {
    let data = (0..shape.iter().product()).map(|_| cb() ).collect();
    Self::new(shape, data)
  }

  /// Collapse the last dimension using the index of its greatest value.
  ///
  /// The first index wins on ties and the first NaN wins over any number.
  /// Rows of length zero yield index zero.

  pub fn argmax(&self) -> Tensor<usize> {
    self.collapse(-1, |row| crate::softmax::argmax(row).unwrap_or(0) )
  }

  /// Convert every element, failing if any of them doesn't fit `I`.

  pub fn cast<I: Numeric>(&self) -> Option<Tensor<I>> {
    let data = self.param_iter()
      .map(|a| <I as NumCast>::from(a) )
      .collect::<Option<Vec<_>>>()?;
    Some(Tensor::new(&self.shape.dims, data))
  }
}

impl<T: Real> Tensor<T> {
  /// Uniformly distributed values in `[low, high)`.

  pub fn uniform(shape: &[usize], low: T, high: T, rng: &mut impl Rng) -> Self {
    Self::init(shape, || rng.gen_range(low, high) )
  }
}

impl<T: Integer> Tensor<T> {
  /// Share of elements equal to `labels`.

  pub fn accuracy<O: Real>(&self, labels: &Self) -> O {
    let hits = self
      .equal(labels)
      .param_iter()
      .filter(|&hit| hit )
      .count();
    let total = labels.size().max(1);
    O::from(hits).unwrap_or_else(O::zero) / O::from(total).unwrap_or_else(O::one)
  }
}

impl<T: Inner> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Tensor{:?} ", self.shape.dims)?;
    print_chunks(0, &self.shape, &self.to_vec(), f)
  }
}

fn print_chunks<T: std::fmt::Debug>(idx: usize, shape: &Shape, vec: &[T], f: &mut std::fmt::Formatter) -> std::fmt::Result {
  let indent = "  ".repeat(idx);
  if shape.rank() == 0 {
    write!(f, "{indent}{:?}", vec[0])?;
  } else if idx == shape.rank() - 1 || vec.is_empty() {
    writeln!(f, "{indent}{:?}", vec)?;
  } else {
    let chunks = vec.chunks(vec.len() / shape.dims[idx]);
    writeln!(f, "{indent}[")?;
    for chunk in chunks {
      print_chunks(idx + 1, shape, chunk, f)?;
    }
    writeln!(f, "{indent}]")?;
  }
  Ok(())
}
