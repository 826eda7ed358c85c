use std::ops::Range;

use serde::{ Serialize, Deserialize };

use crate::internal::*;


/// The shape of a [Tensor](crate::Tensor).
///
/// Besides the dimensions themselves a shape carries strides and an offset
/// into the underlying storage, so that indexing, slicing, transposing and
/// broadcasting can all be expressed as views without copying data.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
  pub dims: Vec<usize>,
  pub(crate) strides: Vec<isize>,
  pub(crate) offset: usize,
}

impl Shape {
  pub fn new(dims: &[usize]) -> Self {
    Self {
      dims: dims.to_vec(),
      strides: Self::make_strides(dims),
      offset: 0,
    }
  }

  fn make_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![1; dims.len()];
    for i in (1..dims.len()).rev() {
      strides[i - 1] = dims[i] as isize * strides[i];
    }
    strides
  }

  pub fn size(&self) -> usize {
    self.dims.iter().product()
  }

  pub fn rank(&self) -> usize {
    self.dims.len()
  }

  /// Storage position of an element. Missing trailing indices count as zero.

  pub(crate) fn index(&self, indices: &[usize]) -> usize {
    assert!(indices.len() <= self.rank(), "Too many indices for {self}");
    let position = indices.iter()
      .zip(&self.strides)
      .map(|(&i, &s)| i as isize * s )
      .sum::<isize>();
    (self.offset as isize + position) as usize
  }

  pub fn contiguous(&self) -> bool {
    self.strides == Self::make_strides(&self.dims)
  }

  /// Storage positions of all elements in row-major order.

  pub fn iter(&self) -> Box<dyn Iterator<Item=usize> + '_> {
    if self.contiguous() {
      Box::new(self.offset..self.offset + self.size())
    } else {
      Box::new(ShapeIterator::new(self))
    }
  }

  pub fn view(&self, dims: &[usize]) -> Self {
    assert!(self.contiguous(), "Cannot view non-contiguous {self}");
    assert_eq!(self.size(), dims.iter().product::<usize>(),
      "Cannot view {} as {:?}", self, dims);
    Self {
      dims: dims.to_vec(),
      strides: Self::make_strides(dims),
      offset: self.offset,
    }
  }

  /// Fix the leading dimensions to `indices`.

  pub fn take(&self, indices: &[usize]) -> Self {
    for (d, &i) in indices.iter().enumerate() {
      assert!(i < self.dims[d], "Index {i} out of bounds for {self}");
    }
    Self {
      dims: self.dims[indices.len()..].to_vec(),
      strides: self.strides[indices.len()..].to_vec(),
      offset: self.index(indices),
    }
  }

  /// Restrict the first dimension to `range`.

  pub fn range(&self, range: Range<usize>) -> Self {
    assert!(self.rank() > 0 && range.start <= range.end && range.end <= self.dims[0],
      "Range {:?} out of bounds for {}", range, self);
    let mut shape = self.clone();
    shape.offset = (self.offset as isize + self.strides[0] * range.start as isize) as usize;
    shape.dims[0] = range.end - range.start;
    shape
  }

  pub fn squeeze(&self) -> Self {
    let (dims, strides) = self.dims.iter()
      .zip(&self.strides)
      .filter(|&(&n, _)| n != 1 )
      .map(|(&n, &s)| (n, s) )
      .unzip();
    Self { dims, strides, offset: self.offset }
  }

  pub fn unsqueeze(&self, dim: isize) -> Self {
    let d = negative_index(dim, self.rank(), true);
    let mut shape = self.clone();
    let stride = if d < self.rank() {
      self.strides[d] * self.dims[d] as isize
    } else {
      1
    };
    shape.strides.insert(d, stride);
    shape.dims.insert(d, 1);
    shape
  }

  /// Expand this shape to the common shape of `self` and `other`,
  /// aligning trailing dimensions. Expanded dimensions get a zero stride.

  pub fn broadcast(&self, other: &Self) -> Self {
    let rank = self.rank().max(other.rank());
    let mut dims = vec![0; rank];
    let mut strides = vec![0; rank];
    for i in 0..rank {
      let (dl, stride) = self.rank().checked_sub(i + 1)
        .map(|d| (self.dims[d], self.strides[d]) )
        .unwrap_or((1, 0));
      let dr = other.rank().checked_sub(i + 1)
        .map(|d| other.dims[d] )
        .unwrap_or(1);
      assert!(dl == dr || dl == 1 || dr == 1, "Could not broadcast {} & {}", self, other);
      let d = rank - 1 - i;
      dims[d] = dl.max(dr);
      strides[d] = if dl == 1 && dr != 1 { 0 } else { stride };
    }
    Self { dims, strides, offset: self.offset }
  }

  pub fn transpose(&self, dim1: isize, dim2: isize) -> Self {
    let dim1 = negative_index(dim1, self.rank(), false);
    let dim2 = negative_index(dim2, self.rank(), false);
    let mut shape = self.clone();
    shape.dims.swap(dim1, dim2);
    shape.strides.swap(dim1, dim2);
    shape
  }
}

impl std::ops::Index<isize> for Shape {
  type Output = usize;

  fn index(&self, i: isize) -> &usize {
    &self.dims[negative_index(i, self.rank(), false)]
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape{:?}", self.dims)
  }
}


/// Walk a strided [Shape]'s storage positions in row-major order.

pub struct ShapeIterator<'a> {
  shape: &'a Shape,
  counter: Vec<usize>,
  remaining: usize,
}

impl<'a> ShapeIterator<'a> {
  fn new(shape: &'a Shape) -> Self {
    Self {
      shape,
      counter: vec![0; shape.rank()],
      remaining: shape.size(),
    }
  }
}

impl Iterator for ShapeIterator<'_> {
  type Item = usize;

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 { return None }
    self.remaining -= 1;
    let out = self.shape.index(&self.counter);
    // Odometer increment, carrying into the left hand dimension
    for d in (0..self.counter.len()).rev() {
      self.counter[d] += 1;
      if self.counter[d] < self.shape.dims[d] { break }
      self.counter[d] = 0;
    }
    Some(out)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strides() {
    assert_eq!(Shape::new(&[3,2,2]).strides, vec![4,2,1]);
    assert_eq!(Shape::new(&[2,3,2]).strides, vec![6,2,1]);
    assert_eq!(Shape::new(&[]).strides, Vec::<isize>::new());
  }

  #[test]
  fn index() {
    let shape = Shape::new(&[2,3]);
    assert_eq!(shape.index(&[0]), 0);
    assert_eq!(shape.index(&[1,0]), 3);
    assert_eq!(shape.index(&[1,2]), 5);
  }

  #[test]
  fn take() {
    let shape = Shape::new(&[4,3]).take(&[2]);
    assert_eq!(shape.dims, vec![3]);
    assert_eq!(shape.offset, 6);
  }

  #[test]
  fn range() {
    let shape = Shape::new(&[5,2]).range(1..3);
    assert_eq!(shape.dims, vec![2,2]);
    assert_eq!(shape.iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
  }

  #[test]
  fn transpose() {
    let shape = Shape::new(&[2,3]).transpose(0, 1);
    assert_eq!(shape.dims, vec![3,2]);
    assert_eq!(shape.strides, vec![1,3]);
    assert!(!shape.contiguous());
    assert_eq!(shape.iter().collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);
  }

  #[test]
  fn unsqueeze() {
    let shape = Shape::new(&[3,2]).unsqueeze(-1);
    assert_eq!(shape.dims, vec![3,2,1]);
    assert!(shape.contiguous());

    let shape = Shape::new(&[3,2]).unsqueeze(0);
    assert_eq!(shape.dims, vec![1,3,2]);
    assert_eq!(shape.strides, vec![6,2,1]);
  }

  #[test]
  fn squeeze() {
    let shape = Shape::new(&[1,3,1,2]).squeeze();
    assert_eq!(shape.dims, vec![3,2]);
    assert_eq!(shape.strides, vec![2,1]);
  }

  #[test]
  fn broadcast() {
    let shape = Shape::new(&[3,1]).broadcast(&Shape::new(&[2]));
    assert_eq!(shape.dims, vec![3,2]);
    assert_eq!(shape.iter().collect::<Vec<_>>(), vec![0, 0, 1, 1, 2, 2]);

    let bias = Shape::new(&[2]).broadcast(&Shape::new(&[3,2]));
    assert_eq!(bias.dims, vec![3,2]);
    assert_eq!(bias.iter().collect::<Vec<_>>(), vec![0, 1, 0, 1, 0, 1]);
  }

  #[test]
  #[should_panic]
  fn broadcast_incompatible() {
    Shape::new(&[3]).broadcast(&Shape::new(&[4]));
  }
}
