//! Plain numeric arrays stored with numpy's `np.save`.
//!
//! Parsing is done by [npyz]. This module narrows what it reads down to
//! C-ordered float and integer arrays, widened to `f64` and `i64`.

use std::{ fs, io, path::Path };

use npyz::{ NpyFile, Order };

use crate::error::{ Error, Result };


/// Elements of a loaded array, widened to the largest type of their kind.

#[derive(Debug, Clone, PartialEq)]
pub enum NpyData {
  Float(Vec<f64>),
  Int(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
  pub shape: Vec<usize>,
  pub data: NpyData,
}

fn malformed(error: io::Error) -> Error {
  Error::Npy(error.to_string())
}

macro_rules! read_as {
  ($file:ident, $shape:ident, $type:ty, $variant:ident, $widen:ty) => {
    let $file = match $file.try_data::<$type>() {
      Ok(reader) => {
        let values = reader
          .map(|value| value.map(|v| v as $widen ) )
          .collect::<io::Result<Vec<_>>>()
          .map_err(malformed)?;
        return Ok(Self { shape: $shape, data: NpyData::$variant(values) })
      },
      Err(file) => file,
    };
  };
}

impl NpyArray {
  pub fn read(path: impl AsRef<Path>) -> Result<Self> {
    let bytes = fs::read(path)?;
    Self::parse(&bytes)
  }

  pub fn parse(bytes: &[u8]) -> Result<Self> {
    let file = NpyFile::new(bytes).map_err(malformed)?;
    if file.order() == Order::Fortran {
      return Err(Error::Npy("fortran order arrays are not supported".into()))
    }
    let shape = file.shape().iter()
      .map(|&dim| usize::try_from(dim).ok() )
      .collect::<Option<Vec<_>>>()
      .filter(|dims| dims.iter().try_fold(1_usize, |n, &dim| n.checked_mul(dim) ).is_some() )
      .ok_or_else(|| Error::Npy(format!("shape {:?} is too large", file.shape())) )?;
    let descr = file.dtype().descr();

    read_as!(file, shape, f64, Float, f64);
    read_as!(file, shape, f32, Float, f64);
    read_as!(file, shape, i64, Int, i64);
    read_as!(file, shape, i32, Int, i64);
    read_as!(file, shape, u32, Int, i64);
    read_as!(file, shape, u8, Int, i64);
    read_as!(file, shape, i8, Int, i64);
    drop(file);

    Err(Error::Npy(format!("unsupported dtype {descr}")))
  }

  /// Elements as `f64`, whichever kind was stored.

  pub fn to_f64(&self) -> Vec<f64> {
    match &self.data {
      NpyData::Float(values) => values.clone(),
      NpyData::Int(values) => values.iter().map(|&v| v as f64 ).collect(),
    }
  }
}


/// Serialize `values` the way `np.save` does. Test fixtures only.

#[cfg(test)]
pub(crate) fn encode<T: npyz::AutoSerialize + Copy>(shape: &[u64], values: &[T]) -> Vec<u8> {
  use npyz::WriterBuilder;

  let mut bytes = vec![];
  let mut writer = npyz::WriteOptions::<T>::new()
    .default_dtype()
    .shape(shape)
    .writer(&mut bytes)
    .begin_nd()
    .unwrap();
  writer.extend(values.iter().copied()).unwrap();
  writer.finish().unwrap();
  bytes
}


#[cfg(test)]
mod tests {
  use super::*;

  /// A version 1.0 file with a hand-written header dictionary.
  fn raw(header: &str, body: &[u8]) -> Vec<u8> {
    let mut header = header.to_string();
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');
    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(body);
    bytes
  }

  #[test]
  fn floats() {
    let array = NpyArray::parse(&encode(&[2, 3], &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.5])).unwrap();
    assert_eq!(array.shape, vec![2, 3]);
    assert_eq!(array.data, NpyData::Float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.5]));

    let single = NpyArray::parse(&encode(&[2], &[0.5_f32, -1.0])).unwrap();
    assert_eq!(single.data, NpyData::Float(vec![0.5, -1.0]));
  }

  #[test]
  fn column_of_integers() {
    let array = NpyArray::parse(&encode(&[3, 1], &[0_i64, 9, 4])).unwrap();
    assert_eq!(array.shape, vec![3, 1]);
    assert_eq!(array.data, NpyData::Int(vec![0, 9, 4]));
    assert_eq!(array.to_f64(), vec![0.0, 9.0, 4.0]);
  }

  #[test]
  fn bytes() {
    let array = NpyArray::parse(&encode(&[4], &[1_u8, 2, 3, 255])).unwrap();
    assert_eq!(array.shape, vec![4]);
    assert_eq!(array.data, NpyData::Int(vec![1, 2, 3, 255]));
  }

  #[test]
  fn big_endian() {
    let body: Vec<u8> = [1.5_f64, -2.0].iter().flat_map(|v| v.to_be_bytes() ).collect();
    let bytes = raw("{'descr': '>f8', 'fortran_order': False, 'shape': (2,), }", &body);
    assert_eq!(NpyArray::parse(&bytes).unwrap().data, NpyData::Float(vec![1.5, -2.0]));
  }

  #[test]
  fn rejects_malformed() {
    assert!(matches!(NpyArray::parse(b"not an array"), Err(Error::Npy(_))));

    let truncated = raw("{'descr': '<f8', 'fortran_order': False, 'shape': (4,), }", &[0; 16]);
    assert!(matches!(NpyArray::parse(&truncated), Err(Error::Npy(_))));

    let strings = raw("{'descr': '<U3', 'fortran_order': False, 'shape': (1,), }", &[0; 12]);
    assert!(matches!(NpyArray::parse(&strings), Err(Error::Npy(_))));
  }

  #[test]
  fn oversized_shape() {
    let header = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, 8), }}", 1_u64 << 62);
    assert!(matches!(NpyArray::parse(&raw(&header, &[0; 8])), Err(Error::Npy(_))));
  }

  #[test]
  fn fortran_order() {
    let bytes = raw("{'descr': '<f8', 'fortran_order': True, 'shape': (1,), }", &1.0_f64.to_le_bytes());
    assert!(matches!(NpyArray::parse(&bytes), Err(Error::Npy(_))));
  }
}
