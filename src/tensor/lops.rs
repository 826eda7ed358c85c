use crate::{
  shape::Shape,
  tensor::Tensor,
  scalar::{ Inner, Numeric, Signed, Real },
  ops::{ Cops, BaseOps, NumericOps, RealOps },
};


impl<T: Inner> BaseOps<T> for Tensor<T> {
  fn scalar(item: T) -> Self {
    Self::new(&[], vec![item])
  }

  fn shape(&self) -> &Shape {
    &self.shape
  }

  fn broadcast(&self, shape: &Shape) -> Self {
    Self {
      shape: self.shape.broadcast(shape),
      data: self.data.clone(),
    }
  }

  fn reshape(&self, dims: &[usize]) -> Self {
    self.contiguous().view(dims)
  }

  fn unsqueeze(&self, dim: isize) -> Self {
    Self {
      shape: self.shape.unsqueeze(dim),
      data: self.data.clone(),
    }
  }

  fn transpose(&self, dim1: isize, dim2: isize) -> Self {
    Self {
      shape: self.shape.transpose(dim1, dim2),
      data: self.data.clone(),
    }
  }
}

fn greatest<T: Numeric>(values: &[T]) -> T {
  values.iter().copied().reduce(|acc, a| if a > acc { a } else { acc } ).unwrap_or_else(T::zero)
}

impl<T: Numeric + Cops> NumericOps<T> for Tensor<T> {
  fn sum(&self, dim: isize) -> Self {
    self.collapse(dim, |values| values.iter().copied().sum() )
  }

  /// Matrix product of `[m, k] x [k, n]`. A vector on the left is treated as
  /// a single row and the result is a vector again.

  fn mm(&self, rhs: &Self) -> Self {
    let pad = self.rank() == 1;
    let lhs = if pad { self.unsqueeze(0) } else { self.clone() };
    assert!(lhs.rank() == 2 && rhs.rank() == 2,
      "Cannot multiply {} by {}", self.shape, rhs.shape);
    let (m, k) = (lhs.shape[0], lhs.shape[1]);
    let n = rhs.shape[1];
    assert_eq!(k, rhs.shape[0],
      "Cannot multiply {} by {}", self.shape, rhs.shape);

    let mut data = vec![T::zero(); m * n];
    T::gemm(
      m, k, n,
      &lhs.data, lhs.shape.offset, lhs.shape.strides[0], lhs.shape.strides[1],
      &rhs.data, rhs.shape.offset, rhs.shape.strides[0], rhs.shape.strides[1],
      &mut data,
    );

    if pad {
      Self::new(&[n], data)
    } else {
      Self::new(&[m, n], data)
    }
  }

  /// Greatest value of each group. Empty groups yield zero.

  fn max(&self, dim: isize) -> Self {
    self.collapse(dim, greatest)
  }
}

impl<T: Real> RealOps<T> for Tensor<T> {
  fn exp(&self) -> Self {
    self.vectorize(|a| a.exp() )
  }

  fn log(&self) -> Self {
    self.vectorize(|a| a.ln() )
  }

  fn relu(&self) -> Self {
    self.vectorize(|a| if a > T::zero() { a } else { T::zero() } )
  }

  fn sigmoid(&self) -> Self {
    self.vectorize(|a| T::one() / (T::one() + (-a).exp()) )
  }
}

impl<T: Signed> std::ops::Neg for &Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    self.vectorize(|a| -a )
  }
}

impl<T: Signed> std::ops::Neg for Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    -&self
  }
}

macro_rules! add_operator {
  ($trait:ident, $meth:ident, $symbol:tt) => {
    impl<T: Numeric> std::ops::$trait for &Tensor<T> { // &tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        self.zip(rhs, |(a, b)| a $symbol b )
      }
    }

    impl<T: Numeric> std::ops::$trait for Tensor<T> { // tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Numeric> std::ops::$trait<Tensor<T>> for &Tensor<T> { // &tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Tensor<T>) -> Tensor<T> {
        self $symbol &rhs
      }
    }

    impl<T: Numeric> std::ops::$trait<&Tensor<T>> for Tensor<T> { // tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: &Tensor<T>) -> Tensor<T> {
        &self $symbol rhs
      }
    }

    impl<T: Numeric> std::ops::$trait<T> for &Tensor<T> { // &tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        self.vectorize(|a| a $symbol rhs )
      }
    }

    impl<T: Numeric> std::ops::$trait<T> for Tensor<T> { // tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        &self $symbol rhs
      }
    }

    impl std::ops::$trait<&Tensor<f32>> for f32 { // f32 * &tensor
      type Output = Tensor<f32>;

      fn $meth(self, tensor: &Tensor<f32>) -> Tensor<f32> {
        tensor.vectorize(|a| self $symbol a )
      }
    }

    impl std::ops::$trait<&Tensor<f64>> for f64 { // f64 * &tensor
      type Output = Tensor<f64>;

      fn $meth(self, tensor: &Tensor<f64>) -> Tensor<f64> {
        tensor.vectorize(|a| self $symbol a )
      }
    }
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);
add_operator!(Div, div, /);
add_operator!(Rem, rem, %);
