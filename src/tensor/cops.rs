use crate::{
  scalar::Numeric,
  ops::Cops,
};


/// Reference triple loop, used when the `unsafe` feature is disabled.

#[allow(clippy::too_many_arguments, dead_code)]
fn naive_gemm<T: Numeric>(
  m: usize, k: usize, n: usize,
  a: &[T], a_offset: usize, rsa: isize, csa: isize,
  b: &[T], b_offset: usize, rsb: isize, csb: isize,
  c: &mut [T],
) {
  let at = |i: usize, j: usize| a[(a_offset as isize + i as isize * rsa + j as isize * csa) as usize];
  let bt = |i: usize, j: usize| b[(b_offset as isize + i as isize * rsb + j as isize * csb) as usize];
  for i in 0..m {
    for j in 0..n {
      let mut acc = T::zero();
      for l in 0..k {
        acc += at(i, l) * bt(l, j);
      }
      c[i * n + j] = acc;
    }
  }
}

macro_rules! impl_cops {
  ($type:ty, $kernel:ident) => {
    impl Cops for $type {
      #[cfg(feature = "unsafe")]
      fn gemm(
        m: usize, k: usize, n: usize,
        a: &[$type], a_offset: usize, rsa: isize, csa: isize,
        b: &[$type], b_offset: usize, rsb: isize, csb: isize,
        c: &mut [$type],
      ) {
        assert!(c.len() >= m * n);
        if m == 0 || n == 0 { return }
        // matrixmultiply addresses the operands through raw pointers,
        // so every element it may touch has to lie inside the slices
        let last = |offset: usize, rs: isize, cs: isize, rows: usize, cols: usize|
          offset as isize + rows.saturating_sub(1) as isize * rs + cols.saturating_sub(1) as isize * cs;
        assert!(k == 0 || (last(a_offset, rsa, csa, m, k) as usize) < a.len());
        assert!(k == 0 || (last(b_offset, rsb, csb, k, n) as usize) < b.len());
        unsafe {
          matrixmultiply::$kernel(
            m, k, n,
            1.0,
            a.as_ptr().add(a_offset), rsa, csa,
            b.as_ptr().add(b_offset), rsb, csb,
            0.0,
            c.as_mut_ptr(), n as isize, 1,
          );
        }
      }

      #[cfg(not(feature = "unsafe"))]
      fn gemm(
        m: usize, k: usize, n: usize,
        a: &[$type], a_offset: usize, rsa: isize, csa: isize,
        b: &[$type], b_offset: usize, rsb: isize, csb: isize,
        c: &mut [$type],
      ) {
        naive_gemm(m, k, n, a, a_offset, rsa, csa, b, b_offset, rsb, csb, c);
      }
    }
  };
}

impl_cops!(f32, sgemm);
impl_cops!(f64, dgemm);


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ Tensor, ops::{ BaseOps, NumericOps } };

  #[test]
  fn matmul() {
    let x = Tensor::new(&[2,3], vec![1., 2., 3., 4., 5., 6.]);
    let y = Tensor::new(&[3,2], vec![1., 2., 3., 4., 5., 6.]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,2], vec![22., 28., 49., 64.]));
  }

  #[test]
  fn matmul_vector() {
    let x = Tensor::vec(&[1.0_f32, 2., 3.]);
    let y = Tensor::new(&[3,2], vec![1., 2., 3., 4., 5., 6.]);
    assert_eq!(x.mm(&y), Tensor::vec(&[22., 28.]));
  }

  #[test]
  fn matmul_strided() {
    let x = Tensor::new(&[3,2], vec![1., 4., 2., 5., 3., 6.]).transpose(0, 1);
    let y = Tensor::new(&[3,1], vec![1., 2., 3.]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,1], vec![14., 32.]));

    let rows = Tensor::new(&[4,3], vec![
      0., 0., 0.,
      1., 2., 3.,
      4., 5., 6.,
      0., 0., 0.,
    ]).range(1..3);
    assert_eq!(rows.mm(&y), Tensor::new(&[2,1], vec![14., 32.]));
  }

  #[test]
  fn naive_matches_kernel() {
    let a = [1.0_f64, 2., 3., 4., 5., 6.];
    let b = [1.0_f64, 2., 3., 4., 5., 6.];
    let mut naive = [0.0; 4];
    naive_gemm(2, 3, 2, &a, 0, 3, 1, &b, 0, 2, 1, &mut naive);
    let mut kernel = [0.0; 4];
    f64::gemm(2, 3, 2, &a, 0, 3, 1, &b, 0, 2, 1, &mut kernel);
    assert_eq!(naive, kernel);
  }
}
