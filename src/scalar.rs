use rand::distributions::uniform::SampleUniform;
use num_traits::{ Float, PrimInt, NumAssignOps, Num, NumCast };

use crate::ops::Cops;


/// All types that may be used in a [Tensor](crate::Tensor).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug {}
impl<T: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug> Inner for T {}


/// All numeric types.

pub trait Numeric: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum {}
impl<T: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum> Numeric for T {}


/// All signed numeric types.

pub trait Signed: Numeric + num_traits::Signed {}
impl<T: Numeric + num_traits::Signed> Signed for T {}


/// All unsigned numeric types. Class labels live here.

pub trait Unsigned: Numeric + num_traits::Unsigned {}
impl<T: Numeric + num_traits::Unsigned> Unsigned for T {}


/// All integer types.

pub trait Integer: Numeric + PrimInt {}
impl<T: Numeric + PrimInt> Integer for T {}


/// Floating point types that logits, probabilities and weights are stored in.
///
/// In practice this means `f32` and `f64`, the two types with a
/// matrix multiply kernel (see [Cops]).

pub trait Real: Signed + Float + SampleUniform + Cops {}
impl<T: Signed + Float + SampleUniform + Cops> Real for T {}
