//! Softmax classification of handwritten digits.
//! Small. Few dependencies. CPU only.
//!
//! # Features
//!
//! - **Two softmax modes**: [softmax::softmax] computes the textbook formula
//! for displaying probabilities, while the loss in [loss] takes raw logits and
//! fuses the normalisation into a log-sum-exp that never overflows.
//!
//! - **Broadcasting**: Tensors with differing but compatible shapes get
//! broadcasted to matching dimensions automatically for elementwise operations.
//!
//! - **Zero-copy views**: Tensors may be sliced, indexed, reshaped, transposed and
//! broadcasted without copying any data.
//!
//! - **Caller-owned parameters**: A [Sequential] model only describes its layers.
//! Weights live in [Params], created deterministically from a [Config] seed.
//!
//! # Examples
//!
//! Turning logits into probabilities and a prediction:
//! ```
//! use digitnet::softmax::{ softmax, argmax };
//!
//! let logits = [1.0, 2.0, 3.0, 4.0];
//! let p = softmax(&logits).unwrap();
//! assert!(p.windows(2).all(|w| w[0] < w[1] ));
//! assert_eq!(argmax(&p).unwrap(), argmax(&logits).unwrap());
//! ```
//!
//! Evaluating the digit model:
//! ```
//! use digitnet::{ Config, Sequential, Tensor, Params };
//! use digitnet::loss::sparse_categorical_crossentropy;
//!
//! let model = Sequential::digits();
//! assert_eq!(model.param_count(), 10_575);
//!
//! let params: Params<f32> = model.init_params(&Config::default());
//! let x = Tensor::ones(&[2, 400]);
//! let logits = model.forward(&params, &x).unwrap();
//! assert_eq!(logits.dims(), &[2, 10]);
//!
//! // Loss is computed from logits, not from displayed probabilities
//! let labels = Tensor::vec(&[3_u8, 7]);
//! let loss = sparse_categorical_crossentropy(&logits, &labels, true).unwrap();
//! assert!(loss.is_finite());
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for runnable programs.
//!
//!
//! # Optional features
//!
//! Some features can be toggled in your `Cargo.toml`.
//!
//! - `unsafe` *(default)*: Accelerated matrix math using [matrixmultiply] crate.
//! - `rayon`: Softmax rows and prediction batches are processed in parallel.

mod internal;
mod shape;
mod tensor;
mod error;

pub mod ops;
pub mod scalar;
pub mod softmax;
pub mod loss;
pub mod activation;
pub mod layer;
pub mod model;
pub mod data;
pub mod config;

pub use shape::Shape;
pub use tensor::Tensor;
pub use error::{ Error, Result };
pub use config::Config;
pub use activation::Activation;
pub use layer::{ Dense, DenseParams, Layer };
pub use model::{ Sequential, Params, Misprediction };
pub use data::Dataset;
