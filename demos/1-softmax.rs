// This example contrasts the two ways of using softmax: directly, to show
// probabilities, and fused into the loss, to train on raw logits.

use clap::Parser;
use digitnet::{ Config, Tensor, Result };
use digitnet::softmax::{ softmax, softmax_stable, argmax };
use digitnet::loss::sparse_categorical_crossentropy;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Logits to transform
  #[arg(num_args = 1.., default_values_t = [1.0, 2.0, 3.0, 4.0])]
  logits: Vec<f64>,
  #[arg(long, default_value_t = 2)]
  precision: usize,
  #[arg(long, default_value_t = log::LevelFilter::Warn)]
  log_level: log::LevelFilter,
}

fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::default()
    .with_precision(args.precision)
    .with_log_level(args.log_level);

  pretty_env_logger::formatted_builder()
    .filter_level(config.log_level)
    .init();

  let a = softmax(&args.logits)?;
  println!("z = {}", config.format(&args.logits));
  println!("a = {}", config.format(&a));
  println!("sum = {:.6}, argmax = {}", a.iter().sum::<f64>(), argmax(&a)?);

  // Large logits break the direct formula, but not the shifted one
  let large: Vec<f64> = args.logits.iter().map(|z| z + 1000.0 ).collect();
  println!("\nz + 1000 directly   = {}", config.format(&softmax(&large)?));
  println!("z + 1000 stabilized = {}", config.format(&softmax_stable(&large)?));

  // For training, the loss consumes logits and does its own normalisation
  let logits = Tensor::new(&[1, large.len()], large);
  let label = argmax(&args.logits)? as u64;
  let loss = sparse_categorical_crossentropy(&logits, &Tensor::vec(&[label]), true)?;
  println!("\nloss(z + 1000, label {label}) from logits = {loss:.6}");

  Ok(())
}
