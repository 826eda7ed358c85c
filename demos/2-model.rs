// This example builds the digit classifier, prints its summary and
// runs a batch of random images through freshly initialized parameters.

use clap::Parser;
use digitnet::{ Config, Params, Sequential, Tensor, Result };

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
  #[arg(long, default_value_t = 1234)]
  seed: u64,
  #[arg(long, default_value_t = 4)]
  batch: usize,
  #[arg(long, default_value_t = log::LevelFilter::Error)]
  log_level: log::LevelFilter,
}

fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::default()
    .with_seed(args.seed)
    .with_log_level(args.log_level);

  pretty_env_logger::formatted_builder()
    .filter_level(config.log_level)
    .init();

  let model = Sequential::digits();
  println!("{model}\n");

  let params: Params<f32> = model.init_params(&config);
  for (i, p) in params.layers.iter().enumerate() {
    println!("W{} shape = {:?}, b{} shape = {:?}", i + 1, p.weights.dims(), i + 1, p.bias.dims());
  }

  let x = Tensor::uniform(&[args.batch, model.input_dim], 0.0, 1.0, &mut config.rng());
  let logits = model.forward(&params, &x)?;
  let probabilities = model.predict_proba(&params, &x)?;
  println!();
  for (i, (z, p)) in logits.iter().zip(probabilities.iter()).enumerate() {
    println!("image {i}: logits {}", config.format(&z.to_vec()));
    println!("         probabilities {} -> {}", config.format(&p.to_vec()), p.argmax().item());
  }

  Ok(())
}
