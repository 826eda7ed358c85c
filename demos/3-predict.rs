// This example loads the digit dataset (`X.npy` with one 20x20 image per
// row, `y.npy` with the labels), draws one image and reports what the
// model makes of it. Parameters are freshly initialized from the seed.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use digitnet::{ Config, Dataset, Error, Params, Sequential, Tensor, Result };
use digitnet::data::render_digit;
use digitnet::loss::sparse_categorical_crossentropy;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Directory holding X.npy and y.npy
  #[arg(long, default_value = "data")]
  data: PathBuf,
  /// Image to predict
  #[arg(long, default_value_t = 1015)]
  index: usize,
  /// Random images to list alongside their predictions
  #[arg(long, default_value_t = 8)]
  samples: usize,
  #[arg(long, default_value_t = 1234)]
  seed: u64,
  #[arg(long, default_value_t = log::LevelFilter::Info)]
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

  let dataset = Dataset::load(&args.data)?;
  if dataset.is_empty() { return Err(Error::EmptyInput) }
  info!("Loaded {} images", dataset.len());

  let model = Sequential::digits();
  let params: Params<f64> = model.init_params(&config);

  let index = args.index.min(dataset.len() - 1);
  let image = dataset.image(index);
  println!("{}\n", render_digit(&image)?);

  let logits = model.forward(&params, &image)?;
  let probabilities = model.predict_proba(&params, &image)?;
  println!("predicting image {index}, labelled {}", dataset.label(index));
  println!("logits:        {}", config.format(&logits.to_vec()));
  println!("probabilities: {}", config.format(&probabilities.to_vec()));
  println!("total of predictions: {:.3}", probabilities.to_vec().iter().sum::<f64>());
  println!("np.argmax(prediction_p): {}", probabilities.argmax().item());

  let loss = sparse_categorical_crossentropy(
    &logits.view(&[1, logits.size()]),
    &Tensor::vec(&[dataset.label(index)]),
    true,
  )?;
  println!("loss from logits: {loss:.4}\n");

  let mut rng = config.rng();
  let samples = dataset.sample(args.samples.max(1), &mut rng)?;
  let rows = Tensor::rows(&samples.iter().map(|&i| dataset.image(i) ).collect::<Vec<_>>());
  let predicted = model.predict_labels(&params, &rows)?;
  for (&i, p) in samples.iter().zip(predicted) {
    println!("image {i:>4}: label {}, predicted {p}", dataset.label(i));
  }

  let errors = model.errors(&params, &dataset)?;
  println!("\n{} errors out of {} images", errors.len(), dataset.len());

  Ok(())
}
