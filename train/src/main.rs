use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;

use cadenza::{read_conll, SystemKind, Trainer};

#[derive(Parser, Debug)]
#[clap(name = "train", about = "Model trainer")]
struct Args {
    /// Training corpus in CoNLL-X format.
    #[clap(short = 't', long)]
    corpus: PathBuf,

    /// A file to which the model is output.
    #[clap(short = 'o', long)]
    model_out: PathBuf,

    /// Transition system: arc-standard or arc-eager.
    #[clap(short = 's', long, default_value = "arc-eager")]
    system: SystemKind,

    /// Number of passes over the corpus.
    #[clap(long, default_value = "10")]
    iterations: usize,

    /// Beam width used during training and stored in the model.
    #[clap(short = 'b', long, default_value = "8")]
    beam_width: usize,

    /// Size of the hashed feature space, rounded down to a power of two.
    #[clap(long, default_value = "4194304")]
    feature_dim: u32,

    /// Relation label of the arc drawn from the artificial root.
    #[clap(long, default_value = "ROOT")]
    root_label: String,

    /// Expand beam candidates in parallel.
    #[clap(long)]
    parallel: bool,

    /// Skip sentences whose gold tree the oracle cannot derive instead of
    /// aborting.
    #[clap(long)]
    skip_invalid: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Reading the corpus...");
    let corpus_rdr = BufReader::new(File::open(args.corpus)?);
    let instances = read_conll(corpus_rdr)?;
    eprintln!("{} sentences read", instances.len());

    let trainer = Trainer::new(args.system)
        .iterations(args.iterations)?
        .beam_width(args.beam_width)?
        .feature_dim(args.feature_dim)
        .root_label(args.root_label)
        .parallel(args.parallel)
        .skip_invalid(args.skip_invalid);

    let model = trainer.train(&instances)?;

    eprintln!("Writing the model...");
    let num_bytes = model.write(File::create(args.model_out)?)?;
    eprintln!("{num_bytes} bytes written");

    Ok(())
}
