use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;

use cadenza::{read_conll, Model, Parser};

#[derive(ClapParser, Debug)]
#[clap(name = "parse", about = "Dependency parser")]
struct Args {
    /// Trained model file.
    #[clap(short = 'i', long)]
    model: PathBuf,

    /// Input in CoNLL-X format; underscore HEAD columns are accepted.
    /// Reads the standard input when omitted.
    #[clap(short = 't', long)]
    input: Option<PathBuf>,

    /// Beam width, overriding the one stored in the model.
    #[clap(short = 'b', long)]
    beam_width: Option<usize>,

    /// Expand beam candidates in parallel.
    #[clap(long)]
    parallel: bool,

    /// Report attachment scores against the HEAD and DEPREL columns of the
    /// input.
    #[clap(short = 'e', long)]
    evaluate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Loading the model...");
    let model = Model::read(BufReader::new(File::open(args.model)?))?;
    let mut parser = Parser::new(model)?.parallel(args.parallel);
    if let Some(width) = args.beam_width {
        parser = parser.beam_width(width)?;
    }
    eprintln!("Ready to parse");

    let instances = match args.input {
        Some(path) => read_conll(BufReader::new(File::open(path)?))?,
        None => read_conll(std::io::stdin().lock())?,
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut tokens = 0usize;
    let mut heads_correct = 0usize;
    let mut labels_correct = 0usize;

    for instance in &instances {
        let attachments = parser.parse(instance.sentence())?;
        for (i, (word, attachment)) in instance
            .sentence()
            .words()
            .iter()
            .zip(&attachments)
            .enumerate()
        {
            writeln!(
                out,
                "{}\t{}\t_\t{}\t{}\t_\t{}\t{}\t_\t_",
                i + 1,
                word.form(),
                word.pos(),
                word.pos(),
                attachment.head(),
                attachment.relation(),
            )?;
            if args.evaluate {
                tokens += 1;
                if attachment.head() == instance.heads()[i] {
                    heads_correct += 1;
                    if attachment.relation() == instance.relations()[i] {
                        labels_correct += 1;
                    }
                }
            }
        }
        writeln!(out)?;
    }
    out.flush()?;

    if args.evaluate && tokens != 0 {
        eprintln!(
            "UAS: {:.4} ({heads_correct}/{tokens})",
            heads_correct as f64 / tokens as f64
        );
        eprintln!(
            "LAS: {:.4} ({labels_correct}/{tokens})",
            labels_correct as f64 / tokens as f64
        );
    }

    Ok(())
}
