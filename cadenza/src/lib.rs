//! Cadenza is a transition-based dependency parser with beam search and
//! structured-perceptron training.
//!
//! A sentence is parsed by a greedy state machine (arc-standard or
//! arc-eager) whose transitions are scored by a sparse linear model over
//! hashed features. Beam search keeps the best partial derivations at each
//! step; training follows the early-update scheme of Collins and Roark,
//! updating the weights the moment the gold derivation falls off the beam.
//!
//! # Examples
//!
//! Training a model on a CoNLL-X corpus and parsing with it:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use cadenza::{read_conll, Parser, SystemKind, Trainer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let instances = read_conll(BufReader::new(File::open("train.conll")?))?;
//! let model = Trainer::new(SystemKind::ArcEager).train(&instances)?;
//!
//! let parser = Parser::new(model)?;
//! let attachments = parser.parse(instances[0].sentence())?;
//! for (word, attachment) in instances[0].sentence().words().iter().zip(&attachments) {
//!     println!("{}\t{}\t{}", word.form(), attachment.head(), attachment.relation());
//! }
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

mod common;
pub mod errors;
pub mod features;
pub mod graph;
pub mod model;
pub mod numberer;
pub mod parser;
pub mod search;
pub mod sentence;
pub mod system;
pub mod trainer;


pub use model::Model;
pub use parser::{Attachment, Parser};
pub use sentence::{Sentence, Word};
pub use system::SystemKind;
pub use trainer::{read_conll, Instance, Trainer};
