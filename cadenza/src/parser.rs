//! Dependency parsing with a trained model.

use crate::common::ROOT_NODE;
use crate::errors::{CadenzaError, Result};
use crate::features::HashedExtractor;
use crate::model::Model;
use crate::search::Beam;
use crate::sentence::Sentence;
use crate::system::TransitionSystem;

/// The predicted attachment of a single token: the head node index
/// (0 is the artificial root, `i` is token `i - 1`) and the relation label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attachment {
    head: usize,
    relation: String,
}

impl Attachment {
    /// Returns the head node index.
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Returns the relation label.
    #[inline]
    pub fn relation(&self) -> &str {
        &self.relation
    }
}

/// A dependency parser over a trained model.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use cadenza::{Model, Parser, Sentence, Word};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = File::open("parser.model")?;
/// let model = Model::read(reader)?;
/// let parser = Parser::new(model)?;
///
/// let sentence = Sentence::new(vec![
///     Word::new("Markets", "NNS"),
///     Word::new("rallied", "VBD"),
/// ]);
/// for attachment in parser.parse(&sentence)? {
///     println!("{} {}", attachment.head(), attachment.relation());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Parser {
    model: Model,
    system: Box<dyn TransitionSystem>,
    extractor: HashedExtractor,
    beam_width: usize,
    parallel: bool,
}

impl Parser {
    /// Creates a parser from a trained model. The beam width defaults to
    /// the width the model was trained with.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the model carries a zero beam
    /// width or an empty relation table.
    pub fn new(model: Model) -> Result<Self> {
        if model.beam_width() == 0 {
            return Err(CadenzaError::invalid_argument(
                "model",
                "the model carries a zero beam width",
            ));
        }
        if model.table().relations().is_empty() {
            return Err(CadenzaError::invalid_argument(
                "model",
                "the model carries no relation labels",
            ));
        }
        let system = model.system().build(model.table().clone());
        let extractor = HashedExtractor::new(model.feature_dim());
        let beam_width = model.beam_width();
        Ok(Self {
            model,
            system,
            extractor,
            beam_width,
            parallel: false,
        })
    }

    /// Sets the beam width, overriding the trained one.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the width is zero.
    pub fn beam_width(mut self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(CadenzaError::invalid_argument(
                "width",
                "the beam width must be positive",
            ));
        }
        self.beam_width = width;
        Ok(self)
    }

    /// Enables parallel candidate expansion during the beam search.
    pub const fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    /// Returns the model.
    #[inline]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Parses a sentence, returning one attachment per token in sentence
    /// order.
    ///
    /// Tokens the search left unattached, which can only happen when the
    /// derivation hits the round bound, are attached to the root.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the beam search fails to apply a
    /// selected transition.
    pub fn parse(&self, sentence: &Sentence) -> Result<Vec<Attachment>> {
        if sentence.is_empty() {
            return Ok(vec![]);
        }
        let init = self
            .system
            .init(sentence, self.model.forms(), self.model.pos_tags());
        let beam = Beam::new(
            self.system.as_ref(),
            self.model.linear(),
            &self.extractor,
            self.beam_width,
        )?
        .parallel(self.parallel);
        let derivation = beam.decode(init)?;

        let relations = self.model.table().relations();
        let root_relation = self.model.table().root_relation();
        let mut attachments = Vec::with_capacity(sentence.len());
        for i in 0..sentence.len() {
            let node = i + 1;
            let (head, relation) = derivation
                .config()
                .head_of(node)
                .unwrap_or((ROOT_NODE, root_relation));
            let label = relations.value(relation).ok_or_else(|| {
                CadenzaError::invalid_argument(
                    "model",
                    format!("relation code {relation} is not in the label table"),
                )
            })?;
            attachments.push(Attachment {
                head,
                relation: label.clone(),
            });
        }
        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::LinearModel;
    use crate::numberer::Numberer;
    use crate::sentence::Word;
    use crate::system::{SystemKind, TransitionTable};

    fn tiny_model(system: SystemKind) -> Model {
        let mut relations = Numberer::new();
        relations.number(&"DEP".to_string());
        let table = TransitionTable::new(relations, "ROOT").unwrap();

        let mut forms = Numberer::new();
        let mut pos_tags = Numberer::new();
        for (form, pos) in [("a", "X"), ("b", "Y")] {
            forms.number(&form.to_string());
            pos_tags.number(&pos.to_string());
        }
        forms.freeze();
        pos_tags.freeze();

        let linear = LinearModel::new(table.len());
        Model {
            linear,
            system,
            table,
            forms,
            pos_tags,
            feature_dim: 1 << 16,
            beam_width: 4,
        }
    }

    #[test]
    fn test_parse_attaches_every_token() {
        for system in [SystemKind::ArcStandard, SystemKind::ArcEager] {
            let parser = Parser::new(tiny_model(system)).unwrap();
            let sentence =
                Sentence::new(vec![Word::new("a", "X"), Word::new("b", "Y")]);
            let attachments = parser.parse(&sentence).unwrap();
            assert_eq!(attachments.len(), 2);
            for attachment in &attachments {
                assert!(attachment.head() <= 2);
                assert!(!attachment.relation().is_empty());
            }
        }
    }

    #[test]
    fn test_parse_empty_sentence() {
        let parser = Parser::new(tiny_model(SystemKind::ArcStandard)).unwrap();
        assert!(parser.parse(&Sentence::new(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_zero_beam_width_is_rejected() {
        let parser = Parser::new(tiny_model(SystemKind::ArcEager)).unwrap();
        assert!(parser.beam_width(0).is_err());
    }
}
