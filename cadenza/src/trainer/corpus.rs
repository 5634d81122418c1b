//! CoNLL-X training corpora.

use std::io::BufRead;

use crate::errors::{CadenzaError, Result};
use crate::graph::{Arc, ArcSet, DependencyGraph};
use crate::numberer::Numberer;
use crate::sentence::{Sentence, Word};

/// A single training sentence with its gold annotation: one head index and
/// one relation label per token, in token order. Head 0 is the artificial
/// root.
#[derive(Clone, Debug)]
pub struct Instance {
    sentence: Sentence,
    heads: Vec<usize>,
    relations: Vec<String>,
}

impl Instance {
    /// Returns the sentence.
    #[inline]
    pub const fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// Returns the gold head index of every token.
    #[inline]
    pub fn heads(&self) -> &[usize] {
        &self.heads
    }

    /// Returns the gold relation label of every token.
    #[inline]
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// Builds the gold dependency graph using the given relation table.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when a relation label is not in the
    /// table.
    pub fn gold_graph(&self, relations: &Numberer<String>) -> Result<DependencyGraph> {
        let mut arcs = ArcSet::new();
        for (i, (&head, relation)) in
            self.heads.iter().zip(&self.relations).enumerate()
        {
            let code = relations.lookup(relation).ok_or_else(|| {
                CadenzaError::invalid_format(
                    "corpus",
                    format!("relation label {relation} is not in the label table"),
                )
            })?;
            arcs.push(Arc::new(head, code, i + 1));
        }
        Ok(DependencyGraph::new(self.sentence.len() + 1, arcs))
    }
}

/// Reads a CoNLL-X corpus: sentences are blank-line separated blocks of
/// tab-separated rows ID, FORM, LEMMA, CPOSTAG, POSTAG, FEATS, HEAD and
/// DEPREL (further columns are ignored). The POSTAG column provides the
/// part of speech. An underscore HEAD marks an unannotated token and is
/// read as 0, which lets the reader load unannotated input for parsing.
///
/// # Errors
///
/// [`CadenzaError`] is returned when a row has too few columns, a
/// non-numeric ID or HEAD, an ID out of sequence, or a HEAD pointing
/// outside the sentence.
pub fn read_conll<R>(rdr: R) -> Result<Vec<Instance>>
where
    R: BufRead,
{
    let mut instances = vec![];
    let mut words = vec![];
    let mut heads = vec![];
    let mut relations = vec![];

    for (lineno, line) in rdr.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            if !words.is_empty() {
                instances.push(finish_block(&mut words, &mut heads, &mut relations)?);
            }
            continue;
        }

        let cols: Vec<_> = line.split('\t').collect();
        if cols.len() < 8 {
            return Err(CadenzaError::invalid_format(
                "corpus",
                format!("line {}: expected at least 8 columns", lineno + 1),
            ));
        }
        let id: usize = cols[0].parse().map_err(|_| {
            CadenzaError::invalid_format(
                "corpus",
                format!("line {}: non-numeric token ID {}", lineno + 1, cols[0]),
            )
        })?;
        if id != words.len() + 1 {
            return Err(CadenzaError::invalid_format(
                "corpus",
                format!("line {}: token ID {id} out of sequence", lineno + 1),
            ));
        }
        let head: usize = if cols[6] == "_" {
            0
        } else {
            cols[6].parse().map_err(|_| {
                CadenzaError::invalid_format(
                    "corpus",
                    format!("line {}: non-numeric head {}", lineno + 1, cols[6]),
                )
            })?
        };

        words.push(Word::new(cols[1], cols[4]));
        heads.push(head);
        relations.push(cols[7].to_string());
    }
    if !words.is_empty() {
        instances.push(finish_block(&mut words, &mut heads, &mut relations)?);
    }
    Ok(instances)
}

fn finish_block(
    words: &mut Vec<Word>,
    heads: &mut Vec<usize>,
    relations: &mut Vec<String>,
) -> Result<Instance> {
    let len = words.len();
    for (i, &head) in heads.iter().enumerate() {
        if head > len {
            return Err(CadenzaError::invalid_format(
                "corpus",
                format!(
                    "token {} has head {head} outside its {len}-token sentence",
                    i + 1
                ),
            ));
        }
        if head == i + 1 {
            return Err(CadenzaError::invalid_format(
                "corpus",
                format!("token {} is its own head", i + 1),
            ));
        }
    }
    Ok(Instance {
        sentence: Sentence::new(std::mem::take(words)),
        heads: std::mem::take(heads),
        relations: std::mem::take(relations),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECONOMIC_NEWS: &str = "\
1\tEconomic\t_\tJJ\tJJ\t_\t2\tATT\t_\t_
2\tnews\t_\tNN\tNN\t_\t3\tSBJ\t_\t_
3\thad\t_\tVBD\tVBD\t_\t0\tROOT\t_\t_
4\tlittle\t_\tJJ\tJJ\t_\t5\tATT\t_\t_
5\teffect\t_\tNN\tNN\t_\t3\tOBJ\t_\t_
";

    #[test]
    fn test_read_single_sentence() {
        let instances = read_conll(ECONOMIC_NEWS.as_bytes()).unwrap();
        assert_eq!(instances.len(), 1);

        let instance = &instances[0];
        assert_eq!(instance.sentence().len(), 5);
        assert_eq!(instance.sentence().words()[2].form(), "had");
        assert_eq!(instance.sentence().words()[2].pos(), "VBD");
        assert_eq!(instance.heads(), &[2, 3, 0, 5, 3]);
        assert_eq!(instance.relations()[2], "ROOT");
    }

    #[test]
    fn test_read_two_sentences_with_trailing_blank() {
        let corpus = format!("{ECONOMIC_NEWS}\n{ECONOMIC_NEWS}\n\n");
        let instances = read_conll(corpus.as_bytes()).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1].sentence().len(), 5);
    }

    #[test]
    fn test_gold_graph_uses_label_codes() {
        let instances = read_conll(ECONOMIC_NEWS.as_bytes()).unwrap();
        let mut relations = Numberer::new();
        for label in ["ATT", "SBJ", "ROOT", "OBJ"] {
            relations.number(&label.to_string());
        }
        let gold = instances[0].gold_graph(&relations).unwrap();
        assert_eq!(gold.num_nodes(), 6);
        assert_eq!(gold.arcs().len(), 5);
        let root_arc = gold.arcs().head_of(3).unwrap();
        assert_eq!(root_arc.head, 0);
        assert_eq!(root_arc.relation, relations.lookup(&"ROOT".to_string()).unwrap());
    }

    #[test]
    fn test_gold_graph_rejects_unknown_label() {
        let instances = read_conll(ECONOMIC_NEWS.as_bytes()).unwrap();
        let relations = Numberer::new();
        assert!(instances[0].gold_graph(&relations).is_err());
    }

    #[test]
    fn test_too_few_columns() {
        assert!(read_conll("1\tEconomic\tJJ\n".as_bytes()).is_err());
    }

    #[test]
    fn test_id_out_of_sequence() {
        let corpus = "1\ta\t_\tX\tX\t_\t0\tROOT\t_\t_\n3\tb\t_\tX\tX\t_\t1\tDEP\t_\t_\n";
        assert!(read_conll(corpus.as_bytes()).is_err());
    }

    #[test]
    fn test_head_outside_sentence() {
        let corpus = "1\ta\t_\tX\tX\t_\t9\tROOT\t_\t_\n";
        assert!(read_conll(corpus.as_bytes()).is_err());
    }

    #[test]
    fn test_self_headed_token() {
        let corpus = "1\ta\t_\tX\tX\t_\t1\tDEP\t_\t_\n";
        assert!(read_conll(corpus.as_bytes()).is_err());
    }
}
