//! Representation of input sentences.

/// A single input token with its part-of-speech tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    form: String,
    pos: String,
}

impl Word {
    /// Creates a new word.
    pub fn new<S, T>(form: S, pos: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            form: form.into(),
            pos: pos.into(),
        }
    }

    /// Returns the surface form.
    #[inline]
    pub fn form(&self) -> &str {
        &self.form
    }

    /// Returns the part-of-speech tag.
    #[inline]
    pub fn pos(&self) -> &str {
        &self.pos
    }
}

/// An ordered list of taggable tokens, the input contract of the parser.
///
/// Token `i` of the sentence becomes node `i + 1` of a configuration; node 0
/// is the synthetic root.
#[derive(Clone, Debug, Default)]
pub struct Sentence {
    words: Vec<Word>,
}

impl Sentence {
    /// Creates a sentence from words.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Returns a slice of the words.
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Returns the number of words, excluding the synthetic root.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Checks if the sentence has no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence() {
        let sent = Sentence::new(vec![
            Word::new("Economic", "JJ"),
            Word::new("news", "NN"),
        ]);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent.words()[0].form(), "Economic");
        assert_eq!(sent.words()[1].pos(), "NN");
    }
}
