use log::debug;

use crate::errors::StoreError;

// @module: Ordered, editable collection of worksheet sentences

/// The single ordered list every sentence source appends to.
///
/// Positions are 0-based. Every successful mutation bumps the revision so
/// dependents (pagination, rendered handles) can tell when to recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceStore {
    // @field: Sentences in insertion order
    sentences: Vec<String>,

    // @field: Mutation counter
    revision: u64,
}

impl SentenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every non-blank sentence, in the given order.
    ///
    /// Entries that are empty after trimming are skipped; kept entries are
    /// stored verbatim. Returns how many sentences were added.
    pub fn append_all<I, S>(&mut self, new_sentences: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.sentences.len();
        self.sentences.extend(
            new_sentences
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty()),
        );

        let added = self.sentences.len() - before;
        if added > 0 {
            self.revision += 1;
            debug!("Appended {} sentences (total {})", added, self.sentences.len());
        }
        added
    }

    /// Append each line of a multi-line text block, dropping blank lines
    pub fn ingest_text(&mut self, text: &str) -> usize {
        self.append_all(text.lines())
    }

    /// Replace the text at `position` verbatim
    pub fn edit(&mut self, position: usize, new_text: impl Into<String>) -> Result<(), StoreError> {
        let len = self.sentences.len();
        let slot = self
            .sentences
            .get_mut(position)
            .ok_or(StoreError::OutOfRange { position, len })?;
        *slot = new_text.into();
        self.revision += 1;
        Ok(())
    }

    /// Remove the sentence at `position`; later sentences move up by one
    pub fn delete(&mut self, position: usize) -> Result<String, StoreError> {
        if position >= self.sentences.len() {
            return Err(StoreError::OutOfRange {
                position,
                len: self.sentences.len(),
            });
        }
        let removed = self.sentences.remove(position);
        self.revision += 1;
        debug!("Deleted sentence {} (total {})", position, self.sentences.len());
        Ok(removed)
    }

    /// Remove every sentence
    pub fn reset(&mut self) {
        if !self.sentences.is_empty() {
            self.sentences.clear();
            self.revision += 1;
        }
    }

    /// Owned copy of the current sentences
    pub fn snapshot(&self) -> Vec<String> {
        self.sentences.clone()
    }

    /// Borrowed view of the current sentences
    pub fn as_slice(&self) -> &[String] {
        &self.sentences
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.sentences.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Number of successful mutations since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
