/*!
 * Worksheet pagination.
 *
 * Splits the sentence list into fixed-size pages. Pages borrow from the
 * sentence slice and hold no state of their own, so they are recomputed
 * whenever the store changes.
 */

/// Sentences per worksheet page
pub const PAGE_SIZE: usize = 6;

/// One worksheet page: a contiguous slice of the sentence list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number
    pub page_number: usize,
    /// Number of pages in the worksheet
    pub total_pages: usize,
    /// 0-based offset of the first sentence within the whole list
    pub starting_index: usize,
    /// Sentences on this page
    pub sentences: &'a [String],
}

impl<'a> Page<'a> {
    /// Number printed in front of the sentence at `local_index`
    pub fn display_number(&self, local_index: usize) -> usize {
        self.starting_index + local_index + 1
    }

    /// Sentences paired with their printed numbers
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.sentences
            .iter()
            .enumerate()
            .map(move |(i, s)| (self.display_number(i), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Number of pages `sentence_count` sentences fill
pub fn page_count(sentence_count: usize, page_size: usize) -> usize {
    sentence_count.div_ceil(page_size.max(1))
}

/// Partition `sentences` into pages of at most `page_size` entries.
///
/// An empty list yields no pages. A `page_size` of zero is treated as one.
pub fn paginate(sentences: &[String], page_size: usize) -> Vec<Page<'_>> {
    let page_size = page_size.max(1);
    let total_pages = page_count(sentences.len(), page_size);

    sentences
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| Page {
            page_number: i + 1,
            total_pages,
            starting_index: i * page_size,
            sentences: chunk,
        })
        .collect()
}
