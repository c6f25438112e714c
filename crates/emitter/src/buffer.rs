//! Deferred emission buffers.

use stackvm_common::Word;

/// An append-only run of Words whose final position is already known.
///
/// `prev_len` is the number of Words that will precede this buffer once it
/// is spliced into the image, fixed when the buffer is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EmissionBuffer {
    pub(crate) words: Vec<Word>,
    pub(crate) prev_len: usize,
}

impl EmissionBuffer {
    pub(crate) fn new(prev_len: usize) -> Self {
        Self {
            words: Vec::new(),
            prev_len,
        }
    }

    /// Global address one past the last Word written so far.
    pub(crate) fn end(&self) -> usize {
        self.prev_len + self.words.len()
    }
}
