//! Reading time estimate

use super::post::ContentBlock;

/// Assumed reading speed
pub const WORDS_PER_MINUTE: usize = 200;

/// Count words across every paragraph of every block.
/// A word is a maximal run of non-whitespace characters.
pub fn word_count(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .flat_map(|block| block.body.iter())
        .map(|paragraph| paragraph.text.split_whitespace().count())
        .sum()
}

/// Minutes needed to read the content, rounded up
pub fn reading_time(content: &[ContentBlock]) -> u32 {
    let minutes = word_count(content).div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
