/// A zero-width assertion.
///
/// An assertion constrains a match position without consuming any input.
/// Some assertions look behind the current position (`Start`, `StartLF`),
/// some look ahead (`End`, `EndLF`) and the word boundary assertions do
/// both.
///
/// Which assertion `^` and `$` compile to depends on whether multi-line
/// mode is enabled; `\b` and `\B` always compile to the word boundary
/// assertions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Look {
    /// The current position is the beginning of the haystack.
    Start,
    /// The current position is the end of the haystack.
    End,
    /// The current position is the beginning of the haystack or immediately
    /// follows a `\n`.
    StartLF,
    /// The current position is the end of the haystack or immediately
    /// precedes a `\n`.
    EndLF,
    /// When tested at position `i`, where `p` is the char before `i` and
    /// `n` the char at `i`, this passes if and only if
    /// `is_word(p) != is_word(n)`. Out-of-bounds neighbors count as
    /// non-word.
    Word,
    /// Same as `Word`, but requires `is_word(p) == is_word(n)`.
    WordNegate,
}

impl Look {
    /// Returns true when the position `at` in `haystack` satisfies this
    /// assertion.
    ///
    /// `at` must lie on a char boundary of the haystack.
    #[inline]
    pub fn matches(self, haystack: &str, at: usize) -> bool {
        match self {
            Look::Start => at == 0,
            Look::End => at == haystack.len(),
            Look::StartLF => {
                at == 0 || haystack.as_bytes()[at - 1] == b'\n'
            }
            Look::EndLF => {
                at == haystack.len() || haystack.as_bytes()[at] == b'\n'
            }
            Look::Word => is_word_before(haystack, at) != is_word_after(haystack, at),
            Look::WordNegate => {
                is_word_before(haystack, at) == is_word_after(haystack, at)
            }
        }
    }
}

/// Returns true when this char can participate in a word boundary, i.e.,
/// when it matches `\w`.
#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[inline]
fn is_word_before(haystack: &str, at: usize) -> bool {
    haystack[..at].chars().next_back().map_or(false, is_word_char)
}

#[inline]
fn is_word_after(haystack: &str, at: usize) -> bool {
    haystack[at..].chars().next().map_or(false, is_word_char)
}
