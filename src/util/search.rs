use core::ops::Range;

/// The parameters for a single search: the haystack, the sub-span of it to
/// search and whether the match must begin exactly at the span start.
///
/// Every search routine on a [`Regex`](crate::Regex) bottoms out in a call
/// that accepts an `Input`. The convenience routines (`find`, `is_match` and
/// friends) build one internally; callers only need to construct an `Input`
/// themselves for the less common cases:
///
/// * Searching a substring of the haystack while letting look-around
/// assertions see the surrounding context. Slicing the haystack instead
/// would move the positions that `^`, `$` and `\b` observe.
/// * Running an anchored search, i.e., requiring the match to start exactly
/// at `Input::start`. This is how "does the pattern match at offset `i`" is
/// expressed.
///
/// The `'h` lifetime refers to the haystack.
///
/// # Example
///
/// ```
/// use regex_backtrack::{Input, Match, Regex};
///
/// let re = Regex::new(r"\bcat\b")?;
/// let mut cache = re.create_cache();
/// let mut caps = re.create_captures();
///
/// // Slicing the haystack hides the surrounding word characters and the
/// // word boundaries match where they shouldn't.
/// re.try_search(&mut cache, &Input::new(&"concat"[3..]), &mut caps)?;
/// assert_eq!(Some(Match::new(0..3)), caps.get_match());
///
/// // Narrowing the span instead keeps the context visible.
/// re.try_search(&mut cache, &Input::new("concat").span(3..6), &mut caps)?;
/// assert_eq!(None, caps.get_match());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Input<'h> {
    haystack: &'h str,
    span: Span,
    anchored: bool,
}

impl<'h> Input<'h> {
    /// Create a new unanchored search configuration for the given haystack
    /// that spans all of it.
    #[inline]
    pub fn new(haystack: &'h str) -> Input<'h> {
        Input {
            haystack,
            span: Span { start: 0, end: haystack.len() },
            anchored: false,
        }
    }

    /// Set the span for this search.
    ///
    /// This routine is generic over how a span is provided. While a [`Span`]
    /// may be given directly, one may also provide a
    /// `std::ops::Range<usize>`.
    ///
    /// The span is not validated here. If it is out of bounds or does not
    /// fall on char boundaries of the haystack, the search that uses this
    /// input reports no match.
    #[inline]
    pub fn span<S: Into<Span>>(mut self, span: S) -> Input<'h> {
        self.set_span(span);
        self
    }

    /// Like [`Input::span`], but accepts a range directly.
    #[inline]
    pub fn range(mut self, range: Range<usize>) -> Input<'h> {
        self.set_span(Span::from(range));
        self
    }

    /// Whether the match must start exactly at the beginning of the span.
    ///
    /// When disabled (the default), the search retries the pattern at each
    /// successive position in the span until a match is found or the span is
    /// exhausted.
    #[inline]
    pub fn anchored(mut self, yes: bool) -> Input<'h> {
        self.set_anchored(yes);
        self
    }

    /// Set the span for this search configuration in place.
    #[inline]
    pub fn set_span<S: Into<Span>>(&mut self, span: S) {
        self.span = span.into();
    }

    /// Set the starting offset of the span in place.
    #[inline]
    pub fn set_start(&mut self, start: usize) {
        self.span.start = start;
    }

    /// Set the anchored mode in place.
    #[inline]
    pub fn set_anchored(&mut self, yes: bool) {
        self.anchored = yes;
    }

    /// Return the haystack being searched.
    #[inline]
    pub fn haystack(&self) -> &'h str {
        self.haystack
    }

    /// Return the span of the haystack being searched.
    #[inline]
    pub fn get_span(&self) -> Span {
        self.span
    }

    /// Return the starting offset of the span.
    #[inline]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Return the ending offset of the span.
    #[inline]
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Return the anchored mode of this search configuration.
    #[inline]
    pub fn get_anchored(&self) -> bool {
        self.anchored
    }

    /// Returns true when the span is valid for the haystack: in bounds, not
    /// inverted and with both endpoints on char boundaries.
    #[inline]
    pub(crate) fn is_valid_span(&self) -> bool {
        self.span.start <= self.span.end
            && self.span.end <= self.haystack.len()
            && self.haystack.is_char_boundary(self.span.start)
            && self.haystack.is_char_boundary(self.span.end)
    }
}

impl<'h> core::fmt::Debug for Input<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Input")
            .field("haystack", &self.haystack)
            .field("span", &self.span)
            .field("anchored", &self.anchored)
            .finish()
    }
}

/// A contiguous range of byte offsets into a haystack.
///
/// This is equivalent to `std::ops::Range<usize>`, except it is `Copy`,
/// which makes it much more ergonomic to pass around as part of match
/// results. Like a range, a `Span` can be used to index a `str`, and
/// `From<Range<usize>>` is provided so that `Span::from(5..10)` works.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    /// The start offset of the span, inclusive.
    pub start: usize,
    /// The end offset of the span, exclusive.
    pub end: usize,
}

impl Span {
    /// Returns this span as a range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        Range::from(*self)
    }

    /// Returns true when this span is empty, i.e., when `start >= end`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns the length of this span, in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

impl core::ops::Index<Span> for str {
    type Output = str;

    #[inline]
    fn index(&self, index: Span) -> &str {
        &self[index.range()]
    }
}

impl From<Range<usize>> for Span {
    #[inline]
    fn from(range: Range<usize>) -> Span {
        Span { start: range.start, end: range.end }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Range<usize> {
        Range { start: span.start, end: span.end }
    }
}

impl PartialEq<Range<usize>> for Span {
    #[inline]
    fn eq(&self, range: &Range<usize>) -> bool {
        self.start == range.start && self.end == range.end
    }
}

impl PartialEq<Span> for Range<usize> {
    #[inline]
    fn eq(&self, span: &Span) -> bool {
        self.start == span.start && self.end == span.end
    }
}

/// A successful match reported by the backtracking interpreter.
///
/// A match carries the overall span only. To get the spans of individual
/// capturing groups, use the [`Captures`](crate::Captures)-based search
/// routines instead.
///
/// Every match guarantees `start() <= end()`, with both offsets falling on
/// char boundaries of the haystack that produced it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    span: Span,
}

impl Match {
    /// Create a new match from a span.
    ///
    /// This constructor is generic over how a span is provided. While a
    /// [`Span`] may be given directly, one may also provide a
    /// `std::ops::Range<usize>`.
    ///
    /// # Panics
    ///
    /// This panics if `end < start`.
    #[inline]
    pub fn new<S: Into<Span>>(span: S) -> Match {
        let span = span.into();
        assert!(span.start <= span.end, "invalid match span");
        Match { span }
    }

    /// The starting position of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// The ending position of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Returns the match span as a range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    /// Returns the span for this match.
    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns true when the span in this match is empty.
    ///
    /// An empty match can only be reported when the pattern itself can
    /// match the empty string.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// An error that occurred during a search.
///
/// "The pattern did not match" is deliberately *not* an error: fallible
/// search routines return `Result<Option<Match>, MatchError>`, where
/// `Ok(None)` is the expected negative outcome and a `MatchError` means the
/// search could not run to completion. The only way to observe a
/// `MatchError` today is to exhaust the configured backtracking step budget,
/// which distinguishes "this would never match" from "this search is
/// pathologically expensive."
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MatchError {
    /// The search gave up after executing more backtracking steps than the
    /// configured limit allows. This is the safety valve against
    /// catastrophic backtracking, e.g., nested unbounded quantifiers over
    /// ambiguous alternatives such as `(a+)+$`.
    ///
    /// Callers that need to bound worst-case search latency should lower
    /// the limit via
    /// [`Config::backtrack_limit`](crate::Config::backtrack_limit).
    BacktrackLimit {
        /// The configured limit on backtracking steps.
        limit: usize,
    },
}

impl std::error::Error for MatchError {}

impl core::fmt::Display for MatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            MatchError::BacktrackLimit { limit } => write!(
                f,
                "search exceeded the backtrack step limit of {}",
                limit,
            ),
        }
    }
}
