use crate::util::{
    captures::Captures,
    search::{Input, Match, MatchError},
};

/// A searcher for advancing through all non-overlapping matches in a
/// haystack.
///
/// In theory iterating over matches is simple: search from `0`, report the
/// match, continue searching from the match end, stop on the first failed
/// search. That loop breaks as soon as the pattern can match the empty
/// string: an empty match ends where it started, and the next search would
/// never advance. A `Searcher` knows how to detect an empty match that
/// overlaps the previous match and forcefully advances past it, one char at
/// a time.
///
/// This is the shared implementation behind the iterators returned by
/// [`Regex::find_iter`](crate::Regex::find_iter) and
/// [`Regex::captures_iter`](crate::Regex::captures_iter); those should be
/// preferred when they fit. A `Searcher` is not itself an iterator: it
/// exposes `advance` routines that take a closure running the actual search,
/// plus `into_*_iter` adapters producing conventional iterators. The
/// searcher owns its position, so iteration can be resumed from any earlier
/// match's end offset by constructing a new `Searcher` whose input span
/// starts there.
///
/// The `'h` lifetime is the haystack, via the [`Input`] type.
#[derive(Clone, Debug)]
pub struct Searcher<'h> {
    /// The search parameters, with `start` bumped after every match.
    input: Input<'h>,
    /// The end offset of the most recent match. Used to refuse an empty
    /// match that overlaps the end of the previous match.
    last_match_end: Option<usize>,
}

impl<'h> Searcher<'h> {
    /// Create a new searcher over the given input. Iteration begins at the
    /// input's current start offset.
    pub fn new(input: Input<'h>) -> Searcher<'h> {
        Searcher { input, last_match_end: None }
    }

    /// Return the next non-overlapping match, using `finder` to run each
    /// underlying search.
    ///
    /// # Panics
    ///
    /// This panics when `finder` reports a [`MatchError`]. Use
    /// [`Searcher::try_advance`] to handle errors.
    #[inline]
    pub fn advance<F>(&mut self, finder: F) -> Option<Match>
    where
        F: FnMut(&Input<'_>) -> Result<Option<Match>, MatchError>,
    {
        match self.try_advance(finder) {
            Ok(m) => m,
            Err(err) => panic!(
                "unexpected regex find error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            ),
        }
    }

    /// Return the next non-overlapping match, using `finder` to run each
    /// underlying search and propagating any error it reports.
    #[inline]
    pub fn try_advance<F>(
        &mut self,
        mut finder: F,
    ) -> Result<Option<Match>, MatchError>
    where
        F: FnMut(&Input<'_>) -> Result<Option<Match>, MatchError>,
    {
        let mut m = match finder(&self.input)? {
            None => return Ok(None),
            Some(m) => m,
        };
        if m.is_empty() && Some(m.end()) == self.last_match_end {
            // An empty match that ends where the previous match ended would
            // overlap it and stall iteration. Skip one char and retry.
            self.input.set_start(next_char_boundary(
                self.input.haystack(),
                self.input.start(),
            ));
            m = match finder(&self.input)? {
                None => return Ok(None),
                Some(m) => m,
            };
        }
        if m.is_empty() {
            // The next search must make progress even though this match
            // consumed nothing.
            self.input
                .set_start(next_char_boundary(self.input.haystack(), m.end()));
        } else {
            self.input.set_start(m.end());
        }
        self.last_match_end = Some(m.end());
        Ok(Some(m))
    }

    /// Convert this searcher into a fallible iterator of matches.
    #[inline]
    pub fn into_matches_iter<F>(self, finder: F) -> TryMatchesIter<'h, F>
    where
        F: FnMut(&Input<'_>) -> Result<Option<Match>, MatchError>,
    {
        TryMatchesIter { it: self, finder }
    }

    /// Convert this searcher into a fallible iterator of captures, where
    /// `finder` fills in the given `Captures` on each search.
    #[inline]
    pub fn into_captures_iter<F>(
        self,
        caps: Captures,
        finder: F,
    ) -> TryCapturesIter<'h, F>
    where
        F: FnMut(&Input<'_>, &mut Captures) -> Result<(), MatchError>,
    {
        TryCapturesIter { it: self, caps, finder }
    }
}

/// Returns the smallest offset greater than `at` that is a char boundary of
/// `haystack`, or `haystack.len() + 1` when there is none. The latter makes
/// the input span invalid, which ends iteration.
fn next_char_boundary(haystack: &str, at: usize) -> usize {
    let mut at = at + 1;
    while at < haystack.len() && !haystack.is_char_boundary(at) {
        at += 1;
    }
    at
}

/// An iterator over all non-overlapping matches for a fallible search,
/// created by [`Searcher::into_matches_iter`].
///
/// The iterator yields `Result<Match, MatchError>` values until no more
/// matches can be found. `F` is the closure that executes the underlying
/// search and `'h` is the lifetime of the haystack.
pub struct TryMatchesIter<'h, F> {
    it: Searcher<'h>,
    finder: F,
}

impl<'h, F> TryMatchesIter<'h, F> {
    /// Return an infallible version of this iterator that panics on error.
    /// Useful when the backtrack limit is known to be unreachable.
    pub fn infallible(self) -> MatchesIter<'h, F> {
        MatchesIter(self)
    }
}

impl<'h, F> Iterator for TryMatchesIter<'h, F>
where
    F: FnMut(&Input<'_>) -> Result<Option<Match>, MatchError>,
{
    type Item = Result<Match, MatchError>;

    #[inline]
    fn next(&mut self) -> Option<Result<Match, MatchError>> {
        self.it.try_advance(&mut self.finder).transpose()
    }
}

impl<'h, F> core::fmt::Debug for TryMatchesIter<'h, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TryMatchesIter")
            .field("it", &self.it)
            .field("finder", &"<closure>")
            .finish()
    }
}

/// An iterator over all non-overlapping matches for an infallible search,
/// created by [`TryMatchesIter::infallible`]. Panics if the underlying
/// search reports an error.
#[derive(Debug)]
pub struct MatchesIter<'h, F>(TryMatchesIter<'h, F>);

impl<'h, F> Iterator for MatchesIter<'h, F>
where
    F: FnMut(&Input<'_>) -> Result<Option<Match>, MatchError>,
{
    type Item = Match;

    #[inline]
    fn next(&mut self) -> Option<Match> {
        match self.0.next()? {
            Ok(m) => Some(m),
            Err(err) => panic!(
                "unexpected regex find error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            ),
        }
    }
}

/// An iterator over all non-overlapping capture matches for a fallible
/// search, created by [`Searcher::into_captures_iter`].
pub struct TryCapturesIter<'h, F> {
    it: Searcher<'h>,
    caps: Captures,
    finder: F,
}

impl<'h, F> TryCapturesIter<'h, F> {
    /// Return an infallible version of this iterator that panics on error.
    pub fn infallible(self) -> CapturesIter<'h, F> {
        CapturesIter(self)
    }
}

impl<'h, F> Iterator for TryCapturesIter<'h, F>
where
    F: FnMut(&Input<'_>, &mut Captures) -> Result<(), MatchError>,
{
    type Item = Result<Captures, MatchError>;

    #[inline]
    fn next(&mut self) -> Option<Result<Captures, MatchError>> {
        let TryCapturesIter { ref mut it, ref mut caps, ref mut finder } =
            *self;
        let result = it
            .try_advance(|input| {
                (finder)(input, caps)?;
                Ok(caps.get_match())
            })
            .transpose()?;
        match result {
            Ok(_) => Some(Ok(caps.clone())),
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'h, F> core::fmt::Debug for TryCapturesIter<'h, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TryCapturesIter")
            .field("it", &self.it)
            .field("caps", &self.caps)
            .field("finder", &"<closure>")
            .finish()
    }
}

/// An iterator over all non-overlapping capture matches for an infallible
/// search, created by [`TryCapturesIter::infallible`]. Panics if the
/// underlying search reports an error.
#[derive(Debug)]
pub struct CapturesIter<'h, F>(TryCapturesIter<'h, F>);

impl<'h, F> Iterator for CapturesIter<'h, F>
where
    F: FnMut(&Input<'_>, &mut Captures) -> Result<(), MatchError>,
{
    type Item = Captures;

    #[inline]
    fn next(&mut self) -> Option<Captures> {
        match self.0.next()? {
            Ok(caps) => Some(caps),
            Err(err) => panic!(
                "unexpected regex captures error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::search::Span;

    // A fake regex that matches the empty string at every position.
    fn empty_at(input: &Input<'_>) -> Result<Option<Match>, MatchError> {
        if input.start() > input.end() {
            return Ok(None);
        }
        Ok(Some(Match::new(Span {
            start: input.start(),
            end: input.start(),
        })))
    }

    #[test]
    fn empty_matches_always_advance() {
        let searcher = Searcher::new(Input::new("ab"));
        let spans: Vec<Match> =
            searcher.into_matches_iter(empty_at).infallible().collect();
        assert_eq!(
            vec![Match::new(0..0), Match::new(1..1), Match::new(2..2)],
            spans,
        );
    }

    #[test]
    fn empty_matches_skip_whole_chars() {
        let searcher = Searcher::new(Input::new("α"));
        let spans: Vec<Match> =
            searcher.into_matches_iter(empty_at).infallible().collect();
        // No match may be reported inside the two-byte 'α'.
        assert_eq!(vec![Match::new(0..0), Match::new(2..2)], spans);
    }
}
