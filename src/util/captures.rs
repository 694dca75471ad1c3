use crate::util::{
    primitives::{NonMaxUsize, Slot},
    search::{Match, Span},
};

/// The span offsets of the capturing groups of a single successful match.
///
/// A `Captures` value is the "result" type of this crate: group `0` is the
/// overall match span and groups `1`, `2`, ... correspond to the pattern's
/// parenthesized capturing groups, numbered left-to-right by opening
/// parenthesis. A group that did not participate in the match has no span.
///
/// `Captures` does not borrow the haystack. To get the text of a group,
/// slice the haystack with the group's span:
///
/// ```
/// use regex_backtrack::Regex;
///
/// let re = Regex::new(r"(\d{3})-(\d{3})")?;
/// let mut cache = re.create_cache();
/// let mut caps = re.create_captures();
///
/// let hay = "dial 888-555 now";
/// re.captures(&mut cache, hay, &mut caps);
/// assert_eq!("888", &hay[caps.get_group(1).unwrap()]);
/// assert_eq!("555", &hay[caps.get_group(2).unwrap()]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Values of this type are created by [`Regex::create_captures`]
/// (crate::Regex::create_captures) and are reused across searches; a search
/// that reports no match leaves the value with
/// [`Captures::is_match`] returning `false`.
#[derive(Clone)]
pub struct Captures {
    /// Two slots per group: start offset at `2n`, end offset at `2n + 1`.
    slots: Vec<Slot>,
    /// The total number of groups, including the implicit group 0.
    group_len: usize,
}

impl Captures {
    pub(crate) fn new(group_len: usize) -> Captures {
        Captures { slots: vec![None; group_len * 2], group_len }
    }

    /// Returns true when this value reflects a successful match.
    #[inline]
    pub fn is_match(&self) -> bool {
        self.slots[0].is_some()
    }

    /// Returns the overall match span, or `None` when the most recent
    /// search found no match.
    #[inline]
    pub fn get_match(&self) -> Option<Match> {
        Some(Match::new(self.get_group(0)?))
    }

    /// Returns the span of the capturing group at the given index.
    ///
    /// Index `0` is the overall match. `None` is returned when there was no
    /// match, when the index is out of range, or when the group did not
    /// participate in the match (e.g., the unused branch of an
    /// alternation).
    #[inline]
    pub fn get_group(&self, index: usize) -> Option<Span> {
        if index >= self.group_len {
            return None;
        }
        let start = self.slots[index * 2]?.get();
        let end = self.slots[index * 2 + 1]?.get();
        Some(Span { start, end })
    }

    /// Returns the total number of groups, including the implicit group 0.
    ///
    /// This is always one more than the number of capturing groups in the
    /// pattern.
    #[inline]
    pub fn group_len(&self) -> usize {
        self.group_len
    }

    /// Returns an iterator over all group spans, starting with group 0.
    /// Groups that did not participate yield `None`.
    pub fn iter(&self) -> CapturesSpans<'_> {
        CapturesSpans { caps: self, index: 0 }
    }

    /// Reset this value to "no match". Every search does this first, so a
    /// failed search never leaves stale group spans behind.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    /// Copy the capture slots of a successful attempt into this value.
    ///
    /// The source may be longer than our slot table: the interpreter keeps
    /// loop progress markers past the capture slots, and those are not part
    /// of the result.
    pub(crate) fn copy_from_slots(&mut self, slots: &[Slot]) {
        let len = self.slots.len();
        self.slots.copy_from_slice(&slots[..len]);
    }

    #[cfg(test)]
    pub(crate) fn set_span(&mut self, index: usize, span: Span) {
        self.slots[index * 2] = NonMaxUsize::new(span.start);
        self.slots[index * 2 + 1] = NonMaxUsize::new(span.end);
    }
}

impl core::fmt::Debug for Captures {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut dm = f.debug_map();
        for (index, span) in self.iter().enumerate() {
            match span {
                None => dm.entry(&index, &"<none>"),
                Some(span) => dm.entry(&index, &span.range()),
            };
        }
        dm.finish()
    }
}

/// An iterator over the group spans in a `Captures` value, created by
/// [`Captures::iter`].
#[derive(Clone, Debug)]
pub struct CapturesSpans<'c> {
    caps: &'c Captures,
    index: usize,
}

impl<'c> Iterator for CapturesSpans<'c> {
    type Item = Option<Span>;

    fn next(&mut self) -> Option<Option<Span>> {
        if self.index >= self.caps.group_len() {
            return None;
        }
        let span = self.caps.get_group(self.index);
        self.index += 1;
        Some(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_written() {
        let mut caps = Captures::new(3);
        assert!(!caps.is_match());
        assert_eq!(None, caps.get_match());
        assert_eq!(None, caps.get_group(1));

        caps.set_span(0, Span { start: 1, end: 7 });
        caps.set_span(2, Span { start: 3, end: 5 });
        assert!(caps.is_match());
        assert_eq!(Some(Match::new(1..7)), caps.get_match());
        assert_eq!(None, caps.get_group(1));
        assert_eq!(Some(Span { start: 3, end: 5 }), caps.get_group(2));
        // Out of range groups are not an error.
        assert_eq!(None, caps.get_group(3));

        caps.clear();
        assert!(!caps.is_match());
    }

    #[test]
    fn iter_yields_all_groups() {
        let mut caps = Captures::new(2);
        caps.set_span(0, Span { start: 0, end: 2 });
        let spans: Vec<Option<Span>> = caps.iter().collect();
        assert_eq!(vec![Some(Span { start: 0, end: 2 }), None], spans);
    }
}
