use core::num::NonZeroUsize;

/// A capture slot: the byte offset recorded by a save instruction, or
/// `None` if the instruction has not executed in the current attempt.
pub(crate) type Slot = Option<NonMaxUsize>;

/// A `usize` that can never be `usize::MAX`, stored in one word.
///
/// Capture slots are `Option<NonMaxUsize>`, and the niche here guarantees
/// that an optional slot is no bigger than a plain `usize`. This matters
/// because the backtracking interpreter snapshots the entire slot table on
/// every branch it might need to revisit.
///
/// The trade-off is that `usize::MAX` is unrepresentable, which is fine:
/// haystack lengths are guaranteed by Rust to fit into an `isize`.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(transparent)]
pub(crate) struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    /// Create a new `NonMaxUsize`. Returns `None` when `value == usize::MAX`.
    pub(crate) fn new(value: usize) -> Option<NonMaxUsize> {
        NonZeroUsize::new(value.wrapping_add(1)).map(NonMaxUsize)
    }

    /// Return the underlying value.
    pub(crate) fn get(self) -> usize {
        self.0.get().wrapping_sub(1)
    }
}

// The internal biased repr leaks into derived Debug output and is confusing
// to read in backtrack stack dumps, so render the logical value instead.
impl core::fmt::Debug for NonMaxUsize {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:?}", self.get())
    }
}
