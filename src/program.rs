/*!
The compiled form of a pattern: a flat instruction sequence interpreted by
the backtracking engine in [`backtrack`](crate::backtrack).
*/

use crate::{
    ast::{ClassSet, LookaroundKind},
    util::look::Look,
};

/// A single instruction. Jump targets are absolute indices into the
/// instruction sequence of the program that contains them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Inst {
    /// The pattern has matched at the current position.
    Match,
    /// Consume one char equal to the given char. Under case-insensitive
    /// matching the stored char is pre-folded and the input char is folded
    /// before comparison.
    Char(char),
    /// Consume one char contained in `classes[i]`.
    Class(u32),
    /// Consume any one char.
    Any,
    /// Consume any one char except `\n`.
    AnyExceptNewline,
    /// Try `primary` first; on failure, resume at `secondary` with the
    /// position and capture state this instruction was reached with.
    Split { primary: usize, secondary: usize },
    /// Continue at the given instruction.
    Jump(usize),
    /// Record the current position in capture slot `i`. Slot `2n` is the
    /// start of group `n` and slot `2n + 1` its end.
    Save(usize),
    /// A zero-width assertion on the current position.
    Look(Look),
    /// Consume the same text the given capturing group matched. An unset
    /// group fails the attempt.
    Backref(u32),
    /// Run `subs[sub]` as a zero-width probe at the current position.
    Lookaround { kind: LookaroundKind, sub: u32 },
    /// Record the current position in check slot `i`. Placed before
    /// entering a loop whose body may match the empty string.
    WriteCheck(u32),
    /// Loop back-edge: continue at `target` only if the position has
    /// advanced since check slot `check` was written, otherwise fail this
    /// branch. Stops an empty loop body from iterating forever.
    CheckProgress { check: u32, target: usize },
}

/// A compiled pattern.
///
/// Look-around subexpressions compile to their own `Program`s, stored in
/// `subs` and referenced by index. Capture slot and check slot numbering is
/// shared across the whole tree, so one slot table serves a search through
/// any of them.
#[derive(Clone)]
pub(crate) struct Program {
    pub(crate) insts: Vec<Inst>,
    pub(crate) classes: Vec<ClassSet>,
    pub(crate) subs: Vec<Program>,
    /// Capture slots, including group 0: `2 * group_len`.
    pub(crate) slots: usize,
    /// Check slots across the whole program tree.
    pub(crate) checks: usize,
    /// Number of groups, including the implicit group 0.
    pub(crate) group_len: usize,
    pub(crate) case_insensitive: bool,
    /// Set when every match must begin at the start of the search span, as
    /// for a pattern with a leading `^` outside multi-line mode. The
    /// scanning loop then gives up after one attempt.
    pub(crate) anchored_start: bool,
    /// A byte prefix every match must begin with, used to skip ahead
    /// between attempts.
    pub(crate) prefix: Option<Prefix>,
}

impl Program {
    pub(crate) fn class(&self, index: u32) -> &ClassSet {
        &self.classes[index as usize]
    }

    pub(crate) fn sub(&self, index: u32) -> &Program {
        &self.subs[index as usize]
    }
}

impl core::fmt::Debug for Program {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "program(slots: {}, checks: {}, anchored_start: {})",
            self.slots, self.checks, self.anchored_start,
        )?;
        for (index, inst) in self.insts.iter().enumerate() {
            writeln!(f, "{:03}: {:?}", index, inst)?;
        }
        for (index, sub) in self.subs.iter().enumerate() {
            writeln!(f, "sub {}:", index)?;
            core::fmt::Debug::fmt(sub, f)?;
        }
        Ok(())
    }
}

/// A literal byte prefix of every match, found with `memchr` rather than by
/// running the interpreter at every position.
///
/// Case-sensitive programs search for the first byte of the leading char's
/// UTF-8 encoding. Under case-insensitive matching only ASCII leading chars
/// are eligible, with the two-byte form covering the pair of case variants,
/// e.g. `e`/`E`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Prefix {
    Byte(u8),
    Byte2(u8, u8),
}

impl Prefix {
    /// Returns the first offset at or after `at` where a match could begin,
    /// or `None` when the rest of the haystack cannot contain one.
    #[inline]
    pub(crate) fn find(&self, haystack: &str, at: usize) -> Option<usize> {
        let rest = &haystack.as_bytes()[at..];
        let offset = match *self {
            Prefix::Byte(b) => memchr::memchr(b, rest)?,
            Prefix::Byte2(b1, b2) => memchr::memchr2(b1, b2, rest)?,
        };
        Some(at + offset)
    }
}
