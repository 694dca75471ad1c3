/*!
The abstract syntax of a pattern, produced by [`parse`](crate::parse) and
consumed by [`compile`](crate::compile).

Nodes live in a single arena (`Vec<Node>`) and refer to each other by
[`NodeId`] index. That keeps the tree trivially owned by one allocation,
makes the nodes `Copy`-cheap to traverse and sidesteps lifetime plumbing
that a pointer-linked tree would need.
*/

/// The index of a node in the AST arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        // The parser consumes at least one pattern char per node, and
        // pattern lengths are far below u32::MAX in practice. A pattern
        // long enough to overflow this would have exhausted memory first.
        NodeId(u32::try_from(index).expect("AST arena node count fits in u32"))
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A parsed pattern: the node arena, the root node and the number of
/// capturing groups.
#[derive(Clone, Debug)]
pub(crate) struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
    /// The number of capturing groups, not counting the implicit group 0.
    /// Group indices are 1-based and assigned left-to-right by opening
    /// parenthesis.
    group_len: u32,
}

impl Ast {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId, group_len: u32) -> Ast {
        Ast { nodes, root, group_len }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.as_usize()]
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn group_len(&self) -> u32 {
        self.group_len
    }
}

/// A single AST node. Child nodes are referenced by arena index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Node {
    /// Matches the empty string. Produced by empty alternation branches
    /// and empty groups.
    Empty,
    /// A single literal char.
    Literal(char),
    /// `.`, matching any char; whether that includes `\n` is decided at compile
    /// time by the dot-all flag.
    Any,
    /// A bracketed character class.
    Class(ClassSet),
    /// A sequence of nodes that must match one after the other.
    Concat(Vec<NodeId>),
    /// A list of branches tried in order, leftmost preferred.
    Alternation(Vec<NodeId>),
    /// A group. `index` is `Some` for capturing groups and `None` for
    /// `(?:...)`.
    Group { index: Option<u32>, node: NodeId },
    /// A quantified node. `max == None` means unbounded.
    Repetition { node: NodeId, min: u32, max: Option<u32>, greedy: bool },
    /// A zero-width assertion: `^`, `$`, `\b` or `\B`.
    Assertion(AssertionKind),
    /// A backreference to a capturing group, `\1`-style.
    Backref(u32),
    /// A look-around group. The child is matched as a zero-width probe.
    Lookaround { kind: LookaroundKind, node: NodeId },
}

/// The kind of a zero-width assertion as written in the pattern. The
/// multi-line flag decides at compile time whether `^`/`$` anchor to lines
/// or to the whole haystack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AssertionKind {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
}

/// The kind of a look-around group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LookaroundKind {
    /// `(?=...)`
    Ahead,
    /// `(?!...)`
    AheadNegate,
    /// `(?<=...)`
    Behind,
    /// `(?<!...)`
    BehindNegate,
}

/// A character class: a union of char ranges, possibly negated.
///
/// Everything inside `[...]` normalizes to ranges, including singleton
/// chars and the Perl classes (`\d` becomes `0-9` and so on). Negated Perl
/// classes are expanded to their complement ranges by the parser, so
/// membership here is always a plain range scan.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ClassSet {
    negated: bool,
    ranges: Vec<ClassRange>,
}

/// A closed range of chars, `start..=end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ClassRange {
    pub(crate) start: char,
    pub(crate) end: char,
}

impl ClassSet {
    pub(crate) fn new() -> ClassSet {
        ClassSet::default()
    }

    pub(crate) fn negate(&mut self) {
        self.negated = true;
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.push_range(c, c);
    }

    pub(crate) fn push_range(&mut self, start: char, end: char) {
        self.ranges.push(ClassRange { start, end });
    }

    #[cfg(test)]
    pub(crate) fn is_negated(&self) -> bool {
        self.negated
    }

    pub(crate) fn ranges(&self) -> &[ClassRange] {
        &self.ranges
    }

    /// Class membership, honoring negation.
    ///
    /// Under case-insensitive matching the char is also tried with its
    /// simple case flips, so that `[A-Z]` matches `a`. Ranges themselves
    /// are left untouched; folding the probe char covers both directions.
    pub(crate) fn contains(&self, c: char, case_insensitive: bool) -> bool {
        let mut found = self.contains_exact(c);
        if !found && case_insensitive {
            for folded in case_fold_variants(c) {
                if folded != c && self.contains_exact(folded) {
                    found = true;
                    break;
                }
            }
        }
        found != self.negated
    }

    fn contains_exact(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.start <= c && c <= r.end)
    }
}

/// The simple case flips of a char: its single-char lowercase and
/// uppercase mappings. Multi-char mappings (e.g. `ß` to `SS`) are not
/// folded; that is locale territory, which this crate does not enter.
pub(crate) fn case_fold_variants(c: char) -> [char; 2] {
    let lower = {
        let mut it = c.to_lowercase();
        let first = it.next().unwrap_or(c);
        if it.next().is_some() {
            c
        } else {
            first
        }
    };
    let upper = {
        let mut it = c.to_uppercase();
        let first = it.next().unwrap_or(c);
        if it.next().is_some() {
            c
        } else {
            first
        }
    };
    [lower, upper]
}

/// The canonical case used for literal and backreference comparisons under
/// case-insensitive matching: the simple lowercase mapping when it is a
/// single char, otherwise the char itself.
pub(crate) fn fold_case(c: char) -> char {
    case_fold_variants(c)[0]
}
