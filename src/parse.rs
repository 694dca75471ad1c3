/*!
A recursive-descent parser from pattern text to an [`Ast`].

The grammar is handled in the usual precedence layers: alternation at the
top, then concatenation, then a quantified atom, then the atom itself.
Capturing group indices are assigned here, left-to-right by opening
parenthesis.
*/

use crate::ast::{
    AssertionKind, Ast, ClassSet, LookaroundKind, Node, NodeId,
};

/// An error that occurred while building a regex from pattern text.
///
/// Every build failure points at the byte offset in the pattern where the
/// problem was detected, available via [`BuildError::offset`]. The
/// `Display` impl renders the offset along with a human readable reason.
///
/// A failed build never yields a partially usable regex: the only artifact
/// of failure is this error value.
#[derive(Clone, Debug)]
pub struct BuildError {
    kind: ErrorKind,
    offset: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ErrorKind {
    /// A backreference names a group that cannot exist at this point in
    /// the pattern, e.g. `(a)\3`.
    BackrefInvalid { group: u32 },
    /// A class range has its endpoints out of order, e.g. `[z-a]`, or a
    /// range endpoint that is not a literal char, e.g. `[a-\d]`.
    ClassRangeInvalid,
    /// A `[` with no matching `]`.
    ClassUnclosed,
    /// An escape sequence this crate does not recognize.
    EscapeUnrecognized { c: char },
    /// The pattern ended in the middle of an escape sequence.
    EscapeUnexpectedEof,
    /// A `(?` group whose kind marker is not one of `:`, `=`, `!`, `<=`,
    /// `<!`.
    GroupUnknown,
    /// A `(` with no matching `)`.
    GroupUnclosed,
    /// A `)` with no matching `(`.
    GroupUnopened,
    /// `{n,m}` with `m < n`.
    RepetitionBounds { min: u32, max: u32 },
    /// A decimal number (repetition count or group number) too large to
    /// represent.
    DecimalInvalid,
    /// A quantifier with nothing to repeat, e.g. `*a` or `a**`.
    RepetitionMissing,
}

impl BuildError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> BuildError {
        BuildError { kind, offset }
    }

    /// The byte offset into the pattern text at which the error was
    /// detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::error::Error for BuildError {}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "regex parse error at offset {}: ", self.offset)?;
        match self.kind {
            ErrorKind::BackrefInvalid { group } => {
                write!(f, "backreference \\{} refers to a group that does not exist", group)
            }
            ErrorKind::ClassRangeInvalid => {
                write!(f, "invalid character class range")
            }
            ErrorKind::ClassUnclosed => {
                write!(f, "unclosed character class")
            }
            ErrorKind::EscapeUnrecognized { c } => {
                write!(f, "unrecognized escape sequence \\{}", c)
            }
            ErrorKind::EscapeUnexpectedEof => {
                write!(f, "incomplete escape sequence at end of pattern")
            }
            ErrorKind::GroupUnknown => {
                write!(f, "unrecognized group kind")
            }
            ErrorKind::GroupUnclosed => write!(f, "unclosed group"),
            ErrorKind::GroupUnopened => write!(f, "unopened group"),
            ErrorKind::RepetitionBounds { min, max } => {
                write!(f, "invalid repetition bounds {{{},{}}}", min, max)
            }
            ErrorKind::DecimalInvalid => {
                write!(f, "decimal number in pattern is too large")
            }
            ErrorKind::RepetitionMissing => {
                write!(f, "quantifier has nothing to repeat")
            }
        }
    }
}

/// Parse pattern text into an AST.
pub(crate) fn parse(pattern: &str) -> Result<Ast, BuildError> {
    Parser::new(pattern).parse()
}

#[derive(Debug)]
struct Parser<'p> {
    pattern: &'p str,
    /// Current byte offset into the pattern.
    offset: usize,
    /// The node arena under construction.
    nodes: Vec<Node>,
    /// Capturing groups opened so far. Doubles as the backreference
    /// validity horizon: `\n` is legal only when `n <= groups`.
    groups: u32,
}

/// What a single escape sequence denotes.
enum Escaped {
    Literal(char),
    Class(ClassSet),
    Assertion(AssertionKind),
    Backref(u32),
}

impl<'p> Parser<'p> {
    fn new(pattern: &'p str) -> Parser<'p> {
        Parser { pattern, offset: 0, nodes: vec![], groups: 0 }
    }

    fn parse(mut self) -> Result<Ast, BuildError> {
        let root = self.parse_alternation()?;
        if self.peek().is_some() {
            // parse_alternation only stops early on ')'.
            return Err(self.error(ErrorKind::GroupUnopened, self.offset));
        }
        Ok(Ast::new(self.nodes, root, self.groups))
    }

    fn parse_alternation(&mut self) -> Result<NodeId, BuildError> {
        let first = self.parse_concat()?;
        if self.peek() != Some('|') {
            return Ok(first);
        }
        let mut branches = vec![first];
        while self.eat('|') {
            branches.push(self.parse_concat()?);
        }
        Ok(self.push(Node::Alternation(branches)))
    }

    fn parse_concat(&mut self) -> Result<NodeId, BuildError> {
        let mut items = vec![];
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.parse_quantified()?);
        }
        Ok(match items.len() {
            0 => self.push(Node::Empty),
            1 => items[0],
            _ => self.push(Node::Concat(items)),
        })
    }

    fn parse_quantified(&mut self) -> Result<NodeId, BuildError> {
        let atom = self.parse_atom()?;
        let (min, max) = match self.maybe_parse_quantifier()? {
            None => return Ok(atom),
            Some(bounds) => bounds,
        };
        // A literal '?' right after a quantifier flips it to lazy.
        let greedy = !self.eat('?');
        Ok(self.push(Node::Repetition { node: atom, min, max, greedy }))
    }

    /// Parse a quantifier if one is next: `*`, `+`, `?`, `{n}`, `{n,}` or
    /// `{n,m}`. A `{` that does not form valid bounds is not a quantifier
    /// and is left for the atom parser to treat as a literal.
    fn maybe_parse_quantifier(
        &mut self,
    ) -> Result<Option<(u32, Option<u32>)>, BuildError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(Some((0, None)))
            }
            Some('+') => {
                self.bump();
                Ok(Some((1, None)))
            }
            Some('?') => {
                self.bump();
                Ok(Some((0, Some(1))))
            }
            Some('{') => self.maybe_parse_counted_quantifier(),
            _ => Ok(None),
        }
    }

    fn maybe_parse_counted_quantifier(
        &mut self,
    ) -> Result<Option<(u32, Option<u32>)>, BuildError> {
        let start = self.offset;
        self.bump();
        let min = match self.parse_decimal(start)? {
            None => {
                // Not a quantifier after all, e.g. '{' or '{,3}'. Rewind
                // and let it be a literal brace.
                self.offset = start;
                return Ok(None);
            }
            Some(n) => n,
        };
        let max = if self.eat(',') {
            if self.peek() == Some('}') {
                None
            } else {
                match self.parse_decimal(start)? {
                    None => {
                        self.offset = start;
                        return Ok(None);
                    }
                    Some(n) => Some(n),
                }
            }
        } else {
            Some(min)
        };
        if !self.eat('}') {
            self.offset = start;
            return Ok(None);
        }
        if let Some(max) = max {
            if min > max {
                return Err(
                    self.error(ErrorKind::RepetitionBounds { min, max }, start)
                );
            }
        }
        Ok(Some((min, max)))
    }

    /// Parse a run of ASCII digits. Returns `None` when no digit is next.
    fn parse_decimal(
        &mut self,
        quantifier_start: usize,
    ) -> Result<Option<u32>, BuildError> {
        let digits_start = self.offset;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.offset == digits_start {
            return Ok(None);
        }
        match self.pattern[digits_start..self.offset].parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(self.error(
                ErrorKind::DecimalInvalid,
                quantifier_start,
            )),
        }
    }

    fn parse_atom(&mut self) -> Result<NodeId, BuildError> {
        let start = self.offset;
        let c = match self.peek() {
            // parse_concat guarantees the atom parser never sees EOF, '|'
            // or ')'. This is unreachable, but erring is cheaper to reason
            // about than a panic.
            None => return Err(self.error(ErrorKind::GroupUnopened, start)),
            Some(c) => c,
        };
        match c {
            '(' => self.parse_group(),
            '[' => self.parse_class(),
            '\\' => {
                self.bump();
                match self.parse_escape(start, false)? {
                    Escaped::Literal(c) => Ok(self.push(Node::Literal(c))),
                    Escaped::Class(set) => Ok(self.push(Node::Class(set))),
                    Escaped::Assertion(kind) => {
                        Ok(self.push(Node::Assertion(kind)))
                    }
                    Escaped::Backref(group) => {
                        Ok(self.push(Node::Backref(group)))
                    }
                }
            }
            '.' => {
                self.bump();
                Ok(self.push(Node::Any))
            }
            '^' => {
                self.bump();
                Ok(self.push(Node::Assertion(AssertionKind::Start)))
            }
            '$' => {
                self.bump();
                Ok(self.push(Node::Assertion(AssertionKind::End)))
            }
            '*' | '+' | '?' => {
                Err(self.error(ErrorKind::RepetitionMissing, start))
            }
            '{' => {
                // Valid bounds here would be a quantifier with nothing to
                // repeat. Bounds that don't parse make the brace a literal.
                if self.maybe_parse_counted_quantifier()?.is_some() {
                    return Err(
                        self.error(ErrorKind::RepetitionMissing, start)
                    );
                }
                self.bump();
                Ok(self.push(Node::Literal('{')))
            }
            c => {
                self.bump();
                Ok(self.push(Node::Literal(c)))
            }
        }
    }

    fn parse_group(&mut self) -> Result<NodeId, BuildError> {
        let open = self.offset;
        self.bump();
        let kind = if self.eat('?') {
            match self.peek() {
                Some(':') => {
                    self.bump();
                    None
                }
                Some('=') => {
                    self.bump();
                    Some(LookaroundKind::Ahead)
                }
                Some('!') => {
                    self.bump();
                    Some(LookaroundKind::AheadNegate)
                }
                Some('<') => {
                    self.bump();
                    match self.peek() {
                        Some('=') => {
                            self.bump();
                            Some(LookaroundKind::Behind)
                        }
                        Some('!') => {
                            self.bump();
                            Some(LookaroundKind::BehindNegate)
                        }
                        _ => {
                            return Err(
                                self.error(ErrorKind::GroupUnknown, open)
                            )
                        }
                    }
                }
                _ => return Err(self.error(ErrorKind::GroupUnknown, open)),
            }
        } else {
            self.groups += 1;
            let index = self.groups;
            let node = self.parse_alternation()?;
            if !self.eat(')') {
                return Err(self.error(ErrorKind::GroupUnclosed, open));
            }
            return Ok(self.push(Node::Group { index: Some(index), node }));
        };
        let node = self.parse_alternation()?;
        if !self.eat(')') {
            return Err(self.error(ErrorKind::GroupUnclosed, open));
        }
        Ok(match kind {
            None => self.push(Node::Group { index: None, node }),
            Some(kind) => self.push(Node::Lookaround { kind, node }),
        })
    }

    fn parse_class(&mut self) -> Result<NodeId, BuildError> {
        let open = self.offset;
        self.bump();
        let mut set = ClassSet::new();
        // '^' negates only as the first char of the class.
        if self.eat('^') {
            set.negate();
        }
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(ErrorKind::ClassUnclosed, open))
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    let esc_start = self.offset;
                    self.bump();
                    match self.parse_escape(esc_start, true)? {
                        Escaped::Literal(lo) => {
                            self.parse_class_item(&mut set, lo)?
                        }
                        Escaped::Class(perl) => {
                            for range in perl.ranges() {
                                set.push_range(range.start, range.end);
                            }
                        }
                        // parse_escape with in_class=true never produces
                        // these.
                        Escaped::Assertion(_) | Escaped::Backref(_) => {
                            unreachable!("non-class escape inside class")
                        }
                    }
                }
                Some(lo) => {
                    self.bump();
                    self.parse_class_item(&mut set, lo)?;
                }
            }
        }
        Ok(self.push(Node::Class(set)))
    }

    /// Add a class item that starts with the literal char `lo`: either a
    /// lone char or, when followed by `-` and another literal, a range.
    /// A trailing `-` (as in `[a-]`) stays a literal.
    fn parse_class_item(
        &mut self,
        set: &mut ClassSet,
        lo: char,
    ) -> Result<(), BuildError> {
        if self.peek() != Some('-') || matches!(self.peek2(), None | Some(']'))
        {
            set.push_char(lo);
            return Ok(());
        }
        let range_start = self.offset;
        self.bump();
        let hi = match self.peek() {
            Some('\\') => {
                let esc_start = self.offset;
                self.bump();
                match self.parse_escape(esc_start, true)? {
                    Escaped::Literal(c) => c,
                    // A Perl class cannot be a range endpoint: [a-\d].
                    _ => {
                        return Err(self
                            .error(ErrorKind::ClassRangeInvalid, range_start))
                    }
                }
            }
            Some(c) => {
                self.bump();
                c
            }
            None => return Err(self.error(ErrorKind::ClassUnclosed, range_start)),
        };
        if lo > hi {
            return Err(self.error(ErrorKind::ClassRangeInvalid, range_start));
        }
        set.push_range(lo, hi);
        Ok(())
    }

    /// Parse the char(s) following a backslash. `start` is the offset of
    /// the backslash itself. Inside a class, word boundaries and
    /// backreferences are not recognized.
    fn parse_escape(
        &mut self,
        start: usize,
        in_class: bool,
    ) -> Result<Escaped, BuildError> {
        let c = match self.peek() {
            None => {
                return Err(self.error(ErrorKind::EscapeUnexpectedEof, start))
            }
            Some(c) => c,
        };
        // Backreferences: \1 through \99... (multi-digit, \0 excluded).
        if !in_class && c.is_ascii_digit() && c != '0' {
            let group = match self.parse_decimal(start)? {
                Some(n) => n,
                None => unreachable!("digit peeked"),
            };
            if group > self.groups {
                return Err(
                    self.error(ErrorKind::BackrefInvalid { group }, start)
                );
            }
            return Ok(Escaped::Backref(group));
        }
        self.bump();
        match c {
            'n' => Ok(Escaped::Literal('\n')),
            'r' => Ok(Escaped::Literal('\r')),
            't' => Ok(Escaped::Literal('\t')),
            'f' => Ok(Escaped::Literal('\x0C')),
            'v' => Ok(Escaped::Literal('\x0B')),
            '0' => Ok(Escaped::Literal('\0')),
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                Ok(Escaped::Class(perl_class(c)))
            }
            'b' if !in_class => {
                Ok(Escaped::Assertion(AssertionKind::WordBoundary))
            }
            'B' if !in_class => {
                Ok(Escaped::Assertion(AssertionKind::NotWordBoundary))
            }
            c if c.is_ascii_punctuation() || c == ' ' => {
                Ok(Escaped::Literal(c))
            }
            c => Err(self.error(ErrorKind::EscapeUnrecognized { c }, start)),
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn error(&self, kind: ErrorKind, offset: usize) -> BuildError {
        BuildError::new(kind, offset)
    }

    fn peek(&self) -> Option<char> {
        self.pattern[self.offset..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.pattern[self.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }
}

/// The expansion of a Perl class escape into plain ranges. Negated forms
/// are the set complement over all of `char`.
fn perl_class(which: char) -> ClassSet {
    let positive: &[(char, char)] = match which.to_ascii_lowercase() {
        'd' => &[('0', '9')],
        'w' => &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
        's' => &[('\t', '\r'), (' ', ' ')],
        _ => unreachable!("caller checked the class letter"),
    };
    let mut set = ClassSet::new();
    if which.is_ascii_lowercase() {
        for &(lo, hi) in positive {
            set.push_range(lo, hi);
        }
    } else {
        // Complement of a sorted, non-overlapping range list.
        let mut next = '\0';
        for &(lo, hi) in positive {
            if next < lo {
                set.push_range(next, prev_char(lo));
            }
            next = match next_char(hi) {
                Some(c) => c,
                None => return set,
            };
        }
        set.push_range(next, char::MAX);
    }
    set
}

fn next_char(c: char) -> Option<char> {
    let mut scalar = u32::from(c) + 1;
    // Skip the surrogate gap.
    if scalar == 0xD800 {
        scalar = 0xE000;
    }
    char::from_u32(scalar)
}

fn prev_char(c: char) -> char {
    let mut scalar = u32::from(c) - 1;
    if scalar == 0xDFFF {
        scalar = 0xD7FF;
    }
    // '\0' never begins a Perl class range, so there is always a
    // predecessor.
    char::from_u32(scalar).expect("predecessor exists")
}
