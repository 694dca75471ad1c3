/*!
A backtracking interpreter for compiled programs.

The interpreter executes one attempt at a time: it runs the program from a
candidate start position, pushing a frame for every `Split` it passes, and
on failure pops the most recent frame to resume at the alternative with the
position and capture state that frame recorded. An unanchored search wraps
this in a scan that retries the attempt at each char boundary of the span.

Every executed instruction counts against a step budget. When the budget is
exhausted the search fails with [`MatchError::BacktrackLimit`] instead of
running for an unbounded amount of time, which is how patterns with
catastrophic backtracking behavior stay contained.
*/

use crate::{
    ast::{fold_case, LookaroundKind},
    program::{Inst, Program},
    util::{
        captures::Captures,
        primitives::{NonMaxUsize, Slot},
        search::{Input, MatchError},
    },
};

/// Mutable scratch space used by searches.
///
/// A cache is cheap to create but holds allocations that are reused across
/// searches, so callers doing many searches should create one with
/// [`Regex::create_cache`](crate::Regex::create_cache) and hold on to it.
/// A cache may be used with a different regex than the one that created it;
/// the next search simply resizes it.
#[derive(Clone, Debug)]
pub struct Cache {
    /// The slot table of the current attempt: capture slots first, then
    /// the loop progress checks.
    slots: Vec<Slot>,
}

impl Cache {
    pub(crate) fn new(program: &Program) -> Cache {
        Cache { slots: vec![None; program.slots + program.checks] }
    }
}

/// A suspended alternative of an attempt. Popping a frame restores the
/// interpreter exactly as it was when the corresponding `Split` executed,
/// except that control resumes at the split's secondary target.
#[derive(Clone, Debug)]
struct Frame {
    ip: usize,
    at: usize,
    slots: Vec<Slot>,
}

/// Run a search, writing the result into `caps`. `caps` reports no match
/// both when the pattern cannot match and when the input span is invalid
/// for the haystack.
pub(crate) fn search(
    program: &Program,
    cache: &mut Cache,
    input: &Input<'_>,
    caps: &mut Captures,
    limit: usize,
) -> Result<(), MatchError> {
    caps.clear();
    if !input.is_valid_span() {
        return Ok(());
    }
    let haystack = input.haystack();
    cache.slots.clear();
    cache.slots.resize(program.slots + program.checks, None);

    let mut interp = Interpreter {
        haystack,
        end: input.end(),
        case_insensitive: program.case_insensitive,
        steps: 0,
        limit,
    };
    // One attempt per candidate start position. The step budget is shared
    // across all attempts of this one search call.
    let one_shot = input.get_anchored() || program.anchored_start;
    let mut at = input.start();
    loop {
        if !one_shot {
            if let Some(ref prefix) = program.prefix {
                match prefix.find(&haystack[..input.end()], at) {
                    None => break,
                    Some(next) => at = next,
                }
            }
        }
        for slot in cache.slots.iter_mut() {
            *slot = None;
        }
        if interp.run(program, &mut cache.slots, at, None)?.is_some() {
            caps.copy_from_slots(&cache.slots);
            return Ok(());
        }
        if one_shot || at >= input.end() {
            break;
        }
        at += 1;
        while !haystack.is_char_boundary(at) {
            at += 1;
        }
    }
    Ok(())
}

#[derive(Debug)]
struct Interpreter<'h> {
    haystack: &'h str,
    /// Consuming instructions may not read at or past this offset. This is
    /// the span end for the main program and the haystack end inside
    /// look-around probes, which get to see the surrounding context.
    end: usize,
    case_insensitive: bool,
    steps: usize,
    limit: usize,
}

impl<'h> Interpreter<'h> {
    /// Execute one attempt of `program` starting at `at`. Returns the end
    /// position of the match, or `None` when every alternative failed.
    ///
    /// `must_end` is set by look-behind probes: the attempt only counts as
    /// a match when it ends exactly there.
    fn run(
        &mut self,
        program: &Program,
        slots: &mut Vec<Slot>,
        at: usize,
        must_end: Option<usize>,
    ) -> Result<Option<usize>, MatchError> {
        let mut stack: Vec<Frame> = vec![];
        let mut ip = 0;
        let mut at = at;
        loop {
            self.steps += 1;
            if self.steps > self.limit {
                trace!(
                    "giving up at ip {} after {} steps",
                    ip, self.steps,
                );
                return Err(MatchError::BacktrackLimit { limit: self.limit });
            }
            let mut failed = false;
            match program.insts[ip] {
                Inst::Match => {
                    if must_end.map_or(true, |end| end == at) {
                        return Ok(Some(at));
                    }
                    failed = true;
                }
                Inst::Char(expected) => match self.char_at(at) {
                    Some(c) if self.fold(c) == expected => {
                        at += c.len_utf8();
                        ip += 1;
                    }
                    _ => failed = true,
                },
                Inst::Class(index) => match self.char_at(at) {
                    Some(c)
                        if program
                            .class(index)
                            .contains(c, self.case_insensitive) =>
                    {
                        at += c.len_utf8();
                        ip += 1;
                    }
                    _ => failed = true,
                },
                Inst::Any => match self.char_at(at) {
                    Some(c) => {
                        at += c.len_utf8();
                        ip += 1;
                    }
                    None => failed = true,
                },
                Inst::AnyExceptNewline => match self.char_at(at) {
                    Some(c) if c != '\n' => {
                        at += c.len_utf8();
                        ip += 1;
                    }
                    _ => failed = true,
                },
                Inst::Split { primary, secondary } => {
                    stack.push(Frame {
                        ip: secondary,
                        at,
                        slots: slots.clone(),
                    });
                    ip = primary;
                }
                Inst::Jump(target) => ip = target,
                Inst::Save(slot) => {
                    slots[slot] = NonMaxUsize::new(at);
                    ip += 1;
                }
                Inst::Look(look) => {
                    if look.matches(self.haystack, at) {
                        ip += 1;
                    } else {
                        failed = true;
                    }
                }
                Inst::WriteCheck(check) => {
                    slots[program.slots + check as usize] =
                        NonMaxUsize::new(at);
                    ip += 1;
                }
                Inst::CheckProgress { check, target } => {
                    let written = slots[program.slots + check as usize]
                        .map(NonMaxUsize::get);
                    if written == Some(at) {
                        // The loop body matched the empty string; another
                        // iteration could not make progress.
                        failed = true;
                    } else {
                        ip = target;
                    }
                }
                Inst::Backref(group) => {
                    let g = group as usize;
                    match (slots[2 * g], slots[2 * g + 1]) {
                        (Some(start), Some(end)) => {
                            match self.match_backref(
                                at,
                                start.get(),
                                end.get(),
                            ) {
                                Some(next) => {
                                    at = next;
                                    ip += 1;
                                }
                                None => failed = true,
                            }
                        }
                        // A group that has not participated cannot be
                        // referred back to.
                        _ => failed = true,
                    }
                }
                Inst::Lookaround { kind, sub } => {
                    if self.probe(program.sub(sub), slots, at, kind)? {
                        ip += 1;
                    } else {
                        failed = true;
                    }
                }
            }
            if failed {
                match stack.pop() {
                    None => return Ok(None),
                    Some(frame) => {
                        ip = frame.ip;
                        at = frame.at;
                        *slots = frame.slots;
                    }
                }
            }
        }
    }

    /// Test a look-around at position `at`. On a successful positive
    /// look-around, capture slots written by the probe stay committed;
    /// otherwise the slot table is restored.
    fn probe(
        &mut self,
        sub: &Program,
        slots: &mut Vec<Slot>,
        at: usize,
        kind: LookaroundKind,
    ) -> Result<bool, MatchError> {
        let saved = slots.clone();
        // Probes observe the haystack past the span end, like the
        // zero-width assertions do.
        let saved_end = self.end;
        self.end = self.haystack.len();
        let matched = match kind {
            LookaroundKind::Ahead | LookaroundKind::AheadNegate => {
                self.run(sub, slots, at, None).map(|m| m.is_some())
            }
            LookaroundKind::Behind | LookaroundKind::BehindNegate => {
                self.probe_behind(sub, slots, at, &saved)
            }
        };
        self.end = saved_end;
        let matched = matched?;
        let positive = matches!(
            kind,
            LookaroundKind::Ahead | LookaroundKind::Behind
        );
        if !(positive && matched) {
            *slots = saved;
        }
        Ok(if positive { matched } else { !matched })
    }

    /// Try the look-behind body at every char boundary at or before `at`,
    /// requiring it to end exactly at `at`.
    fn probe_behind(
        &mut self,
        sub: &Program,
        slots: &mut Vec<Slot>,
        at: usize,
        saved: &[Slot],
    ) -> Result<bool, MatchError> {
        let mut start = at;
        loop {
            if self.run(sub, slots, start, Some(at))?.is_some() {
                return Ok(true);
            }
            // A failed probe may have left partial capture writes behind.
            slots.copy_from_slice(saved);
            if start == 0 {
                return Ok(false);
            }
            start -= 1;
            while !self.haystack.is_char_boundary(start) {
                start -= 1;
            }
        }
    }

    /// Consume the text the given group captured, starting at `at`.
    /// Returns the new position, or `None` when the input differs.
    fn match_backref(
        &self,
        at: usize,
        start: usize,
        end: usize,
    ) -> Option<usize> {
        let mut at = at;
        for expected in self.haystack[start..end].chars() {
            let c = self.char_at(at)?;
            if self.fold(c) != self.fold(expected) {
                return None;
            }
            at += c.len_utf8();
        }
        Some(at)
    }

    /// The char at position `at`, or `None` at the consumption limit. `at`
    /// is always on a char boundary here, so the char never straddles the
    /// limit.
    #[inline]
    fn char_at(&self, at: usize) -> Option<char> {
        if at >= self.end {
            return None;
        }
        self.haystack[at..].chars().next()
    }

    #[inline]
    fn fold(&self, c: char) -> char {
        if self.case_insensitive {
            fold_case(c)
        } else {
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile::Compiler, parse::parse};

    const LIMIT: usize = 1_000_000;

    fn program(pattern: &str) -> Program {
        Compiler::new(false, false, false).compile(&parse(pattern).unwrap())
    }

    fn find(pattern: &str, haystack: &str) -> Option<(usize, usize)> {
        find_in(&program(pattern), haystack)
    }

    fn find_in(program: &Program, haystack: &str) -> Option<(usize, usize)> {
        let mut cache = Cache::new(program);
        let mut caps = Captures::new(program.group_len);
        search(program, &mut cache, &Input::new(haystack), &mut caps, LIMIT)
            .unwrap();
        caps.get_match().map(|m| (m.start(), m.end()))
    }

    #[test]
    fn unanchored_scan_finds_leftmost() {
        assert_eq!(Some((5, 8)), find("cat", "a concatenation"));
        assert_eq!(None, find("dog", "a concatenation"));
        assert_eq!(Some((0, 0)), find("", "abc"));
    }

    #[test]
    fn greedy_takes_longest_lazy_shortest() {
        let hay = "[Data A] some text [Data B]";
        assert_eq!(Some((0, 27)), find(r"\[.*\]", hay));
        assert_eq!(Some((0, 8)), find(r"\[.*?\]", hay));
    }

    #[test]
    fn alternation_is_leftmost_first() {
        assert_eq!(Some((0, 3)), find("sam|samwise", "samwise"));
    }

    #[test]
    fn empty_loop_bodies_terminate() {
        assert_eq!(Some((0, 0)), find("(a*)*", "b"));
        assert_eq!(Some((0, 3)), find("(a*)*", "aaa"));
        assert_eq!(Some((0, 0)), find("(?:a|)*", "b"));
    }

    #[test]
    fn captures_roll_back_on_backtrack() {
        let program = program("(a+)(a)");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        search(&program, &mut cache, &Input::new("aaa"), &mut caps, LIMIT)
            .unwrap();
        // Greedy a+ first grabs all three, then gives one back.
        assert_eq!(Some(0..2), caps.get_group(1).map(|s| s.range()));
        assert_eq!(Some(2..3), caps.get_group(2).map(|s| s.range()));
    }

    #[test]
    fn backrefs_match_captured_text() {
        assert_eq!(Some((0, 6)), find(r"(abc)\1", "abcabcabc"));
        assert_eq!(None, find(r"(abc)\1", "abcabd"));
        // The quoted-string classic.
        let hay = r#"say "hello" and 'bye'"#;
        assert_eq!(Some((4, 11)), find(r#"(['"]).*?\1"#, hay));
        // A backreference to a group that did not participate fails.
        assert_eq!(None, find(r"(?:(a)|b)\1", "bb"));
        assert_eq!(Some((0, 2)), find(r"(?:(a)|b)\1", "aa"));
    }

    #[test]
    fn lookahead_probes_without_consuming() {
        assert_eq!(Some((0, 3)), find(r"foo(?=bar)", "foobar"));
        assert_eq!(None, find(r"foo(?=bar)", "foobaz"));
        assert_eq!(Some((0, 3)), find(r"foo(?!bar)", "foobaz"));
        assert_eq!(None, find(r"foo(?!bar)", "foobar"));
    }

    #[test]
    fn lookbehind_requires_preceding_text() {
        assert_eq!(Some((4, 7)), find(r"(?<=\$)\d+", "is $100, sure"));
        assert_eq!(None, find(r"(?<=\$)\d+x", "is $100, sure"));
        assert_eq!(Some((3, 6)), find(r"(?<!x)100", "is 100"));
        assert_eq!(None, find(r"(?<!\$)100", "is $100"));
    }

    #[test]
    fn lookahead_captures_commit_on_success() {
        let program = program(r"(?=(\d+))\w+");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        search(&program, &mut cache, &Input::new("123abc"), &mut caps, LIMIT)
            .unwrap();
        assert_eq!(Some(0..6), caps.get_match().map(|m| m.range()));
        assert_eq!(Some(0..3), caps.get_group(1).map(|s| s.range()));
    }

    #[test]
    fn negative_lookaround_leaves_no_captures() {
        let program = program(r"(?!(x))a");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        search(&program, &mut cache, &Input::new("a"), &mut caps, LIMIT)
            .unwrap();
        assert!(caps.is_match());
        assert_eq!(None, caps.get_group(1));
    }

    #[test]
    fn span_bounds_consumption_but_not_context() {
        let program = program(r"\bcat\b");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        // "cat" inside "concat" is not at a word boundary, and narrowing
        // the span does not hide the 'n' before it.
        let input = Input::new("concat").span(3..6);
        search(&program, &mut cache, &input, &mut caps, LIMIT).unwrap();
        assert!(!caps.is_match());
    }

    #[test]
    fn invalid_span_reports_no_match() {
        let program = program("a");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        let input = Input::new("αa").span(1..3);
        search(&program, &mut cache, &input, &mut caps, LIMIT).unwrap();
        assert!(!caps.is_match());
    }

    #[test]
    fn step_budget_stops_catastrophic_backtracking() {
        let program = program("(a+)+$");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        let hay = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaX";
        let err =
            search(&program, &mut cache, &Input::new(hay), &mut caps, 10_000)
                .unwrap_err();
        assert_eq!(MatchError::BacktrackLimit { limit: 10_000 }, err);
    }

    #[test]
    fn case_insensitive_matching() {
        let ast = parse("error").unwrap();
        let program = Compiler::new(true, false, false).compile(&ast);
        assert_eq!(Some((5, 10)), find_in(&program, "read ERROR here"));
        assert_eq!(Some((5, 10)), find_in(&program, "read Error here"));

        let ast = parse(r"(go)\1").unwrap();
        let program = Compiler::new(true, false, false).compile(&ast);
        // Backreference comparison folds both sides.
        assert_eq!(Some((0, 4)), find_in(&program, "GoGO"));
    }

    #[test]
    fn multi_line_anchors() {
        let ast = parse("^bar$").unwrap();
        let program = Compiler::new(false, true, false).compile(&ast);
        assert_eq!(Some((4, 7)), find_in(&program, "foo\nbar\nbaz"));
    }

    #[test]
    fn anchored_input_pins_the_start() {
        let program = program("cat");
        let mut cache = Cache::new(&program);
        let mut caps = Captures::new(program.group_len);
        let input = Input::new("a cat").anchored(true);
        search(&program, &mut cache, &input, &mut caps, LIMIT).unwrap();
        assert!(!caps.is_match());

        let input = Input::new("a cat").span(2..5).anchored(true);
        search(&program, &mut cache, &input, &mut caps, LIMIT).unwrap();
        assert_eq!(Some(2..5), caps.get_match().map(|m| m.range()));
    }
}
