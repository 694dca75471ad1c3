/*!
Lowering from the AST to a [`Program`].

The output follows the classic backtracking layout: alternation and
quantifiers become `Split` instructions whose first target is the preferred
branch, counted repetitions unroll into copies of their body and every
unbounded loop carries a progress check so an empty body cannot iterate
forever.
*/

use crate::{
    ast::{
        case_fold_variants, fold_case, AssertionKind, Ast, Node, NodeId,
    },
    program::{Inst, Prefix, Program},
    util::look::Look,
};

/// Compiles an AST into a program, according to the flags the compiler was
/// built with. Compilation itself cannot fail; everything that can go wrong
/// with a pattern is rejected by the parser.
#[derive(Clone, Debug)]
pub(crate) struct Compiler {
    case_insensitive: bool,
    multi_line: bool,
    dot_matches_new_line: bool,
}

/// Compilation state shared across the whole program tree, as opposed to
/// the per-program instruction stream in [`Builder`].
#[derive(Debug)]
struct State {
    /// Check slots handed out so far.
    checks: u32,
}

/// The instruction stream of one program while it is being emitted.
#[derive(Debug, Default)]
struct Builder {
    insts: Vec<Inst>,
    classes: Vec<crate::ast::ClassSet>,
    subs: Vec<Program>,
}

impl Builder {
    /// The index the next pushed instruction will get.
    fn next(&self) -> usize {
        self.insts.len()
    }

    fn push(&mut self, inst: Inst) -> usize {
        let index = self.insts.len();
        self.insts.push(inst);
        index
    }

    /// Fill in the targets of a `Split` emitted earlier with placeholders.
    fn set_split(&mut self, at: usize, primary: usize, secondary: usize) {
        match self.insts[at] {
            Inst::Split { primary: ref mut p, secondary: ref mut s } => {
                *p = primary;
                *s = secondary;
            }
            ref inst => unreachable!("patching non-split {:?}", inst),
        }
    }

    fn set_jump(&mut self, at: usize, target: usize) {
        match self.insts[at] {
            Inst::Jump(ref mut t) => *t = target,
            ref inst => unreachable!("patching non-jump {:?}", inst),
        }
    }
}

impl Compiler {
    pub(crate) fn new(
        case_insensitive: bool,
        multi_line: bool,
        dot_matches_new_line: bool,
    ) -> Compiler {
        Compiler { case_insensitive, multi_line, dot_matches_new_line }
    }

    pub(crate) fn compile(&self, ast: &Ast) -> Program {
        let mut state = State { checks: 0 };
        let mut b = Builder::default();
        b.push(Inst::Save(0));
        self.c(ast, &mut state, &mut b, ast.root());
        b.push(Inst::Save(1));
        b.push(Inst::Match);

        let group_len = ast.group_len() as usize + 1;
        let mut program = Program {
            insts: b.insts,
            classes: b.classes,
            subs: b.subs,
            slots: 2 * group_len,
            checks: state.checks as usize,
            group_len,
            case_insensitive: self.case_insensitive,
            anchored_start: !self.multi_line
                && self.is_anchored(ast, ast.root()),
            prefix: self.prefix(ast),
        };
        propagate_totals(&mut program);
        debug!(
            "compiled program: {} instructions, {} slots, {} checks, \
             prefix: {:?}",
            program.insts.len(),
            program.slots,
            program.checks,
            program.prefix,
        );
        program
    }

    fn c(&self, ast: &Ast, state: &mut State, b: &mut Builder, id: NodeId) {
        match *ast.node(id) {
            Node::Empty => {}
            Node::Literal(c) => {
                let c =
                    if self.case_insensitive { fold_case(c) } else { c };
                b.push(Inst::Char(c));
            }
            Node::Any => {
                b.push(if self.dot_matches_new_line {
                    Inst::Any
                } else {
                    Inst::AnyExceptNewline
                });
            }
            Node::Class(ref set) => {
                let index = u32::try_from(b.classes.len())
                    .expect("class count fits in u32");
                b.classes.push(set.clone());
                b.push(Inst::Class(index));
            }
            Node::Concat(ref items) => {
                for &item in items {
                    self.c(ast, state, b, item);
                }
            }
            Node::Alternation(ref branches) => {
                self.c_alternation(ast, state, b, branches);
            }
            Node::Group { index: None, node } => {
                self.c(ast, state, b, node);
            }
            Node::Group { index: Some(group), node } => {
                b.push(Inst::Save(2 * group as usize));
                self.c(ast, state, b, node);
                b.push(Inst::Save(2 * group as usize + 1));
            }
            Node::Repetition { node, min, max, greedy } => {
                self.c_repetition(ast, state, b, node, min, max, greedy);
            }
            Node::Assertion(kind) => {
                b.push(Inst::Look(self.look_for(kind)));
            }
            Node::Backref(group) => {
                b.push(Inst::Backref(group));
            }
            Node::Lookaround { kind, node } => {
                let mut sub_b = Builder::default();
                self.c(ast, state, &mut sub_b, node);
                sub_b.push(Inst::Match);
                // Totals are propagated onto the sub-program at the end of
                // the top-level compile.
                let sub = Program {
                    insts: sub_b.insts,
                    classes: sub_b.classes,
                    subs: sub_b.subs,
                    slots: 0,
                    checks: 0,
                    group_len: 0,
                    case_insensitive: self.case_insensitive,
                    anchored_start: true,
                    prefix: None,
                };
                let index = u32::try_from(b.subs.len())
                    .expect("sub-program count fits in u32");
                b.subs.push(sub);
                b.push(Inst::Lookaround { kind, sub: index });
            }
        }
    }

    /// Branches chain through splits, each preferring its own branch over
    /// the rest of the chain, which yields leftmost-preference.
    fn c_alternation(
        &self,
        ast: &Ast,
        state: &mut State,
        b: &mut Builder,
        branches: &[NodeId],
    ) {
        let mut jumps = vec![];
        for (i, &branch) in branches.iter().enumerate() {
            if i + 1 == branches.len() {
                self.c(ast, state, b, branch);
            } else {
                let split = b.push(Inst::Split { primary: 0, secondary: 0 });
                self.c(ast, state, b, branch);
                jumps.push(b.push(Inst::Jump(0)));
                let next_branch = b.next();
                b.set_split(split, split + 1, next_branch);
            }
        }
        let end = b.next();
        for jump in jumps {
            b.set_jump(jump, end);
        }
    }

    fn c_repetition(
        &self,
        ast: &Ast,
        state: &mut State,
        b: &mut Builder,
        node: NodeId,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) {
        if max == Some(0) {
            return;
        }
        for _ in 0..min {
            self.c(ast, state, b, node);
        }
        match max {
            // An unbounded tail: loop with a progress check, so a body
            // that matches the empty string exits instead of spinning.
            None => {
                let check = state.checks;
                state.checks += 1;
                let write = b.push(Inst::WriteCheck(check));
                let split = b.push(Inst::Split { primary: 0, secondary: 0 });
                self.c(ast, state, b, node);
                b.push(Inst::CheckProgress { check, target: write });
                let end = b.next();
                if greedy {
                    b.set_split(split, split + 1, end);
                } else {
                    b.set_split(split, end, split + 1);
                }
            }
            // A bounded tail: `max - min` nested optionals, each exiting
            // to the common end.
            Some(max) => {
                let mut splits = vec![];
                for _ in min..max {
                    splits
                        .push(b.push(Inst::Split { primary: 0, secondary: 0 }));
                    self.c(ast, state, b, node);
                }
                let end = b.next();
                for split in splits {
                    if greedy {
                        b.set_split(split, split + 1, end);
                    } else {
                        b.set_split(split, end, split + 1);
                    }
                }
            }
        }
    }

    fn look_for(&self, kind: AssertionKind) -> Look {
        match kind {
            AssertionKind::Start => {
                if self.multi_line {
                    Look::StartLF
                } else {
                    Look::Start
                }
            }
            AssertionKind::End => {
                if self.multi_line {
                    Look::EndLF
                } else {
                    Look::End
                }
            }
            AssertionKind::WordBoundary => Look::Word,
            AssertionKind::NotWordBoundary => Look::WordNegate,
        }
    }

    /// Whether every match of the pattern must begin at the start of the
    /// search span. Conservative: `false` means "don't know".
    fn is_anchored(&self, ast: &Ast, id: NodeId) -> bool {
        match *ast.node(id) {
            Node::Assertion(AssertionKind::Start) => true,
            Node::Concat(ref items) => items
                .first()
                .map_or(false, |&first| self.is_anchored(ast, first)),
            Node::Alternation(ref branches) => {
                branches.iter().all(|&branch| self.is_anchored(ast, branch))
            }
            Node::Group { node, .. } => self.is_anchored(ast, node),
            Node::Repetition { node, min, .. } => {
                min >= 1 && self.is_anchored(ast, node)
            }
            _ => false,
        }
    }

    /// A byte every match must begin with, if there is one the scanning
    /// loop can cheaply search for.
    fn prefix(&self, ast: &Ast) -> Option<Prefix> {
        let c = leading_char(ast, ast.root())?;
        if !self.case_insensitive {
            let mut buf = [0u8; 4];
            return Some(Prefix::Byte(c.encode_utf8(&mut buf).as_bytes()[0]));
        }
        // Folding may change the encoded length of a non-ASCII char, so
        // only ASCII prefixes are accelerated under 'i'.
        let [lower, upper] = case_fold_variants(c);
        if !lower.is_ascii() || !upper.is_ascii() {
            return None;
        }
        if lower == upper {
            Some(Prefix::Byte(lower as u8))
        } else {
            Some(Prefix::Byte2(lower as u8, upper as u8))
        }
    }
}

/// The first char every match must consume, skipping over leading
/// zero-width nodes. `None` when there is no single such char.
fn leading_char(ast: &Ast, id: NodeId) -> Option<char> {
    match *ast.node(id) {
        Node::Literal(c) => Some(c),
        Node::Concat(ref items) => {
            for &item in items {
                match ast.node(item) {
                    Node::Empty
                    | Node::Assertion(_)
                    | Node::Lookaround { .. } => continue,
                    _ => return leading_char(ast, item),
                }
            }
            None
        }
        Node::Alternation(ref branches) => {
            let mut leading = None;
            for &branch in branches {
                let c = leading_char(ast, branch)?;
                match leading {
                    None => leading = Some(c),
                    Some(l) if l == c => {}
                    Some(_) => return None,
                }
            }
            leading
        }
        Node::Group { node, .. } => leading_char(ast, node),
        Node::Repetition { node, min, .. } if min >= 1 => {
            leading_char(ast, node)
        }
        _ => None,
    }
}

/// Copy the top-level slot and check totals onto every sub-program, so the
/// interpreter can size its state from whichever program it is running.
fn propagate_totals(program: &mut Program) {
    fn go(p: &mut Program, slots: usize, checks: usize, group_len: usize) {
        for sub in p.subs.iter_mut() {
            sub.slots = slots;
            sub.checks = checks;
            sub.group_len = group_len;
            go(sub, slots, checks, group_len);
        }
    }
    let (slots, checks, group_len) =
        (program.slots, program.checks, program.group_len);
    go(program, slots, checks, group_len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn compile(pattern: &str) -> Program {
        Compiler::new(false, false, false).compile(&parse(pattern).unwrap())
    }

    #[test]
    fn greedy_star_loops_with_progress_check() {
        let program = compile("a*");
        assert_eq!(
            vec![
                Inst::Save(0),
                Inst::WriteCheck(0),
                Inst::Split { primary: 3, secondary: 5 },
                Inst::Char('a'),
                Inst::CheckProgress { check: 0, target: 1 },
                Inst::Save(1),
                Inst::Match,
            ],
            program.insts,
        );
        assert_eq!(1, program.checks);
    }

    #[test]
    fn lazy_star_prefers_exit() {
        let program = compile("a*?");
        assert_eq!(
            Inst::Split { primary: 5, secondary: 3 },
            program.insts[2],
        );
    }

    #[test]
    fn alternation_chains_left_to_right() {
        let program = compile("a|b|c");
        assert_eq!(
            vec![
                Inst::Save(0),
                Inst::Split { primary: 2, secondary: 4 },
                Inst::Char('a'),
                Inst::Jump(8),
                Inst::Split { primary: 5, secondary: 7 },
                Inst::Char('b'),
                Inst::Jump(8),
                Inst::Char('c'),
                Inst::Save(1),
                Inst::Match,
            ],
            program.insts,
        );
    }

    #[test]
    fn counted_repetition_unrolls() {
        let program = compile("a{2,4}");
        assert_eq!(
            vec![
                Inst::Save(0),
                Inst::Char('a'),
                Inst::Char('a'),
                Inst::Split { primary: 4, secondary: 7 },
                Inst::Char('a'),
                Inst::Split { primary: 6, secondary: 7 },
                Inst::Char('a'),
                Inst::Save(1),
                Inst::Match,
            ],
            program.insts,
        );
    }

    #[test]
    fn zero_repetition_emits_nothing() {
        let program = compile("a{0}b");
        assert_eq!(
            vec![
                Inst::Save(0),
                Inst::Char('b'),
                Inst::Save(1),
                Inst::Match,
            ],
            program.insts,
        );
    }

    #[test]
    fn capturing_groups_save_slots() {
        let program = compile("(a)(?:b)");
        assert_eq!(
            vec![
                Inst::Save(0),
                Inst::Save(2),
                Inst::Char('a'),
                Inst::Save(3),
                Inst::Char('b'),
                Inst::Save(1),
                Inst::Match,
            ],
            program.insts,
        );
        assert_eq!(2, program.group_len);
        assert_eq!(4, program.slots);
    }

    #[test]
    fn lookaround_compiles_to_sub_program() {
        let program = compile("(?=(a))b");
        assert_eq!(1, program.subs.len());
        let sub = &program.subs[0];
        assert_eq!(
            vec![
                Inst::Save(2),
                Inst::Char('a'),
                Inst::Save(3),
                Inst::Match,
            ],
            sub.insts,
        );
        // Slot totals are shared across the tree.
        assert_eq!(4, program.slots);
        assert_eq!(4, sub.slots);
    }

    #[test]
    fn anchoring_detection() {
        assert!(compile("^foo").anchored_start);
        assert!(compile("(^a|^b)c").anchored_start);
        assert!(!compile("foo").anchored_start);
        assert!(!compile("a|^b").anchored_start);
        // ^ in multi-line mode anchors to lines, not the span start.
        let multi = Compiler::new(false, true, false)
            .compile(&parse("^foo").unwrap());
        assert!(!multi.anchored_start);
        assert_eq!(Inst::Look(Look::StartLF), multi.insts[1]);
    }

    #[test]
    fn prefix_detection() {
        assert_eq!(Some(Prefix::Byte(b'f')), compile("foo|faa").prefix);
        assert_eq!(Some(Prefix::Byte(b'c')), compile(r"\bcat\b").prefix);
        assert_eq!(None, compile("a|b").prefix);
        assert_eq!(None, compile("a*b").prefix);

        let ci = Compiler::new(true, false, false)
            .compile(&parse("error").unwrap());
        assert_eq!(Some(Prefix::Byte2(b'e', b'E')), ci.prefix);
        assert_eq!(Inst::Char('e'), ci.insts[1]);
    }

    #[test]
    fn dot_respects_dot_all() {
        assert_eq!(Inst::AnyExceptNewline, compile(".").insts[1]);
        let dot_all = Compiler::new(false, false, true)
            .compile(&parse(".").unwrap());
        assert_eq!(Inst::Any, dot_all.insts[1]);
    }
}
