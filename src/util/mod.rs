/*!
Supporting types shared by the parser, the compiler and the backtracking
interpreter.

Most of what callers interact with lives here: [`Span`](search::Span),
[`Match`](search::Match), [`Input`](search::Input),
[`Captures`](captures::Captures) and [`MatchError`](search::MatchError).
*/

/// Reusable storage for the group spans of a match.
pub mod captures;
/// The iteration protocol behind `find_iter` and `captures_iter`.
pub mod iter;
/// Zero-width assertions.
pub mod look;
pub(crate) mod primitives;
/// Search parameters and results.
pub mod search;
