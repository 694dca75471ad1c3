/*!
A regular expression engine based on backtracking, with support for
backreferences and look-around.

This crate trades the worst-case time guarantees of automata-based engines
for expressiveness: patterns may refer back to earlier captures (`\1`) and
assert on surrounding text without consuming it (`(?=..)`, `(?!..)`,
`(?<=..)`, `(?<!..)`). The price is that some patterns backtrack
excessively; every search therefore runs under a configurable step budget
and reports [`MatchError::BacktrackLimit`] instead of hanging when the
budget runs out.

# Example

```
use regex_backtrack::Regex;

let re = Regex::new(r"(\w+)\s+\1")?;
let mut cache = re.create_cache();
let mut caps = re.create_captures();

let hay = "a duplicated duplicated word";
re.captures(&mut cache, hay, &mut caps);
assert_eq!("duplicated duplicated", &hay[caps.get_match().unwrap().span()]);
assert_eq!("duplicated", &hay[caps.get_group(1).unwrap()]);
# Ok::<(), Box<dyn std::error::Error>>(())
```

# Supported syntax

* Literals, `.`, alternation `|` and grouping, both capturing `(..)` and
non-capturing `(?:..)`.
* Character classes `[a-z0-9_]`, negated with a leading `^`, plus the Perl
classes `\d`, `\w`, `\s` and their complements.
* Greedy quantifiers `*`, `+`, `?`, `{n}`, `{n,}` and `{n,m}`; a trailing
`?` makes a quantifier lazy.
* Anchors `^` and `$`, word boundaries `\b` and `\B`.
* Backreferences `\1` through `\99`.
* Look-ahead `(?=..)`/`(?!..)` and look-behind `(?<=..)`/`(?<!..)`.

Flags are not written in the pattern; they are set on a [`Config`] and
applied through [`Regex::builder`]. The available flags are
case-insensitivity, multi-line anchors and dot-matches-newline.

# The cache and captures model

A [`Regex`] is immutable and shareable. All per-search mutable state lives
in a [`Cache`], and match results are written into a reusable [`Captures`]
value. Both are created from the regex:

```
use regex_backtrack::Regex;

let re = Regex::new("[0-9]+")?;
let mut cache = re.create_cache();

let sum: i64 = re
    .find_iter(&mut cache, "3 + 4 + 10")
    .map(|m| "3 + 4 + 10"[m.span()].parse::<i64>().unwrap())
    .sum();
assert_eq!(17, sum);
# Ok::<(), Box<dyn std::error::Error>>(())
```

Applications that compile patterns from runtime input can put a bounded
[`RegexCache`] in front of the builder to avoid recompiling hot patterns.

# Matching semantics

Matching is leftmost-first, like Perl and unlike the leftmost-longest POSIX
rule: at the leftmost position where any match exists, the alternative
preferred by the pattern wins. Haystacks are `&str` and all reported
offsets are byte offsets, always on UTF-8 char boundaries. Case-insensitive
matching uses each char's simple one-to-one case mapping, and the Perl
classes and word boundaries are defined over ASCII.

# Crate features

* **logging** - Emits trace messages via the [`log`](https://docs.rs/log)
crate describing compilation and searches that give up. Disabled by
default.
*/

#![warn(missing_docs)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

mod ast;
mod backtrack;
mod cache;
mod compile;
mod parse;
mod program;
mod regex;
pub mod util;

pub use crate::{
    backtrack::Cache,
    cache::RegexCache,
    parse::BuildError,
    regex::{Builder, CapturesMatches, Config, FindMatches, Regex},
    util::{
        captures::Captures,
        search::{Input, Match, MatchError, Span},
    },
};
