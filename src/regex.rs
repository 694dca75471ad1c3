/*!
The public search API: [`Config`], [`Builder`] and [`Regex`].
*/

use crate::{
    backtrack::{self, Cache},
    compile::Compiler,
    parse::{self, BuildError},
    program::Program,
    util::{
        captures::Captures,
        iter,
        search::{Input, Match, MatchError},
    },
};

/// The default backtracking step budget per search call.
const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// The configuration of a [`Regex`].
///
/// A `Config` uses the builder pattern: methods take ownership, set one
/// knob and return the modified value. Every knob has a default, so
/// `Config::new()` by itself describes a usable regex.
///
/// ```
/// use regex_backtrack::{Config, Regex};
///
/// let re = Regex::builder()
///     .configure(Config::new().case_insensitive(true))
///     .build("warn|error")?;
/// let mut cache = re.create_cache();
/// assert!(re.is_match(&mut cache, "an ERROR was logged"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    case_insensitive: Option<bool>,
    multi_line: Option<bool>,
    dot_matches_new_line: Option<bool>,
    backtrack_limit: Option<usize>,
}

impl Config {
    /// Return a new configuration with everything set to its default.
    pub fn new() -> Config {
        Config::default()
    }

    /// When enabled, literals, classes and backreferences match without
    /// regard to case, using each char's simple one-to-one case mapping.
    ///
    /// Disabled by default.
    pub fn case_insensitive(mut self, yes: bool) -> Config {
        self.case_insensitive = Some(yes);
        self
    }

    /// When enabled, `^` and `$` match at line breaks inside the haystack
    /// in addition to its start and end.
    ///
    /// Disabled by default.
    pub fn multi_line(mut self, yes: bool) -> Config {
        self.multi_line = Some(yes);
        self
    }

    /// When enabled, `.` matches `\n` as well.
    ///
    /// Disabled by default.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Config {
        self.dot_matches_new_line = Some(yes);
        self
    }

    /// Set the maximum number of backtracking steps a single search call
    /// may execute before giving up with [`MatchError::BacktrackLimit`].
    ///
    /// The default is `1_000_000`, which leaves well-behaved patterns
    /// unaffected while stopping catastrophic cases quickly.
    pub fn backtrack_limit(mut self, limit: usize) -> Config {
        self.backtrack_limit = Some(limit);
        self
    }

    /// Returns whether case-insensitive matching is enabled.
    pub fn get_case_insensitive(&self) -> bool {
        self.case_insensitive.unwrap_or(false)
    }

    /// Returns whether multi-line mode is enabled.
    pub fn get_multi_line(&self) -> bool {
        self.multi_line.unwrap_or(false)
    }

    /// Returns whether `.` matches `\n`.
    pub fn get_dot_matches_new_line(&self) -> bool {
        self.dot_matches_new_line.unwrap_or(false)
    }

    /// Returns the backtracking step budget.
    pub fn get_backtrack_limit(&self) -> usize {
        self.backtrack_limit.unwrap_or(DEFAULT_BACKTRACK_LIMIT)
    }

    /// Overwrite this configuration with the options set in `o`. Options
    /// not set in `o` keep their value from `self`.
    pub(crate) fn overwrite(&self, o: Config) -> Config {
        Config {
            case_insensitive: o.case_insensitive.or(self.case_insensitive),
            multi_line: o.multi_line.or(self.multi_line),
            dot_matches_new_line: o
                .dot_matches_new_line
                .or(self.dot_matches_new_line),
            backtrack_limit: o.backtrack_limit.or(self.backtrack_limit),
        }
    }
}

/// A builder for a [`Regex`].
///
/// Construct one with [`Regex::builder`], apply a [`Config`] and build.
/// The plain [`Regex::new`] constructor is equivalent to building with the
/// default configuration.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a builder with the default configuration.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Apply the given configuration to this builder. Options that
    /// `config` leaves unset are unchanged.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }

    /// Build a regex from the given pattern.
    pub fn build(&self, pattern: &str) -> Result<Regex, BuildError> {
        let ast = parse::parse(pattern)?;
        let compiler = Compiler::new(
            self.config.get_case_insensitive(),
            self.config.get_multi_line(),
            self.config.get_dot_matches_new_line(),
        );
        Ok(Regex {
            config: self.config.clone(),
            program: compiler.compile(&ast),
        })
    }
}

/// A compiled regular expression, matched by backtracking.
///
/// A `Regex` is immutable once built and can be shared freely across
/// threads. The mutable state a search needs lives in a [`Cache`], created
/// with [`Regex::create_cache`]; each thread (or each concurrent search)
/// needs its own.
///
/// # Fallibility
///
/// Searches execute under a step budget ([`Config::backtrack_limit`]), so
/// every search routine comes in two flavors: a `try_` routine returning a
/// `Result` and a panicking convenience wrapper. "No match" is never an
/// error; the fallible routines reserve `Err` for an exhausted budget.
///
/// # Example
///
/// ```
/// use regex_backtrack::{Match, Regex};
///
/// let re = Regex::new(r"(\w+)@(\w+)\.example")?;
/// let mut cache = re.create_cache();
/// let mut caps = re.create_captures();
///
/// let hay = "mail us: eva@dev.example";
/// re.captures(&mut cache, hay, &mut caps);
/// assert_eq!(Some(Match::new(9..24)), caps.get_match());
/// assert_eq!("eva", &hay[caps.get_group(1).unwrap()]);
/// assert_eq!("dev", &hay[caps.get_group(2).unwrap()]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Regex {
    config: Config,
    program: Program,
}

impl Regex {
    /// Build a regex from a pattern with the default configuration.
    ///
    /// To set flags such as case-insensitivity, use [`Regex::builder`].
    pub fn new(pattern: &str) -> Result<Regex, BuildError> {
        Regex::builder().build(pattern)
    }

    /// Return a builder for configuring a regex.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Return the configuration this regex was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a new cache for searches with this regex.
    pub fn create_cache(&self) -> Cache {
        Cache::new(&self.program)
    }

    /// Create a new `Captures` value sized for this regex's groups.
    pub fn create_captures(&self) -> Captures {
        Captures::new(self.program.group_len)
    }

    /// Returns the total number of capturing groups, including the
    /// implicit group 0 for the overall match.
    pub fn group_len(&self) -> usize {
        self.program.group_len
    }

    /// The lowest level search routine: run this regex on the given
    /// [`Input`] and write the result into `caps`.
    ///
    /// All other search routines are wrappers around this one. `caps`
    /// reports no match when the pattern does not match within the input's
    /// span, and also when the span is out of bounds or not on char
    /// boundaries.
    pub fn try_search(
        &self,
        cache: &mut Cache,
        input: &Input<'_>,
        caps: &mut Captures,
    ) -> Result<(), MatchError> {
        backtrack::search(
            &self.program,
            cache,
            input,
            caps,
            self.config.get_backtrack_limit(),
        )
    }

    /// Returns true if this regex matches anywhere in the haystack.
    ///
    /// # Panics
    ///
    /// This panics when the backtracking step budget is exhausted. Use
    /// [`Regex::try_is_match`] to handle that case.
    pub fn is_match(&self, cache: &mut Cache, haystack: &str) -> bool {
        self.try_is_match(cache, haystack).unwrap_or_else(|err| {
            panic!(
                "unexpected regex find error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            )
        })
    }

    /// Fallible version of [`Regex::is_match`].
    pub fn try_is_match(
        &self,
        cache: &mut Cache,
        haystack: &str,
    ) -> Result<bool, MatchError> {
        Ok(self.try_find(cache, haystack)?.is_some())
    }

    /// Returns the leftmost match in the haystack, if any.
    ///
    /// # Panics
    ///
    /// This panics when the backtracking step budget is exhausted. Use
    /// [`Regex::try_find`] to handle that case.
    pub fn find(&self, cache: &mut Cache, haystack: &str) -> Option<Match> {
        self.try_find(cache, haystack).unwrap_or_else(|err| {
            panic!(
                "unexpected regex find error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            )
        })
    }

    /// Fallible version of [`Regex::find`].
    pub fn try_find(
        &self,
        cache: &mut Cache,
        haystack: &str,
    ) -> Result<Option<Match>, MatchError> {
        let mut caps = self.create_captures();
        self.try_search(cache, &Input::new(haystack), &mut caps)?;
        Ok(caps.get_match())
    }

    /// Search the haystack and fill `caps` with the spans of the leftmost
    /// match's capturing groups.
    ///
    /// # Panics
    ///
    /// This panics when the backtracking step budget is exhausted. Use
    /// [`Regex::try_captures`] to handle that case.
    pub fn captures(
        &self,
        cache: &mut Cache,
        haystack: &str,
        caps: &mut Captures,
    ) {
        if let Err(err) = self.try_captures(cache, haystack, caps) {
            panic!(
                "unexpected regex captures error: {}\n\
                 to handle find errors, use 'try' or 'search' methods",
                err,
            )
        }
    }

    /// Fallible version of [`Regex::captures`].
    pub fn try_captures(
        &self,
        cache: &mut Cache,
        haystack: &str,
        caps: &mut Captures,
    ) -> Result<(), MatchError> {
        self.try_search(cache, &Input::new(haystack), caps)
    }

    /// Run an anchored search at the given offset: the match must begin
    /// exactly at `offset`.
    ///
    /// This answers "does the pattern match here" rather than "where does
    /// the pattern match", which is what an unanchored search answers.
    ///
    /// # Panics
    ///
    /// This panics when `offset` is greater than the haystack length.
    pub fn try_match_at(
        &self,
        cache: &mut Cache,
        haystack: &str,
        offset: usize,
    ) -> Result<Option<Match>, MatchError> {
        assert!(
            offset <= haystack.len(),
            "match offset {} exceeds haystack length {}",
            offset,
            haystack.len(),
        );
        let input = Input::new(haystack)
            .span(offset..haystack.len())
            .anchored(true);
        let mut caps = self.create_captures();
        self.try_search(cache, &input, &mut caps)?;
        Ok(caps.get_match())
    }

    /// Returns an iterator over all non-overlapping matches in the
    /// haystack, leftmost first.
    ///
    /// An empty match immediately following another match is skipped, and
    /// iteration always advances by at least one char after an empty
    /// match, so the iterator terminates even for patterns that match the
    /// empty string everywhere.
    ///
    /// # Panics
    ///
    /// The iterator panics when the backtracking step budget is exhausted
    /// during any underlying search.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_backtrack::Regex;
    ///
    /// let re = Regex::new(r"\d+")?;
    /// let mut cache = re.create_cache();
    ///
    /// let hay = "route 66, exit 9";
    /// let spans: Vec<_> =
    ///     re.find_iter(&mut cache, hay).map(|m| m.range()).collect();
    /// assert_eq!(vec![6..8, 15..16], spans);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn find_iter<'r, 'c, 'h>(
        &'r self,
        cache: &'c mut Cache,
        haystack: &'h str,
    ) -> FindMatches<'r, 'c, 'h> {
        FindMatches {
            re: self,
            cache,
            caps: self.create_captures(),
            it: iter::Searcher::new(Input::new(haystack)),
        }
    }

    /// Returns an iterator over the capture groups of all non-overlapping
    /// matches in the haystack.
    ///
    /// The empty-match and panic behavior is the same as for
    /// [`Regex::find_iter`].
    pub fn captures_iter<'r, 'c, 'h>(
        &'r self,
        cache: &'c mut Cache,
        haystack: &'h str,
    ) -> CapturesMatches<'r, 'c, 'h> {
        CapturesMatches {
            re: self,
            cache,
            caps: self.create_captures(),
            it: iter::Searcher::new(Input::new(haystack)),
        }
    }
}

/// An iterator over all non-overlapping matches, created by
/// [`Regex::find_iter`].
///
/// `'r` is the lifetime of the regex, `'c` of the cache and `'h` of the
/// haystack.
#[derive(Debug)]
pub struct FindMatches<'r, 'c, 'h> {
    re: &'r Regex,
    cache: &'c mut Cache,
    caps: Captures,
    it: iter::Searcher<'h>,
}

impl<'r, 'c, 'h> Iterator for FindMatches<'r, 'c, 'h> {
    type Item = Match;

    #[inline]
    fn next(&mut self) -> Option<Match> {
        let FindMatches { re, ref mut cache, ref mut caps, ref mut it } =
            *self;
        it.advance(|input| {
            re.try_search(cache, input, caps)?;
            Ok(caps.get_match())
        })
    }
}

/// An iterator over the captures of all non-overlapping matches, created
/// by [`Regex::captures_iter`].
#[derive(Debug)]
pub struct CapturesMatches<'r, 'c, 'h> {
    re: &'r Regex,
    cache: &'c mut Cache,
    caps: Captures,
    it: iter::Searcher<'h>,
}

impl<'r, 'c, 'h> Iterator for CapturesMatches<'r, 'c, 'h> {
    type Item = Captures;

    #[inline]
    fn next(&mut self) -> Option<Captures> {
        let CapturesMatches { re, ref mut cache, ref mut caps, ref mut it } =
            *self;
        it.advance(|input| {
            re.try_search(cache, input, caps)?;
            Ok(caps.get_match())
        })
        .map(|_| caps.clone())
    }
}
