// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter patterns, the scoring oracle, and generation-tagged live filtering.
//!
//! Filter text is parsed into a [`FilterPattern`]:
//!
//! - empty text matches everything with [`ItemScore::FULL`],
//! - `r/expr/` is a regular expression,
//! - `g/glob/` is a case-insensitive glob over the whole title (`*` and `?`),
//! - anything else, including an expression that fails to compile, is plain text.
//!
//! A [`FilterScorer`] turns a pattern and a title into a [`FilterMatch`]. Menus treat
//! a zero score as hidden and never look at the numbers otherwise, so hosts can plug
//! in their own oracle. [`BasicScorer`] is the one used by default.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;
use std::thread::JoinHandle;

use hashbrown::HashMap;
use regex::Regex;
use smallvec::SmallVec;

use crate::menu::{ItemId, MenuId};

/// How well an item matched a filter. Zero hides the item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemScore(u8);

impl ItemScore {
    /// No match.
    pub const NONE: Self = Self(0);
    /// The filter's characters appear in order, not necessarily together.
    pub const SUBSEQUENCE: Self = Self(1);
    /// The filter appears ignoring case.
    pub const CONTAINS: Self = Self(2);
    /// The filter appears verbatim, or the expression matched.
    pub const STRONG: Self = Self(3);
    /// Score given to every item when there is no filter.
    pub const FULL: Self = Self::STRONG;

    /// Wrap a raw score.
    #[must_use]
    pub const fn new(score: u8) -> Self {
        Self(score)
    }

    /// Raw score.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether this score hides the item.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Parsed filter text.
#[derive(Clone, Debug)]
pub enum FilterPattern {
    /// No filter.
    Empty,
    /// Plain text.
    Text(String),
    /// A compiled expression (from `r/…/` or `g/…/`).
    Regex(Regex),
}

impl FilterPattern {
    /// Parse filter text typed by the user.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::Empty;
        }
        if let Some(expr) = delimited(text, "r/") {
            match Regex::new(expr) {
                Ok(regex) => return Self::Regex(regex),
                Err(err) => tracing::debug!(%err, expr, "invalid filter expression, matching as text"),
            }
        }
        if let Some(glob) = delimited(text, "g/") {
            match Regex::new(&glob_to_regex(glob)) {
                Ok(regex) => return Self::Regex(regex),
                Err(err) => tracing::debug!(%err, glob, "invalid glob, matching as text"),
            }
        }
        Self::Text(text.to_owned())
    }

    /// Whether this pattern matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

fn delimited<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix)?
        .strip_suffix('/')
        .filter(|inner| !inner.is_empty())
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("(?i)^");
    let mut buf = [0_u8; 4];
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}

/// Result of scoring one title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterMatch {
    /// Match strength.
    pub score: ItemScore,
    /// Byte ranges of the title to emphasize.
    pub ranges: SmallVec<[Range<usize>; 2]>,
}

impl FilterMatch {
    /// A miss.
    #[must_use]
    pub fn none() -> Self {
        Self {
            score: ItemScore::NONE,
            ranges: SmallVec::new(),
        }
    }

    /// A full-strength match with nothing to emphasize.
    #[must_use]
    pub fn full() -> Self {
        Self {
            score: ItemScore::FULL,
            ranges: SmallVec::new(),
        }
    }

    fn with_range(score: ItemScore, range: Range<usize>) -> Self {
        let mut ranges = SmallVec::new();
        ranges.push(range);
        Self { score, ranges }
    }
}

/// Scores item titles against a filter.
///
/// Scoring runs on worker threads, hence the `Send + Sync` bound.
pub trait FilterScorer: Send + Sync {
    /// Score `title` against `pattern`. [`FilterPattern::Empty`] must score
    /// [`ItemScore::FULL`].
    fn score(&self, pattern: &FilterPattern, title: &str) -> FilterMatch;
}

/// Reference scorer.
///
/// | Match | Score |
/// |---|---|
/// | expression matched | 3 |
/// | text appears verbatim | 3 |
/// | text appears ignoring case | 2 |
/// | text characters appear in order, ignoring case | 1 |
/// | otherwise | 0 |
#[derive(Copy, Clone, Debug, Default)]
pub struct BasicScorer;

impl FilterScorer for BasicScorer {
    fn score(&self, pattern: &FilterPattern, title: &str) -> FilterMatch {
        match pattern {
            FilterPattern::Empty => FilterMatch::full(),
            FilterPattern::Regex(regex) => regex
                .find(title)
                .map_or_else(FilterMatch::none, |m| {
                    FilterMatch::with_range(ItemScore::STRONG, m.range())
                }),
            FilterPattern::Text(text) => {
                if let Some(start) = title.find(text.as_str()) {
                    FilterMatch::with_range(ItemScore::STRONG, start..start + text.len())
                } else if let Some(range) = find_ignoring_case(title, text) {
                    FilterMatch::with_range(ItemScore::CONTAINS, range)
                } else if let Some(ranges) = subsequence(title, text) {
                    FilterMatch {
                        score: ItemScore::SUBSEQUENCE,
                        ranges,
                    }
                } else {
                    FilterMatch::none()
                }
            }
        }
    }
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn find_ignoring_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    'start: for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        for n in needle.chars() {
            match rest.next() {
                Some((offset, c)) if chars_match(c, n) => end = start + offset + c.len_utf8(),
                _ => continue 'start,
            }
        }
        return Some(start..end);
    }
    None
}

fn subsequence(haystack: &str, needle: &str) -> Option<SmallVec<[Range<usize>; 2]>> {
    let mut ranges: SmallVec<[Range<usize>; 2]> = SmallVec::new();
    let mut rest = haystack.char_indices();
    'needle: for n in needle.chars() {
        for (at, c) in rest.by_ref() {
            if chars_match(c, n) {
                let range = at..at + c.len_utf8();
                match ranges.last_mut() {
                    Some(last) if last.end == range.start => last.end = range.end,
                    _ => ranges.push(range),
                }
                continue 'needle;
            }
        }
        return None;
    }
    Some(ranges)
}

/// Below this many titles per worker, scoring stays on the calling thread.
const MIN_ITEMS_PER_THREAD: usize = 256;

/// Score every title, fanning out across scoped worker threads for large menus.
///
/// Blocks until every chunk has been scored; results are in input order.
pub fn score_items<S>(scorer: &dyn FilterScorer, pattern: &FilterPattern, titles: &[S]) -> Vec<FilterMatch>
where
    S: AsRef<str> + Sync,
{
    let max_threads = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let thread_count = (titles.len() / MIN_ITEMS_PER_THREAD).clamp(1, max_threads);
    if thread_count == 1 {
        return titles
            .iter()
            .map(|title| scorer.score(pattern, title.as_ref()))
            .collect();
    }

    let items_per_thread = titles.len().div_ceil(thread_count);
    let mut matches = Vec::with_capacity(titles.len());
    std::thread::scope(|s| {
        let tasks: Vec<_> = titles
            .chunks(items_per_thread)
            .map(|chunk| {
                s.spawn(move || {
                    chunk
                        .iter()
                        .map(|title| scorer.score(pattern, title.as_ref()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for task in tasks {
            match task.join() {
                Ok(local) => matches.extend(local),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });
    matches
}

/// Identifies one live filter pass over one menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterTicket {
    /// Menu being filtered.
    pub menu: MenuId,
    /// Generation of the pass.
    pub generation: u64,
}

/// Per-menu generation counters for live filtering.
///
/// Every keystroke starts a new pass with [`begin`](Self::begin). Passes are never
/// cancelled; a finished pass is applied only if its ticket is still current.
#[derive(Clone, Debug, Default)]
pub struct LiveFilter {
    generations: HashMap<MenuId, u64>,
}

impl LiveFilter {
    /// Create a counter set with every menu at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass for `menu`, superseding earlier ones.
    pub fn begin(&mut self, menu: MenuId) -> FilterTicket {
        let generation = self.generations.entry(menu).or_insert(0);
        *generation += 1;
        FilterTicket {
            menu,
            generation: *generation,
        }
    }

    /// Latest generation started for `menu`.
    #[must_use]
    pub fn generation(&self, menu: MenuId) -> u64 {
        self.generations.get(&menu).copied().unwrap_or(0)
    }

    /// Whether `ticket` belongs to the latest pass of its menu.
    #[must_use]
    pub fn is_current(&self, ticket: &FilterTicket) -> bool {
        self.generation(ticket.menu) == ticket.generation
    }
}

/// Results of a background filter pass.
#[derive(Clone, Debug)]
pub struct FilterCompletion {
    /// Pass the results belong to.
    pub ticket: FilterTicket,
    /// Filter text that was scored.
    pub text: String,
    /// Scored items, parallel to `results`.
    pub items: Vec<ItemId>,
    /// One result per item.
    pub results: Vec<FilterMatch>,
}

/// Score `titles` on a background thread and hand the results to `deliver`.
///
/// The pass always runs to completion; the receiver decides whether the ticket is
/// still current.
pub fn spawn_filter_pass<F>(
    scorer: Arc<dyn FilterScorer>,
    ticket: FilterTicket,
    text: String,
    items: Vec<ItemId>,
    titles: Vec<String>,
    deliver: F,
) -> JoinHandle<()>
where
    F: FnOnce(FilterCompletion) + Send + 'static,
{
    std::thread::spawn(move || {
        let pattern = FilterPattern::parse(&text);
        let results = score_items(scorer.as_ref(), &pattern, &titles);
        deliver(FilterCompletion {
            ticket,
            text,
            items,
            results,
        });
    })
}
