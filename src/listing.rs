//! Article list pipeline
//!
//! The visible page of articles is a pure function of the article collection
//! and a [`QueryState`]: filter, then sort, then paginate. Nothing is cached,
//! so the view is recomputed from scratch whenever either input changes.

use crate::config::ListingConfig;
use crate::error::{Error, Result};
use crate::types::{Article, SortKey, normalize_subject};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Subject filter value matching every article
pub const SUBJECT_ALL: &str = "all";

/// User-chosen search, filter, sort and page settings
///
/// Setters that change which articles match or how they are ordered reset the
/// page to 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    search_term: String,
    subject_filter: String,
    sort_key: SortKey,
    page_size: usize,
    page_size_options: Vec<usize>,
    page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::from_config(&ListingConfig::default())
    }
}

impl QueryState {
    /// Initial state from the listing defaults
    pub fn from_config(config: &ListingConfig) -> Self {
        Self {
            search_term: String::new(),
            subject_filter: SUBJECT_ALL.to_string(),
            sort_key: config.default_sort,
            page_size: config.default_page_size.max(1),
            page_size_options: config
                .page_size_options
                .iter()
                .copied()
                .filter(|&n| n > 0)
                .collect(),
            page: 1,
        }
    }

    /// Search text as typed
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Normalized subject or [`SUBJECT_ALL`]
    pub fn subject_filter(&self) -> &str {
        &self.subject_filter
    }

    /// Ordering after pinned/favorite
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Articles per page (at least 1)
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page sizes the user may pick; empty means any size is accepted
    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Requested page, 1-based; may exceed the page count until clamped
    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the search text; resets the page
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    /// Change the subject filter; resets the page
    ///
    /// The value is normalized, so `" DSA "` selects `dsa`. A blank value
    /// selects [`SUBJECT_ALL`].
    pub fn set_subject_filter(&mut self, subject: &str) {
        let trimmed = subject.trim();
        self.subject_filter = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(SUBJECT_ALL) {
            SUBJECT_ALL.to_string()
        } else {
            normalize_subject(Some(trimmed))
        };
        self.page = 1;
    }

    /// Change the ordering; resets the page
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.page = 1;
    }

    /// Change the page size; resets the page
    ///
    /// Sizes outside [`page_size_options`](Self::page_size_options) are
    /// rejected and leave the state unchanged. Without options, 0 is
    /// treated as 1.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if !self.page_size_options.is_empty() && !self.page_size_options.contains(&size) {
            return Err(Error::InvalidInput(format!(
                "page size {size} is not one of {:?}",
                self.page_size_options
            )));
        }
        self.page_size = size.max(1);
        self.page = 1;
        Ok(())
    }

    /// Jump to a page; clamped when the view is derived
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Advance one page, stopping at `total_pages`
    pub fn next_page(&mut self, total_pages: usize) {
        let last = total_pages.max(1);
        self.page = self.page.saturating_add(1).min(last);
    }

    /// Go back one page, stopping at 1
    ///
    /// A page beyond `total_pages` first snaps to the last page, so the step
    /// is always visible.
    pub fn prev_page(&mut self, total_pages: usize) {
        let last = total_pages.max(1);
        self.page = self.page.min(last).saturating_sub(1).max(1);
    }

    /// Whether a search term or a subject filter narrows the list
    pub fn has_filters(&self) -> bool {
        self.subject_filter != SUBJECT_ALL || !self.search_term.trim().is_empty()
    }

    /// Whether `article` passes the search and subject filters
    pub fn matches(&self, article: &Article) -> bool {
        let query = self.search_term.trim().to_lowercase();
        let matches_query = query.is_empty()
            || article.title.to_lowercase().contains(&query)
            || article
                .subject
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&query);

        let matches_subject =
            self.subject_filter == SUBJECT_ALL || self.subject_filter == article.normalized_subject();

        matches_query && matches_subject
    }
}

/// One page of the filtered, sorted collection
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleView<'a> {
    /// Articles on the current page, in display order
    pub visible: Vec<&'a Article>,
    /// Number of articles passing the filters
    pub total_filtered: usize,
    /// Current page after clamping, 1-based
    pub page: usize,
    /// Page count, at least 1
    pub total_pages: usize,
    /// 1-based position of the first visible article, 0 when nothing matches
    pub page_start: usize,
    /// 1-based position of the last visible article, 0 when nothing matches
    pub page_end: usize,
}

impl ArticleView<'_> {
    /// Whether a later page exists
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Page buttons to render, see [`page_slots`]
    pub fn page_slots(&self) -> Vec<PageSlot> {
        page_slots(self.page, self.total_pages)
    }
}

/// One entry of a pagination bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSlot {
    /// Button for a 1-based page number
    Page(usize),
    /// Ellipsis standing in for skipped pages
    Gap,
}

/// Longest page count shown without gaps
pub const MAX_UNGAPPED_PAGES: usize = 7;

/// Pagination bar for `current` of `total_pages`
///
/// Up to [`MAX_UNGAPPED_PAGES`] pages are all listed. Beyond that the bar
/// holds the first and last page plus the neighbours of `current`, with a
/// [`PageSlot::Gap`] wherever numbers are skipped.
pub fn page_slots(current: usize, total_pages: usize) -> Vec<PageSlot> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    let mut slots = Vec::new();
    let mut prev: Option<usize> = None;

    for p in 1..=total {
        let shown = total <= MAX_UNGAPPED_PAGES
            || p == 1
            || p == total
            || p.abs_diff(current) <= 1;
        if !shown {
            continue;
        }
        if prev.is_some_and(|q| p - q > 1) {
            slots.push(PageSlot::Gap);
        }
        slots.push(PageSlot::Page(p));
        prev = Some(p);
    }
    slots
}

/// Filter, sort and paginate `articles`
pub fn derive_view<'a>(articles: &'a [Article], query: &QueryState) -> ArticleView<'a> {
    let mut filtered = filter_articles(articles, query);
    sort_articles(&mut filtered, query.sort_key);

    let page_size = query.page_size.max(1);
    let total_filtered = filtered.len();
    let total_pages = total_pages(total_filtered, page_size);
    let page = query.page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (page * page_size).min(total_filtered);
    let visible = filtered
        .get(start..end)
        .map(<[&Article]>::to_vec)
        .unwrap_or_default();

    let (page_start, page_end) = if total_filtered == 0 {
        (0, 0)
    } else {
        (start + 1, end)
    };

    ArticleView {
        visible,
        total_filtered,
        page,
        total_pages,
        page_start,
        page_end,
    }
}

/// Articles passing the query's search and subject filters, in input order
pub fn filter_articles<'a>(articles: &'a [Article], query: &QueryState) -> Vec<&'a Article> {
    articles.iter().filter(|a| query.matches(a)).collect()
}

/// Stable sort: pinned first, then favorites, then `key`
pub fn sort_articles(articles: &mut [&Article], key: SortKey) {
    articles.sort_by(|a, b| compare_articles(a, b, key));
}

/// Ordering used by [`sort_articles`]
pub fn compare_articles(a: &Article, b: &Article, key: SortKey) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.favorite.cmp(&a.favorite))
        .then_with(|| match key {
            SortKey::TitleAsc => compare_titles(&a.title, &b.title),
            SortKey::TitleDesc => compare_titles(&b.title, &a.title),
            SortKey::DateAsc => a.created_at_millis().cmp(&b.created_at_millis()),
            SortKey::DateDesc => b.created_at_millis().cmp(&a.created_at_millis()),
        })
}

/// Human-oriented title comparison
///
/// Case-insensitive first, so "apple" sorts next to "Apple" rather than after
/// "Zebra"; exact comparison only breaks ties between case variants.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// `max(1, ceil(count / page_size))`; a page size of 0 counts as 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// A subject filter choice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectOption {
    /// Filter value ([`SUBJECT_ALL`] or a normalized subject)
    pub value: String,
    /// Display label
    pub label: String,
}

/// Filter choices: "all" followed by each distinct normalized subject, sorted
pub fn subject_options(articles: &[Article]) -> Vec<SubjectOption> {
    let subjects: BTreeSet<String> = articles.iter().map(Article::normalized_subject).collect();

    std::iter::once(SubjectOption {
        value: SUBJECT_ALL.to_string(),
        label: "All Subjects".to_string(),
    })
    .chain(subjects.into_iter().map(|s| SubjectOption {
        label: subject_label(&s),
        value: s,
    }))
    .collect()
}

/// Display label for a normalized subject
pub fn subject_label(subject: &str) -> String {
    match subject {
        SUBJECT_ALL => "All Subjects".to_string(),
        "dsa" => "DSA".to_string(),
        "os" => "OS".to_string(),
        "other" => "Other".to_string(),
        _ => {
            let mut chars = subject.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Counts over the whole collection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArticleStats {
    /// Number of articles
    pub total: usize,
    /// Articles marked favorite
    pub favorites: usize,
    /// Articles pinned
    pub pinned: usize,
    /// Articles per normalized subject
    pub by_subject: BTreeMap<String, usize>,
}

impl ArticleStats {
    /// Tally `articles`
    pub fn collect(articles: &[Article]) -> Self {
        articles.iter().fold(Self::default(), |mut acc, a| {
            acc.total += 1;
            acc.favorites += usize::from(a.favorite);
            acc.pinned += usize::from(a.pinned);
            *acc.by_subject.entry(a.normalized_subject()).or_default() += 1;
            acc
        })
    }
}
