//! Counter extraction from the admin pages.
//!
//! Each page kind has its own [`ExtractionStrategy`]. The default strategies are regex walks over the raw HTML
//! ([`PatternExtractor`]); any of them can be replaced through [`Extractors::with`] without touching the rest
//! of the pipeline.

mod pattern;

use crate::error::CollectError;
pub use pattern::PatternExtractor;
use strum::Display;

/// Counter names, shared by the extractors and the snapshot builder.
pub mod fields {
    pub const TAGS: &str = "tags";
    pub const ALL: &str = "all";
    pub const PUBLISHED: &str = "published";
    pub const CLOSED: &str = "closed";
    pub const ARCHIVED: &str = "archived";
    pub const ADMINISTRATOR: &str = "administrator";
    pub const EDITOR: &str = "editor";
    pub const KEYMASTER: &str = "keymaster";
    pub const MODERATOR: &str = "moderator";
    pub const BLOCKED: &str = "blocked";
    pub const HELPHUB_EDITOR: &str = "helphub_editor";
    pub const HELPHUB_MANAGER: &str = "helphub_manager";
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum PageKind {
    Tags,
    Replies,
    Topics,
    Users,
}

/// Named counters scraped from one page, in the order they appear on it.
///
/// Values are kept as the page renders them (e.g. `1,204`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterBundle {
    page: PageKind,
    counters: Vec<(&'static str, String)>,
}

impl CounterBundle {
    pub fn new(page: PageKind) -> Self {
        Self {
            page,
            counters: Vec::new(),
        }
    }

    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: &'static str, value: impl Into<String>) {
        self.counters.push((field, value.into()));
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.counters.iter().map(|(field, _)| *field)
    }

    #[cfg(test)]
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.counters.iter().map(|(_, value)| value.as_str())
    }

    pub fn get(&self, field: &'static str) -> Result<&str, CollectError> {
        self.counters
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
            .ok_or(CollectError::MissingField { page: self.page, field })
    }
}

/// Turns the raw HTML of one admin page into its counters.
pub trait ExtractionStrategy: Send + Sync {
    fn extract(&self, body: &str) -> Result<CounterBundle, CollectError>;
}

/// One strategy per page kind.
pub struct Extractors {
    tags: Box<dyn ExtractionStrategy>,
    replies: Box<dyn ExtractionStrategy>,
    topics: Box<dyn ExtractionStrategy>,
    users: Box<dyn ExtractionStrategy>,
}

impl Default for Extractors {
    fn default() -> Self {
        Self {
            tags: Box::new(PatternExtractor::for_page(PageKind::Tags)),
            replies: Box::new(PatternExtractor::for_page(PageKind::Replies)),
            topics: Box::new(PatternExtractor::for_page(PageKind::Topics)),
            users: Box::new(PatternExtractor::for_page(PageKind::Users)),
        }
    }
}

impl Extractors {
    pub fn with(mut self, page: PageKind, strategy: impl ExtractionStrategy + 'static) -> Self {
        *self.slot(page) = Box::new(strategy);
        self
    }

    pub fn extract(&self, page: PageKind, body: &str) -> Result<CounterBundle, CollectError> {
        let strategy = match page {
            PageKind::Tags => &self.tags,
            PageKind::Replies => &self.replies,
            PageKind::Topics => &self.topics,
            PageKind::Users => &self.users,
        };
        strategy.extract(body)
    }

    fn slot(&mut self, page: PageKind) -> &mut Box<dyn ExtractionStrategy> {
        match page {
            PageKind::Tags => &mut self.tags,
            PageKind::Replies => &mut self.replies,
            PageKind::Topics => &mut self.topics,
            PageKind::Users => &mut self.users,
        }
    }
}

impl std::fmt::Debug for Extractors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractors").finish_non_exhaustive()
    }
}
