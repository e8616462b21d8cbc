//! Field extraction strategies shared by the adapters.
//!
//! Each field is an ordered fallback chain held as data: the first strategy
//! that yields a value wins, and exhausting the chain yields the neutral
//! default (`0.0` snowfall, empty report). Chains are compiled once, when
//! the adapter is built.

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};

use crate::error::TrackerError;

/// Elements whose text never counts as page content.
const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Paragraph prefixes treated as boilerplate.
const BOILERPLATE_PATTERN: &str = r"^(?:\d|copyright|©|privacy|cookie)";

/// Compiles a case-insensitive pattern.
///
/// # Errors
///
/// Returns [`TrackerError::Pattern`] if the pattern is invalid.
pub fn pattern(source: &str) -> Result<Regex, TrackerError> {
    Ok(RegexBuilder::new(source).case_insensitive(true).build()?)
}

/// Parses a CSS selector.
///
/// # Errors
///
/// Returns [`TrackerError::Pattern`] if the selector is invalid.
pub fn selector(source: &str) -> Result<Selector, TrackerError> {
    Selector::parse(source).map_err(|e| TrackerError::Pattern(format!("{source}: {e}")))
}

/// Text content of an element, trimmed pieces joined by single spaces.
#[must_use]
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Elements that start and end a rendered line. Everything else, table
/// cells included, flows inline with its siblings.
const BLOCK_TAGS: [&str; 37] = [
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre",
    "section", "summary", "table", "tr", "ul",
];

/// Rendered lines being assembled by [`page_text`].
#[derive(Debug, Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
}

impl LineBuffer {
    fn push_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            if !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn collect(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.push_words(text);
                continue;
            }
            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            let name = child.value().name();
            if NON_CONTENT_TAGS.contains(&name) {
                continue;
            }
            if name == "br" {
                self.break_line();
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                self.break_line();
            }
            self.collect(child);
            if block {
                self.break_line();
            }
        }
    }
}

/// Visible text of a document as rendered lines.
///
/// Inline siblings share a line with single spaces between words; block
/// elements and `<br>` end it. Script and style contents are skipped.
#[must_use]
pub fn page_text(document: &Html) -> String {
    let mut buffer = LineBuffer::default();
    buffer.collect(document.root_element());
    buffer.break_line();
    buffer.lines.join("\n")
}

/// Ordered 24-hour snowfall patterns.
///
/// Each pattern has exactly one capture group holding the number.
#[derive(Debug, Clone)]
pub struct SnowPatterns {
    patterns: Vec<Regex>,
}

impl SnowPatterns {
    /// Compiles the chain, primary pattern first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if any pattern is invalid.
    pub fn new(sources: &[&str]) -> Result<Self, TrackerError> {
        let patterns = sources
            .iter()
            .map(|s| pattern(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First pattern whose first match parses as a number wins.
    ///
    /// A match that does not parse (e.g. a lone `.`) moves on to the next
    /// pattern.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<f64> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            let value: f64 = caps.get(1)?.as_str().parse().ok()?;
            value.is_finite().then_some(value)
        })
    }

    /// [`Self::extract`], defaulting to `0.0`.
    #[must_use]
    pub fn extract_or_zero(&self, text: &str) -> f64 {
        self.extract(text).unwrap_or(0.0)
    }
}

/// One way of locating narrative report text.
#[derive(Debug, Clone)]
pub enum ReportStrategy {
    /// First element matching the selector, if its text is long enough.
    Selector {
        /// Compiled selector.
        selector: Selector,
        /// Text must be strictly longer than this many characters.
        min_chars: usize,
    },
    /// First element carrying a class that matches the pattern, if its
    /// text is long enough.
    ClassPattern {
        /// Pattern tested against each class name.
        pattern: Regex,
        /// Text must be strictly longer than this many characters.
        min_chars: usize,
    },
    /// Leading long, non-boilerplate paragraphs joined by blank lines.
    Paragraphs {
        /// Paragraph selector (`p`).
        selector: Selector,
        /// Boilerplate prefix filter.
        boilerplate: Regex,
        /// A paragraph must be strictly longer than this many characters.
        min_chars: usize,
        /// Maximum number of paragraphs kept.
        limit: usize,
    },
}

impl ReportStrategy {
    /// Paragraph fallback: paragraphs over 40 chars, first five.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
    pub fn paragraphs() -> Result<Self, TrackerError> {
        Ok(Self::Paragraphs {
            selector: selector("p")?,
            boilerplate: pattern(BOILERPLATE_PATTERN)?,
            min_chars: 40,
            limit: 5,
        })
    }

    fn apply(&self, document: &Html) -> Option<String> {
        match self {
            Self::Selector {
                selector,
                min_chars,
            } => {
                let text = collapsed_text(document.select(selector).next()?);
                (text.chars().count() > *min_chars).then_some(text)
            }
            Self::ClassPattern { pattern, min_chars } => {
                let element = document
                    .root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().classes().any(|class| pattern.is_match(class)))?;
                let text = collapsed_text(element);
                (text.chars().count() > *min_chars).then_some(text)
            }
            Self::Paragraphs {
                selector,
                boilerplate,
                min_chars,
                limit,
            } => {
                let kept: Vec<String> = document
                    .select(selector)
                    .map(collapsed_text)
                    .filter(|t| t.chars().count() > *min_chars && !boilerplate.is_match(t))
                    .take(*limit)
                    .collect();
                (!kept.is_empty()).then(|| kept.join("\n\n"))
            }
        }
    }
}

/// Ordered report extraction chain.
#[derive(Debug, Clone)]
pub struct ReportExtractor {
    strategies: Vec<ReportStrategy>,
}

impl ReportExtractor {
    /// Builds a chain from explicit strategies.
    #[must_use]
    pub const fn new(strategies: Vec<ReportStrategy>) -> Self {
        Self { strategies }
    }

    /// Selector chain (each hit must exceed 50 chars), then paragraphs.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if any selector is invalid.
    pub fn from_selectors(selectors: &[&str]) -> Result<Self, TrackerError> {
        let mut strategies = selectors
            .iter()
            .map(|s| {
                Ok(ReportStrategy::Selector {
                    selector: selector(s)?,
                    min_chars: 50,
                })
            })
            .collect::<Result<Vec<_>, TrackerError>>()?;
        strategies.push(ReportStrategy::paragraphs()?);
        Ok(Self::new(strategies))
    }

    /// Class-name pattern (hit must exceed 50 chars), then paragraphs.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if the pattern is invalid.
    pub fn from_class_pattern(class_pattern: &str) -> Result<Self, TrackerError> {
        Ok(Self::new(vec![
            ReportStrategy::ClassPattern {
                pattern: pattern(class_pattern)?,
                min_chars: 50,
            },
            ReportStrategy::paragraphs()?,
        ]))
    }

    /// Runs the chain; empty string when nothing matched.
    #[must_use]
    pub fn extract(&self, document: &Html) -> String {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.apply(document))
            .unwrap_or_default()
    }
}
