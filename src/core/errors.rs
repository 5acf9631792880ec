use std::fmt;
use thiserror::Error;
use url::Url;

/// Position inside a crawl, used to tag errors raised while processing a page or item.
///
/// Pages and items are numbered from 1, items in document order within their page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageItem {
    pub page: usize,
    pub item: Option<usize>,
}

impl PageItem {
    pub fn page(page: usize) -> Self {
        Self { page, item: None }
    }

    pub fn item(page: usize, item: usize) -> Self {
        Self {
            page,
            item: Some(item),
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item {
            Some(item) => write!(f, "page {}, item {}", self.page, item),
            None => write!(f, "page {}", self.page),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Fetch error for {url}: {reason}")]
    FetchError { url: Url, reason: String },

    #[error("Malformed price text: {0:?}")]
    MalformedPriceError(String),

    #[error("Malformed fragment: missing {0}")]
    MalformedFragmentError(String),

    #[error("Selector error: {0}")]
    SelectorError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{at}: {source}")]
    At {
        at: PageItem,
        #[source]
        source: Box<ScraperError>,
    },
}

impl ScraperError {
    pub fn at(self, at: PageItem) -> Self {
        match self {
            // keep the innermost location
            ScraperError::At { .. } => self,
            other => ScraperError::At {
                at,
                source: Box::new(other),
            },
        }
    }

    /// The error with any location context stripped.
    pub fn root(&self) -> &ScraperError {
        match self {
            ScraperError::At { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn location(&self) -> Option<PageItem> {
        match self {
            ScraperError::At { at, .. } => Some(*at),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(
            self.root(),
            ScraperError::HttpError(_) | ScraperError::FetchError { .. }
        )
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_reported_and_stripped() {
        let err = ScraperError::MalformedPriceError("free".to_string()).at(PageItem::item(2, 3));

        assert_eq!(err.to_string(), "page 2, item 3: Malformed price text: \"free\"");
        assert_eq!(err.location(), Some(PageItem::item(2, 3)));
        assert!(matches!(err.root(), ScraperError::MalformedPriceError(_)));
    }

    #[test]
    fn test_innermost_location_wins() {
        let err = ScraperError::MalformedFragmentError("title".to_string())
            .at(PageItem::item(1, 1))
            .at(PageItem::page(1));

        assert_eq!(err.location(), Some(PageItem::item(1, 1)));
    }
}
