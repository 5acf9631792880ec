use crate::core::PageItem;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Listing { page: usize },
    Detail { page: usize, item: usize },
}

impl RequestKind {
    pub fn location(&self) -> PageItem {
        match *self {
            RequestKind::Listing { page } => PageItem::page(page),
            RequestKind::Detail { page, item } => PageItem::item(page, item),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub kind: RequestKind,
}

impl HttpRequest {
    pub fn new(url: Url, kind: RequestKind) -> Self {
        Self { url, kind }
    }

    pub fn listing(url: Url, page: usize) -> Self {
        Self::new(url, RequestKind::Listing { page })
    }

    pub fn detail(url: Url, page: usize, item: usize) -> Self {
        Self::new(url, RequestKind::Detail { page, item })
    }
}
