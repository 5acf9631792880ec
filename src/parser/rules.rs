use crate::{ScraperError, ScraperResult};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// CSS selectors and positional rules describing the catalogue layout.
///
/// Defaults match books.toscrape.com. Override individual fields when the site layout drifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// One match per catalogue entry on a listing page.
    pub item: String,
    /// Link carrying the `title` attribute and the detail `href`, relative to an item.
    pub title_link: String,
    pub price: String,
    pub availability: String,
    /// Element whose second class is the rating tier, e.g. `star-rating Three`.
    pub rating: String,
    pub image: String,

    pub breadcrumb: String,
    /// Zero-based breadcrumb entry holding the category (Home > Category > Title).
    pub category_index: usize,
    pub attribute_table: String,
    pub attribute_row: String,
    pub attribute_label: String,
    pub attribute_value: String,
    pub upc_label: String,
    pub availability_label: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            item: "article.product_pod".to_string(),
            title_link: "h3 a".to_string(),
            price: "p.price_color".to_string(),
            availability: "p.instock.availability".to_string(),
            rating: "p.star-rating".to_string(),
            image: "img".to_string(),
            breadcrumb: "ul.breadcrumb li a".to_string(),
            category_index: 2,
            attribute_table: "table.table.table-striped".to_string(),
            attribute_row: "tr".to_string(),
            attribute_label: "th".to_string(),
            attribute_value: "td".to_string(),
            upc_label: "UPC".to_string(),
            availability_label: "Availability".to_string(),
        }
    }
}

impl ExtractionRules {
    pub fn with_category_index(mut self, index: usize) -> Self {
        self.category_index = index;
        self
    }

    /// Compiles every selector once so a crawl can reuse them for all its pages.
    pub fn compile(&self) -> ScraperResult<CompiledRules> {
        Ok(CompiledRules {
            listing: ListingSelectors::compile(self)?,
            detail: DetailSelectors::compile(self)?,
        })
    }

    pub fn validate(&self) -> ScraperResult<()> {
        self.compile().map(|_| ())
    }
}

pub struct CompiledRules {
    pub(crate) listing: ListingSelectors,
    pub(crate) detail: DetailSelectors,
}

pub(crate) fn selector(css: &str) -> ScraperResult<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::SelectorError(format!("{css:?}: {e:?}")))
}

pub(crate) struct ListingSelectors {
    pub item: Selector,
    pub title_link: Selector,
    pub price: Selector,
    pub availability: Selector,
    pub rating: Selector,
    pub image: Selector,
}

impl ListingSelectors {
    pub fn compile(rules: &ExtractionRules) -> ScraperResult<Self> {
        Ok(Self {
            item: selector(&rules.item)?,
            title_link: selector(&rules.title_link)?,
            price: selector(&rules.price)?,
            availability: selector(&rules.availability)?,
            rating: selector(&rules.rating)?,
            image: selector(&rules.image)?,
        })
    }
}

pub(crate) struct DetailSelectors {
    pub breadcrumb: Selector,
    pub category_index: usize,
    pub attribute_table: Selector,
    pub attribute_row: Selector,
    pub attribute_label: Selector,
    pub attribute_value: Selector,
    pub upc_label: String,
    pub availability_label: String,
}

impl DetailSelectors {
    pub fn compile(rules: &ExtractionRules) -> ScraperResult<Self> {
        Ok(Self {
            breadcrumb: selector(&rules.breadcrumb)?,
            category_index: rules.category_index,
            attribute_table: selector(&rules.attribute_table)?,
            attribute_row: selector(&rules.attribute_row)?,
            attribute_label: selector(&rules.attribute_label)?,
            attribute_value: selector(&rules.attribute_value)?,
            upc_label: rules.upc_label.clone(),
            availability_label: rules.availability_label.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        assert!(ExtractionRules::default().validate().is_ok());
    }

    #[test]
    fn test_broken_selector_is_reported() {
        let rules = ExtractionRules {
            price: "p[".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(ScraperError::SelectorError(_))
        ));
    }
}
