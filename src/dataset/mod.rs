mod view;

pub use view::{DatasetView, Filter, SortKey, SortOrder, Summary};

use serde::{Deserialize, Serialize};

/// One catalogue item, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price_text: String,
    #[serde(rename = "Price_Value")]
    pub price_value: f64,
    #[serde(rename = "Availability")]
    pub availability_text: String,
    #[serde(rename = "Stock_Count")]
    pub stock_count: u32,
    /// 1-5, or 0 when the tier was not recognized.
    #[serde(rename = "Rating")]
    pub rating: u8,
    #[serde(rename = "Image")]
    pub image_url: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "UPC")]
    pub upc: String,
    #[serde(rename = "Availability_Detail")]
    pub availability_detail: String,
}

impl BookRecord {
    pub fn in_stock(&self) -> bool {
        self.stock_count > 0
    }
}

/// Records of one crawl in discovery order: page-major, then item order within the page.
///
/// Duplicates are kept. There is no mutable access once built; derive views instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<BookRecord>,
}

impl Dataset {
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BookRecord> {
        self.records.iter()
    }

    pub fn view(&self) -> DatasetView<'_> {
        DatasetView::new(self)
    }
}

impl FromIterator<BookRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = BookRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a BookRecord;
    type IntoIter = std::slice::Iter<'a, BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::BookRecord;

    pub fn record(title: &str, price: f64, stock: u32, rating: u8, category: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            price_text: format!("£{price:.2}"),
            price_value: price,
            availability_text: if stock > 0 {
                format!("In stock ({stock} available)")
            } else {
                "Out of stock".to_string()
            },
            stock_count: stock,
            rating,
            image_url: format!("http://books.toscrape.com/media/{}.jpg", title.len()),
            category: category.to_string(),
            upc: format!("upc-{}", title.len()),
            availability_detail: "N/A".to_string(),
        }
    }
}
