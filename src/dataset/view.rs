use super::{BookRecord, Dataset};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Row predicate. Every criterion left at its default accepts all records.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// `Some` restricts to the listed categories; an empty set matches nothing.
    pub categories: Option<BTreeSet<String>>,
    pub min_rating: u8,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_stock: u32,
    pub in_stock_only: bool,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
}

impl Filter {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_rating(mut self, rating: u8) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_min_stock(mut self, stock: u32) -> Self {
        self.min_stock = stock;
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    pub fn with_title(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, record: &BookRecord) -> bool {
        if let Some(categories) = &self.categories {
            if !categories.contains(&record.category) {
                return false;
            }
        }
        if record.rating < self.min_rating || record.stock_count < self.min_stock {
            return false;
        }
        if self.min_price.is_some_and(|min| record.price_value < min)
            || self.max_price.is_some_and(|max| record.price_value > max)
        {
            return false;
        }
        if self.in_stock_only && !record.in_stock() {
            return false;
        }
        match &self.title_contains {
            Some(needle) if !needle.is_empty() => record
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    PriceValue,
    Rating,
    Category,
    StockCount,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(SortKey::Title),
            "price" | "pricevalue" => Ok(SortKey::PriceValue),
            "rating" => Ok(SortKey::Rating),
            "category" => Ok(SortKey::Category),
            "stock" | "stockcount" => Ok(SortKey::StockCount),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_rating: Option<f64>,
    pub mean_price: Option<f64>,
    pub distinct_categories: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total Books: {}", self.count)?;
        match self.mean_rating {
            Some(rating) => write!(f, " | Avg Rating: {rating:.1}")?,
            None => write!(f, " | Avg Rating: N/A")?,
        }
        match self.mean_price {
            Some(price) => write!(f, " | Avg Price: £{price:.2}")?,
            None => write!(f, " | Avg Price: N/A")?,
        }
        write!(f, " | Categories: {}", self.distinct_categories)
    }
}

/// A filtered and/or reordered selection over a [`Dataset`]. The dataset itself is untouched.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    rows: Vec<&'a BookRecord>,
}

impl<'a> DatasetView<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            rows: dataset.iter().collect(),
        }
    }

    pub fn filter(mut self, filter: &Filter) -> Self {
        self.rows.retain(|record| filter.matches(record));
        self
    }

    /// Stable: records that compare equal keep their current relative order.
    pub fn sort_by(mut self, key: SortKey, order: SortOrder) -> Self {
        let compare = |a: &&BookRecord, b: &&BookRecord| -> Ordering {
            match key {
                SortKey::Title => a.title.cmp(&b.title),
                SortKey::PriceValue => a.price_value.total_cmp(&b.price_value),
                SortKey::Rating => a.rating.cmp(&b.rating),
                SortKey::Category => a.category.cmp(&b.category),
                SortKey::StockCount => a.stock_count.cmp(&b.stock_count),
            }
        };

        match order {
            SortOrder::Ascending => self.rows.sort_by(compare),
            SortOrder::Descending => self.rows.sort_by(|a, b| compare(b, a)),
        }
        self
    }

    pub fn records(&self) -> &[&'a BookRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a BookRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn summary(&self) -> Summary {
        let count = self.rows.len();
        let mean = |total: f64| (count > 0).then(|| total / count as f64);

        Summary {
            count,
            mean_rating: mean(self.rows.iter().map(|r| f64::from(r.rating)).sum()),
            mean_price: mean(self.rows.iter().map(|r| r.price_value).sum()),
            distinct_categories: self
                .rows
                .iter()
                .map(|r| r.category.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.rows {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn rating_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.rows {
            *counts.entry(record.rating).or_insert(0) += 1;
        }
        counts
    }
}
