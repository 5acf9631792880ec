use super::detail::DetailInfo;
use super::listing::ListingItem;
use crate::dataset::BookRecord;
use crate::{ScraperError, ScraperResult};
use log::warn;
use regex::Regex;
use std::sync::OnceLock;

// digits with at most one decimal point; separators end the run
const PRICE_PATTERN: &str = r"\d+(?:\.\d+)?|\.\d+";
const STOCK_PATTERN: &str = r"\d+";

type CompiledPattern = OnceLock<Result<Regex, regex::Error>>;

fn compiled(cell: &'static CompiledPattern, pattern: &str) -> ScraperResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| ScraperError::RegexError(e.clone()))
}

fn price_regex() -> ScraperResult<&'static Regex> {
    static RE: CompiledPattern = OnceLock::new();
    compiled(&RE, PRICE_PATTERN)
}

fn stock_regex() -> ScraperResult<&'static Regex> {
    static RE: CompiledPattern = OnceLock::new();
    compiled(&RE, STOCK_PATTERN)
}

/// Numeric value of the first number in a display price such as `£51.77`.
pub fn price_value(text: &str) -> ScraperResult<f64> {
    let run = price_regex()?
        .find(text)
        .ok_or_else(|| ScraperError::MalformedPriceError(text.to_string()))?;

    run.as_str()
        .parse::<f64>()
        .map_err(|_| ScraperError::MalformedPriceError(text.to_string()))
}

/// First integer in an availability string, 0 when there is none.
///
/// Counts too large for `u32` saturate at `u32::MAX`.
pub fn stock_count(text: &str) -> ScraperResult<u32> {
    let Some(run) = stock_regex()?.find(text) else {
        return Ok(0);
    };

    Ok(run.as_str().parse().unwrap_or_else(|_| {
        warn!("Stock count {:?} overflows, saturating", run.as_str());
        u32::MAX
    }))
}

pub fn rating_from_tier(tier: &str) -> u8 {
    match tier {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => 0,
    }
}

pub fn build_record(item: ListingItem, detail: DetailInfo) -> ScraperResult<BookRecord> {
    let price_value = price_value(&item.price_text)?;
    let stock_count = stock_count(&item.availability_text)?;
    let rating = rating_from_tier(&item.rating_tier);

    Ok(BookRecord {
        title: item.title,
        price_text: item.price_text,
        price_value,
        availability_text: item.availability_text,
        stock_count,
        rating,
        image_url: item.image_url.to_string(),
        category: detail.category,
        upc: detail.upc,
        availability_detail: detail.availability_detail,
    })
}
