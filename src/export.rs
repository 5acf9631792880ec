use crate::dataset::BookRecord;
use crate::ScraperResult;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

// image and detail availability are left out of the tabular export
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Price")]
    price_text: &'a str,
    #[serde(rename = "Price_Value")]
    price_value: f64,
    #[serde(rename = "Availability")]
    availability_text: &'a str,
    #[serde(rename = "Stock_Count")]
    stock_count: u32,
    #[serde(rename = "Rating")]
    rating: u8,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "UPC")]
    upc: &'a str,
}

impl<'a> From<&'a BookRecord> for CsvRow<'a> {
    fn from(record: &'a BookRecord) -> Self {
        Self {
            title: &record.title,
            price_text: &record.price_text,
            price_value: record.price_value,
            availability_text: &record.availability_text,
            stock_count: record.stock_count,
            rating: record.rating,
            category: &record.category,
            upc: &record.upc,
        }
    }
}

pub const CSV_HEADER: [&str; 8] = [
    "Title",
    "Price",
    "Price_Value",
    "Availability",
    "Stock_Count",
    "Rating",
    "Category",
    "UPC",
];

pub fn write_csv<'a, W, I>(writer: W, records: I) -> ScraperResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BookRecord>,
{
    // header written by hand so an empty export still carries it
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for record in records {
        csv_writer.serialize(CsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<'a, W, I>(writer: W, records: I) -> ScraperResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BookRecord>,
{
    let records = records.into_iter().collect::<Vec<_>>();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

pub fn export<'a, W, I>(format: ExportFormat, writer: W, records: I) -> ScraperResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BookRecord>,
{
    match format {
        ExportFormat::Csv => write_csv(writer, records),
        ExportFormat::Json => write_json(writer, records),
    }
}
