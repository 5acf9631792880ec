use super::rules::{CompiledRules, DetailSelectors, ExtractionRules};
use crate::ScraperResult;
use scraper::Html;

pub const UNKNOWN_CATEGORY: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailInfo {
    pub category: String,
    pub upc: String,
    pub availability_detail: String,
}

/// Reads category and product attributes from a detail page.
///
/// Never fails on page content: a short breadcrumb yields `Unknown`, absent rows yield `N/A`.
/// Only an invalid selector in `rules` is an error.
pub fn parse_detail(body: &str, rules: &ExtractionRules) -> ScraperResult<DetailInfo> {
    let selectors = DetailSelectors::compile(rules)?;
    Ok(extract_detail(body, &selectors))
}

/// Same as [`parse_detail`] with selectors compiled ahead of time.
pub fn parse_detail_with(body: &str, rules: &CompiledRules) -> DetailInfo {
    extract_detail(body, &rules.detail)
}

fn extract_detail(body: &str, selectors: &DetailSelectors) -> DetailInfo {
    let document = Html::parse_document(body);

    let category = document
        .select(&selectors.breadcrumb)
        .nth(selectors.category_index)
        .map(|link| link.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

    let mut upc = NOT_AVAILABLE.to_string();
    let mut availability_detail = NOT_AVAILABLE.to_string();

    if let Some(table) = document.select(&selectors.attribute_table).next() {
        for row in table.select(&selectors.attribute_row) {
            let label = row.select(&selectors.attribute_label).next();
            let value = row.select(&selectors.attribute_value).next();

            if let (Some(label), Some(value)) = (label, value) {
                let label = label.text().collect::<String>();
                let value = value.text().collect::<String>().trim().to_string();

                if label.contains(&selectors.upc_label) {
                    upc = value;
                } else if label.contains(&selectors.availability_label) {
                    availability_detail = value;
                }
            }
        }
    }

    DetailInfo {
        category,
        upc,
        availability_detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"
        <html><body>
          <ul class="breadcrumb">
            <li><a href="../../index.html">Home</a></li>
            <li><a href="../category/books_1/index.html">Books</a></li>
            <li><a href="../category/books/poetry_23/index.html">Poetry</a></li>
            <li class="active">A Light in the Attic</li>
          </ul>
          <table class="table table-striped">
            <tr><th>UPC</th><td>a897fe39b1053632</td></tr>
            <tr><th>Product Type</th><td>Books</td></tr>
            <tr><th>Price (excl. tax)</th><td>£51.77</td></tr>
            <tr><th>Availability</th><td>In stock (22 available)</td></tr>
            <tr><th>Number of reviews</th><td>0</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_reads_category_and_attributes() {
        let info = parse_detail(DETAIL, &ExtractionRules::default()).unwrap();
        assert_eq!(info.category, "Poetry");
        assert_eq!(info.upc, "a897fe39b1053632");
        assert_eq!(info.availability_detail, "In stock (22 available)");
    }

    #[test]
    fn test_compiled_rules_serve_many_pages() {
        let rules = ExtractionRules::default().with_category_index(1);
        let compiled = rules.compile().unwrap();

        for _ in 0..3 {
            let info = parse_detail_with(DETAIL, &compiled);
            assert_eq!(info.category, "Books");
            assert_eq!(info.upc, "a897fe39b1053632");
        }
        assert_eq!(
            parse_detail_with(DETAIL, &compiled),
            parse_detail(DETAIL, &rules).unwrap()
        );
    }

    #[test]
    fn test_short_breadcrumb_is_unknown() {
        let body = r#"
            <ul class="breadcrumb">
              <li><a href="/">Home</a></li>
              <li><a href="/books">Books</a></li>
            </ul>
        "#;
        let info = parse_detail(body, &ExtractionRules::default()).unwrap();
        assert_eq!(info.category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_category_index_is_overridable() {
        let rules = ExtractionRules::default().with_category_index(1);
        let info = parse_detail(DETAIL, &rules).unwrap();
        assert_eq!(info.category, "Books");
    }

    #[test]
    fn test_missing_table_defaults_to_not_available() {
        let info = parse_detail("<html><body><p>gone</p></body></html>", &ExtractionRules::default())
            .unwrap();
        assert_eq!(info.category, UNKNOWN_CATEGORY);
        assert_eq!(info.upc, NOT_AVAILABLE);
        assert_eq!(info.availability_detail, NOT_AVAILABLE);
    }

    #[test]
    fn test_incomplete_rows_are_ignored() {
        let body = r#"
            <table class="table table-striped">
              <tr><th>UPC</th></tr>
              <tr><td>orphan value</td></tr>
              <tr><th>Availability</th><td> Out of stock </td></tr>
            </table>
        "#;
        let info = parse_detail(body, &ExtractionRules::default()).unwrap();
        assert_eq!(info.upc, NOT_AVAILABLE);
        assert_eq!(info.availability_detail, "Out of stock");
    }
}
