use super::rules::{CompiledRules, ExtractionRules, ListingSelectors};
use crate::{ScraperError, ScraperResult};
use log::trace;
use scraper::{ElementRef, Html};
use url::Url;

/// Fields read from one catalogue entry on a listing page, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub title: String,
    pub price_text: String,
    pub availability_text: String,
    pub rating_tier: String,
    pub image_url: Url,
    pub detail_url: Url,
}

/// Extracts every catalogue entry from a listing page, in document order.
///
/// Each entry is extracted independently so one malformed fragment does not hide the rest;
/// the caller decides whether a failed entry aborts the crawl.
pub fn parse_listing(
    body: &str,
    base: &Url,
    rules: &ExtractionRules,
) -> ScraperResult<Vec<ScraperResult<ListingItem>>> {
    let selectors = ListingSelectors::compile(rules)?;
    Ok(extract_listing(body, base, &selectors))
}

/// Same as [`parse_listing`] with selectors compiled ahead of time.
pub fn parse_listing_with(
    body: &str,
    base: &Url,
    rules: &CompiledRules,
) -> Vec<ScraperResult<ListingItem>> {
    extract_listing(body, base, &rules.listing)
}

fn extract_listing(
    body: &str,
    base: &Url,
    selectors: &ListingSelectors,
) -> Vec<ScraperResult<ListingItem>> {
    let document = Html::parse_document(body);

    let items = document
        .select(&selectors.item)
        .map(|fragment| extract_item(fragment, base, selectors))
        .collect::<Vec<_>>();

    trace!("Found {} fragments on {}", items.len(), base);
    items
}

fn missing(field: &str) -> ScraperError {
    ScraperError::MalformedFragmentError(field.to_string())
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_item(
    fragment: ElementRef<'_>,
    base: &Url,
    selectors: &ListingSelectors,
) -> ScraperResult<ListingItem> {
    let link = fragment
        .select(&selectors.title_link)
        .next()
        .ok_or_else(|| missing("title link"))?;

    let title = link
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("title"))?
        .to_string();

    let detail_url = link
        .value()
        .attr("href")
        .and_then(|href| base.join(href).ok())
        .ok_or_else(|| missing("detail link"))?;

    let price_text = fragment
        .select(&selectors.price)
        .next()
        .map(text_of)
        .ok_or_else(|| missing("price"))?;

    let availability_text = fragment
        .select(&selectors.availability)
        .next()
        .map(text_of)
        .ok_or_else(|| missing("availability"))?;

    // an absent tier is not fatal, it normalizes to 0
    let rating_tier = fragment
        .select(&selectors.rating)
        .next()
        .and_then(|p| p.value().attr("class"))
        .and_then(|class| class.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();

    let image_url = fragment
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| base.join(src).ok())
        .ok_or_else(|| missing("image"))?;

    Ok(ListingItem {
        title,
        price_text,
        availability_text,
        rating_tier,
        image_url,
        detail_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://books.toscrape.com/catalogue/page-1.html";

    fn base() -> Url {
        Url::parse(BASE).unwrap()
    }

    const FRAGMENT: &str = r#"
        <ol class="row">
          <li>
            <article class="product_pod">
              <div class="image_container">
                <a href="a-light-in-the-attic_1000/index.html"><img src="../media/cache/2c/da/2cdad67c.jpg" alt="A Light in the Attic" class="thumbnail"></a>
              </div>
              <p class="star-rating Three">
                <i class="icon-star"></i>
              </p>
              <h3><a href="a-light-in-the-attic_1000/index.html" title="A Light in the Attic">A Light in the ...</a></h3>
              <div class="product_price">
                <p class="price_color">£51.77</p>
                <p class="instock availability">
                  <i class="icon-ok"></i>
                  In stock
                </p>
              </div>
            </article>
          </li>
        </ol>
    "#;

    #[test]
    fn test_extracts_all_fields() {
        let items = parse_listing(FRAGMENT, &base(), &ExtractionRules::default()).unwrap();
        assert_eq!(items.len(), 1);

        let item = items.into_iter().next().unwrap().unwrap();
        assert_eq!(item.title, "A Light in the Attic");
        assert_eq!(item.price_text, "£51.77");
        assert_eq!(item.availability_text, "In stock");
        assert_eq!(item.rating_tier, "Three");
        assert_eq!(
            item.image_url.as_str(),
            "http://books.toscrape.com/media/cache/2c/da/2cdad67c.jpg"
        );
        assert_eq!(
            item.detail_url.as_str(),
            "http://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html"
        );
    }

    #[test]
    fn test_missing_price_fails_only_that_fragment() {
        let body = r#"
            <article class="product_pod">
              <img src="../media/a.jpg">
              <p class="star-rating One"></p>
              <h3><a href="a_1/index.html" title="No Price">No Price</a></h3>
              <p class="instock availability">In stock</p>
            </article>
            <article class="product_pod">
              <img src="../media/b.jpg">
              <p class="star-rating Two"></p>
              <h3><a href="b_2/index.html" title="Priced">Priced</a></h3>
              <p class="price_color">£10.00</p>
              <p class="instock availability">In stock</p>
            </article>
        "#;

        let items = parse_listing(body, &base(), &ExtractionRules::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(matches!(
            &items[0],
            Err(ScraperError::MalformedFragmentError(field)) if field == "price"
        ));
        assert_eq!(items[1].as_ref().unwrap().title, "Priced");
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let body = r#"
            <article class="product_pod">
              <img src="../media/a.jpg">
              <h3><a href="a_1/index.html">untitled</a></h3>
              <p class="price_color">£10.00</p>
              <p class="instock availability">In stock</p>
            </article>
        "#;

        let items = parse_listing(body, &base(), &ExtractionRules::default()).unwrap();
        assert!(matches!(
            &items[0],
            Err(ScraperError::MalformedFragmentError(field)) if field == "title"
        ));
    }

    #[test]
    fn test_missing_rating_defaults_to_empty_tier() {
        let body = r#"
            <article class="product_pod">
              <img src="../media/a.jpg">
              <h3><a href="a_1/index.html" title="Unrated">Unrated</a></h3>
              <p class="price_color">£10.00</p>
              <p class="instock availability">In stock</p>
            </article>
        "#;

        let items = parse_listing(body, &base(), &ExtractionRules::default()).unwrap();
        assert_eq!(items[0].as_ref().unwrap().rating_tier, "");
    }

    #[test]
    fn test_page_without_fragments_is_empty() {
        let items = parse_listing("<html><body></body></html>", &base(), &ExtractionRules::default())
            .unwrap();
        assert!(items.is_empty());
    }
}
