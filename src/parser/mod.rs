pub mod detail;
pub mod listing;
pub mod normalize;
pub mod rules;

pub use detail::{parse_detail, parse_detail_with, DetailInfo, NOT_AVAILABLE, UNKNOWN_CATEGORY};
pub use listing::{parse_listing, parse_listing_with, ListingItem};
pub use normalize::{build_record, price_value, rating_from_tier, stock_count};
pub use rules::{CompiledRules, ExtractionRules};
