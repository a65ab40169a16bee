pub mod item_bytes;
pub mod normalize;
pub mod price;
pub mod time;

pub use item_bytes::{ItemBytesError, decode_item_bytes, extract_count, item_count};
pub use normalize::{matches_normalized, normalize};
pub use price::{PriceRange, coerce_bid, parse_price_param};
pub use time::{time_ago, time_since};
