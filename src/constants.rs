pub const UNKNOWN_SELLER: &str = "Unknown Seller";

pub mod cache {
    use std::time::Duration;

    pub const SEARCH_TTL: Duration = Duration::from_secs(60);

    pub const KEY_PREFIX: &str = "search";
}

pub mod search {
    use std::time::Duration;

    pub const PAGES_PER_SEARCH: u32 = 2;

    pub const PAGE_DELAY: Duration = Duration::from_secs(1);

    pub const SELLER_LOOKUP_CONCURRENCY: usize = 4;
}

pub mod files {

    pub const ITEM_IDS: &str = "skyblock_item_ids.json";

    pub const ITEM_LIST: &str = "skyblock_item_list.json";
}
