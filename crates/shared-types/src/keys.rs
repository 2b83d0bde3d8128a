//! Persisted key names. Kept stable so existing data stays readable.

pub const API_KEY: &str = "steam_api_key";
pub const FAVORITES: &str = "favorites";
pub const FRIEND_CODES: &str = "steam_friend_codes";
pub const WISHLIST: &str = "steam_wishlist";
pub const EXCHANGE_RATES: &str = "exchange_rates";
pub const EXCHANGE_RATES_TS: &str = "exchange_rates_ts";

/// Every key the bridge writes.
pub const ALL: &[&str] = &[
    API_KEY,
    FAVORITES,
    FRIEND_CODES,
    WISHLIST,
    EXCHANGE_RATES,
    EXCHANGE_RATES_TS,
];
