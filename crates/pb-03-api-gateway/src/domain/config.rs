//! Gateway endpoints and URL construction.

use serde::{Deserialize, Serialize};
use shared_types::ApiKind;
use url::{ParseError, Url};

pub const DEFAULT_STEAM_API_BASE: &str = "https://api.steampowered.com";
pub const DEFAULT_STEAMPY_URL: &str = "https://steampy.com/xboot/common/plugIn/getGame";
pub const DEFAULT_STEAMCICI_URL: &str =
    "https://steamcici.com/prod-api/user/system/shopGame/list";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Web API root, without trailing slash.
    pub steam_api_base: String,
    pub steampy_url: String,
    pub steamcici_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            steam_api_base: DEFAULT_STEAM_API_BASE.to_string(),
            steampy_url: DEFAULT_STEAMPY_URL.to_string(),
            steamcici_url: DEFAULT_STEAMCICI_URL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Remote call for one credentialed lookup.
    ///
    /// The key and ids are query values, so separators inside them are
    /// encoded rather than read as extra parameters.
    pub fn api_url(&self, kind: ApiKind, api_key: &str, subject_ids: &str) -> Result<Url, ParseError> {
        let base = self.steam_api_base.trim_end_matches('/');
        match kind {
            ApiKind::Summary => Url::parse_with_params(
                &format!("{base}/ISteamUser/GetPlayerSummaries/v2/"),
                [("key", api_key), ("steamids", subject_ids)],
            ),
            ApiKind::Owned => Url::parse_with_params(
                &format!("{base}/IPlayerService/GetOwnedGames/v1/"),
                [
                    ("key", api_key),
                    ("steamid", subject_ids),
                    ("include_appinfo", "1"),
                    ("include_played_free_games", "1"),
                    ("format", "json"),
                ],
            ),
        }
    }

    pub fn steampy_lookup_url(&self, primary_id: &str, secondary_id: &str) -> Result<Url, ParseError> {
        Url::parse_with_params(
            &self.steampy_url,
            [("subId", secondary_id), ("appId", primary_id), ("type", "subid")],
        )
    }

    pub fn steamcici_lookup_url(&self, primary_id: &str) -> Result<Url, ParseError> {
        Url::parse_with_params(&self.steamcici_url, [("parentId", primary_id)])
    }
}
