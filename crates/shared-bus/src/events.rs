//! # Bridge Events
//!
//! Defines every message that flows across the bridge. The set is closed:
//! anything the consumer sends that is not one of these kinds is dropped
//! at the wire boundary.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared_types::{ApiErrorCode, ApiKind, EntryList, PriceSource, SnapshotPayload};

/// All events that can be published to the bus.
///
/// On the wire each event is `{"kind": "<camelCaseKind>", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum BridgeEvent {
    // =========================================================================
    // INBOUND (consumer -> agent)
    // =========================================================================
    /// Replace one piece of persisted user data.
    Update(DataUpdate),

    /// Forward a credentialed remote lookup.
    ApiFetch(ApiFetchRequest),

    /// Query both catalog/price services for one item.
    PriceLookup(PriceLookupRequest),

    /// Legacy: ask for the stored favorites.
    FavoritesQuery,

    /// Legacy: replace the stored favorites. `null` stores an empty list.
    FavoritesUpdate(Option<EntryList>),

    /// The consumer is ready to receive the startup snapshot.
    Ready,

    // =========================================================================
    // OUTBOUND (agent -> consumer)
    // =========================================================================
    /// One-shot aggregate of all persisted state.
    InitSnapshot(SnapshotPayload),

    /// Correlated answer to an `ApiFetch`.
    ApiResponse(ApiResponse),

    /// Side channel: the remote rejected the stored credential.
    AuthInvalid(AuthInvalidNotice),

    /// Result from one price source.
    PriceResponse(PriceResponse),

    /// Legacy: answer to `FavoritesQuery`.
    FavoritesResponse(FavoritesResponse),
}

/// Persisted data replaced by an `Update` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum DataUpdate {
    Favorites(EntryList),
    FriendCodes(EntryList),
    Wishlist(Value),
    ApiKey(String),
}

impl DataUpdate {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Favorites(_) => "favorites",
            Self::FriendCodes(_) => "friendCodes",
            Self::Wishlist(_) => "wishlist",
            Self::ApiKey(_) => "apiKey",
        }
    }
}

/// Request descriptor for the API gateway.
///
/// `correlation_id` is chosen by the caller and must be unique among its
/// concurrently outstanding requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFetchRequest {
    pub kind: ApiKind,
    /// Comma-separated. The consumer may send a string, a number or a list.
    #[serde(deserialize_with = "id_list_from_wire")]
    pub subject_ids: String,
    pub correlation_id: String,
}

/// Correlated gateway response. Exactly one of `data` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub correlation_id: String,
    pub kind: ApiKind,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorCode>,
}

impl ApiResponse {
    pub fn from_result(
        correlation_id: impl Into<String>,
        kind: ApiKind,
        result: Result<Value, ApiErrorCode>,
    ) -> Self {
        let (success, data, error) = match result {
            Ok(data) => (true, Some(data), None),
            Err(code) => (false, None, Some(code)),
        };
        Self {
            correlation_id: correlation_id.into(),
            kind,
            success,
            data,
            error,
        }
    }

    /// View as a `Result`.
    pub fn result(&self) -> Result<&Value, ApiErrorCode> {
        match (&self.data, self.error) {
            (_, Some(code)) => Err(code),
            (Some(data), None) => Ok(data),
            (None, None) => Ok(&Value::Null),
        }
    }
}

/// Raw evidence of a credential rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInvalidNotice {
    pub status: u16,
    pub body: String,
}

/// Fan-out price lookup. The two ids are only shared by `container_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLookupRequest {
    #[serde(deserialize_with = "id_from_wire")]
    pub primary_id: String,
    #[serde(deserialize_with = "id_from_wire")]
    pub secondary_id: String,
    pub container_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub source: PriceSource,
    pub container_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_id: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Ids scraped from a page arrive as JSON numbers as often as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireIdList {
    One(WireId),
    Many(Vec<WireId>),
}

fn id_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    WireId::deserialize(deserializer).map(String::from)
}

fn id_list_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match WireIdList::deserialize(deserializer)? {
        WireIdList::One(id) => id.into(),
        WireIdList::Many(ids) => ids.into_iter().map(String::from).collect::<Vec<_>>().join(","),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: EntryList,
}

/// Which side of the bridge originates a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sent by the consumer.
    Inbound,
    /// Sent by the agent.
    Outbound,
}

/// Discriminant of [`BridgeEvent`], used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Update,
    ApiFetch,
    PriceLookup,
    FavoritesQuery,
    FavoritesUpdate,
    Ready,
    InitSnapshot,
    ApiResponse,
    AuthInvalid,
    PriceResponse,
    FavoritesResponse,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::Update,
        Self::ApiFetch,
        Self::PriceLookup,
        Self::FavoritesQuery,
        Self::FavoritesUpdate,
        Self::Ready,
        Self::InitSnapshot,
        Self::ApiResponse,
        Self::AuthInvalid,
        Self::PriceResponse,
        Self::FavoritesResponse,
    ];

    /// Name used in the wire `kind` field.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::ApiFetch => "apiFetch",
            Self::PriceLookup => "priceLookup",
            Self::FavoritesQuery => "favoritesQuery",
            Self::FavoritesUpdate => "favoritesUpdate",
            Self::Ready => "ready",
            Self::InitSnapshot => "initSnapshot",
            Self::ApiResponse => "apiResponse",
            Self::AuthInvalid => "authInvalid",
            Self::PriceResponse => "priceResponse",
            Self::FavoritesResponse => "favoritesResponse",
        }
    }

    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Update
            | Self::ApiFetch
            | Self::PriceLookup
            | Self::FavoritesQuery
            | Self::FavoritesUpdate
            | Self::Ready => Direction::Inbound,
            Self::InitSnapshot
            | Self::ApiResponse
            | Self::AuthInvalid
            | Self::PriceResponse
            | Self::FavoritesResponse => Direction::Outbound,
        }
    }
}

impl BridgeEvent {
    /// Get the kind for this event (for filtering).
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Update(_) => EventKind::Update,
            Self::ApiFetch(_) => EventKind::ApiFetch,
            Self::PriceLookup(_) => EventKind::PriceLookup,
            Self::FavoritesQuery => EventKind::FavoritesQuery,
            Self::FavoritesUpdate(_) => EventKind::FavoritesUpdate,
            Self::Ready => EventKind::Ready,
            Self::InitSnapshot(_) => EventKind::InitSnapshot,
            Self::ApiResponse(_) => EventKind::ApiResponse,
            Self::AuthInvalid(_) => EventKind::AuthInvalid,
            Self::PriceResponse(_) => EventKind::PriceResponse,
            Self::FavoritesResponse(_) => EventKind::FavoritesResponse,
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self { kinds }
    }

    /// Every kind the consumer may send.
    #[must_use]
    pub fn inbound() -> Self {
        Self::direction(Direction::Inbound)
    }

    /// Every kind the agent sends to the consumer.
    #[must_use]
    pub fn outbound() -> Self {
        Self::direction(Direction::Outbound)
    }

    fn direction(direction: Direction) -> Self {
        Self::kinds(
            EventKind::ALL
                .into_iter()
                .filter(|kind| kind.direction() == direction)
                .collect(),
        )
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BridgeEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names_match_serde() {
        let event = BridgeEvent::FavoritesQuery;
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], json!(event.kind().wire_name()));

        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_wire_name(kind.wire_name()), Some(kind));
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, json!(kind.wire_name()));
        }
    }

    #[test]
    fn test_update_wire_shape() {
        let raw = json!({
            "kind": "update",
            "payload": { "type": "friendCodes", "data": ["123", "456"] }
        });
        let event: BridgeEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            event,
            BridgeEvent::Update(DataUpdate::FriendCodes(vec![json!("123"), json!("456")]))
        );
    }

    #[test]
    fn test_unknown_update_type_rejected() {
        let raw = json!({
            "kind": "update",
            "payload": { "type": "theme", "data": "dark" }
        });
        assert!(serde_json::from_value::<BridgeEvent>(raw).is_err());
    }

    #[test]
    fn test_api_response_shapes() {
        let ok = ApiResponse::from_result("r1", ApiKind::Summary, Ok(json!({"a": 1})));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["correlationId"], json!("r1"));
        assert_eq!(value["success"], json!(true));
        assert!(value.get("error").is_none());

        let err = ApiResponse::from_result("r2", ApiKind::Owned, Err(ApiErrorCode::HttpError(500)));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("HTTP_ERROR_500"));
        assert!(value.get("data").is_none());
        assert_eq!(err.result(), Err(ApiErrorCode::HttpError(500)));
    }

    #[test]
    fn test_direction_filters() {
        let inbound = EventFilter::inbound();
        let outbound = EventFilter::outbound();

        assert!(inbound.matches(&BridgeEvent::Ready));
        assert!(!outbound.matches(&BridgeEvent::Ready));

        let response = BridgeEvent::FavoritesResponse(FavoritesResponse { favorites: vec![] });
        assert!(outbound.matches(&response));
        assert!(!inbound.matches(&response));
        assert_eq!(inbound.kinds.len() + outbound.kinds.len(), EventKind::ALL.len());
    }

    #[test]
    fn test_subject_ids_accept_string_number_and_list() {
        let decode = |ids: Value| {
            let raw = json!({
                "kind": "apiFetch",
                "payload": { "kind": "summary", "subjectIds": ids, "correlationId": "c1" }
            });
            match serde_json::from_value::<BridgeEvent>(raw).unwrap() {
                BridgeEvent::ApiFetch(request) => request.subject_ids,
                other => panic!("unexpected event {other:?}"),
            }
        };

        assert_eq!(decode(json!("1,2")), "1,2");
        assert_eq!(decode(json!(76561198000000000u64)), "76561198000000000");
        assert_eq!(decode(json!(["1", 2, "3"])), "1,2,3");
        assert_eq!(decode(json!([])), "");
    }

    #[test]
    fn test_subject_ids_reject_objects() {
        let raw = json!({
            "kind": "apiFetch",
            "payload": { "kind": "owned", "subjectIds": {"id": 1}, "correlationId": "c1" }
        });
        assert!(serde_json::from_value::<BridgeEvent>(raw).is_err());
    }

    #[test]
    fn test_price_lookup_numeric_ids() {
        let raw = json!({
            "kind": "priceLookup",
            "payload": { "primaryId": 730, "secondaryId": "54029", "containerId": "row" }
        });
        let event: BridgeEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            event,
            BridgeEvent::PriceLookup(PriceLookupRequest {
                primary_id: "730".into(),
                secondary_id: "54029".into(),
                container_id: "row".into(),
            })
        );
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&BridgeEvent::FavoritesUpdate(None)));
    }

    #[test]
    fn test_filter_by_kind() {
        let filter = EventFilter::kinds(vec![EventKind::ApiFetch]);
        let fetch = BridgeEvent::ApiFetch(ApiFetchRequest {
            kind: ApiKind::Owned,
            subject_ids: "7656".into(),
            correlation_id: "c".into(),
        });
        assert!(filter.matches(&fetch));
        assert!(!filter.matches(&BridgeEvent::FavoritesQuery));
    }
}
