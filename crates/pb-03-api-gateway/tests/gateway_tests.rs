//! Gateway behaviour through the bus: correlation, classification and
//! price fan-out.

use pb_01_persistent_store::{BridgeRepository, InMemoryStore};
use pb_03_api_gateway::{ApiGatewayService, GatewayBusAdapter, GatewayConfig};
use serde_json::{json, Value};
use shared_bus::{
    ApiFetchRequest, ApiResponse, BridgeEvent, EventFilter, EventPublisher, InMemoryEventBus,
    PriceLookupRequest, PriceResponse, Subscription,
};
use shared_types::testing::{Reply, ScriptedHttpClient};
use shared_types::{ApiErrorCode, ApiKind, PriceSource, TransportError};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    bus: Arc<InMemoryEventBus>,
    http: Arc<ScriptedHttpClient>,
    repo: BridgeRepository,
    service: Arc<ApiGatewayService>,
    outbound: Subscription,
}

fn harness(http: ScriptedHttpClient) -> Harness {
    let bus = Arc::new(InMemoryEventBus::new());
    let http = Arc::new(http);
    let repo = BridgeRepository::new(Arc::new(InMemoryStore::new()));
    let service = Arc::new(ApiGatewayService::new(
        repo.clone(),
        bus.clone(),
        http.clone(),
        GatewayConfig::default(),
    ));
    let outbound = bus.subscribe(EventFilter::outbound());
    Harness {
        bus,
        http,
        repo,
        service,
        outbound,
    }
}

fn keyed(http: ScriptedHttpClient) -> Harness {
    let h = harness(http);
    h.repo.set_api_key("SECRET").unwrap();
    h
}

fn fetch(kind: ApiKind, ids: &str, correlation_id: &str) -> ApiFetchRequest {
    ApiFetchRequest {
        kind,
        subject_ids: ids.into(),
        correlation_id: correlation_id.into(),
    }
}

fn drain(sub: &mut Subscription) -> Vec<BridgeEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv().unwrap() {
        events.push(event);
    }
    events
}

async fn next_event(sub: &mut Subscription) -> BridgeEvent {
    tokio::time::timeout(Duration::from_secs(30), sub.recv())
        .await
        .expect("no event within 30s")
        .expect("bus closed")
}

async fn next_api_response(sub: &mut Subscription) -> ApiResponse {
    loop {
        if let BridgeEvent::ApiResponse(response) = next_event(sub).await {
            return response;
        }
    }
}

/// Run one fetch to completion and return everything it published.
async fn run_fetch(h: &mut Harness, request: ApiFetchRequest) -> Vec<BridgeEvent> {
    if let Some(handle) = h.service.handle_fetch(request) {
        handle.await.unwrap();
    }
    drain(&mut h.outbound)
}

// =============================================================================
// CREDENTIAL PRECONDITION
// =============================================================================

#[tokio::test]
async fn missing_key_responds_without_network_call() {
    let mut h = harness(ScriptedHttpClient::new().route("", Reply::ok("{}")));

    assert!(h
        .service
        .handle_fetch(fetch(ApiKind::Owned, "765", "req-7"))
        .is_none());

    let events = drain(&mut h.outbound);
    assert_eq!(
        events,
        vec![BridgeEvent::ApiResponse(ApiResponse::from_result(
            "req-7",
            ApiKind::Owned,
            Err(ApiErrorCode::NoApiKey)
        ))]
    );
    assert_eq!(h.http.call_count(), 0);
}

#[tokio::test]
async fn empty_stored_key_counts_as_missing() {
    let mut h = harness(ScriptedHttpClient::new());
    h.repo.set_api_key("").unwrap();

    let events = run_fetch(&mut h, fetch(ApiKind::Summary, "1", "c")).await;

    let [BridgeEvent::ApiResponse(response)] = events.as_slice() else {
        panic!("expected one response, got {events:?}");
    };
    assert_eq!(response.error, Some(ApiErrorCode::NoApiKey));
    assert_eq!(h.http.call_count(), 0);
}

// =============================================================================
// CORRELATION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn concurrent_requests_keep_their_correlation_ids() {
    let http = ScriptedHttpClient::new()
        .route(
            "steamids=111",
            Reply::ok(r#"{"player":111}"#).after(Duration::from_millis(500)),
        )
        .route(
            "steamids=222",
            Reply::ok(r#"{"player":222}"#).after(Duration::from_millis(20)),
        );
    let mut h = keyed(http);
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let adapter = GatewayBusAdapter::new(&h.bus, h.service.clone());
    tokio::spawn(adapter.run(shutdown_rx));

    h.bus
        .publish(BridgeEvent::ApiFetch(fetch(ApiKind::Summary, "111", "slow")));
    h.bus
        .publish(BridgeEvent::ApiFetch(fetch(ApiKind::Summary, "222", "fast")));

    let first = next_api_response(&mut h.outbound).await;
    let second = next_api_response(&mut h.outbound).await;

    assert_eq!(first.correlation_id, "fast");
    assert_eq!(first.data, Some(json!({"player": 222})));
    assert_eq!(second.correlation_id, "slow");
    assert_eq!(second.data, Some(json!({"player": 111})));
    assert_eq!(h.service.in_flight().in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn colliding_ids_are_both_served() {
    let http = ScriptedHttpClient::new()
        .route("steamids=1", Reply::ok(r#"{"n":1}"#).after(Duration::from_millis(50)))
        .route("steamid=2", Reply::ok(r#"{"n":2}"#).after(Duration::from_millis(10)));
    let mut h = keyed(http);

    let a = h
        .service
        .handle_fetch(fetch(ApiKind::Summary, "1", "same"))
        .unwrap();
    let b = h
        .service
        .handle_fetch(fetch(ApiKind::Owned, "2", "same"))
        .unwrap();
    a.await.unwrap();
    b.await.unwrap();

    let responses: Vec<ApiResponse> = drain(&mut h.outbound)
        .into_iter()
        .filter_map(|e| match e {
            BridgeEvent::ApiResponse(r) => Some(r),
            _ => None,
        })
        .collect();

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.correlation_id == "same"));
    assert_eq!(responses[0].kind, ApiKind::Owned);
    assert_eq!(responses[1].kind, ApiKind::Summary);

    let stats = h.service.in_flight().stats();
    assert_eq!(stats.total_collisions.load(Ordering::Relaxed), 1);
    assert!(!h.service.in_flight().is_in_flight("same"));
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

async fn classify_via_gateway(reply: Reply) -> (ApiResponse, Vec<BridgeEvent>) {
    let mut h = keyed(ScriptedHttpClient::new().route("GetOwnedGames", reply));
    let mut events = run_fetch(&mut h, fetch(ApiKind::Owned, "765", "cls")).await;

    let Some(BridgeEvent::ApiResponse(response)) = events.pop() else {
        panic!("last event must be the api response");
    };
    assert_eq!(response.correlation_id, "cls");
    assert_eq!(response.kind, ApiKind::Owned);
    (response, events)
}

#[tokio::test]
async fn auth_rejections_are_auth_invalid_with_notice() {
    let cases = [
        (401, "<html>401 Unauthorized</html>"),
        (403, "Access is denied"),
        (200, "<html><body><h1>Unauthorized</h1></body></html>"),
    ];

    for (status, body) in cases {
        let (response, side) = classify_via_gateway(Reply::status(status, body)).await;

        assert!(!response.success);
        assert_eq!(response.error, Some(ApiErrorCode::AuthInvalid), "status {status}");
        assert_eq!(side.len(), 1, "one notice for status {status}");
        let BridgeEvent::AuthInvalid(notice) = &side[0] else {
            panic!("expected authInvalid notice");
        };
        assert_eq!(notice.status, status);
        assert_eq!(notice.body, body);
    }
}

#[tokio::test]
async fn server_error_is_http_error() {
    let (response, side) = classify_via_gateway(Reply::status(500, "oops")).await;
    assert_eq!(response.error, Some(ApiErrorCode::HttpError(500)));
    assert!(side.is_empty());

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["error"], json!("HTTP_ERROR_500"));
}

#[tokio::test]
async fn invalid_json_is_parse_error() {
    let (response, _) = classify_via_gateway(Reply::ok("{truncated")).await;
    assert_eq!(response.error, Some(ApiErrorCode::ParseError));
}

#[tokio::test]
async fn transport_failure_is_network_error() {
    let failure = Reply::fail(TransportError::Connection("dns".into()));
    let (response, side) = classify_via_gateway(failure).await;
    assert_eq!(response.error, Some(ApiErrorCode::NetworkError));
    assert!(side.is_empty());
}

#[tokio::test]
async fn success_carries_parsed_payload() {
    let body = r#"{"response":{"game_count":1,"games":[{"appid":730}]}}"#;
    let (response, _) = classify_via_gateway(Reply::ok(body)).await;

    assert!(response.success);
    assert_eq!(response.error, None);
    assert_eq!(response.data, Some(serde_json::from_str::<Value>(body).unwrap()));
}

#[tokio::test]
async fn request_url_carries_key_and_ids() {
    let mut h = keyed(ScriptedHttpClient::new().route("", Reply::ok("{}")));
    run_fetch(&mut h, fetch(ApiKind::Summary, "1,2,3", "u")).await;

    assert_eq!(
        h.http.calls(),
        vec!["https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2/?key=SECRET&steamids=1%2C2%2C3"]
    );
}

// =============================================================================
// PRICE LOOKUP
// =============================================================================

fn lookup(primary: &str, secondary: &str) -> PriceLookupRequest {
    PriceLookupRequest {
        primary_id: primary.into(),
        secondary_id: secondary.into(),
        container_id: "card-3".into(),
    }
}

async fn run_lookup(h: &mut Harness, request: PriceLookupRequest) -> Vec<PriceResponse> {
    let (a, b) = h.service.handle_price_lookup(request).unwrap();
    a.await.unwrap();
    b.await.unwrap();

    let mut responses: Vec<PriceResponse> = drain(&mut h.outbound)
        .into_iter()
        .filter_map(|e| match e {
            BridgeEvent::PriceResponse(r) => Some(r),
            _ => None,
        })
        .collect();
    responses.sort_by_key(|r| r.source.as_str());
    responses
}

#[tokio::test]
async fn price_lookup_reports_each_source() {
    let http = ScriptedHttpClient::new()
        .route("steampy.com", Reply::ok(r#"{"result":{"price":12.5}}"#))
        .route("steamcici.com", Reply::status(500, r#"{"rows":[{"subId":54029}]}"#));
    let mut h = harness(http);

    let responses = run_lookup(&mut h, lookup("730", "54029")).await;

    assert_eq!(responses.len(), 2);
    let (cici, py) = (&responses[0], &responses[1]);

    assert_eq!(py.source, PriceSource::Steampy);
    assert!(py.success);
    assert_eq!(py.data, Some(json!({"result": {"price": 12.5}})));
    assert_eq!(py.secondary_id, None);
    assert_eq!(py.container_id, "card-3");

    assert_eq!(cici.source, PriceSource::Steamcici);
    assert!(cici.success, "status is ignored for price sources");
    assert_eq!(cici.secondary_id.as_deref(), Some("54029"));

    assert_eq!(h.http.calls_matching("subId=54029&appId=730"), 1);
    assert_eq!(h.http.calls_matching("parentId=730"), 1);
}

#[tokio::test]
async fn price_lookup_failures_are_per_source() {
    let http = ScriptedHttpClient::new()
        .route("steampy.com", Reply::ok("<html>maintenance</html>"))
        .route("steamcici.com", Reply::fail(TransportError::Timeout));
    let mut h = harness(http);

    let responses = run_lookup(&mut h, lookup("10", "20")).await;

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| !r.success && r.data.is_none()));
}

#[tokio::test]
async fn price_lookup_with_empty_id_is_ignored() {
    let mut h = harness(ScriptedHttpClient::new().route("", Reply::ok("{}")));

    assert!(h.service.handle_price_lookup(lookup("", "20")).is_none());
    assert!(h.service.handle_price_lookup(lookup("10", "")).is_none());

    assert_eq!(h.http.call_count(), 0);
    assert!(drain(&mut h.outbound).is_empty());
}

#[tokio::test]
async fn price_lookup_does_not_need_api_key() {
    let http = ScriptedHttpClient::new().route("", Reply::ok("[]"));
    let mut h = harness(http);
    assert!(!h.repo.has_api_key());

    let responses = run_lookup(&mut h, lookup("1", "2")).await;
    assert!(responses.iter().all(|r| r.success));
}
