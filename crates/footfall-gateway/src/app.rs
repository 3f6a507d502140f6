use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    card_handler, health_handler, list_visitors_handler, social_card_handler, track_visit_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/list", get(list_visitors_handler))
                    .route("/track", get(track_visit_handler)),
            )
            .route("/writing/{slug}/card", get(card_handler))
            .route("/writing/{slug}/instagram", get(social_card_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{listing, Tracker};
    use crate::writings::WritingSource;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use footfall_core::{Coordinates, KvStore};
    use footfall_ledger::{FixedResolver, GeoResolver, LedgerSettings, VisitTracker, VisitorLedger};
    use footfall_store::InMemoryStore;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const FIRST_POST: &str =
        "---\ntitle: First Post\n---\nHello **world**.\n\n> Make it work,\n> then make it fast.";

    struct Harness {
        router: Router,
        store: Arc<InMemoryStore>,
        writings: TempDir,
    }

    /// One gateway instance over `store`, listing through a cache that
    /// lives for `cache_ttl`.
    fn instance(
        store: Arc<InMemoryStore>,
        writings: &Path,
        dev_mode: bool,
        cache_ttl: Duration,
    ) -> Router {
        let kv: Arc<dyn KvStore> = store;
        let paris = Coordinates::resolved(48.85, 2.35);
        let resolver: Arc<dyn GeoResolver> = Arc::new(FixedResolver(paris));
        let tracker: Tracker = VisitTracker::new(
            VisitorLedger::new(kv.clone(), LedgerSettings::default()),
            resolver,
        )
        .with_dev_mode(dev_mode);
        let listing = listing(kv, LedgerSettings::default(), cache_ttl);

        App::router(AppState::new(tracker, listing, WritingSource::new(writings)))
    }

    fn harness(dev_mode: bool) -> Harness {
        let writings = tempfile::tempdir().unwrap();
        std::fs::write(writings.path().join("first-post.mdx"), FIRST_POST).unwrap();

        let store = Arc::new(InMemoryStore::new());
        let router = instance(store.clone(), writings.path(), dev_mode, Duration::ZERO);
        Harness {
            router,
            store,
            writings,
        }
    }

    fn track_request(city: &str, country: &str, ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/track")
            .header("x-vercel-ip-city", city)
            .header("x-vercel-ip-country", country)
            .header("x-real-ip", ip)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health() {
        let h = harness(false);
        let response = send(&h.router, get_request("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn list_starts_empty_with_cache_headers() {
        let h = harness(false);
        let response = send(&h.router, get_request("/api/list")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=1800, stale-while-revalidate=3600"
        );

        let body = json_body(response).await;
        assert_eq!(body["visitors"], Value::Array(vec![]));
        let last_updated = body["lastUpdated"].as_i64().unwrap();
        assert!(last_updated < jiff::Timestamp::now().as_millisecond());
    }

    #[tokio::test]
    async fn track_then_list() {
        let h = harness(false);
        let request = Request::builder()
            .uri("/api/track")
            .header("x-vercel-ip-city", "S%C3%A3o%20Paulo")
            .header("x-vercel-ip-country", "BR")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["currentVisitor"], "São Paulo, Brazil");
        assert_eq!(body["lastVisitor"], "Somewhere else in the world");
        assert_eq!(body["visitors"][0]["location"], "São Paulo, Brazil");

        let list = json_body(send(&h.router, get_request("/api/list")).await).await;
        assert_eq!(list["visitors"].as_array().unwrap().len(), 1);
        assert_eq!(list["visitors"][0]["latitude"], 48.85);
    }

    #[tokio::test]
    async fn track_without_address_records_nothing() {
        let h = harness(false);
        let request = Request::builder()
            .uri("/api/track")
            .header("x-vercel-ip-country", "US")
            .body(Body::empty())
            .unwrap();

        let body = json_body(send(&h.router, request).await).await;
        assert_eq!(body["currentVisitor"], "Somewhere in the United States");
        assert_eq!(body["visitors"], Value::Array(vec![]));
        assert!(h.store.get("visitors").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn track_in_dev_mode() {
        let h = harness(true);
        let request = Request::builder()
            .uri("/api/track")
            .header("x-real-ip", "203.0.113.7")
            .header("x-vercel-ip-country", "FR")
            .body(Body::empty())
            .unwrap();

        let body = json_body(send(&h.router, request).await).await;
        assert_eq!(body["currentVisitor"], "Somewhere else in the world");
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn card_layout_for_existing_writing() {
        let h = harness(false);
        let response = send(
            &h.router,
            get_request("/writing/first-post/card?theme=light&width=1200"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=86400, immutable"
        );

        let body = json_body(response).await;
        assert_eq!(body["title"], "First Post");
        assert_eq!(body["theme"], "light");
        assert_eq!(body["width"], 1200);
        assert_eq!(body["height"], 1024);
        assert_eq!(body["decorations"].as_array().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn card_is_stable_per_slug() {
        let h = harness(false);
        let first = json_body(send(&h.router, get_request("/writing/first-post/card")).await).await;
        let second =
            json_body(send(&h.router, get_request("/writing/first-post/card")).await).await;

        assert_eq!(first, second);
        assert_eq!(first["theme"], "dark");
    }

    #[tokio::test]
    async fn unknown_theme_falls_back_to_dark() {
        let h = harness(false);
        let body = json_body(
            send(&h.router, get_request("/writing/first-post/card?theme=sepia")).await,
        )
        .await;
        assert_eq!(body["theme"], "dark");
        assert_eq!(body["background"], "#000");
    }

    #[tokio::test]
    async fn missing_writing_is_not_found() {
        let h = harness(false);
        let response = send(&h.router, get_request("/writing/nope/card")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(text_body(response).await, "This writing does not exist.");
    }

    #[tokio::test]
    async fn traversal_slug_is_rejected() {
        let h = harness(false);
        let response = send(&h.router, get_request("/writing/..secret/card")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&h.router, get_request("/writing/a%2Fb/card")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn instances_sharing_a_store_keep_every_visit() {
        let writings = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let ttl = Duration::from_secs(60);
        let a = instance(store.clone(), writings.path(), false, ttl);
        let b = instance(store.clone(), writings.path(), false, ttl);

        // Warm both list caches while the ledger is still empty.
        send(&a, get_request("/api/list")).await;
        send(&b, get_request("/api/list")).await;

        send(&a, track_request("Paris", "FR", "203.0.113.7")).await;
        send(&b, track_request("Oslo", "NO", "198.51.100.4")).await;
        let last = json_body(send(&a, track_request("Lima", "PE", "192.0.2.9")).await).await;

        let expected = ["Lima, Peru", "Oslo, Norway", "Paris, France"];
        let tracked: Vec<&str> = last["visitors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["location"].as_str().unwrap())
            .collect();
        assert_eq!(tracked, expected);

        let persisted = store.get("visitors").await.unwrap().unwrap();
        let persisted: Vec<&str> = persisted
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["location"].as_str().unwrap())
            .collect();
        assert_eq!(persisted, expected);

        // The list endpoint still answers from its cache until the TTL lapses.
        let listed = json_body(send(&b, get_request("/api/list")).await).await;
        assert_eq!(listed["visitors"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn malformed_ledger_lists_empty_and_is_overwritten() {
        let h = harness(false);
        h.store
            .set("visitors", json!({ "not": "a list" }))
            .await
            .unwrap();

        let listed = json_body(send(&h.router, get_request("/api/list")).await).await;
        assert_eq!(listed["visitors"], Value::Array(vec![]));

        let response = send(&h.router, track_request("Oslo", "NO", "198.51.100.4")).await;
        let body = json_body(response).await;
        assert_eq!(body["visitors"][0]["location"], "Oslo, Norway");
        assert_eq!(body["visitors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn instagram_layout_for_existing_writing() {
        let h = harness(false);
        let response = send(&h.router, get_request("/writing/first-post/instagram")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600, immutable"
        );

        let body = json_body(response).await;
        assert_eq!(body["title"], "First Post");
        assert_eq!(body["width"], 1024);
        assert_eq!(body["height"], 1024);
        assert_eq!(body["background"], "#000");
        assert_eq!(body["decorations"].as_array().unwrap().len(), 20);

        let first_word = &body["lines"][0]["words"][0];
        assert_eq!(first_word["spans"][0]["text"], "Hello");
        assert!(first_word["spans"][0]["key"]
            .as_str()
            .unwrap()
            .starts_with("text-0-0-0-"));
    }

    #[tokio::test]
    async fn instagram_ignores_card_options() {
        let h = harness(false);
        let plain =
            json_body(send(&h.router, get_request("/writing/first-post/instagram")).await).await;
        let themed = json_body(
            send(
                &h.router,
                get_request("/writing/first-post/instagram?theme=light&width=600"),
            )
            .await,
        )
        .await;

        assert_eq!(plain, themed);
    }

    #[tokio::test]
    async fn instagram_missing_or_blank_writing_is_not_found() {
        let h = harness(false);
        std::fs::write(h.writings.path().join("draft.mdx"), "  \n").unwrap();

        let response = send(&h.router, get_request("/writing/nope/instagram")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(text_body(response).await, "This writing does not exist.");

        let response = send(&h.router, get_request("/writing/draft/instagram")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&h.router, get_request("/writing/draft/card")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&h.router, get_request("/writing/..secret/instagram")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
