//! Storefront routes and JSON API.
//!
//! HTML Endpoints:
//! - `GET  /`                        — home page with the search form
//! - `GET  /search`                  — search results with watchlist badges
//! - `GET  /product/{product_id}`    — product detail with price history
//! - `GET  /community`               — community deals feed
//! - `GET  /compare`                 — side-by-side comparison (max 4)
//! - `GET  /export/pdf`              — watchlist export (PDF or printable HTML)
//!
//! JSON API Endpoints:
//! - `GET  /api/watchlist`           — list watchlist entries
//! - `POST /api/watchlist/add`       — add a product to the watchlist
//! - `POST /api/watchlist/remove`    — remove a product from the watchlist
//! - `POST /api/ai/summary`          — AI product summary (degradable)
//! - `POST /api/ai/buy-advice`       — heuristic purchase advice
//! - `POST /api/ai/review-check`     — review-trust assessment
//! - `POST /api/community/upvote`    — upvote a community deal

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use pricedrop_agent::SummaryRuntime;
use pricedrop_core::advice::{self, AdviceResult, BuySignal};
use pricedrop_core::catalog::{self, MarketplaceFilter, SearchFilters, SortKey};
use pricedrop_core::domain::deal::{rank_deals, Deal};
use pricedrop_core::domain::product::{Marketplace, Product, ProductId};
use pricedrop_core::domain::watchlist::{NewWatchlistEntry, WatchlistEntry};
use pricedrop_core::pricing::{self, HistoryPoint};
use pricedrop_db::repositories::{
    DealVoteRepository, PriceHistoryRepository, RepositoryError, SqlDealVoteRepository,
    SqlPriceHistoryRepository, SqlWatchlistRepository, WatchlistRepository,
};
use pricedrop_db::DbPool;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::pdf::PdfExporter;

const PAGE_SIZE: usize = 12;
const SYNTHETIC_HISTORY_DAYS: u32 = 30;
const MAX_COMPARE_PRODUCTS: usize = 4;
const EXPORT_NAME_WIDTH: usize = 40;

#[derive(Clone)]
pub struct WebState {
    templates: Arc<Tera>,
    pdf_exporter: Arc<PdfExporter>,
    summary: SummaryRuntime,
    deals: Arc<Vec<Deal>>,
    watchlist: Arc<dyn WatchlistRepository>,
    prices: Arc<dyn PriceHistoryRepository>,
    votes: Arc<dyn DealVoteRepository>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub marketplace: Option<String>,
    pub free_shipping: Option<String>,
    pub discount_only: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRef {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct BuyAdviceRequest {
    #[serde(default)]
    pub current_price: Decimal,
    #[serde(default)]
    pub price_history: Vec<HistoryPricePayload>,
    #[serde(default)]
    pub discount: i32,
}

/// Only the price matters for advice; the page posts back the embedded
/// series which also carries dates.
#[derive(Debug, Deserialize)]
pub struct HistoryPricePayload {
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BuyAdviceResponse {
    pub success: bool,
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<BuySignal>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewCheckRequest {
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ReviewCheckResponse {
    pub success: bool,
    pub trust_score: u8,
    pub flags: Vec<&'static str>,
    pub recommendation: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UpvoteRequest {
    pub deal_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(rename = "type")]
    pub export_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub products: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

#[derive(Debug, Serialize)]
struct ProductView {
    #[serde(flatten)]
    product: Product,
    in_watchlist: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Initialize Tera with the site templates, falling back to the embedded
/// copies so a fresh checkout renders without a templates directory.
fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/site/**/*") {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to load site templates from filesystem, using empty Tera instance");
            Tera::default()
        }
    };

    crate::pdf::register_template_filters(&mut tera);

    tera.add_raw_template("index.html", include_str!("../../../templates/site/index.html")).ok();
    tera.add_raw_template(
        "search_results.html",
        include_str!("../../../templates/site/search_results.html"),
    )
    .ok();
    tera.add_raw_template(
        "product_detail.html",
        include_str!("../../../templates/site/product_detail.html"),
    )
    .ok();
    tera.add_raw_template("community.html", include_str!("../../../templates/site/community.html"))
        .ok();
    tera.add_raw_template("compare.html", include_str!("../../../templates/site/compare.html"))
        .ok();

    Arc::new(tera)
}

pub fn router(db_pool: DbPool, summary: SummaryRuntime, deals: Vec<Deal>) -> Router {
    let templates = init_templates();

    let pdf_exporter = match PdfExporter::new("templates/export") {
        Ok(exporter) => Arc::new(exporter),
        Err(e) => {
            warn!(error = %e, "Failed to load export templates from filesystem, using embedded fallback");
            Arc::new(PdfExporter::with_embedded_templates())
        }
    };

    let state = WebState {
        templates,
        pdf_exporter,
        summary,
        deals: Arc::new(deals),
        watchlist: Arc::new(SqlWatchlistRepository::new(db_pool.clone())),
        prices: Arc::new(SqlPriceHistoryRepository::new(db_pool.clone())),
        votes: Arc::new(SqlDealVoteRepository::new(db_pool)),
    };

    Router::new()
        // HTML routes
        .route("/", get(index_page))
        .route("/search", get(search_page))
        .route("/product/{product_id}", get(product_page))
        .route("/community", get(community_page))
        .route("/compare", get(compare_page))
        .route("/export/pdf", get(export_pdf))
        // JSON API routes
        .route("/api/watchlist", get(list_watchlist))
        .route("/api/watchlist/add", post(add_to_watchlist))
        .route("/api/watchlist/remove", post(remove_from_watchlist))
        .route("/api/ai/summary", post(ai_summary))
        .route("/api/ai/buy-advice", post(buy_advice))
        .route("/api/ai/review-check", post(review_check))
        .route("/api/community/upvote", post(upvote_deal))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// HTML Handlers
// ---------------------------------------------------------------------------

fn render(
    templates: &Tera,
    name: &str,
    context: &Context,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    templates.render(name, context).map(Html).map_err(|e| {
        error!(template = name, error = %e, "template render failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Error</h1><p>The page could not be rendered.</p>".to_string()),
        )
    })
}

async fn index_page(
    State(state): State<WebState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("marketplaces", &marketplace_names());
    render(&state.templates, "index.html", &context)
}

async fn search_page(
    Query(params): Query<SearchParams>,
    State(state): State<WebState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let query = params.q.unwrap_or_default();
    let marketplace_raw = params.marketplace.unwrap_or_else(|| "all".to_string());
    let filters = SearchFilters {
        marketplace: MarketplaceFilter::parse(&marketplace_raw),
        free_shipping_only: params.free_shipping.as_deref() == Some("true"),
        discount_only: params.discount_only.as_deref() == Some("true"),
        sort: SortKey::parse(params.sort_by.as_deref().unwrap_or("relevance")),
    };
    let page = params.page.unwrap_or(1).max(1);

    let results = catalog::search(&query, &filters, (page - 1) * PAGE_SIZE, PAGE_SIZE);
    let watched = watched_ids(state.watchlist.as_ref()).await;

    let items: Vec<ProductView> = results
        .items
        .iter()
        .map(|product| ProductView {
            product: product.clone(),
            in_watchlist: watched.contains(&product.id.0),
        })
        .collect();

    let mut context = Context::new();
    context.insert("query", &query);
    context.insert("results", &items);
    context.insert("total", &results.total);
    context.insert("page", &page);
    context.insert("marketplaces", &marketplace_names());
    context.insert(
        "filters",
        &serde_json::json!({
            "marketplace": marketplace_raw,
            "free_shipping": filters.free_shipping_only,
            "discount_only": filters.discount_only,
            "sort_by": filters.sort.as_str(),
        }),
    );
    render(&state.templates, "search_results.html", &context)
}

async fn product_page(
    Path(product_id): Path<String>,
    State(state): State<WebState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let id = ProductId(product_id);
    let product = match catalog::get(&id) {
        Some(product) => product,
        None => {
            return Err((StatusCode::NOT_FOUND, Html("<h1>Product not found</h1>".to_string())))
        }
    };

    // Recorded observations win; otherwise fabricate a series so the chart
    // always has something to draw.
    let recorded = match state.prices.history(&id).await {
        Ok(points) => points,
        Err(repo_error) => {
            warn!(product_id = %id, error = %repo_error, "price history unavailable, using synthetic series");
            Vec::new()
        }
    };
    let history: Vec<HistoryPoint> = if recorded.is_empty() {
        pricing::generate(product.price, SYNTHETIC_HISTORY_DAYS)
    } else {
        recorded
            .iter()
            .map(|point| HistoryPoint { date: point.recorded_at.date_naive(), price: point.price })
            .collect()
    };

    let in_watchlist = match state.watchlist.contains(&id).await {
        Ok(contained) => contained,
        Err(repo_error) => {
            warn!(product_id = %id, error = %repo_error, "watchlist lookup failed");
            false
        }
    };

    let history_json = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

    let mut context = Context::new();
    context.insert("product", product);
    context.insert("in_watchlist", &in_watchlist);
    context.insert("price_history", &history_json);
    render(&state.templates, "product_detail.html", &context)
}

async fn community_page(
    State(state): State<WebState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut local_counts: HashMap<i64, i64> = HashMap::new();
    for deal in state.deals.iter() {
        match state.votes.upvotes(deal.id).await {
            Ok(count) if count > 0 => {
                local_counts.insert(deal.id, count);
            }
            Ok(_) => {}
            Err(repo_error) => {
                warn!(deal_id = deal.id, error = %repo_error, "upvote lookup failed");
            }
        }
    }

    let ranked = rank_deals(&state.deals, &local_counts);

    let mut context = Context::new();
    context.insert("deals", &ranked);
    render(&state.templates, "community.html", &context)
}

async fn compare_page(
    Query(params): Query<CompareParams>,
    State(state): State<WebState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let products: Vec<&'static Product> = params
        .products
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .take(MAX_COMPARE_PRODUCTS)
        .filter_map(|raw| catalog::get(&ProductId(raw.to_string())))
        .collect();

    let mut context = Context::new();
    context.insert("products", &products);
    render(&state.templates, "compare.html", &context)
}

async fn export_pdf(
    Query(params): Query<ExportParams>,
    State(state): State<WebState>,
) -> Response {
    let export_type = params.export_type.unwrap_or_else(|| "watchlist".to_string());
    if export_type != "watchlist" {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: format!("unsupported export type `{export_type}`") }),
        )
            .into_response();
    }

    let entries = match state.watchlist.list().await {
        Ok(entries) => entries,
        Err(repo_error) => return store_unavailable("watchlist export", repo_error),
    };

    let rows: Vec<serde_json::Value> = entries.iter().map(export_row).collect();
    let export_data = serde_json::json!({
        "generated_at": Utc::now().format("%Y-%m-%d %H:%M").to_string(),
        "rows": rows,
    });

    match state.pdf_exporter.generate_watchlist_pdf(&export_data).await {
        Ok(result) => {
            let filename = format!("pricedrop_watchlist_{}", Utc::now().format("%Y%m%d"));
            result.into_response(&filename)
        }
        Err(export_error) => {
            error!(error = %export_error, "watchlist export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError { error: "export failed".to_string() }),
            )
                .into_response()
        }
    }
}

fn export_row(entry: &WatchlistEntry) -> serde_json::Value {
    serde_json::json!({
        "product_name": truncate_name(&entry.product_name, EXPORT_NAME_WIDTH),
        "marketplace": entry.marketplace.as_str(),
        "current_price": entry.current_price.to_string(),
        "original_price": entry
            .original_price
            .map(|price| price.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        "savings": entry
            .savings()
            .map(|savings| savings.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    })
}

// ---------------------------------------------------------------------------
// JSON API Handlers
// ---------------------------------------------------------------------------

async fn list_watchlist(
    State(state): State<WebState>,
) -> Result<Json<Vec<WatchlistEntry>>, Response> {
    state
        .watchlist
        .list()
        .await
        .map(Json)
        .map_err(|repo_error| store_unavailable("watchlist list", repo_error))
}

async fn add_to_watchlist(
    State(state): State<WebState>,
    Json(entry): Json<NewWatchlistEntry>,
) -> Result<Json<MutationResponse>, Response> {
    state
        .watchlist
        .add(entry)
        .await
        .map(|success| Json(MutationResponse { success }))
        .map_err(|repo_error| store_unavailable("watchlist add", repo_error))
}

async fn remove_from_watchlist(
    State(state): State<WebState>,
    Json(request): Json<ProductRef>,
) -> Result<Json<MutationResponse>, Response> {
    state
        .watchlist
        .remove(&request.product_id)
        .await
        .map(|()| Json(MutationResponse { success: true }))
        .map_err(|repo_error| store_unavailable("watchlist remove", repo_error))
}

async fn ai_summary(
    State(state): State<WebState>,
    Json(request): Json<SummaryRequest>,
) -> Json<SummaryResponse> {
    let outcome = state.summary.summarize(&request.name, &request.description).await;
    Json(SummaryResponse {
        success: outcome.is_generated(),
        summary: outcome.text().to_string(),
    })
}

async fn buy_advice(Json(request): Json<BuyAdviceRequest>) -> Json<BuyAdviceResponse> {
    let prices: Vec<Decimal> = request.price_history.iter().map(|point| point.price).collect();

    match advice::advise(request.current_price, &prices, request.discount) {
        AdviceResult::Advice { signal, message } => {
            Json(BuyAdviceResponse { success: true, advice: message, signal: Some(signal) })
        }
        AdviceResult::Unavailable { message } => {
            Json(BuyAdviceResponse { success: false, advice: message, signal: None })
        }
    }
}

async fn review_check(Json(request): Json<ReviewCheckRequest>) -> Json<ReviewCheckResponse> {
    let assessment = advice::assess(request.rating, request.review_count);
    Json(ReviewCheckResponse {
        success: true,
        trust_score: assessment.score,
        flags: assessment.flags,
        recommendation: assessment.recommendation,
    })
}

async fn upvote_deal(
    State(state): State<WebState>,
    Json(request): Json<UpvoteRequest>,
) -> Result<Json<MutationResponse>, Response> {
    state
        .votes
        .upvote(request.deal_id)
        .await
        .map(|()| Json(MutationResponse { success: true }))
        .map_err(|repo_error| store_unavailable("deal upvote", repo_error))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn marketplace_names() -> Vec<&'static str> {
    Marketplace::ALL.iter().map(Marketplace::as_str).collect()
}

async fn watched_ids(watchlist: &dyn WatchlistRepository) -> HashSet<String> {
    match watchlist.list().await {
        Ok(entries) => entries.into_iter().map(|entry| entry.product_id.0).collect(),
        Err(repo_error) => {
            // Badges degrade to "not watched" rather than failing the page.
            warn!(error = %repo_error, "watchlist unavailable, rendering without badges");
            HashSet::new()
        }
    }
}

fn store_unavailable(operation: &str, repo_error: RepositoryError) -> Response {
    error!(operation, error = %repo_error, "store operation failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError { error: "store temporarily unavailable".to_string() }),
    )
        .into_response()
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let mut short: String = name.chars().take(max).collect();
        short.push_str("...");
        short
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use pricedrop_agent::{SummaryRuntime, FALLBACK_SUMMARY};
    use pricedrop_core::domain::deal::Deal;
    use pricedrop_db::{connect_with_settings, migrations};
    use tower::util::ServiceExt;

    use super::{router, truncate_name};

    async fn app() -> axum::Router {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let deals = Deal::load_feed(include_str!("../../../data/community_deals.json"))
            .expect("embedded feed should parse");
        router(pool, SummaryRuntime::disabled(), deals)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn watchlist_payload(product_id: &str) -> serde_json::Value {
        serde_json::json!({
            "product_id": product_id,
            "product_name": "Sony WH-1000XM5 Wireless Noise Cancelling Headphones",
            "marketplace": "Amazon",
            "current_price": "348.00",
            "original_price": "399.99",
            "image_url": "https://example.com/image.jpg",
            "product_url": "https://example.com/listing",
        })
    }

    #[tokio::test]
    async fn home_page_renders() {
        let response = app().await.oneshot(get("/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("PriceDrop"));
    }

    #[tokio::test]
    async fn search_page_lists_matches_and_watchlist_badges() {
        let app = app().await;

        let added = app
            .clone()
            .oneshot(post_json("/api/watchlist/add", watchlist_payload("amz_001")))
            .await
            .expect("add response");
        assert_eq!(added.status(), StatusCode::OK);

        let response = app
            .oneshot(get("/search?q=headphones&sort_by=price_low"))
            .await
            .expect("search response");
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Sony WH-1000XM5"));
        assert!(html.contains("Watching"), "watched product should carry its badge");
    }

    #[tokio::test]
    async fn product_page_embeds_a_price_series_and_unknown_ids_are_404() {
        let app = app().await;

        let response = app.clone().oneshot(get("/product/amz_001")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("price-chart"));
        assert!(html.contains("PRICE_HISTORY"));

        let missing = app.oneshot(get("/product/nope")).await.expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn watchlist_api_round_trip() {
        let app = app().await;

        let first = body_json(
            app.clone()
                .oneshot(post_json("/api/watchlist/add", watchlist_payload("amz_001")))
                .await
                .expect("add"),
        )
        .await;
        assert_eq!(first["success"], serde_json::json!(true));

        let duplicate = body_json(
            app.clone()
                .oneshot(post_json("/api/watchlist/add", watchlist_payload("amz_001")))
                .await
                .expect("duplicate add"),
        )
        .await;
        assert_eq!(duplicate["success"], serde_json::json!(false));

        let listed = body_json(app.clone().oneshot(get("/api/watchlist")).await.expect("list"))
            .await;
        assert_eq!(listed.as_array().expect("array").len(), 1);
        assert_eq!(listed[0]["product_id"], serde_json::json!("amz_001"));

        let removed = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/watchlist/remove",
                    serde_json::json!({ "product_id": "amz_001" }),
                ))
                .await
                .expect("remove"),
        )
        .await;
        assert_eq!(removed["success"], serde_json::json!(true));

        let empty = body_json(app.oneshot(get("/api/watchlist")).await.expect("list")).await;
        assert!(empty.as_array().expect("array").is_empty());
    }

    #[tokio::test]
    async fn buy_advice_endpoint_answers_and_never_errors() {
        let app = app().await;

        let history: Vec<serde_json::Value> =
            (0..7).map(|_| serde_json::json!({ "date": "2025-05-01", "price": "100" })).collect();
        let best = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/ai/buy-advice",
                    serde_json::json!({
                        "current_price": "85",
                        "price_history": history,
                        "discount": 0,
                    }),
                ))
                .await
                .expect("advice"),
        )
        .await;
        assert_eq!(best["success"], serde_json::json!(true));
        assert_eq!(best["signal"], serde_json::json!("best_price_ever"));

        let discount_only = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/ai/buy-advice",
                    serde_json::json!({ "current_price": "50", "discount": 65 }),
                ))
                .await
                .expect("advice"),
        )
        .await;
        assert_eq!(discount_only["signal"], serde_json::json!("amazing_discount"));

        // Malformed price degrades to the tagged fallback, not a 500.
        let response = app
            .oneshot(post_json(
                "/api/ai/buy-advice",
                serde_json::json!({ "current_price": "0", "discount": 50 }),
            ))
            .await
            .expect("advice");
        assert_eq!(response.status(), StatusCode::OK);
        let fallback = body_json(response).await;
        assert_eq!(fallback["success"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn review_check_endpoint_scores_the_fake_pattern() {
        let payload = body_json(
            app()
                .await
                .oneshot(post_json(
                    "/api/ai/review-check",
                    serde_json::json!({ "rating": 5.0, "review_count": 10000 }),
                ))
                .await
                .expect("review check"),
        )
        .await;
        assert_eq!(payload["success"], serde_json::json!(true));
        assert_eq!(payload["trust_score"], serde_json::json!(90));
    }

    #[tokio::test]
    async fn summary_endpoint_serves_the_fallback_without_a_client() {
        let payload = body_json(
            app()
                .await
                .oneshot(post_json(
                    "/api/ai/summary",
                    serde_json::json!({ "name": "Headphones", "description": "Great sound." }),
                ))
                .await
                .expect("summary"),
        )
        .await;
        assert_eq!(payload["success"], serde_json::json!(false));
        assert_eq!(payload["summary"], serde_json::json!(FALLBACK_SUMMARY));
    }

    #[tokio::test]
    async fn community_page_layers_local_upvotes_onto_the_feed() {
        let app = app().await;

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post_json("/api/community/upvote", serde_json::json!({ "deal_id": 1 })))
                .await
                .expect("upvote");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/community")).await.expect("community");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        // Deal 1 ships with 128 base upvotes; two local votes make 130.
        assert!(html.contains("130"));
    }

    #[tokio::test]
    async fn export_rejects_unknown_types_and_serves_the_watchlist() {
        let app = app().await;

        let bad = app.clone().oneshot(get("/export/pdf?type=search")).await.expect("response");
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        app.clone()
            .oneshot(post_json("/api/watchlist/add", watchlist_payload("amz_001")))
            .await
            .expect("add");

        let export = app.oneshot(get("/export/pdf?type=watchlist")).await.expect("response");
        assert_eq!(export.status(), StatusCode::OK);
        let content_type = export
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            content_type.starts_with("application/pdf") || content_type.starts_with("text/html"),
            "export should be a PDF or printable HTML, got `{content_type}`"
        );
    }

    #[tokio::test]
    async fn compare_page_caps_at_four_products() {
        let response = app()
            .await
            .oneshot(get("/compare?products=amz_001,ebay_001,ali_001,amz_002,temu_001"))
            .await
            .expect("compare");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Sony WH-1000XM5"));
        assert!(!html.contains("iPhone 15 Pro Max Case"), "fifth product must be dropped");
    }

    #[test]
    fn long_names_are_truncated_with_an_ellipsis() {
        let name = "Sony WH-1000XM5 Wireless Noise Cancelling Headphones";
        let short = truncate_name(name, 40);
        assert_eq!(short.chars().count(), 43);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_name("short", 40), "short");
    }
}
