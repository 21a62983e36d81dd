//! Dairydrop - Dairy-Delivery Storefront Service
//!
//! In-memory storefront API: catalog browsing with filters, per-session
//! carts, phone-OTP sign-in, and subscription plans. Carts and auth sessions
//! are keyed by an opaque session id with no cross-session sharing.

use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

use dairydrop::{
    AuthSession, Cart, Catalog, CategoryFilter, FilterSpec, MockOtpGateway, OtpGateway, PhoneNumber,
    Product, SortKey, StoreError, SubscriptionPlan, User, VerifyOutcome,
};
use dairydrop::domain::subscription::default_plans;

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub plans: Arc<Vec<SubscriptionPlan>>,
    pub carts: Arc<RwLock<HashMap<String, Cart>>>,
    pub auth: Arc<RwLock<HashMap<String, AuthSession>>>,
    pub otp: Arc<dyn OtpGateway>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let state = AppState {
        catalog: Arc::new(Catalog::demo()),
        plans: Arc::new(default_plans()),
        carts: Arc::new(RwLock::new(HashMap::new())),
        auth: Arc::new(RwLock::new(HashMap::new())),
        otp: Arc::new(MockOtpGateway),
    };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "dairydrop"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/plans", get(list_plans))
        .route("/api/v1/cart/:session", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items", post(add_item))
        .route("/api/v1/cart/:session/items/:product_id", axum::routing::put(update_item).delete(remove_item))
        .route("/api/v1/auth/:session", get(get_auth))
        .route("/api/v1/auth/:session/otp/request", post(request_otp))
        .route("/api/v1/auth/:session/otp/verify", post(verify_otp))
        .route("/api/v1/auth/:session/logout", post(logout))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    tracing::info!("dairydrop storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

fn internal(msg: &str) -> ApiError { (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()) }

fn store_error(e: StoreError) -> ApiError {
    let status = match e {
        StoreError::ProductNotFound => StatusCode::NOT_FOUND,
        StoreError::InvalidPhone => StatusCode::BAD_REQUEST,
        StoreError::NoPendingCode => StatusCode::CONFLICT,
        StoreError::AttemptsExhausted => StatusCode::TOO_MANY_REQUESTS,
        StoreError::Gateway(_) => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
}

impl ProductQuery {
    /// The default upper bound is the catalog's observed max price, so an
    /// unbounded query shows the full range.
    fn into_spec(self, catalog: &Catalog) -> FilterSpec {
        FilterSpec {
            search: self.search.unwrap_or_default(),
            category: match self.category {
                None => CategoryFilter::All,
                Some(c) if c.eq_ignore_ascii_case("all") => CategoryFilter::All,
                Some(c) => CategoryFilter::Only(c),
            },
            min_price: self.min_price.unwrap_or(Decimal::ZERO),
            max_price: self.max_price.unwrap_or_else(|| catalog.max_price()),
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        }
    }
}

async fn list_products(State(s): State<AppState>, Query(q): Query<ProductQuery>) -> Json<Vec<Product>> {
    let spec = q.into_spec(&s.catalog);
    Json(s.catalog.filter(&spec).into_iter().cloned().collect())
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    s.catalog.get(&id).cloned().map(Json).ok_or_else(|| store_error(StoreError::ProductNotFound))
}

async fn list_categories(State(s): State<AppState>) -> Json<Vec<String>> {
    Json(s.catalog.categories())
}

async fn list_plans(State(s): State<AppState>) -> Json<Vec<SubscriptionPlan>> {
    Json(s.plans.as_ref().clone())
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: String,
    pub lines: Vec<LineView>,
    pub total_items: u64,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LineView {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            id: cart.id().to_string(),
            lines: cart.lines().iter().map(|l| LineView {
                product: l.product.clone(),
                quantity: l.quantity,
                line_total: l.line_total().rounded(),
            }).collect(),
            total_items: cart.total_items(),
            // Rounding happens here, at the presentation boundary.
            subtotal: cart.subtotal().rounded(),
        }
    }
}

fn with_cart<T>(s: &AppState, session: &str, f: impl FnOnce(&mut Cart) -> T) -> Result<T, ApiError> {
    let mut carts = s.carts.write().map_err(|_| internal("cart state lock poisoned"))?;
    let cart = carts.entry(session.to_string()).or_insert_with(|| Cart::new("USD"));
    let out = f(cart);
    for event in cart.take_events() {
        tracing::debug!(session = %session, ?event, "cart event");
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest { pub product_id: String, pub quantity: Option<i64> }

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest { pub quantity: i64 }

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>, ApiError> {
    with_cart(&s, &session, |cart| Json(CartView::from_cart(cart)))
}

async fn add_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>) -> Result<(StatusCode, Json<CartView>), ApiError> {
    let product = s.catalog.get(&r.product_id).cloned().ok_or_else(|| store_error(StoreError::ProductNotFound))?;
    let quantity = r.quantity.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
    let view = with_cart(&s, &session, |cart| { cart.add(&product, quantity); Json(CartView::from_cart(cart)) })?;
    Ok((StatusCode::CREATED, view))
}

async fn update_item(State(s): State<AppState>, Path((session, product_id)): Path<(String, String)>, Json(r): Json<UpdateItemRequest>) -> Result<Json<CartView>, ApiError> {
    // Negative quantities clamp to zero, which removes the line.
    let quantity = r.quantity.clamp(0, i64::from(u32::MAX)) as u32;
    with_cart(&s, &session, |cart| { cart.update_quantity(&product_id, quantity); Json(CartView::from_cart(cart)) })
}

async fn remove_item(State(s): State<AppState>, Path((session, product_id)): Path<(String, String)>) -> Result<Json<CartView>, ApiError> {
    with_cart(&s, &session, |cart| { cart.remove(&product_id); Json(CartView::from_cart(cart)) })
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, ApiError> {
    with_cart(&s, &session, |cart| cart.clear())?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct OtpRequestPayload {
    #[validate(length(min = 7, max = 32))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OtpVerifyPayload {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct AuthView {
    pub authenticated: bool,
    pub user: Option<User>,
}

fn with_auth<T>(s: &AppState, session: &str, f: impl FnOnce(&mut AuthSession) -> T) -> Result<T, ApiError> {
    let mut sessions = s.auth.write().map_err(|_| internal("auth state lock poisoned"))?;
    let auth = sessions.entry(session.to_string()).or_default();
    let out = f(auth);
    for event in auth.take_events() {
        tracing::debug!(session = %session, ?event, "auth event");
    }
    Ok(out)
}

async fn get_auth(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<AuthView>, ApiError> {
    with_auth(&s, &session, |auth| Json(AuthView { authenticated: auth.is_authenticated(), user: auth.user().cloned() }))
}

async fn request_otp(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<OtpRequestPayload>) -> Result<StatusCode, ApiError> {
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let phone = PhoneNumber::new(r.phone).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    with_auth(&s, &session, |auth| auth.request_code(phone, s.otp.as_ref()))?.map_err(store_error)?;
    Ok(StatusCode::ACCEPTED)
}

async fn verify_otp(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<OtpVerifyPayload>) -> Result<Json<AuthView>, ApiError> {
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let outcome = with_auth(&s, &session, |auth| auth.verify(&r.code, s.otp.as_ref()))?.map_err(store_error)?;
    match outcome {
        VerifyOutcome::Verified(user) => Ok(Json(AuthView { authenticated: true, user: Some(user) })),
        VerifyOutcome::Rejected { attempts_left } => Err((StatusCode::UNAUTHORIZED, format!("Invalid code, {} attempts left", attempts_left))),
    }
}

async fn logout(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, ApiError> {
    with_auth(&s, &session, |auth| auth.logout())?;
    Ok(StatusCode::NO_CONTENT)
}
