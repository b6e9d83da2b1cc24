//! Integration tests for Clementine Market.
//!
//! The client under test talks to a real HTTP server: an in-process
//! axum mock of the storefront API, bound to an ephemeral port per
//! test. The mock speaks the same `{success, message, data}` envelope
//! and camelCase wire shapes as the production backend, and exposes
//! knobs for the failure modes the client must survive (cart backend
//! outage, server-priced totals the client must not second-guess).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p clementine-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use clementine_client::notify::{Notification, NotificationKind, Notifier};
use clementine_client::{App, ClientConfig};
use clementine_core::{
    Address, Cart, CartId, CartItem, LoginRequest, Order, OrderId, OrderPage, OrderStatus,
    PaymentStatus, Product, ProductId, ProductPage, ProfileUpdate, RegisterRequest, User, UserId,
    UserRole,
};

// =============================================================================
// Mock backend state
// =============================================================================

struct MockUser {
    user: User,
    password: String,
}

/// Shared state behind the mock storefront API.
///
/// Tests reach in through the public methods to seed products and to
/// flip failure knobs; everything else is driven over HTTP by the
/// client under test.
pub struct MockState {
    products: Mutex<Vec<Product>>,
    users: Mutex<Vec<MockUser>>,
    tokens: Mutex<HashMap<String, UserId>>,
    carts: Mutex<HashMap<String, Cart>>,
    orders: Mutex<Vec<Order>>,
    next_id: AtomicU64,
    fail_cart_fetch: AtomicBool,
    total_override: Mutex<Option<Decimal>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            users: Mutex::new(Vec::new()),
            tokens: Mutex::new(HashMap::new()),
            carts: Mutex::new(HashMap::new()),
            orders: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            fail_cart_fetch: AtomicBool::new(false),
            total_override: Mutex::new(None),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Seed one purchasable product and return its id.
    pub fn seed_product(&self, name: &str, category: &str, price: Decimal, stock: u32) -> ProductId {
        let now = Utc::now();
        let id = ProductId::from(format!("p-{}", self.next_id()));
        lock(&self.products).push(Product {
            id: id.clone(),
            name: name.to_owned(),
            description: format!("{name} from the Clementine test orchard"),
            price,
            category: category.to_owned(),
            image_url: format!("https://img.example/{id}.jpg"),
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Make every `GET /api/cart` fail with a 500 until reset.
    pub fn set_cart_fetch_failing(&self, failing: bool) {
        self.fail_cart_fetch.store(failing, Ordering::SeqCst);
    }

    /// Force the server-computed cart total to an arbitrary figure.
    /// The client must display it verbatim.
    pub fn set_total_override(&self, total: Option<Decimal>) {
        *lock(&self.total_override) = total;
    }

    /// Number of orders placed so far.
    pub fn order_count(&self) -> usize {
        lock(&self.orders).len()
    }

    /// Advance an order's status out-of-band, as warehouse processing
    /// would.
    pub fn set_order_status(&self, order_id: &OrderId, status: OrderStatus) {
        if let Some(order) = lock(&self.orders)
            .iter_mut()
            .find(|order| &order.id == order_id)
        {
            order.status = status;
            order.updated_at = Utc::now();
        }
    }

    fn user_for_token(&self, token: &str) -> Option<User> {
        let user_id = lock(&self.tokens).get(token).cloned()?;
        lock(&self.users)
            .iter()
            .find(|entry| entry.user.id == user_id)
            .map(|entry| entry.user.clone())
    }

    fn issue_token(&self, user_id: &UserId) -> String {
        let token = format!("tok-{}", Uuid::new_v4());
        lock(&self.tokens).insert(token.clone(), user_id.clone());
        token
    }

    fn recompute(&self, cart: &mut Cart) {
        cart.total_amount = lock(&self.total_override).unwrap_or_else(|| {
            cart.items
                .iter()
                .map(|item| item.price * Decimal::from(item.quantity))
                .sum()
        });
        cart.updated_at = Utc::now();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// Envelope helpers
// =============================================================================

type ApiReply = (StatusCode, Json<Value>);

fn ok<T: Serialize>(data: &T) -> ApiReply {
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

fn fail(status: StatusCode, message: &str) -> ApiReply {
    (status, Json(json!({"success": false, "message": message})))
}

// =============================================================================
// Request identity
// =============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-session-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn auth_user(state: &MockState, headers: &HeaderMap) -> Option<User> {
    bearer_token(headers).and_then(|token| state.user_for_token(token))
}

/// Key under which the caller's cart lives: user identity when signed
/// in, otherwise the anonymous session id.
fn cart_key(state: &MockState, headers: &HeaderMap) -> Option<String> {
    if let Some(user) = auth_user(state, headers) {
        return Some(format!("user:{}", user.id));
    }
    session_id(headers).map(|sid| format!("sess:{sid}"))
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiReply {
    let exists = lock(&state.users)
        .iter()
        .any(|entry| entry.user.email == body.email);
    if exists {
        return fail(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let now = Utc::now();
    let user = User {
        id: UserId::from(format!("u-{}", state.next_id())),
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        role: body.role.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    lock(&state.users).push(MockUser {
        user: user.clone(),
        password: body.password,
    });

    let token = state.issue_token(&user.id);
    ok(&json!({"user": user, "token": token}))
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> ApiReply {
    let Some(user) = lock(&state.users)
        .iter()
        .find(|entry| entry.user.email == body.email && entry.password == body.password)
        .map(|entry| entry.user.clone())
    else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };

    if let Some(required_role) = body.role
        && user.role != required_role
    {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }

    // Adopt the caller's anonymous cart, if one exists.
    if let Some(sid) = session_id(&headers) {
        let mut carts = lock(&state.carts);
        if let Some(mut cart) = carts.remove(&format!("sess:{sid}")) {
            cart.user_id = Some(user.id.clone());
            carts.insert(format!("user:{}", user.id), cart);
        }
    }

    let token = state.issue_token(&user.id);
    ok(&json!({"user": user, "token": token}))
}

async fn get_profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> ApiReply {
    match auth_user(&state, &headers) {
        Some(user) => ok(&user),
        None => fail(StatusCode::UNAUTHORIZED, "Authentication required"),
    }
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> ApiReply {
    let Some(current) = auth_user(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let mut users = lock(&state.users);
    let Some(entry) = users.iter_mut().find(|entry| entry.user.id == current.id) else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };

    if let Some(email) = update.email {
        entry.user.email = email;
    }
    if let Some(first_name) = update.first_name {
        entry.user.first_name = first_name;
    }
    if let Some(last_name) = update.last_name {
        entry.user.last_name = last_name;
    }
    entry.user.updated_at = Utc::now();

    ok(&entry.user.clone())
}

// =============================================================================
// Product handlers
// =============================================================================

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(12);

    let products = lock(&state.products);
    let filtered: Vec<Product> = products
        .iter()
        .filter(|product| {
            params
                .get("category")
                .is_none_or(|category| &product.category == category)
        })
        .filter(|product| {
            params.get("search").is_none_or(|needle| {
                product
                    .name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
        })
        .cloned()
        .collect();

    let total = filtered.len() as u64;
    let start = ((page.saturating_sub(1)) * limit) as usize;
    let page_items: Vec<Product> = filtered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    ok(&ProductPage {
        products: page_items,
        total,
        page,
        limit,
    })
}

async fn list_categories(State(state): State<Arc<MockState>>) -> ApiReply {
    let mut categories: Vec<String> = lock(&state.products)
        .iter()
        .map(|product| product.category.clone())
        .collect();
    categories.sort();
    categories.dedup();
    ok(&categories)
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    Path(product_id): Path<String>,
) -> ApiReply {
    let product_id = ProductId::from(product_id);
    lock(&state.products)
        .iter()
        .find(|product| product.id == product_id)
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Product not found"),
            |product| ok(product),
        )
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Result<User, ApiReply> {
    match auth_user(state, headers) {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) => Err(fail(StatusCode::UNAUTHORIZED, "Admin access required")),
        None => Err(fail(StatusCode::UNAUTHORIZED, "Authentication required")),
    }
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiReply {
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }

    let Value::Object(mut fields) = body else {
        return fail(StatusCode::BAD_REQUEST, "Invalid product body");
    };
    let now = Utc::now();
    fields.insert("_id".to_owned(), json!(format!("p-{}", state.next_id())));
    fields.insert("createdAt".to_owned(), json!(now));
    fields.insert("updatedAt".to_owned(), json!(now));

    match serde_json::from_value::<Product>(Value::Object(fields)) {
        Ok(product) => {
            lock(&state.products).push(product.clone());
            ok(&product)
        }
        Err(err) => fail(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(update): Json<Value>,
) -> ApiReply {
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }

    let product_id = ProductId::from(product_id);
    let mut products = lock(&state.products);
    let Some(product) = products.iter_mut().find(|product| product.id == product_id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };

    let mut merged = match serde_json::to_value(&*product) {
        Ok(value) => value,
        Err(err) => return fail(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };
    if let (Value::Object(target), Value::Object(fields)) = (&mut merged, update) {
        for (key, value) in fields {
            target.insert(key, value);
        }
        target.insert("updatedAt".to_owned(), json!(Utc::now()));
    }

    match serde_json::from_value::<Product>(merged) {
        Ok(updated) => {
            *product = updated.clone();
            ok(&updated)
        }
        Err(err) => fail(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn delete_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> ApiReply {
    if let Err(reply) = require_admin(&state, &headers) {
        return reply;
    }

    let product_id = ProductId::from(product_id);
    let mut products = lock(&state.products);
    let before = products.len();
    products.retain(|product| product.id != product_id);
    if products.len() == before {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    }
    ok(&true)
}

// =============================================================================
// Cart handlers
// =============================================================================

async fn get_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> ApiReply {
    if state.fail_cart_fetch.load(Ordering::SeqCst) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Cart backend unavailable");
    }

    let Some(key) = cart_key(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "No cart identity");
    };

    lock(&state.carts).get(&key).map_or_else(
        || fail(StatusCode::NOT_FOUND, "Cart not found"),
        |cart| ok(cart),
    )
}

async fn add_cart_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiReply {
    let Some(key) = cart_key(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "No cart identity");
    };

    let product_id = ProductId::from(
        body.get("productId")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    );
    let quantity = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(0);
    if quantity == 0 {
        return fail(StatusCode::BAD_REQUEST, "Quantity must be at least 1");
    }

    let Some(product) = lock(&state.products)
        .iter()
        .find(|product| product.id == product_id)
        .cloned()
    else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };

    let mut carts = lock(&state.carts);
    let cart = carts.entry(key).or_insert_with(|| {
        let now = Utc::now();
        Cart {
            id: CartId::from(format!("cart-{}", state.next_id())),
            user_id: auth_user(&state, &headers).map(|user| user.id),
            session_id: session_id(&headers),
            items: vec![],
            total_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            expires_at: now + chrono::Duration::hours(24),
        }
    });

    if let Some(item) = cart
        .items
        .iter_mut()
        .find(|item| item.product_id == product_id)
    {
        item.quantity += quantity;
    } else {
        cart.items.push(CartItem {
            product_id: product.id,
            name: product.name,
            price: product.price,
            quantity,
            image_url: product.image_url,
        });
    }
    state.recompute(cart);

    ok(&cart.clone())
}

async fn update_cart_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiReply {
    let Some(key) = cart_key(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "No cart identity");
    };
    let product_id = ProductId::from(product_id);
    let quantity = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(0);

    let mut carts = lock(&state.carts);
    let Some(cart) = carts.get_mut(&key) else {
        return fail(StatusCode::NOT_FOUND, "Cart not found");
    };
    if !cart.items.iter().any(|item| item.product_id == product_id) {
        return fail(StatusCode::NOT_FOUND, "Item not in cart");
    }

    if quantity == 0 {
        cart.items.retain(|item| item.product_id != product_id);
    } else if let Some(item) = cart
        .items
        .iter_mut()
        .find(|item| item.product_id == product_id)
    {
        item.quantity = quantity;
    }
    state.recompute(cart);

    ok(&cart.clone())
}

async fn remove_cart_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> ApiReply {
    let Some(key) = cart_key(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "No cart identity");
    };
    let product_id = ProductId::from(product_id);

    let mut carts = lock(&state.carts);
    let Some(cart) = carts.get_mut(&key) else {
        return fail(StatusCode::NOT_FOUND, "Cart not found");
    };
    let before = cart.items.len();
    cart.items.retain(|item| item.product_id != product_id);
    if cart.items.len() == before {
        return fail(StatusCode::NOT_FOUND, "Item not in cart");
    }
    state.recompute(cart);

    ok(&cart.clone())
}

async fn clear_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> ApiReply {
    let Some(key) = cart_key(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "No cart identity");
    };

    let mut carts = lock(&state.carts);
    let Some(cart) = carts.get_mut(&key) else {
        return fail(StatusCode::NOT_FOUND, "Cart not found");
    };
    cart.items.clear();
    state.recompute(cart);

    ok(&cart.clone())
}

// =============================================================================
// Order handlers
// =============================================================================

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiReply {
    let Some(user) = auth_user(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let key = format!("user:{}", user.id);
    let cart = lock(&state.carts).get(&key).cloned();
    let Some(cart) = cart.filter(|cart| !cart.items.is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "Cart is empty");
    };

    let shipping_value = body.get("shippingAddress").cloned().unwrap_or(Value::Null);
    let Ok(shipping) = serde_json::from_value::<Address>(shipping_value) else {
        return fail(StatusCode::BAD_REQUEST, "Invalid shipping address");
    };
    let billing_value = body.get("billingAddress").cloned().unwrap_or(Value::Null);
    let billing =
        serde_json::from_value::<Address>(billing_value).unwrap_or_else(|_| shipping.clone());
    let Some(payment_method) = body
        .get("paymentMethod")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<clementine_core::PaymentMethod>().ok())
    else {
        return fail(StatusCode::BAD_REQUEST, "Invalid payment method");
    };

    let now = Utc::now();
    let number = state.next_id();
    let order = Order {
        id: OrderId::from(format!("o-{number}")),
        user_id: user.id,
        order_number: format!("CLEM-{number:04}"),
        items: cart.items,
        total_amount: cart.total_amount,
        status: OrderStatus::Pending,
        shipping_address: shipping,
        billing_address: billing,
        payment_method,
        payment_status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    lock(&state.orders).push(order.clone());
    lock(&state.carts).remove(&key);

    ok(&order)
}

async fn list_orders(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    let Some(user) = auth_user(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(10);

    let mut orders: Vec<Order> = lock(&state.orders)
        .iter()
        .filter(|order| order.user_id == user.id)
        .cloned()
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let start = ((page.saturating_sub(1)) * limit) as usize;
    let page_items: Vec<Order> = orders.into_iter().skip(start).take(limit as usize).collect();

    ok(&OrderPage {
        orders: page_items,
        page,
        limit,
    })
}

async fn get_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> ApiReply {
    let Some(user) = auth_user(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let order_id = OrderId::from(order_id);
    lock(&state.orders)
        .iter()
        .find(|order| order.id == order_id && order.user_id == user.id)
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Order not found"),
            |order| ok(order),
        )
}

async fn cancel_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> ApiReply {
    let Some(user) = auth_user(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let order_id = OrderId::from(order_id);
    let mut orders = lock(&state.orders);
    let Some(order) = orders
        .iter_mut()
        .find(|order| order.id == order_id && order.user_id == user.id)
    else {
        return fail(StatusCode::NOT_FOUND, "Order not found");
    };

    if !order.status.is_cancellable() {
        return fail(StatusCode::BAD_REQUEST, "Order can no longer be cancelled");
    }
    order.status = OrderStatus::Cancelled;
    order.updated_at = Utc::now();

    ok(&order.clone())
}

// =============================================================================
// Server harness
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(get_profile).put(update_profile))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/categories", get(list_categories))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/items", post(add_cart_item))
        .route(
            "/api/cart/items/{id}",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/cancel", put(cancel_order))
        .with_state(state)
}

/// A mock storefront backend listening on an ephemeral local port.
pub struct TestBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl TestBackend {
    /// Bind and serve the mock API on 127.0.0.1.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::new());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend exited");
        });

        Self { addr, state }
    }

    /// Base URL for client configuration.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

// =============================================================================
// Client harness
// =============================================================================

/// Notifier that records everything for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.events).push(notification);
    }
}

impl RecordingNotifier {
    /// All notification texts in delivery order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        lock(&self.events).iter().map(|n| n.text.clone()).collect()
    }

    /// Error notification texts only.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter(|n| n.kind == NotificationKind::Error)
            .map(|n| n.text.clone())
            .collect()
    }

    /// Success notification texts only.
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter(|n| n.kind == NotificationKind::Success)
            .map(|n| n.text.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

/// A client app wired to a [`TestBackend`] with its own temporary
/// data directory and a recording notifier.
pub struct TestApp {
    pub app: App,
    pub notifier: Arc<RecordingNotifier>,
    dir: tempfile::TempDir,
}

impl TestApp {
    /// Build a fresh client (new device, new session) against the
    /// backend.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory or client cannot be created.
    #[must_use]
    pub fn connect(backend: &TestBackend) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        Self::build(backend, dir)
    }

    /// Tear the app down and bring it back up on the same data
    /// directory, as a process restart would.
    #[must_use]
    pub fn restart(self, backend: &TestBackend) -> Self {
        let Self { dir, .. } = self;
        Self::build(backend, dir)
    }

    fn build(backend: &TestBackend, dir: tempfile::TempDir) -> Self {
        let config =
            ClientConfig::new(&backend.url(), dir.path()).expect("invalid test config");
        let notifier = Arc::new(RecordingNotifier::default());
        let sink: Arc<dyn Notifier> = notifier.clone();
        let app = App::with_notifier(config, sink).expect("failed to build client app");
        Self { app, notifier, dir }
    }

    /// Path of the persistent data directory.
    #[must_use]
    pub fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

/// Register a fresh customer and leave the app signed in.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register_customer(app: &TestApp, email: &str) -> UserId {
    let user = app
        .app
        .auth()
        .register(email, "orange-grove-8", "Test", "Shopper", None)
        .await
        .expect("registration failed");
    user.id
}

/// Register a fresh admin and leave the app signed in.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register_admin(app: &TestApp, email: &str) -> UserId {
    let user = app
        .app
        .auth()
        .register(email, "orange-grove-8", "Test", "Admin", Some(UserRole::Admin))
        .await
        .expect("registration failed");
    user.id
}
