//! Route definitions for the Survey Equipment Ledger

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Login and token refresh (public)
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        // Everything else requires a bearer token
        .merge(protected_routes(state))
}

/// Authenticated routes
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/auth/staff",
            get(handlers::list_staff).post(handlers::provision_staff),
        )
        .nest("/customers", customer_routes())
        .nest("/tools", tool_routes())
        .nest("/equipment-types", equipment_type_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/sales", sale_routes())
        .nest("/payments", payment_routes())
        .route("/dashboard/summary", get(handlers::dashboard_summary))
        .route("/notifications/sale-email", post(handlers::send_sale_email))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Customer and receivables routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/provision", post(handlers::provision_customer))
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/:customer_id/account",
            post(handlers::provision_customer_account),
        )
}

/// Tool catalog and serial pool routes
fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tools).post(handlers::create_tool))
        .route(
            "/:tool_id",
            get(handlers::get_tool)
                .put(handlers::update_tool)
                .delete(handlers::delete_tool),
        )
        .route("/:tool_id/serials", post(handlers::add_tool_serials))
        .route(
            "/:tool_id/serials/random",
            post(handlers::allocate_random_serial),
        )
        .route("/:tool_id/serials/set", post(handlers::allocate_serial_set))
}

/// Equipment type routes
fn equipment_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_equipment_types).post(handlers::create_equipment_type),
        )
        .route(
            "/:id",
            get(handlers::get_equipment_type)
                .put(handlers::update_equipment_type)
                .delete(handlers::delete_equipment_type),
        )
}

/// Supplier routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Sales routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
}

/// Payment routes
fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_payments).post(handlers::create_payment),
        )
        .route(
            "/:payment_id",
            get(handlers::get_payment)
                .put(handlers::update_payment)
                .delete(handlers::delete_payment),
        )
}
