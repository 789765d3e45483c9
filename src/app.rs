use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/items", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/api/items/:id",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/api/items/:id/adjust", post(handlers::adjust_item))
        .route("/api/items/:id/archive", post(handlers::archive_item))
        .route("/api/items/:id/restore", post(handlers::restore_item))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/export", get(handlers::export_items))
        .route("/api/import", post(handlers::import_items))
        .route("/api/theme", get(handlers::get_theme).put(handlers::put_theme))
        .route("/api/theme/toggle", post(handlers::toggle_theme))
        .with_state(state)
}
