//! Demo server routes.

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::MenuError;
use crate::menu::{MenuOutput, activate_current_route};
use crate::server::error::{AppError, AppResult};
use crate::server::state::AppState;

/// Route name matched for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRoute(pub String);

/// Build the demo router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/menus/{name}", get(menu_json))
        .fallback(page)
        // Activation runs before every handler, including the fallback
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            activate_for_path,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Middleware activating menu items that link to the matched route.
pub async fn activate_for_path(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let route = activate_current_route(&mut request, &state.roots(), state.routes());
    if let Some(route) = route {
        request.extensions_mut().insert(CurrentRoute(route));
    }
    next.run(request).await
}

/// Render a page for any path matching a declared route.
async fn page(State(state): State<AppState>, request: Request) -> AppResult<Html<String>> {
    let route = request
        .extensions()
        .get::<CurrentRoute>()
        .cloned()
        .ok_or(AppError::NotFound)?;

    let menu = match state.main_menu() {
        Some(menu) => match menu.build(&request, state.routes()) {
            Ok(output) => output,
            Err(MenuError::Route(e)) => {
                warn!(route = %route.0, error = %e, "menu links to an unknown route; rendering without menu");
                None
            }
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let title = menu
        .as_ref()
        .and_then(|menu| menu.active_trail().last().and_then(|node| node.title.clone()))
        .unwrap_or(route.0);

    let html = state.renderer().render_page(&title, menu.as_ref())?;
    Ok(Html(html))
}

/// Built menu as JSON, `null` when the menu is hidden for this request.
async fn menu_json(
    State(state): State<AppState>,
    Path(name): Path<String>,
    request: Request,
) -> AppResult<Json<Option<MenuOutput>>> {
    let menu = state.menus().get(&name).ok_or(AppError::NotFound)?;
    let output = menu.build(&request, state.routes())?;
    Ok(Json(output))
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    menus: usize,
    routes: usize,
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            menus: state.menus().len(),
            routes: state.routes().len(),
        }),
    )
}
