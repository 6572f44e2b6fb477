#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Demo server and activation middleware tests.

use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use http_body_util::BodyExt;
use navmenu::server::{AppState, USER_HEADER, load_menus, router};
use navmenu::{Active, MenuItemId, MenuRenderer, MenuRequest, activate_menu, activate_menus};
use navmenu_test_utils::assert;
use serde_json::Value;
use tower::ServiceExt;

const DEMO_MENUS: &str = include_str!("../menus/main.toml");

fn app() -> Router {
    let menus = load_menus(Path::new("main.toml"), DEMO_MENUS).unwrap();
    let state = AppState::from_parts(menus, "main", MenuRenderer::new().unwrap()).unwrap();
    router(state)
}

async fn get_path(app: Router, path: &str, user: Option<&str>) -> Response {
    let mut request = Request::builder().uri(path);
    if let Some(user) = user {
        request = request.header(USER_HEADER, user);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = get_path(app(), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["menus"], 2);
}

#[tokio::test]
async fn test_page_activates_current_route() {
    let response = get_path(app(), "/blog", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, "<title>Blog</title>");
    assert::contains(&html, r#"<li class="menu-item active"><a href="/blog">Blog</a>"#);
    assert::contains(&html, "Sign in");
    assert::not_contains(&html, "Profile");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = get_path(app(), "/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_menu_json_reflects_activation_and_visibility() {
    let response = get_path(app(), "/api/menus/main", Some("7")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["title"], "Main");
    assert_eq!(json["class"], "navbar");
    assert_eq!(json["active"], false);
    let titles: Vec<_> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Home", "Blog", "About", "Account"]);
    assert_eq!(json["items"][2]["icon"], "info");
}

#[tokio::test]
async fn test_nested_page_marks_section_subitem() {
    let response = get_path(app(), "/account/profile", Some("7")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, "<title>Profile</title>");
    assert::contains(&html, r#"<li class="menu-item subitem"><span>Account</span>"#);
    assert::contains(&html, r#"class="breadcrumb""#);
}

#[tokio::test]
async fn test_unknown_menu_json_is_not_found() {
    let response = get_path(app(), "/api/menus/sidebar", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_link_fn_uses_request_path() {
    let response = get_path(app(), "/api/menus/footer", None).await;
    let json = body_json(response).await;
    assert_eq!(json["items"][0]["url"], "https://example.com/navmenu");
    assert_eq!(json["items"][1]["url"], "/api/menus/footer");
}

async fn active_ids(request: Request) -> String {
    let mut ids: Vec<String> = request
        .active_menus()
        .map(|active| active.iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    ids.sort();
    ids.join(",")
}

#[tokio::test]
async fn test_activate_menu_layers_accumulate() {
    let section = MenuItemId::new();
    let page = MenuItemId::new();
    let extra = MenuItemId::new();

    let app = Router::new()
        .route(
            "/section/page",
            get(active_ids).layer(axum::middleware::from_fn_with_state(page, activate_menu)),
        )
        .layer(axum::middleware::from_fn_with_state(
            vec![section, extra],
            activate_menus,
        ));

    let response = get_path(app, "/section/page", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut expected = vec![section.to_string(), page.to_string(), extra.to_string()];
    expected.sort();
    assert_eq!(body_string(response).await, expected.join(","));
}

#[tokio::test]
async fn test_activation_feeds_build() {
    let (menu, items) = navmenu_test_utils::fixture_menu();
    menu.prepare().unwrap();
    let c = items.c.id();

    let handler_menu = menu.clone();
    let app = Router::new().route(
        "/c",
        get(move |request: Request| async move {
            let output = handler_menu
                .build(&request, &navmenu_test_utils::fixture_routes())
                .unwrap()
                .unwrap();
            axum::Json(output)
        })
        .layer(axum::middleware::from_fn_with_state(c, activate_menu)),
    );

    let json = body_json(get_path(app, "/c", None).await).await;
    assert_eq!(json["active"], "subitem");
    assert_eq!(json["items"][1]["items"][0]["active"], true);
    let output: navmenu::MenuOutput = serde_json::from_value(json).unwrap();
    assert_eq!(output.find("C").unwrap().active, Active::Active);
}
