//! Navigation between related rows: `/{table}/{id}/{route}` and `/links`

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::seeded_server;
use serde_json::Value;

async fn related(server: &TestServer, path: &str) -> Value {
    let response = server.get(path).await;
    response.assert_status_ok();
    response.json()
}

fn names<'a>(body: &'a Value, field: &str) -> Vec<&'a str> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|row| row["record"][field].as_str().expect("string field"))
        .collect()
}

// =============================================================================
// Link-table relations
// =============================================================================

#[tokio::test]
async fn test_forward_through_link_table() {
    let server = seeded_server().await;
    let body = related(&server, "/menus/1/dishes").await;

    assert_eq!(body["table"], "menus");
    assert_eq!(body["id"], 1);
    assert_eq!(body["route"], "dishes");
    assert_eq!(body["relation"], "menu_dishes");
    assert_eq!(body["direction"], "forward");
    assert_eq!(body["related_table"], "dishes");
    assert_eq!(body["count"], 4);
    assert_eq!(
        names(&body, "name"),
        vec!["Borscht", "Varenyky with potato", "Chicken Kyiv", "Syrnyky"]
    );

    let first = &body["data"][0];
    assert_eq!(first["link"]["menu_id"], 1);
    assert_eq!(first["link"]["dish_id"], first["record"]["id"]);
}

#[tokio::test]
async fn test_reverse_through_link_table() {
    let server = seeded_server().await;
    let body = related(&server, "/dishes/2/menus").await;
    assert_eq!(body["direction"], "reverse");
    assert_eq!(names(&body, "name"), vec!["All-day", "Lenten"]);
}

#[tokio::test]
async fn test_link_row_carries_its_columns() {
    let server = seeded_server().await;
    let body = related(&server, "/locations/1/stock").await;
    assert_eq!(names(&body, "name"), vec!["Beetroot", "Sour cream"]);
    assert_eq!(body["data"][0]["link"]["quantity"], 25.5);
    assert_eq!(body["data"][0]["link"]["restocked_on"], "2024-09-02");

    let body = related(&server, "/supply_categories/4/stocked-at").await;
    assert_eq!(names(&body, "name"), vec!["Arcadia"]);

    let body = related(&server, "/suppliers/2/categories").await;
    assert_eq!(names(&body, "name"), vec!["Sour cream", "Eggs"]);
    assert_eq!(body["data"][1]["link"]["unit_price"], 0.12);
}

#[tokio::test]
async fn test_no_related_rows() {
    let server = seeded_server().await;
    let body = related(&server, "/dishes/4/ingredients").await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], Value::Array(vec![]));
}

// =============================================================================
// Foreign-key relations
// =============================================================================

#[tokio::test]
async fn test_forward_foreign_key_lists_children() {
    let server = seeded_server().await;
    let body = related(&server, "/locations/1/employees").await;
    assert_eq!(names(&body, "first_name"), vec!["Olena", "Taras"]);
    assert!(body["data"][0].get("link").is_none());

    let body = related(&server, "/positions/1/employees").await;
    assert_eq!(names(&body, "first_name"), vec!["Olena", "Sofiia"]);
}

#[tokio::test]
async fn test_reverse_foreign_key_returns_parent() {
    let server = seeded_server().await;
    let body = related(&server, "/employees/4/location").await;
    assert_eq!(body["count"], 1);
    assert_eq!(names(&body, "name"), vec!["Arcadia"]);

    let body = related(&server, "/employees/3/position").await;
    assert_eq!(names(&body, "title"), vec!["Waiter"]);
}

#[tokio::test]
async fn test_navigation_follows_updates() {
    let server = seeded_server().await;
    server
        .put("/employees/2")
        .json(&serde_json::json!({
            "first_name": "Taras",
            "last_name": "Melnyk",
            "email": "taras.melnyk@example.com",
            "position_id": 2,
            "location_id": 3,
            "hired_on": "2021-02-15",
            "salary": 1500
        }))
        .await
        .assert_status_ok();

    let body = related(&server, "/locations/3/employees").await;
    assert_eq!(names(&body, "first_name"), vec!["Taras", "Andrii"]);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_route() {
    let server = seeded_server().await;
    let response = server.get("/menus/1/waiters").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_anchor_row() {
    let server = seeded_server().await;
    let response = server.get("/menus/9/dishes").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "RECORD_NOT_FOUND");
}

#[tokio::test]
async fn test_bad_anchor_id() {
    let server = seeded_server().await;
    let response = server.get("/menus/first/dishes").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_ID");
}

#[tokio::test]
async fn test_unknown_table() {
    let server = seeded_server().await;
    let response = server.get("/kitchens/1/links").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNKNOWN_TABLE");
}

// =============================================================================
// Introspection
// =============================================================================

#[tokio::test]
async fn test_links_lists_routes_by_name() {
    let server = seeded_server().await;
    let body = related(&server, "/locations/2/links").await;
    assert_eq!(body["table"], "locations");
    assert_eq!(body["id"], 2);

    let routes = body["available_routes"].as_array().unwrap();
    let route_names: Vec<&str> = routes
        .iter()
        .map(|r| r["route_name"].as_str().unwrap())
        .collect();
    assert_eq!(route_names, vec!["employees", "menus", "stock"]);

    assert_eq!(routes[0]["path"], "/locations/2/employees");
    assert_eq!(routes[0]["method"], "GET");
    assert_eq!(routes[0]["connected_to"], "employees");
    assert_eq!(routes[0]["direction"], "forward");
}

#[tokio::test]
async fn test_links_includes_reverse_routes() {
    let server = seeded_server().await;
    let body = related(&server, "/supply_categories/1/links").await;
    let routes: Vec<(&str, &str)> = body["available_routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["route_name"].as_str().unwrap(),
                r["direction"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        routes,
        vec![
            ("dishes", "reverse"),
            ("stocked-at", "reverse"),
            ("suppliers", "reverse"),
        ]
    );
}
