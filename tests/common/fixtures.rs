//! Record and page fixtures served by the mock remote

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base id used by every mock server
pub const BASE_ID: &str = "appCloset";
/// Table used by every mock server
pub const TABLE: &str = "Items";
/// View used by every mock server
pub const VIEW: &str = "Catalog";
/// Bearer credential expected by every mock server
pub const API_KEY: &str = "patTestKey";

/// One raw record in the remote's JSON shape
pub fn record(id: &str, uid: i64, name: &str, section: &str, collections: &[&str]) -> Value {
    json!({
        "id": id,
        "createdTime": "2024-05-01T12:00:00.000Z",
        "fields": {
            "Name": name,
            "ID": uid,
            "Section": section,
            "Collections": collections,
            "Images": [{"url": format!("https://img.example.com/{}.jpg", id)}],
        }
    })
}

/// Record with the given fields verbatim
pub fn raw_record(id: &str, fields: Value) -> Value {
    json!({ "id": id, "fields": fields })
}

/// Page body with an optional continuation cursor
pub fn page_body(records: Vec<Value>, offset: Option<&str>) -> Value {
    match offset {
        Some(offset) => json!({ "records": records, "offset": offset }),
        None => json!({ "records": records }),
    }
}

/// Path of the mocked table endpoint
pub fn table_path() -> String {
    format!("/v0/{}/{}", BASE_ID, TABLE)
}

/// Mount the page served for `cursor` (None for the first page)
pub async fn mount_page(server: &MockServer, cursor: Option<&str>, response: ResponseTemplate) {
    let mock = Mock::given(method("GET"))
        .and(path(table_path()))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .and(query_param("view", VIEW))
        .and(query_param("filterByFormula", "NOT(Hidden)"));

    let mock = match cursor {
        Some(cursor) => mock.and(query_param("offset", cursor)),
        None => mock.and(query_param_is_missing("offset")),
    };

    mock.respond_with(response).mount(server).await;
}

/// Three pages of closet items: 2 + 2 + 2 records, one of them unnamed
pub async fn mount_three_page_catalog(server: &MockServer) {
    mount_page(
        server,
        None,
        ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                record("rec01", 1, "Silk Top Hat", "Hats", &["Victorian"]),
                record("rec02", 2, "Riding Boots", "Shoes", &["Victorian", "Country"]),
            ],
            Some("itr1/rec02"),
        )),
    )
    .await;

    mount_page(
        server,
        Some("itr1/rec02"),
        ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                record("rec03", 3, "Straw Bonnet", "Hats", &["Country"]),
                raw_record("rec04", json!({ "Section": "Hats" })),
            ],
            Some("itr2/rec04"),
        )),
    )
    .await;

    mount_page(
        server,
        Some("itr2/rec04"),
        ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                record("rec05", 5, "Wool Greatcoat", "Outerwear", &["Victorian"]),
                raw_record(
                    "rec06",
                    json!({ "Name": "Velvet Slippers", "ID": 6, "Featured": true }),
                ),
            ],
            None,
        )),
    )
    .await;
}
