use std::sync::Arc;

use reqwest::Client;
use restconf_browser::{parse_path, Browser, Meta};
use restconf_client::ClientNode;
use restconf_core::compliance::ComplianceOptions;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn car_meta() -> Arc<Meta> {
    Arc::new(
        Meta::container("car", "car", "urn:example:car").with_children(vec![
            Meta::leaf("speed", "car", "urn:example:car"),
            Meta::container("trim", "car", "urn:example:car").with_children(vec![Meta::leaf("level", "car", "urn:example:car")]),
        ]),
    )
}

#[tokio::test]
async fn upsert_against_existing_container_issues_one_get_then_one_patch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restconf/data/car:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"speed": 10, "trim": {"level": 1}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/restconf/data/car:"))
        .and(body_json(serde_json::json!({"speed": 20})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/restconf/data/car:", server.uri());
    let node = Arc::new(ClientNode::new(Client::new(), url, ComplianceOptions::strict()));
    let browser = Browser::new(car_meta(), node);

    browser.root().upsert_from(serde_json::json!({"speed": 20})).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn find_then_read_nested_container_leaf_lazily_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restconf/data/car:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"trim": {"level": 3}})))
        .mount(&server)
        .await;
    Mock::given(method("OPTIONS"))
        .and(path("/restconf/data/car:trim"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/restconf/data/car:trim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"level": 3})))
        .mount(&server)
        .await;

    let url = format!("{}/restconf/data/car:", server.uri());
    let node = Arc::new(ClientNode::new(Client::new(), url, ComplianceOptions::strict()));
    let browser = Browser::new(car_meta(), node);

    let sel = browser.root().find(&parse_path("trim/level")).await.unwrap().unwrap();
    let value = sel.read().await.unwrap();
    assert_eq!(value, 3);
}
