use regiongate_core::{AppError, UserId};

use super::{EffectiveRegionsResponse, HttpEffectiveRegionsClient};

fn parse(body: &str) -> EffectiveRegionsResponse {
    match serde_json::from_str(body) {
        Ok(response) => response,
        Err(error) => panic!("fixture body should parse: {error}"),
    }
}

#[test]
fn successful_response_yields_region_set() {
    let response = parse(
        r#"{"success":true,"regions":[{"name":"Delhi"},{"name":"Maharashtra"},{"name":"Delhi"}]}"#,
    );

    let Ok(regions) = response.into_regions() else {
        panic!("successful response should convert");
    };
    assert_eq!(
        regions.iter().map(|region| region.as_str()).collect::<Vec<_>>(),
        vec!["Delhi", "Maharashtra"]
    );
}

#[test]
fn unsuccessful_response_is_an_error() {
    let response = parse(r#"{"success":false,"message":"user not found"}"#);

    assert!(matches!(
        response.into_regions(),
        Err(AppError::Internal(message)) if message.contains("user not found")
    ));
}

#[test]
fn blank_region_name_is_rejected() {
    let response = parse(r#"{"success":true,"regions":[{"name":"  "}]}"#);

    assert!(matches!(response.into_regions(), Err(AppError::Internal(_))));
}

#[test]
fn endpoint_strips_trailing_slash_from_base_url() {
    let client = HttpEffectiveRegionsClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:3001/",
        "token",
    );
    let user_id = UserId::new();

    assert_eq!(
        client.endpoint(user_id),
        format!("http://127.0.0.1:3001/region-access/effective-regions?userId={user_id}")
    );
}
