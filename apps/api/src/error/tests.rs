use axum::http::StatusCode;
use axum::response::IntoResponse;
use regiongate_core::AppError;

use super::ApiError;

#[test]
fn every_error_category_maps_to_its_status() {
    let cases = [
        (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
        (AppError::NotFound("missing".to_owned()), StatusCode::NOT_FOUND),
        (AppError::Conflict("exists".to_owned()), StatusCode::CONFLICT),
        (AppError::Unauthorized("token".to_owned()), StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("role".to_owned()), StatusCode::FORBIDDEN),
        (AppError::Internal("db".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        assert_eq!(ApiError::from(error).into_response().status(), expected);
    }
}

#[tokio::test]
async fn internal_error_body_hides_adapter_detail() {
    let response = ApiError::from(AppError::Internal(
        "failed to list permanent region grants: connection refused (host db.internal:5432)"
            .to_owned(),
    ))
    .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let Ok(body) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("error body should be readable");
    };
    let body = String::from_utf8_lossy(&body);

    assert!(body.contains("please try again later"));
    assert!(!body.contains("db.internal"));
    assert!(!body.contains("permanent region grants"));
}

#[tokio::test]
async fn validation_error_body_keeps_detail() {
    let response =
        ApiError::from(AppError::Validation("reason is too short".to_owned())).into_response();

    let Ok(body) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("error body should be readable");
    };

    assert!(String::from_utf8_lossy(&body).contains("reason is too short"));
}
