use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
    assert_eq!(AppError::not_found("not_found", "missing").http_status(), 404);
    assert_eq!(AppError::auth("auth", "no").http_status(), 401);
    assert_eq!(AppError::transport("transport_error", "down").http_status(), 503);
    assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
}

#[test]
fn api_errors_fold_into_app_errors() {
    let e: AppError = ApiError::Unauthorized.into();
    assert!(e.is_unauthorized());
    assert_eq!(e.http_status(), 401);

    let e: AppError = ApiError::Status { status: 404, message: "no such path".into() }.into();
    assert_eq!(e.code_str(), "not_found");
    assert_eq!(e.message(), "no such path");

    let e: AppError = ApiError::Status { status: 422, message: "score out of range".into() }.into();
    assert_eq!(e.code_str(), "http_422");
    assert_eq!(e.http_status(), 400);
    assert!(!e.is_unauthorized());

    let e: AppError = ApiError::Status { status: 502, message: "bad gateway".into() }.into();
    assert_eq!(e.http_status(), 503);
}

#[test]
fn display_and_serde_shape() {
    let e = AppError::auth("token_missing", "no token in login response");
    assert_eq!(e.to_string(), "token_missing: no token in login response");
    let v = serde_json::to_value(&e).unwrap();
    assert_eq!(v["type"], "auth");
    assert_eq!(v["code"], "token_missing");
}
