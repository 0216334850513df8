//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{ErrorResponse, HealthResponse, SignResponse, VerifyRequest, VerifyResponse},
    ServiceError,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::state::AppState;
use crate::crypto::{
    cipher::{sign_value, verify_value},
    tree::{decrypt_tree, encrypt_fields},
    CipherError,
};

/// `POST /encrypt` — replace every top-level field of the body with its ciphertext.
///
/// Nested values are sealed whole, so a field's serialised JSON (plus the
/// marker) must fit in one RSA block. One oversized field fails the request.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let fields = match json_body(body).and_then(into_object) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };

    match encrypt_fields(&fields, state.keys.public()) {
        Ok(sealed) => {
            info!(fields = sealed.len(), "fields encrypted");
            (StatusCode::OK, Json(Value::Object(sealed))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "encryption failed");
            error_response(&ServiceError::from(e))
        }
    }
}

/// `POST /decrypt` — recursively decrypt every ciphertext string in the body.
///
/// Never fails on bad ciphertext: strings that do not decrypt under the held
/// key are returned untouched.
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let fields = match json_body(body).and_then(into_object) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };

    let count = fields.len();
    let plain = decrypt_tree(Value::Object(fields), state.keys.private());
    info!(fields = count, "payload decrypted");
    (StatusCode::OK, Json(plain)).into_response()
}

/// `POST /sign` — sign the serialised body with RSA-PSS/SHA-256.
pub async fn sign(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let fields = match json_body(body).and_then(into_object) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };

    match sign_value(&Value::Object(fields), state.keys.private()) {
        Ok(signature) => (StatusCode::OK, Json(SignResponse { signature })).into_response(),
        Err(e) => {
            warn!(error = %e, "signing failed");
            error_response(&ServiceError::from(e))
        }
    }
}

/// `POST /verify` — decrypt `data`, then check `signature` against its
/// serialised form.
///
/// Returns `202 Accepted` when the signature matches and `400 Bad Request`
/// with `isVerified: false` when it does not.
pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let req: VerifyRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(_) => {
            warn!("verify request failed envelope validation");
            let err = ServiceError::BadRequest(
                r#"expected {"signature": string, "data": object}"#.into(),
            );
            return error_response(&err);
        }
    };

    let data = decrypt_tree(Value::Object(req.data), state.keys.private());
    match verify_value(&data, &req.signature, state.keys.public()) {
        Ok(is_verified) => {
            info!(is_verified, "signature checked");
            let status = if is_verified {
                StatusCode::ACCEPTED
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(VerifyResponse { is_verified })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "verification failed");
            error_response(&ServiceError::from(e))
        }
    }
}

/// `GET /health` — liveness check.
///
/// The server only starts listening once the key pair is loaded, so this
/// always reports `ok`.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        key_bits: state.keys.bits(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl From<CipherError> for ServiceError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::PayloadTooLarge { len, max } => ServiceError::PayloadTooLarge(format!(
                "serialised field is {len} bytes with marker; the limit is {max}"
            )),
            CipherError::Encryption | CipherError::Signing => {
                ServiceError::EncryptionFailure(err.to_string())
            }
            CipherError::InvalidKey(_)
            | CipherError::KeyGeneration
            | CipherError::Serialization(_)
            | CipherError::Decryption => ServiceError::Internal(err.to_string()),
        }
    }
}

/// Turn Axum's own body rejections (bad syntax, missing content type) into
/// the standard error body.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ServiceError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!(status = %rejection.status(), "request body rejected");
            Err(ServiceError::BadRequest(rejection.body_text()))
        }
    }
}

/// Accept only JSON objects as request bodies.
fn into_object(body: Value) -> Result<Map<String, Value>, ServiceError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => {
            warn!("request body is not a JSON object");
            Err(ServiceError::BadRequest(
                "request body must be a JSON object".into(),
            ))
        }
    }
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
