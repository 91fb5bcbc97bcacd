use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::server::AppState;

/// Middleware guarding the log routes: checks HTTP Basic credentials
/// against the configured pair and short-circuits with a 401 challenge
/// before the wrapped handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic)
        .is_some_and(|(user, pass)| {
            user == state.config.username && pass == state.config.password
        });

    if authorized {
        next.run(request).await
    } else {
        challenge()
    }
}

/// Decode a "Basic base64(user:pass)" header value. Any malformed header
/// decodes to None and gets the same 401 as missing credentials.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, r#"Basic realm="Login Required""#)],
        "Authentication required.\nPlease provide valid credentials.",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(user_pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(user_pass))
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(
            decode_basic(&encode("admin:admin123")),
            Some(("admin".to_string(), "admin123".to_string()))
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let value = format!("basic {}", STANDARD.encode("a:b"));
        assert_eq!(decode_basic(&value), Some(("a".to_string(), "b".to_string())));
    }

    #[test]
    fn test_password_may_contain_colons() {
        assert_eq!(
            decode_basic(&encode("user:pa:ss")),
            Some(("user".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn test_malformed_headers_decode_to_none() {
        assert_eq!(decode_basic("Bearer abc123"), None);
        assert_eq!(decode_basic("Basic not!base64"), None);
        assert_eq!(decode_basic("Basic"), None);
        assert_eq!(
            decode_basic(&format!("Basic {}", STANDARD.encode("no-colon"))),
            None
        );
    }
}
