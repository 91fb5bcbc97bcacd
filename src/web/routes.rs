use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::pages;
use super::server::AppState;
use crate::tail::{self, TailError};

#[derive(Debug, Deserialize)]
pub struct TailQuery {
    lines: Option<String>,
    download: Option<String>,
}

impl TailQuery {
    /// Lenient parse: absent or non-numeric falls back to the default,
    /// negative values clamp to zero lines.
    fn line_count(&self, default: usize) -> usize {
        self.lines
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|n| n.max(0) as usize)
            .unwrap_or(default)
    }

    fn wants_download(&self) -> bool {
        self.download
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Index: links to every configured source
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::index_page(&state.config.sources))
}

/// Tail view for one configured source. Registered once per source at
/// router build time; `source` is always a configured name here.
pub async fn view_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TailQuery>,
    source: String,
) -> Response {
    let Some(path) = state.config.resolve_source(&source) else {
        return unknown_source(&source);
    };

    // Re-checked on every request; the file may appear or vanish while
    // the server runs.
    if !path.exists() {
        return (StatusCode::NOT_FOUND, Html(pages::missing_page(&path))).into_response();
    }

    if query.wants_download() {
        return download(&source, &path).await;
    }

    let n = query.line_count(state.config.default_lines);
    let scan_path = path.clone();
    let content = match tokio::task::spawn_blocking(move || tail::tail(&scan_path, n)).await {
        Ok(Ok(lines)) => pages::escape_html(&lines.join("\n")),
        Ok(Err(TailError::NotFound(p))) => {
            format!("Error: Log file not found at {}", p.display())
        }
        Ok(Err(TailError::Read(e))) => {
            tracing::warn!(error = %e, path = %path.display(), "Tail scan failed");
            format!("Error reading log file: {e}")
        }
        Err(e) => {
            tracing::error!(error = %e, "Tail task failed");
            format!("Error reading log file: {e}")
        }
    };

    Html(pages::log_page(
        &source,
        &content,
        n,
        state.config.refresh_interval,
    ))
    .into_response()
}

/// Stream the whole file as an attachment, chunked so files larger than
/// memory transfer fine.
async fn download(source: &str, path: &Path) -> Response {
    match tokio::fs::File::open(path).await {
        Ok(file) => {
            let body = Body::from_stream(ReaderStream::new(file));
            let headers = [
                (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{source}-app.log\""),
                ),
            ];
            (headers, body).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to open log for download");
            (StatusCode::NOT_FOUND, Html(pages::missing_page(path))).into_response()
        }
    }
}

/// Fallback for paths outside the registered routes. Sits outside the
/// auth layer, so unknown sources 404 whatever the credentials say.
pub async fn not_found(uri: Uri) -> Response {
    let body = match uri.path().strip_prefix("/logs-") {
        Some(name) => format!("Error: Unknown log type '{name}'"),
        None => "Not found".to_string(),
    };
    (StatusCode::NOT_FOUND, body).into_response()
}

fn unknown_source(source: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("Error: Unknown log type '{source}'"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, WWW_AUTHENTICATE};
    use axum::http::{Request, StatusCode};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::web::server::create_router;

    struct Fixture {
        router: axum::Router,
        // Keeps the log files alive for the duration of the test
        _dir: TempDir,
    }

    fn fixture(log_bytes: &[u8]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("app.log");
        let mut f = std::fs::File::create(&log_path).unwrap();
        f.write_all(log_bytes).unwrap();

        let config = Config {
            username: "admin".to_string(),
            password: "secret".to_string(),
            port: 0,
            default_lines: 500,
            refresh_interval: 10,
            sources: BTreeMap::from([
                ("dev".to_string(), log_path.to_str().unwrap().to_string()),
                (
                    "ghost".to_string(),
                    dir.path().join("missing.log").to_str().unwrap().to_string(),
                ),
            ]),
        };
        Fixture {
            router: create_router(config),
            _dir: dir,
        }
    }

    fn authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(
                AUTHORIZATION,
                format!("Basic {}", STANDARD.encode("admin:secret")),
            )
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials_get_challenged() {
        let fx = fixture(b"a\n");
        let request = Request::builder()
            .uri("/logs-dev")
            .body(Body::empty())
            .unwrap();
        let response = fx.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            r#"Basic realm="Login Required""#
        );
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let fx = fixture(b"a\n");
        let request = Request::builder()
            .uri("/logs-dev")
            .header(
                AUTHORIZATION,
                format!("Basic {}", STANDARD.encode("admin:wrong")),
            )
            .body(Body::empty())
            .unwrap();
        let response = fx.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_index_requires_auth_and_lists_sources() {
        let fx = fixture(b"a\n");

        let anon = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = fx.router.clone().oneshot(anon).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = fx.router.oneshot(authed("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("/logs-dev"));
        assert!(body.contains("/logs-ghost"));
    }

    #[tokio::test]
    async fn test_tail_view_shows_requested_lines() {
        let fx = fixture(b"one\ntwo\nthree\n");
        let response = fx.router.oneshot(authed("/logs-dev?lines=2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_string(response).await;
        assert!(body.contains("two\nthree"));
        assert!(!body.contains("one\ntwo"));
        assert!(body.contains("Showing last 2 lines"));
    }

    #[tokio::test]
    async fn test_log_content_is_escaped() {
        let fx = fixture(b"<script>alert(1)</script>\n");
        let response = fx.router.oneshot(authed("/logs-dev")).await.unwrap();
        let body = body_string(response).await;
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>alert"));
    }

    #[tokio::test]
    async fn test_invalid_lines_param_falls_back_to_default() {
        let fx = fixture(b"one\ntwo\n");
        let response = fx
            .router
            .oneshot(authed("/logs-dev?lines=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Showing last 500 lines"));
        assert!(body.contains("one\ntwo"));
    }

    #[tokio::test]
    async fn test_negative_lines_param_shows_nothing() {
        let fx = fixture(b"one\ntwo\n");
        let response = fx
            .router
            .oneshot(authed("/logs-dev?lines=-5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<pre></pre>"));
    }

    #[tokio::test]
    async fn test_unknown_source_is_404_without_credentials() {
        let fx = fixture(b"a\n");
        let request = Request::builder()
            .uri("/logs-nope")
            .body(Body::empty())
            .unwrap();
        let response = fx.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert_eq!(body, "Error: Unknown log type 'nope'");
    }

    #[tokio::test]
    async fn test_missing_file_renders_explanation_page() {
        let fx = fixture(b"a\n");
        let response = fx.router.oneshot(authed("/logs-ghost")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("Log File Not Found"));
        assert!(body.contains("missing.log"));
    }

    #[tokio::test]
    async fn test_download_streams_exact_bytes() {
        let content = b"one\ntwo\nthree, with bytes \xff\xfe\nfour";
        let fx = fixture(content);
        let response = fx
            .router
            .oneshot(authed("/logs-dev?download=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            r#"attachment; filename="dev-app.log""#
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], &content[..]);
    }

    #[tokio::test]
    async fn test_download_flag_must_be_true() {
        let fx = fixture(b"one\n");
        let response = fx
            .router
            .oneshot(authed("/logs-dev?download=nah"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_empty_log_renders_empty_page() {
        let fx = fixture(b"");
        let response = fx.router.oneshot(authed("/logs-dev")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<pre></pre>"));
    }
}
