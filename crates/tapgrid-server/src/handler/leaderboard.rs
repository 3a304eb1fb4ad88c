use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tapgrid_core::{LeaderboardEntry, ScoreSubmission};

use super::ApiError;
use crate::service::leaderboard::LeaderboardStore;

// Store calls block on file I/O and the submission lock; keep them on the
// blocking pool.

pub async fn get_top(
    State(store): State<LeaderboardStore>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let entries = tokio::task::spawn_blocking(move || store.get_top()).await?;
    Ok(Json(entries))
}

pub async fn submit(
    State(store): State<LeaderboardStore>,
    payload: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let Json(submission) = payload?;
    let entries = tokio::task::spawn_blocking(move || store.submit(submission)).await??;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::mpsc,
        time::{Duration, Instant},
    };

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;
    use tower_http::cors::CorsLayer;

    use super::*;
    use crate::handler::{ErrorBody, router};

    struct TestApp {
        dir: PathBuf,
        store: LeaderboardStore,
        router: Router,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("tapgrid-http-{}", uuid::Uuid::new_v4()));
            let store = LeaderboardStore::new(dir.join("leaderboard.json"));
            Self {
                dir,
                router: router(store.clone(), CorsLayer::permissive()),
                store,
            }
        }

        async fn get(&self) -> (StatusCode, Vec<u8>) {
            let request = Request::builder()
                .uri("/api/leaderboard")
                .body(Body::empty())
                .unwrap();
            self.send(request).await
        }

        async fn post(&self, body: &str) -> (StatusCode, Vec<u8>) {
            self.send(post_request(body)).await
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, bytes.to_vec())
        }
    }

    impl Drop for TestApp {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn post_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/leaderboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_empty_board() {
        let app = TestApp::new();
        let (status, body) = app.get().await;
        assert_eq!(status, StatusCode::OK);
        assert!(parse::<Vec<LeaderboardEntry>>(&body).is_empty());
    }

    #[tokio::test]
    async fn test_submit_and_query() {
        let app = TestApp::new();

        let (status, _) = app.post(r#"{"name":"Ann","score":100}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.post(r#"{"name":"Bob","score":200}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            parse::<Vec<LeaderboardEntry>>(&body),
            vec![entry("Bob", 200), entry("Ann", 100)]
        );

        let (_, body) = app.get().await;
        assert_eq!(
            parse::<Vec<LeaderboardEntry>>(&body),
            vec![entry("Bob", 200), entry("Ann", 100)]
        );
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_client_errors() {
        let app = TestApp::new();
        for body in [
            r#"{"name":"Ann"}"#,
            r#"{"score":10}"#,
            r#"{"name":"Ann","score":"ten"}"#,
            r#"{"name":"Ann","score":1.5}"#,
            "not json",
        ] {
            let (status, response) = app.post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert!(!parse::<ErrorBody>(&response).error.is_empty());
        }

        let (_, body) = app.get().await;
        assert!(parse::<Vec<LeaderboardEntry>>(&body).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_values_are_rejected() {
        let app = TestApp::new();

        let (status, body) = app.post(r#"{"name":"   ","score":50}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(parse::<ErrorBody>(&body).error.contains("Name"));

        let (status, _) = app.post(r#"{"name":"Ann","score":-3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.get().await;
        assert!(parse::<Vec<LeaderboardEntry>>(&body).is_empty());
    }

    #[tokio::test]
    async fn test_pending_submission_does_not_stall_runtime() {
        let app = TestApp::new();
        let store = app.store.clone();
        let (locked_tx, locked_rx) = mpsc::channel();
        let holder = std::thread::spawn(move || {
            let _guard = store.lock_writes();
            locked_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(500));
        });
        locked_rx.recv().unwrap();

        let request = post_request(r#"{"name":"Ann","score":100}"#);
        let mut post = tokio::spawn(app.router.clone().oneshot(request));

        // The submission is parked behind the lock while timers keep firing.
        let started = Instant::now();
        let waited = tokio::time::timeout(Duration::from_millis(50), &mut post).await;
        assert!(waited.is_err());
        assert!(started.elapsed() < Duration::from_millis(400));

        // Reads do not wait for the writer.
        let (status, body) = app.get().await;
        assert_eq!(status, StatusCode::OK);
        assert!(parse::<Vec<LeaderboardEntry>>(&body).is_empty());

        let response = post.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        holder.join().unwrap();

        let (_, body) = app.get().await;
        assert_eq!(parse::<Vec<LeaderboardEntry>>(&body), vec![entry("Ann", 100)]);
    }
}
