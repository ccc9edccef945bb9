//! Handler tests over the assembled router, backed by the mock runtime.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::connect_info::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use runpad_core::orchestra::Orchestra;
    use runpad_core::pool::SandboxPool;
    use runpad_core::runtime::{ContainerRuntime, MockRuntime};
    use runpad_core::store::VersionStore;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::route;
    use crate::state::AppState;

    /// Router plus the tempdirs that must outlive it.
    struct TestApp {
        router: Router,
        _staging: TempDir,
        _persist: TempDir,
    }

    async fn test_app(allowed_ips: &[&str]) -> TestApp {
        let staging = tempfile::tempdir().unwrap();
        let persist = tempfile::tempdir().unwrap();

        let allowed = if allowed_ips.is_empty() {
            "  allowed_ips: []".to_string()
        } else {
            let entries = allowed_ips
                .iter()
                .map(|ip| format!("    - {:?}", ip))
                .collect::<Vec<_>>()
                .join("\n");
            format!("  allowed_ips:\n{}", entries)
        };
        let yaml = format!(
            r#"
server:
  host: 127.0.0.1
  port: 0
  frontend_dir: ./frontend
sandbox:
  image: golang:1.22-alpine
  max_sandboxes: 2
  staging_dir: {staging:?}
  run_command: ["go", "run"]
  file_extension: go
storage:
  persist_dir: {persist:?}
  retention: 3
security:
{allowed}
"#,
            staging = staging.path(),
            persist = persist.path(),
            allowed = allowed,
        );

        let config: Arc<Config> = Arc::new(serde_yaml::from_str(&yaml).unwrap());
        let runtime: Arc<dyn ContainerRuntime> =
            Arc::new(MockRuntime::with_stdout("hello from sandbox\n"));
        let pool = SandboxPool::provision(runtime.as_ref(), config.get_sandbox())
            .await
            .unwrap();
        let orchestra = Arc::new(Orchestra::new(
            runtime,
            pool,
            config.get_sandbox().clone(),
        ));
        let store = Arc::new(VersionStore::new(
            config.get_storage(),
            config.get_sandbox().get_file_extension(),
        ));

        TestApp {
            router: route::create_router(AppState::new(config, orchestra, store)),
            _staging: staging,
            _persist: persist,
        }
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 1, 9], 40000))));
        req
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        post(uri, body.to_string())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn run_returns_decoded_output() {
        let app = test_app(&[]).await;

        let response = app
            .router
            .oneshot(post_json("/run", json!({ "code": "package main" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["output"], "hello from sandbox\n");
    }

    #[tokio::test]
    async fn run_rejects_malformed_payload() {
        let app = test_app(&[]).await;

        let response = app
            .router
            .oneshot(post("/run", "{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn save_is_forbidden_for_unlisted_callers() {
        let app = test_app(&["10.0.0."]).await;

        let response = app
            .router
            .oneshot(post_json(
                "/saveCode",
                json!({ "noteId": "note-1", "code": "x" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn save_accepts_forwarded_allowlisted_caller() {
        let app = test_app(&["10.0.0."]).await;

        let mut req = post_json("/saveCode", json!({ "noteId": "note-1", "code": "saved" }));
        req.headers_mut()
            .insert("x-forwarded-for", "10.0.0.7".parse().unwrap());

        let response = app.router.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn get_code_returns_history_newest_first() {
        let app = test_app(&["127.0."]).await;

        for content in ["first", "second"] {
            let response = app
                .router
                .clone()
                .oneshot(post_json(
                    "/saveCode",
                    json!({ "noteId": "note-1", "code": content }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .router
            .oneshot(post_json("/getCode", json!({ "noteId": "note-1" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["code"], "second");
        assert_eq!(body["versions"].as_array().unwrap().len(), 2);
        assert_eq!(body["versions"][0]["content"], "second");
        assert_eq!(body["versions"][1]["content"], "first");
    }

    #[tokio::test]
    async fn get_code_of_unsaved_note_is_empty_success() {
        let app = test_app(&[]).await;

        let response = app
            .router
            .oneshot(post_json("/getCode", json!({ "noteId": "never-saved" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["code"], "");
        assert_eq!(body["versions"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn save_rejects_traversal_note_ids() {
        let app = test_app(&["127.0."]).await;

        let response = app
            .router
            .oneshot(post_json(
                "/saveCode",
                json!({ "noteId": "../escape", "code": "x" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app(&[]).await;

        let mut req = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
