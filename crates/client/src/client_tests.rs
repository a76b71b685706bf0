#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bugdesk_core::{BugFilter, BugStatus, Identity, LoginInput, NewBug, Priority, Role};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{ApiClient, ClientConfig, ClientError, FileSessionStore, SessionEvent, SessionStore};

    fn client_for(server: &MockServer, session: Arc<SessionStore>) -> ApiClient {
        let config = ClientConfig::default().with_base_url(format!("{}/api", server.uri()));
        ApiClient::new(&config, session).unwrap()
    }

    fn logged_in(role: Role) -> Arc<SessionStore> {
        let session = Arc::new(SessionStore::in_memory());
        session.login(Identity::new("u1", "Ada", "ada@example.com", role), "tok-123".to_owned());
        session
    }

    #[tokio::test]
    async fn test_bearer_attached_from_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(header("Authorization", "Bearer tok-123"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Admin));
        assert!(client.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_bearer_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(SessionStore::in_memory()));
        client.list_projects().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_from_any_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bugs/b1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
            .mount(&server)
            .await;

        let session = logged_in(Role::Tester);
        let mut events = session.subscribe();
        let client = client_for(&server, Arc::clone(&session));

        let err = client.get_bug("b1").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthExpired));
        assert_eq!(err.status(), Some(401));
        assert!(!session.is_authenticated());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired { redirect_to: "/login?expired=true" });
    }

    #[tokio::test]
    async fn test_unauthorized_with_truncated_body_still_clears_session() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: 512\r\n\r\n{\"message\":",
                )
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });

        let session = logged_in(Role::Tester);
        let config = ClientConfig::default().with_base_url(format!("http://{addr}/api"));
        let client = ApiClient::new(&config, Arc::clone(&session)).unwrap();

        let err = client.get("/bugs").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthExpired), "got {err:?}");
        assert!(!session.is_authenticated());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_message_from_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/project/p1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Admins only"})))
            .mount(&server)
            .await;

        let session = logged_in(Role::Developer);
        let client = client_for(&server, Arc::clone(&session));
        let err = client.delete_project("p1").await.unwrap_err();

        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), "Admins only");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_api_error_falls_back_to_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway from proxy"))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Admin));
        match client.list_users().await.unwrap_err() {
            ClientError::Api { status, status_text, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(status_text, "Bad Gateway");
                assert_eq!(message, "Bad gateway from proxy");
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error_is_distinct() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::default().with_base_url(format!("http://127.0.0.1:{port}/api"));
        let client = ApiClient::new(&config, logged_in(Role::Admin)).unwrap();
        let err = client.get("/bugs").await.unwrap_err();
        assert!(err.is_network(), "got {err:?}");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_list_bugs_with_resource_named_envelope_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bugs"))
            .and(query_param("status", "OPEN"))
            .and(query_param("projectId", "p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bugs": [
                    {"_id": "b1", "title": "Crash on save", "status": "OPEN", "projectId": "p1"},
                    {"_id": "b2", "title": "Typo", "status": "OPEN", "projectId": {"_id": "p1", "name": "Web"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Tester));
        let filter = BugFilter {
            status: Some(BugStatus::Open),
            priority: None,
            project_id: Some("p1".to_owned()),
        };
        let bugs = client.list_bugs(&filter).await.unwrap();
        assert_eq!(bugs.len(), 2);
        assert_eq!(bugs[0].id(), "b1");
        assert_eq!(bugs[1].project_ref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_unrecognized_envelope_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bugs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok", "count": 0})))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Tester));
        assert!(client.list_bugs(&BugFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/bugs/b1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Admin));
        assert_eq!(client.delete("/bugs/b1").await.unwrap(), serde_json::Value::Null);
        client.delete_bug("b1").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Admin));
        assert!(matches!(client.get("/users").await, Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_create_bug_refused_for_non_testers_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bugs"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Developer));
        let bug = NewBug {
            title: "Crash".to_owned(),
            description: "Steps".to_owned(),
            priority: Priority::High,
            project_id: "p1".to_owned(),
        };
        let err = client.create_bug(&bug).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden { role: Role::Developer, .. }));
    }

    #[tokio::test]
    async fn test_create_bug_sends_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bugs"))
            .and(body_json(json!({
                "title": "Crash",
                "description": "Steps",
                "priority": "HIGH",
                "projectId": "p1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "created",
                "bug": {"_id": "b9", "title": "Crash", "status": "OPEN"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Tester));
        let bug = NewBug {
            title: "Crash".to_owned(),
            description: "Steps".to_owned(),
            priority: Priority::High,
            project_id: "p1".to_owned(),
        };
        let created = client.create_bug(&bug).await.unwrap().unwrap();
        assert_eq!(created.id(), "b9");
    }

    #[tokio::test]
    async fn test_add_member_sends_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/project/p1/members"))
            .and(body_json(json!({"userId": "u7"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"_id": "p1", "name": "Web", "members": ["u7"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in(Role::Admin));
        let project = client.add_member("p1", "u7").await.unwrap().unwrap();
        assert!(project.has_member("u7"));
    }

    #[tokio::test]
    async fn test_dot_segment_ids_never_reach_the_server() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any()).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = client_for(&server, logged_in(Role::Admin));
        assert!(matches!(client.get_bug("..").await, Err(ClientError::InvalidInput(_))));
        assert!(matches!(client.delete_project(".").await, Err(ClientError::InvalidInput(_))));
        assert!(matches!(client.remove_member("p1", "..").await, Err(ClientError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_persists_and_restores_in_new_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "name": "Ada", "role": "TESTER", "token": "tok-xyz"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let session = Arc::new(SessionStore::new(FileSessionStore::new(dir.path())));
        let client = client_for(&server, Arc::clone(&session));

        let input = LoginInput { email: "ada@example.com".to_owned(), password: "secret1".to_owned() };
        let identity = client.login(&input).await.unwrap();
        assert_eq!(identity.email_address, "ada@example.com");
        assert_eq!(identity.role, Role::Tester);

        let reloaded = SessionStore::new(FileSessionStore::new(dir.path()));
        assert!(reloaded.restore());
        assert_eq!(reloaded.identity(), Some(identity));
        assert_eq!(reloaded.credential().as_deref(), Some("tok-xyz"));
    }

    #[tokio::test]
    async fn test_login_validation_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(SessionStore::in_memory()));
        let input = LoginInput { email: "not-an-email".to_owned(), password: "123".to_owned() };
        match client.login(&input).await.unwrap_err() {
            ClientError::Validation(errors) => {
                assert_eq!(errors.message_for("email"), Some("Invalid email address"));
                assert_eq!(errors.message_for("password"), Some("Password must be at least 6 characters"));
            },
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;

        let session = logged_in(Role::Admin);
        let client = client_for(&server, Arc::clone(&session));
        let input = LoginInput { email: "ada@example.com".to_owned(), password: "wrong-pass".to_owned() };
        assert!(matches!(client.login(&input).await, Err(ClientError::AuthExpired)));
        assert!(!session.is_authenticated());
    }
}
