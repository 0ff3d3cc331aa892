use axum::http::StatusCode;
use axum_test::TestServer;
use netmap_graph::api::{create_router, GraphStore, SecurityConfig};
use netmap_graph::models::*;
use serde_json::json;

fn setup() -> TestServer {
    setup_with(Vec::new())
}

fn setup_with(records: Vec<GraphRecord>) -> TestServer {
    let app = create_router(GraphStore::with_records(records), SecurityConfig::disabled());
    TestServer::new(app).expect("Failed to create test server")
}

fn graph(id: i64, name: &str) -> GraphRecord {
    GraphRecord::with_id(id).attr("name", name)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/health").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod list_graphs {
    use super::*;

    #[tokio::test]
    async fn returns_empty_array_when_no_graphs_exist() {
        let server = setup();

        let response = server.get("/api/graph").await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn returns_graphs_in_creation_order() {
        let server = setup_with(vec![graph(2, "edge"), graph(1, "core")]);

        let graphs: Vec<GraphRecord> = server.get("/api/graph").await.json();

        assert_eq!(graphs, vec![graph(2, "edge"), graph(1, "core")]);
    }
}

mod create_graph {
    use super::*;

    #[tokio::test]
    async fn assigns_an_id_to_new_records() {
        let server = setup();

        let response = server
            .post("/api/graph")
            .json(&json!({ "name": "core", "layer": 2 }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: GraphRecord = response.json();
        assert!(matches!(created.id, Some(RecordId::Str(_))));
        assert_eq!(created.get("layer"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn keeps_client_supplied_id() {
        let server = setup();

        let created: GraphRecord = server
            .post("/api/graph")
            .json(&graph(7, "core"))
            .await
            .json();

        assert_eq!(created, graph(7, "core"));
    }

    #[tokio::test]
    async fn rejects_taken_id() {
        let server = setup_with(vec![graph(1, "core")]);

        let response = server.post("/api/graph").json(&graph(1, "again")).await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_non_object_body() {
        let server = setup();

        let response = server.post("/api/graph").json(&json!([1, 2])).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod get_graph {
    use super::*;

    #[tokio::test]
    async fn returns_graph_by_numeric_id() {
        let server = setup_with(vec![graph(1, "core")]);

        let response = server.get("/api/graph/1").await;

        response.assert_status_ok();
        assert_eq!(response.json::<GraphRecord>(), graph(1, "core"));
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_id() {
        let server = setup();

        let response = server.get("/api/graph/404").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod numeric_looking_string_ids {
    use super::*;

    #[tokio::test]
    async fn are_reachable_through_the_path() {
        let server = setup();
        server
            .post("/api/graph")
            .json(&json!({ "id": "42", "name": "core" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/graph/42").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "id": "42", "name": "core" }));
    }

    #[tokio::test]
    async fn keep_their_string_type_on_update() {
        let server = setup_with(vec![GraphRecord::with_id("42").attr("name", "core")]);

        let response = server
            .put("/api/graph/42")
            .json(&json!({ "name": "backbone" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "id": "42", "name": "backbone" }));
    }

    #[tokio::test]
    async fn collide_with_the_same_integer_id() {
        let server = setup_with(vec![GraphRecord::with_id("42")]);

        let response = server.post("/api/graph").json(&json!({ "id": 42 })).await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn can_be_deleted() {
        let server = setup_with(vec![GraphRecord::with_id("42")]);

        server
            .delete("/api/graph/42")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.get("/api/graph").await.assert_json(&json!([]));
    }
}

mod update_graph {
    use super::*;

    #[tokio::test]
    async fn replaces_all_attributes() {
        let server = setup_with(vec![graph(1, "core").attr("layer", 2)]);

        let response = server
            .put("/api/graph/1")
            .json(&json!({ "name": "backbone" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<GraphRecord>(), graph(1, "backbone"));
    }

    #[tokio::test]
    async fn path_id_overrides_body_id() {
        let server = setup_with(vec![graph(1, "core")]);

        let updated: GraphRecord = server
            .put("/api/graph/1")
            .json(&graph(2, "backbone"))
            .await
            .json();

        assert_eq!(updated, graph(1, "backbone"));
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_id() {
        let server = setup();

        let response = server.put("/api/graph/3").json(&json!({})).await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod patch_graph {
    use super::*;

    #[tokio::test]
    async fn merges_given_attributes() {
        let server = setup_with(vec![graph(1, "core").attr("layer", 2)]);

        let response = server
            .patch("/api/graph/1")
            .json(&json!({ "layer": 3 }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<GraphRecord>(),
            graph(1, "core").attr("layer", 3)
        );
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_id() {
        let server = setup();

        let response = server
            .patch("/api/graph/3")
            .json(&json!({ "layer": 3 }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod delete_graph {
    use super::*;

    #[tokio::test]
    async fn removes_graph() {
        let server = setup_with(vec![graph(1, "core")]);

        server
            .delete("/api/graph/1")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/api/graph/1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_id() {
        let server = setup();

        let response = server.delete("/api/graph/1").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod authentication {
    use super::*;

    fn secured() -> TestServer {
        let app = create_router(
            GraphStore::with_records(vec![graph(1, "core")]),
            SecurityConfig::with_api_key("secret"),
        );
        TestServer::new(app).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn rejects_missing_key() {
        let server = secured();

        let response = server.get("/api/graph").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_wrong_key() {
        let server = secured();

        let response = server
            .get("/api/graph")
            .authorization_bearer("wrong")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_configured_key() {
        let server = secured();

        let response = server
            .get("/api/graph")
            .authorization_bearer("secret")
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn health_stays_open() {
        let server = secured();

        server.get("/health").await.assert_status_ok();
    }
}
