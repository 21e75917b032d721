use axum::http::StatusCode;
use axum_test::TestServer;
use docuverse::api::create_router;
use docuverse::db::Database;
use docuverse::models::*;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_project(server: &TestServer) -> Project {
    server
        .post("/api/v1/projects")
        .json(&serde_json::json!({
            "title": "Campus Cafeteria",
            "domain": "Web Development",
            "teamMembers": [
                { "name": "Asha Verma", "rollNo": "42", "univRollNo": "2201042" }
            ],
            "techStack": { "frontend": "React", "backend": "Node", "database": "MongoDB" },
            "cocomo": { "kloc": 5.0, "effort": 0.0, "time": 0.0, "cost": 0.0 },
            "features": "Menu browsing, ordering, payments"
        }))
        .await
        .json::<Project>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod estimate {
    use super::*;

    #[tokio::test]
    async fn computes_the_organic_model() {
        let server = setup();
        let response = server
            .get("/api/v1/estimate")
            .add_query_param("kloc", 5.0)
            .await;

        response.assert_status_ok();
        let estimate: Estimate = response.json();
        assert_eq!(estimate.kloc, 5.0);
        assert!((estimate.effort - 13.01).abs() < 0.01);
        assert!((estimate.time - 6.63).abs() < 0.01);
        assert!((estimate.cost - 65027.90).abs() < 0.01);
    }

    #[tokio::test]
    async fn missing_kloc_is_zero() {
        let server = setup();
        let response = server.get("/api/v1/estimate").await;

        response.assert_status_ok();
        let estimate: Estimate = response.json();
        assert_eq!(estimate.kloc, 0.0);
        assert_eq!(estimate.effort, 0.0);
        assert_eq!(estimate.time, 0.0);
        assert_eq!(estimate.cost, 0.0);
    }

    #[tokio::test]
    async fn negative_kloc_is_clamped() {
        let server = setup();
        let response = server
            .get("/api/v1/estimate")
            .add_query_param("kloc", -7.5)
            .await;

        response.assert_status_ok();
        let estimate: Estimate = response.json();
        assert_eq!(estimate.effort, 0.0);
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let server = setup();
        let first: Estimate = server
            .get("/api/v1/estimate")
            .add_query_param("kloc", 42.0)
            .await
            .json();
        let second: Estimate = server
            .get("/api/v1/estimate")
            .add_query_param("kloc", 42.0)
            .await
            .json();

        assert_eq!(first.effort, second.effort);
        assert_eq!(first.time, second.time);
        assert_eq!(first.cost, second.cost);
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn create_returns_created_with_recomputed_estimate() {
        let server = setup();
        let response = server
            .post("/api/v1/projects")
            .json(&serde_json::json!({
                "title": "Campus Cafeteria",
                "cocomo": { "kloc": 5.0, "effort": 999.0, "time": 999.0, "cost": 999.0 }
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let project: Project = response.json();
        let estimate = project.form.cocomo.expect("estimate missing");
        assert!((estimate.effort - 13.01).abs() < 0.01);
        assert!((estimate.cost - 65027.90).abs() < 0.01);
    }

    #[tokio::test]
    async fn create_accepts_an_empty_form() {
        let server = setup();
        let response = server.post("/api/v1/projects").json(&serde_json::json!({})).await;

        response.assert_status(StatusCode::CREATED);
        let project: Project = response.json();
        assert!(project.form.title.is_none());
        assert_eq!(project.form.cocomo.expect("estimate missing").kloc, 0.0);
    }

    #[tokio::test]
    async fn get_returns_the_stored_project() {
        let server = setup();
        let created = create_test_project(&server).await;

        let response = server.get(&format!("/api/v1/projects/{}", created.id)).await;
        response.assert_status_ok();
        let project: Project = response.json();
        assert_eq!(project.form.title.as_deref(), Some("Campus Cafeteria"));
        assert_eq!(project.form.team_members.len(), 1);
    }

    #[tokio::test]
    async fn get_returns_not_found_for_unknown_id() {
        let server = setup();
        let response = server
            .get(&format!("/api/v1/projects/{}", uuid::Uuid::new_v4()))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_returns_summaries() {
        let server = setup();
        create_test_project(&server).await;

        let response = server.get("/api/v1/projects").await;
        response.assert_status_ok();
        let summaries: Vec<ProjectSummary> = response.json();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title.as_deref(), Some("Campus Cafeteria"));
        assert_eq!(summaries[0].kloc, 5.0);
    }

    #[tokio::test]
    async fn update_kloc_recomputes_the_estimate() {
        let server = setup();
        let created = create_test_project(&server).await;

        let response = server
            .put(&format!("/api/v1/projects/{}", created.id))
            .json(&serde_json::json!({ "kloc": 10.0 }))
            .await;

        response.assert_status_ok();
        let project: Project = response.json();
        let estimate = project.form.cocomo.expect("estimate missing");
        assert_eq!(estimate.kloc, 10.0);
        assert!((estimate.effort - 26.93).abs() < 0.01);
    }

    #[tokio::test]
    async fn delete_removes_the_project() {
        let server = setup();
        let created = create_test_project(&server).await;

        let response = server.delete(&format!("/api/v1/projects/{}", created.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/v1/projects/{}", created.id)).await;
        response.assert_status_not_found();
    }
}

mod reports {
    use super::*;

    const DOCX_CONTENT_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    #[tokio::test]
    async fn download_returns_a_docx_attachment() {
        let server = setup();
        let created = create_test_project(&server).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/report", created.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), DOCX_CONTENT_TYPE);
        let disposition = response.header("content-disposition");
        let disposition = disposition.to_str().expect("invalid header");
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("Campus_Cafeteria_Report.docx"));

        let bytes = response.as_bytes();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn download_sanitizes_the_filename() {
        let server = setup();
        let created: Project = server
            .post("/api/v1/projects")
            .json(&serde_json::json!({ "title": "My App: v2!" }))
            .await
            .json();

        let response = server
            .get(&format!("/api/v1/projects/{}/report", created.id))
            .await;

        response.assert_status_ok();
        let disposition = response.header("content-disposition");
        assert!(disposition
            .to_str()
            .expect("invalid header")
            .contains("My_App__v2__Report.docx"));
    }

    #[tokio::test]
    async fn download_returns_not_found_for_unknown_id() {
        let server = setup();
        let response = server
            .get(&format!("/api/v1/projects/{}/report", uuid::Uuid::new_v4()))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn build_generates_without_persisting() {
        let server = setup();
        let response = server
            .post("/api/v1/reports")
            .json(&serde_json::json!({
                "title": "Throwaway",
                "cocomo": { "kloc": 2.5, "effort": 0.0, "time": 0.0, "cost": 0.0 }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), DOCX_CONTENT_TYPE);
        let bytes = response.as_bytes();
        assert_eq!(&bytes[..2], b"PK");

        // Nothing was stored.
        let summaries: Vec<ProjectSummary> = server.get("/api/v1/projects").await.json();
        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn build_accepts_an_empty_form() {
        let server = setup();
        let response = server.post("/api/v1/reports").json(&serde_json::json!({})).await;

        response.assert_status_ok();
        let disposition = response.header("content-disposition");
        assert!(disposition
            .to_str()
            .expect("invalid header")
            .contains("LabReport_Report.docx"));
    }
}
