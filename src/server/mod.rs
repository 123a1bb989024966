use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::entity::{Course, Enrollment, Instructor, Student};
use crate::store::RelationalStore;

pub mod routes;

use routes::{CoursePayload, EnrollmentPayload, InstructorPayload, StudentPayload};

/// Server state
///
/// Mutating handlers hold the write lock for the whole validate-then-apply
/// step, so at most one mutation is in flight. Listings share the read lock.
pub struct AppState {
    pub store: RwLock<RelationalStore>,
}

impl AppState {
    pub fn new(store: RelationalStore) -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(store),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/init_db", get(routes::init_db).post(routes::init_db))
        .route("/stats", get(routes::get_stats))
        .route("/get_students", get(routes::list::<Student>))
        .route("/add_student", post(routes::create::<StudentPayload>))
        .route("/update_student", put(routes::update::<StudentPayload>))
        .route("/remove_student", delete(routes::remove::<Student>))
        .route("/get_instructors", get(routes::list::<Instructor>))
        .route("/add_instructor", post(routes::create::<InstructorPayload>))
        .route("/update_instructor", put(routes::update::<InstructorPayload>))
        .route("/remove_instructor", delete(routes::remove::<Instructor>))
        .route("/get_courses", get(routes::list::<Course>))
        .route("/add_course", post(routes::create::<CoursePayload>))
        .route("/update_course", put(routes::update::<CoursePayload>))
        .route("/remove_course", delete(routes::remove::<Course>))
        .route("/get_enrollments", get(routes::list::<Enrollment>))
        .route("/add_enrollment", post(routes::create::<EnrollmentPayload>))
        .route("/update_enrollment", put(routes::update::<EnrollmentPayload>))
        .route("/remove_enrollment", delete(routes::remove::<Enrollment>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, store: RelationalStore) -> anyhow::Result<()> {
    let app = router(AppState::new(store));

    tracing::info!("Starting server on {}", addr);
    crate::ui::done(&format!("Server running at http://{}", addr));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn app() -> Router {
        router(AppState::new(RelationalStore::new()))
    }

    #[tokio::test]
    async fn test_crud_over_every_route() {
        let app = app();

        let rows = [
            ("instructor", json!({"instructor_id": "I1", "name": "Ada", "department": "CS"})),
            ("student", json!({"student_id": "S1", "name": "Grace", "credits": 12})),
            ("course", json!({"course_id": "C1", "title": "Algorithms", "instructor_id": "I1"})),
            ("enrollment", json!({
                "enrollment_id": "E1", "student_id": "S1", "course_id": "C1",
                "semester": "Fall", "grade": "A"
            })),
        ];

        for (kind, row) in &rows {
            let (status, body) = send(&app, Method::POST, &format!("/add_{kind}"), Some(row.clone())).await;
            assert_eq!(status, StatusCode::OK, "add_{kind}: {body}");
            assert!(body["message"].as_str().unwrap().ends_with("added successfully!"));
        }

        let (_, students) = send(&app, Method::GET, "/get_students", None).await;
        assert_eq!(students, json!([{"student_id": "S1", "name": "Grace", "credits": 12}]));
        let (_, instructors) = send(&app, Method::GET, "/get_instructors", None).await;
        assert_eq!(instructors[0]["department"], "CS");
        let (_, courses) = send(&app, Method::GET, "/get_courses", None).await;
        assert_eq!(courses[0]["instructor_id"], "I1");
        let (_, enrollments) = send(&app, Method::GET, "/get_enrollments", None).await;
        assert_eq!(enrollments[0]["enrollment_grade"], "A");

        let updates = [
            ("instructor", json!({"instructor_id": "I1", "name": "Ada L.", "department": "Math"})),
            ("student", json!({"student_id": "S1", "name": "Grace H.", "credits": "30"})),
            ("course", json!({"course_id": "C1", "title": "Advanced Algorithms", "instructor_id": "I1"})),
            ("enrollment", json!({
                "enrollment_id": "E1", "student_id": "S1", "course_id": "C1",
                "semester": "Spring", "grade": "B"
            })),
        ];
        for (kind, row) in &updates {
            let (status, body) = send(&app, Method::PUT, &format!("/update_{kind}"), Some(row.clone())).await;
            assert_eq!(status, StatusCode::OK, "update_{kind}: {body}");
        }
        let (_, students) = send(&app, Method::GET, "/get_students", None).await;
        assert_eq!(students[0]["credits"], 30);
        let (_, enrollments) = send(&app, Method::GET, "/get_enrollments", None).await;
        assert_eq!(enrollments[0]["enrollment_semester"], "Spring");

        for (kind, id) in [("enrollment", "E1"), ("course", "C1"), ("student", "S1"), ("instructor", "I1")] {
            let mut body = serde_json::Map::new();
            body.insert(format!("{kind}_id"), json!(id));
            let body = Value::Object(body);
            let (status, body) = send(&app, Method::DELETE, &format!("/remove_{kind}"), Some(body)).await;
            assert_eq!(status, StatusCode::OK, "remove_{kind}: {body}");
        }

        let (_, stats) = send(&app, Method::GET, "/stats", None).await;
        assert_eq!(stats, json!({"students": 0, "instructors": 0, "courses": 0, "enrollments": 0}));
    }

    #[tokio::test]
    async fn test_store_rejections_map_to_statuses() {
        let app = router(AppState::new(crate::Seed::sample().build().unwrap()));

        let (status, body) = send(
            &app,
            Method::POST,
            "/add_course",
            Some(json!({"course_id": "C1", "title": "Again", "instructor_id": "I1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already exists"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/add_enrollment",
            Some(json!({"enrollment_id": "E9", "student_id": "S1", "course_id": "C9", "semester": "Fall"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/update_student",
            Some(json!({"student_id": "S9", "name": "Nobody", "credits": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/remove_instructor", Some(json!({"instructor_id": "I1"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("still referenced"));
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/add_student", Some(json!({"name": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/add_student",
            Some(json!({"student_id": "S1", "name": "Grace", "credits": 1.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, Method::DELETE, "/remove_student", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing student ID");

        let (status, body) = send(&app, Method::POST, "/add_instructor", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

        let (_, stats) = send(&app, Method::GET, "/stats", None).await;
        assert_eq!(stats["students"], 0);
    }

    #[tokio::test]
    async fn test_init_db_accepts_get_and_post() {
        let app = router(AppState::new(crate::Seed::sample().build().unwrap()));

        for method in [Method::GET, Method::POST] {
            let (status, body) = send(&app, method, "/init_db", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Database initialized successfully!");
        }

        let (_, courses) = send(&app, Method::GET, "/get_courses", None).await;
        assert_eq!(courses, json!([]));
    }
}
