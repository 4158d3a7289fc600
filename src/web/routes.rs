// src/web/routes.rs
use crate::{
    state::AppState,
    web::{admin_handlers, auth_handlers, mw_auth, mw_role, report_handlers, student_handlers},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/signup", get(auth_handlers::show_signup_form).post(auth_handlers::handle_signup))
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/health", get(|| async { "ok" }));

    // --- Admin routes ---
    let admin_routes = Router::new()
        .route("/admin", get(admin_handlers::show_admin_page).post(admin_handlers::handle_shuffle))
        .route("/update", post(admin_handlers::handle_update))
        .route("/download_pdf", get(report_handlers::download_pdf))
        .route_layer(middleware::from_fn(mw_role::require_admin));

    // --- Student routes ---
    let student_routes = Router::new()
        .route("/student", get(student_handlers::student_page))
        .route_layer(middleware::from_fn(mw_role::require_student));

    // Everything below needs a logged-in session; require_auth runs before the role checks
    let authenticated_routes = Router::new()
        .route("/dashboard", get(auth_handlers::dashboard))
        .merge(admin_routes)
        .merge(student_routes)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        db::test_pool,
        services::{allotment_service, report_service::PdfRenderer},
        web::{mw_auth::session_layer, report_handlers::NO_DATA_MESSAGE},
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use tower_sessions_sqlx_store::SqliteStore;

    struct TestApp {
        router: Router,
        pool: SqlitePool,
        report_dir: TempDir,
    }

    async fn test_app() -> TestApp {
        let pool = test_pool().await;
        let store = SqliteStore::new(pool.clone())
            .with_table_name("sessions")
            .unwrap();
        store.migrate().await.unwrap();

        let report_dir = tempfile::tempdir().unwrap();
        let config = AppConfig::for_tests(report_dir.path().to_path_buf());
        let state = AppState::new(pool.clone(), config, Arc::new(PdfRenderer));

        let router = create_router(state).layer(session_layer(store, 1));
        TestApp { router, pool, report_dir }
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::builder().method("GET").uri(uri);
            if let Some(c) = cookie {
                builder = builder.header(header::COOKIE, c);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(c) = cookie {
                builder = builder.header(header::COOKIE, c);
            }
            self.send(builder.body(Body::from(form.to_string())).unwrap()).await
        }

        /// Signs up and logs in, returning the session cookie.
        async fn login_as(&self, username: &str, dept: &str, role: &str) -> String {
            let signup = self
                .post(
                    "/signup",
                    &format!("username={}&password=pw&dept={}&role={}", username, dept, role),
                    None,
                )
                .await;
            assert_eq!(location(&signup), "/");

            let login = self
                .post("/", &format!("username={}&password=pw", username), None)
                .await;
            assert_eq!(location(&login), "/dashboard");
            login
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::to_string)
                .expect("session cookie")
        }
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn table_rows(html: &str) -> usize {
        html.matches("<tr><td>").count()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app().await;
        let response = app.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn login_page_renders() {
        let app = test_app().await;
        let response = app.get("/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("name=\"username\""));
    }

    #[tokio::test]
    async fn wrong_password_redisplays_login() {
        let app = test_app().await;
        app.login_as("root", "CSE", "admin").await;

        let response = app.post("/", "username=root&password=nope", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Invalid username or password."));
    }

    #[tokio::test]
    async fn duplicate_signup_shows_error() {
        let app = test_app().await;
        app.login_as("root", "CSE", "admin").await;

        let response = app
            .post("/signup", "username=root&password=x&dept=ECE&role=student", None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("already taken"));
    }

    #[tokio::test]
    async fn anonymous_requests_go_to_login() {
        let app = test_app().await;
        for uri in ["/dashboard", "/admin", "/student", "/download_pdf"] {
            let response = app.get(uri, None).await;
            assert_eq!(location(&response), "/", "{}", uri);
        }
    }

    #[tokio::test]
    async fn admin_shuffle_writes_todays_allotment() {
        let app = test_app().await;
        let cookie = app.login_as("root", "CSE", "admin").await;

        let dashboard = app.get("/dashboard", Some(&cookie)).await;
        assert_eq!(location(&dashboard), "/admin");

        let shuffle = app.post("/admin", "", Some(&cookie)).await;
        assert_eq!(shuffle.status(), StatusCode::SEE_OTHER);
        assert!(location(&shuffle).starts_with("/admin?success="));

        let today = allotment_service::today();
        let stored = allotment_service::query_by_day(&app.pool, &today).await.unwrap();
        assert_eq!(stored.len(), 100);

        let page = app.get("/admin", Some(&cookie)).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(table_rows(&body_text(page).await), 100);
    }

    #[tokio::test]
    async fn second_shuffle_replaces_the_first() {
        let app = test_app().await;
        let cookie = app.login_as("root", "CSE", "admin").await;

        app.post("/admin", "", Some(&cookie)).await;
        app.post("/admin", "", Some(&cookie)).await;

        let today = allotment_service::today();
        let stored = allotment_service::query_by_day(&app.pool, &today).await.unwrap();
        assert_eq!(stored.len(), 100);
    }

    #[tokio::test]
    async fn simultaneous_shuffles_leave_one_full_day() {
        let app = test_app().await;
        let cookie = app.login_as("root", "CSE", "admin").await;

        let (first, second) = tokio::join!(
            app.post("/admin", "", Some(&cookie)),
            app.post("/admin", "", Some(&cookie)),
        );
        assert!(location(&first).starts_with("/admin?success="));
        assert!(location(&second).starts_with("/admin?success="));

        let today = allotment_service::today();
        let stored = allotment_service::query_by_day(&app.pool, &today).await.unwrap();
        assert_eq!(stored.len(), 100);
    }

    #[tokio::test]
    async fn student_sees_only_their_department() {
        let app = test_app().await;
        allotment_service::run_allotment(&app.pool, &allotment_service::today())
            .await
            .unwrap();
        let cookie = app.login_as("sam", "ECE", "student").await;

        let dashboard = app.get("/dashboard", Some(&cookie)).await;
        assert_eq!(location(&dashboard), "/student");

        let page = app.get("/student", Some(&cookie)).await;
        assert_eq!(page.status(), StatusCode::OK);
        let html = body_text(page).await;
        assert!(html.contains("Allotments for ECE"));
        assert_eq!(table_rows(&html), 20);
    }

    #[tokio::test]
    async fn student_cannot_use_admin_routes() {
        let app = test_app().await;
        let cookie = app.login_as("sam", "ECE", "student").await;

        let response = app.post("/admin", "", Some(&cookie)).await;
        assert_eq!(location(&response), "/");

        let today = allotment_service::today();
        let stored = allotment_service::query_by_day(&app.pool, &today).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn manual_update_shows_up_for_students() {
        let app = test_app().await;
        let admin = app.login_as("root", "CSE", "admin").await;
        app.post("/admin", "", Some(&admin)).await;

        let today = allotment_service::today();
        let update = app
            .post(
                "/update",
                &format!("dept=ECE&year=2nd&section=C&day={}&room=NB999", today),
                Some(&admin),
            )
            .await;
        assert!(location(&update).starts_with("/admin?success="));

        let admin_page = body_text(app.get("/admin", Some(&admin)).await).await;
        assert!(admin_page.contains("NB999"));

        let student = app.login_as("sam", "ECE", "student").await;
        let student_page = body_text(app.get("/student", Some(&student)).await).await;
        assert!(student_page.contains("NB999"));
    }

    #[tokio::test]
    async fn manual_update_without_match_reports_error() {
        let app = test_app().await;
        let admin = app.login_as("root", "CSE", "admin").await;

        let update = app
            .post(
                "/update",
                "dept=ECE&year=2nd&section=C&day=2020-01-01&room=NB999",
                Some(&admin),
            )
            .await;
        assert!(location(&update).starts_with("/admin?error="));
    }

    #[tokio::test]
    async fn download_without_data_returns_message() {
        let app = test_app().await;
        let admin = app.login_as("root", "CSE", "admin").await;

        let response = app.get("/download_pdf", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, NO_DATA_MESSAGE);
        assert_eq!(std::fs::read_dir(app.report_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn download_returns_pdf_attachment() {
        let app = test_app().await;
        let admin = app.login_as("root", "CSE", "admin").await;
        app.post("/admin", "", Some(&admin)).await;

        let response = app.get("/download_pdf", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let filename = format!("class_allotment_{}.pdf", allotment_service::today());
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains(&filename));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(app.report_dir.path().join(filename).exists());
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = test_app().await;
        let cookie = app.login_as("root", "CSE", "admin").await;

        let logout = app.get("/logout", Some(&cookie)).await;
        assert_eq!(location(&logout), "/");

        let after = app.get("/admin", Some(&cookie)).await;
        assert_eq!(location(&after), "/");
    }
}
