pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::listing::handlers as listing;
use crate::state::AppState;

/// Room for the text fields and multipart framing around the largest accepted resume.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // The intake routes must accept bodies above the resume limit so an
    // oversized file gets the `resume` field error instead of a bare 413.
    let intake_limit = state.resumes.constraints().max_bytes * 2 + MULTIPART_OVERHEAD_BYTES;

    let intake = Router::new()
        .route(
            "/api/v1/jobs/:id/applications",
            post(applications::handle_apply_for_job),
        )
        .route(
            "/api/v1/applications/spontaneous",
            post(applications::handle_apply_spontaneous),
        )
        .layer(DefaultBodyLimit::max(intake_limit));

    Router::new()
        .route("/health", get(health::health_handler))
        // Public careers page
        .route("/api/v1/jobs", get(listing::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(listing::handle_get_job))
        .route("/api/v1/areas", get(applications::handle_list_areas))
        .merge(intake)
        // Admin console
        .route("/api/v1/admin/dashboard", get(admin::handle_dashboard))
        .route(
            "/api/v1/admin/jobs",
            get(admin::handle_list_all_jobs).post(admin::handle_create_job),
        )
        .route(
            "/api/v1/admin/jobs/:id",
            get(admin::handle_edit_form)
                .put(admin::handle_update_job)
                .delete(admin::handle_delete_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/active",
            patch(admin::handle_set_active),
        )
        .route(
            "/api/v1/admin/applications",
            get(admin::handle_list_applications),
        )
        .route(
            "/api/v1/admin/applications/spontaneous",
            get(admin::handle_list_spontaneous),
        )
        .route(
            "/api/v1/admin/resumes/:key",
            get(admin::handle_download_resume),
        )
        .route("/api/v1/admin/sign-out", post(admin::handle_sign_out))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::listing::seed;
    use crate::memory::{MemoryApplications, MemoryAuth, MemoryJobs, MemoryObjectStore};
    use crate::resumes::{ResumeConstraints, ResumeTransfer};

    const TOKEN: &str = "admin-token";
    const BOUNDARY: &str = "careers-test-boundary";

    struct Harness {
        app: Router,
        jobs: Arc<MemoryJobs>,
        store: Arc<MemoryObjectStore>,
        auth: Arc<MemoryAuth>,
    }

    fn harness() -> Harness {
        let jobs = Arc::new(MemoryJobs::with_postings(seed::postings()));
        let store = Arc::new(MemoryObjectStore::default());
        let auth = Arc::new(MemoryAuth::with_token(TOKEN));
        let state = AppState {
            jobs: jobs.clone(),
            applications: Arc::new(MemoryApplications::new(jobs.clone())),
            resumes: ResumeTransfer::new(store.clone(), ResumeConstraints::default()),
            auth: auth.clone(),
        };
        Harness {
            app: build_router(state),
            jobs,
            store,
            auth,
        }
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(uri: &str, fields: &[(&str, &str)], resume: Option<(&str, &str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = resume {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const APPLICANT: [(&str, &str); 3] = [
        ("name", "Ana Silva"),
        ("email", "ana@example.com"),
        ("phone", "(11) 98765-4321"),
    ];

    #[tokio::test]
    async fn test_health_and_admin_requires_auth() {
        let h = harness();

        let health = h.app.clone().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let anonymous = h
            .app
            .clone()
            .oneshot(get("/api/v1/admin/jobs", None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let forged = h
            .app
            .oneshot(get("/api/v1/admin/jobs", Some("forged")))
            .await
            .unwrap();
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_listing_shows_only_active_jobs() {
        let h = harness();
        let response = h.app.oneshot(get("/api/v1/jobs", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "jobs");
        let titles: Vec<_> = body["jobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Account Executive", "Senior Frontend Developer"]);
        assert!(body["jobs"][0].get("is_active").is_none());
    }

    #[tokio::test]
    async fn test_public_listing_degrades_when_backend_is_down() {
        let h = harness();
        h.jobs.set_unavailable(true);
        let response = h.app.oneshot(get("/api/v1/jobs", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "unavailable");
    }

    /// Submits a spontaneous application with a PDF named `file_name`, then
    /// follows the download link the admin listing publishes for it.
    async fn submit_and_follow_download(h: &Harness, file_name: &str) -> Response {
        let mut fields = APPLICANT.to_vec();
        fields.push(("area", "technology"));

        let submitted = h
            .app
            .clone()
            .oneshot(multipart(
                "/api/v1/applications/spontaneous",
                &fields,
                Some((file_name, "application/pdf", b"%PDF-1.4 resume".as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(submitted.status(), StatusCode::CREATED);
        assert_eq!(body_json(submitted).await["resume_attached"], true);

        let listed = h
            .app
            .clone()
            .oneshot(get("/api/v1/admin/applications/spontaneous", Some(TOKEN)))
            .await
            .unwrap();
        let entries = body_json(listed).await;
        assert_eq!(entries[0]["area"], "technology");
        assert_eq!(entries[0]["position"], "Technology");
        let link = entries[0]["resume_download"].as_str().unwrap().to_string();

        h.app.clone().oneshot(get(&link, Some(TOKEN))).await.unwrap()
    }

    #[tokio::test]
    async fn test_spontaneous_application_with_resume_round_trips_to_admin() {
        let h = harness();
        let download = submit_and_follow_download(&h, "cv.pdf").await;
        assert_eq!(h.store.put_count(), 1);

        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            download.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume_Ana_Silva.pdf\""
        );
        let bytes = to_bytes(download.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4 resume");
    }

    #[tokio::test]
    async fn test_download_link_survives_url_characters_in_filename() {
        for file_name in ["cv.pdf?v=2", "cv.pdf#top", "my cv.p df", "cv/../x.pdf"] {
            let h = harness();
            let download = submit_and_follow_download(&h, file_name).await;
            assert_eq!(download.status(), StatusCode::OK, "{file_name}");
            assert_eq!(
                download.headers()[header::CONTENT_DISPOSITION],
                "attachment; filename=\"resume_Ana_Silva.pdf\"",
                "{file_name}"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_application_reports_fields_and_stores_nothing() {
        let h = harness();
        let job_id = seed_job_id(&h, "Account Executive").await;

        let response = h
            .app
            .oneshot(multipart(
                &format!("/api/v1/jobs/{job_id}/applications"),
                &[("name", "A"), ("email", "not-an-email"), ("phone", "123")],
                Some(("cv.pdf", "application/pdf", b"%PDF".as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let fields: Vec<_> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
        assert_eq!(h.store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_resume_gets_field_error_not_413() {
        let h = harness();
        let job_id = seed_job_id(&h, "Account Executive").await;
        let six_mb = vec![0u8; 6 * 1024 * 1024];

        let response = h
            .app
            .oneshot(multipart(
                &format!("/api/v1/jobs/{job_id}/applications"),
                &APPLICANT,
                Some(("cv.pdf", "application/pdf", six_mb.as_slice())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["fields"][0]["field"], "resume");
        assert_eq!(h.store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let h = harness();
        let job_id = seed_job_id(&h, "Payroll Analyst").await;

        let unconfirmed = h
            .app
            .clone()
            .oneshot(json_request(
                Method::DELETE,
                &format!("/api/v1/admin/jobs/{job_id}"),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(unconfirmed.status(), StatusCode::CONFLICT);
        assert_eq!(h.jobs.mutation_count(), 0);

        let confirmed = h
            .app
            .oneshot(json_request(
                Method::DELETE,
                &format!("/api/v1/admin/jobs/{job_id}?confirm=true"),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(confirmed.status(), StatusCode::OK);
        let remaining = body_json(confirmed).await;
        assert_eq!(remaining.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_job_validates_then_publishes() {
        let h = harness();
        let invalid = h
            .app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/admin/jobs",
                json!({
                    "title": "", "department": "Legal", "location": "Remote",
                    "type": "full-time", "salary": "", "description": "Contracts",
                    "requirements": " , "
                }),
            ))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.jobs.mutation_count(), 0);

        let created = h
            .app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/admin/jobs",
                json!({
                    "title": "Legal Counsel", "department": "Legal", "location": "Remote",
                    "type": "full-time", "salary": "To be agreed", "description": "Contracts",
                    "requirements": "OAB, Contracts"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listing = body_json(h.app.oneshot(get("/api/v1/jobs", None)).await.unwrap()).await;
        assert_eq!(listing["jobs"][0]["title"], "Legal Counsel");
        assert_eq!(listing["jobs"][0]["requirements"], json!(["OAB", "Contracts"]));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_token() {
        let h = harness();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/admin/sign-out")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();

        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(h.auth.signed_out(), vec![TOKEN.to_string()]);

        let after = h
            .app
            .oneshot(get("/api/v1/admin/dashboard", Some(TOKEN)))
            .await
            .unwrap();
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    async fn seed_job_id(h: &Harness, title: &str) -> String {
        let jobs = body_json(
            h.app
                .clone()
                .oneshot(get("/api/v1/admin/jobs", Some(TOKEN)))
                .await
                .unwrap(),
        )
        .await;
        jobs.as_array()
            .unwrap()
            .iter()
            .find(|j| j["title"] == title)
            .map(|j| j["id"].as_str().unwrap().to_string())
            .unwrap()
    }
}
