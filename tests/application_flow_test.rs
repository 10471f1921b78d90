mod common;

use axum::http::StatusCode;
use common::{
    admin_token, database_app, json_request, multipart_request, pdf_bytes, send, token, Part,
};
use jobboard_backend::{dto::job_dto::CreateJobPayload, models::job::Job, services::job_service::JobService};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use uuid::Uuid;

fn job_payload(title: &str) -> CreateJobPayload {
    serde_json::from_value(json!({
        "title": title,
        "company": "Acme",
        "location": "Paris",
        "contract_type": "CDI",
        "salary_min": 40000,
        "salary_max": 60000,
        "description": "Build and run backend services",
        "tags": ["rust", "backend"]
    }))
    .expect("job payload")
}

async fn create_job(pool: &PgPool, title: &str, owner: Option<&str>) -> Job {
    JobService::new(pool.clone())
        .create(job_payload(title), owner)
        .await
        .expect("create job")
}

async fn create_employer(pool: &PgPool) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO users_sync (id, email, name, role) VALUES ($1, $2, $3, 'EMPLOYER')")
        .bind(&id)
        .bind(format!("employer-{}@example.com", id))
        .bind("Employer")
        .execute(pool)
        .await
        .expect("seed employer");
    id
}

async fn count(pool: &PgPool, sql: &str, bind: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(bind)
        .fetch_one(pool)
        .await
        .expect("count")
}

#[tokio::test]
async fn application_pipeline_end_to_end() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let employer_id = create_employer(&pool).await;
    let job = create_job(&pool, "Rust Developer", Some(&employer_id)).await;
    let job_id = job.id.to_string();
    let email = format!("jean.dupont+{}@example.com", Uuid::new_v4().simple());
    let cv = pdf_bytes(2048);

    let parts = [
        Part::Text("job_id", &job_id),
        Part::Text("name", "Jean Dupont"),
        Part::Text("email", &email),
        Part::Text("phone", "+33 6 12 34 56 78"),
        Part::Text("cover_letter", "I would love to join."),
        Part::File {
            name: "cv",
            file_name: "cv.pdf",
            content_type: "application/pdf",
            data: &cv,
        },
    ];
    let (status, body) = send(&app, multipart_request("/applications", &parts, None)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["application"]["status"], "pending");
    let application_id = body["application"]["id"].as_i64().unwrap();
    assert!(body["application"]["cv_url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/cv/"));

    let (user_id, role): (String, String) =
        sqlx::query_as("SELECT id, role FROM users_sync WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(role, "CANDIDATE");
    let (first_name, last_name): (String, String) =
        sqlx::query_as("SELECT first_name, last_name FROM candidates WHERE user_id = $1")
            .bind(&user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((first_name.as_str(), last_name.as_str()), ("Jean", "Dupont"));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM notifications WHERE user_id = $1", &user_id).await,
        1
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND type = 'new_application'",
            &employer_id
        )
        .await,
        1
    );

    // Same email and job again: rejected, nothing new stored.
    let (status, body) = send(&app, multipart_request("/applications", &parts[..5], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "already_applied");
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM applications a JOIN candidates c ON c.id = a.candidate_id WHERE c.user_id = $1",
            &user_id
        )
        .await,
        1
    );

    // The identity provider id differs from the generated one; the email links them.
    let session = token(&format!("idp-{}", Uuid::new_v4()), Some(&email), "CANDIDATE");
    let (status, body) = send(&app, json_request("GET", "/applications", None, Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    assert_eq!(body["applications"][0]["job_title"], "Rust Developer");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/admin/applications/{}", application_id),
            Some(&json!({ "status": "accepted" })),
            Some(&admin_token()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let accepted: Vec<String> = sqlx::query_scalar(
        "SELECT message FROM notifications WHERE user_id = $1 AND title = 'Congratulations!'",
    )
    .bind(&user_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].contains("Rust Developer"));

    let (status, body) = send(&app, json_request("GET", "/notifications", None, Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unreadCount"], 2);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        json_request("PATCH", "/notifications/read-all", None, Some(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    // An accepted application can be moved back to an earlier status.
    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/admin/applications/{}", application_id),
            Some(&json!({ "status": "pending" })),
            Some(&admin_token()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let stored: String = sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "pending");
}

#[tokio::test]
async fn applying_to_unknown_job_is_not_found() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let email = format!("ghost+{}@example.com", Uuid::new_v4().simple());
    let parts = [
        Part::Text("job_id", "999999999"),
        Part::Text("name", "Ghost Applicant"),
        Part::Text("email", &email),
    ];
    let (status, body) = send(&app, multipart_request("/applications", &parts, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "job_not_found");
}

#[tokio::test]
async fn batch_delete_is_all_or_nothing() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let first = create_job(&pool, "Batch delete one", None).await;
    let second = create_job(&pool, "Batch delete two", None).await;
    let admin = admin_token();

    let (status, body) = send(
        &app,
        json_request(
            "DELETE",
            "/admin/jobs",
            Some(&json!({ "ids": [first.id, second.id, 999999999] })),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999999999"));
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE id = ANY($1)")
        .bind(vec![first.id, second.id])
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 2);

    let (status, body) = send(
        &app,
        json_request(
            "DELETE",
            "/admin/jobs",
            Some(&json!({ "ids": [first.id, second.id] })),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let job = create_job(&pool, "Backend Engineer", None).await;
    let admin = admin_token();

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/admin/jobs",
            Some(&json!({ "id": job.id, "title": "Senior Backend Engineer" })),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["title"], "Senior Backend Engineer");
    assert_eq!(body["job"]["company"], "Acme");
    assert_eq!(body["job"]["salary_max"], 60000);

    // Only salary_min is sent, but the stored salary_max makes the range invalid.
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/admin/jobs",
            Some(&json!({ "id": job.id, "salary_min": 90000 })),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "salary_min");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/admin/jobs",
            Some(&json!({ "id": 999999999, "title": "Nobody" })),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "job_not_found");
}

#[tokio::test]
async fn search_paginates_matching_jobs() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let marker = format!("zq{}", Uuid::new_v4().simple());
    for i in 0..25 {
        create_job(&pool, &format!("Engineer {} {}", marker, i), None).await;
    }

    let (status, body) = send(
        &app,
        json_request(
            "GET",
            &format!("/jobs?search={}&page=2&limit=10", marker),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 10);
    let pagination: &JsonValue = &body["pagination"];
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["totalCount"], 25);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["hasNext"], true);
    assert_eq!(pagination["hasPrev"], true);
}

#[tokio::test]
async fn job_detail_and_inactive_jobs() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let marker = format!("zq{}", Uuid::new_v4().simple());
    let visible = create_job(&pool, &format!("Visible {}", marker), None).await;
    let closed = create_job(&pool, &format!("Closed {}", marker), None).await;
    sqlx::query("UPDATE jobs SET status = 'closed' WHERE id = $1")
        .bind(closed.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request("GET", &format!("/jobs/{}", visible.id), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["id"], visible.id);

    let (status, body) = send(&app, json_request("GET", "/jobs/999999999", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "job_not_found");

    let (status, body) = send(
        &app,
        json_request("GET", &format!("/jobs?search={}", marker), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![visible.id]);
}

#[tokio::test]
async fn profile_upsert_round_trip() {
    let Some((app, _pool)) = database_app().await else {
        return;
    };
    let sub = format!("idp-{}", Uuid::new_v4());
    let email = format!("profile+{}@example.com", Uuid::new_v4().simple());
    let session = token(&sub, Some(&email), "CANDIDATE");

    let (status, body) = send(&app, json_request("GET", "/profile", None, Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["profile"].is_null());

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/profile",
            Some(&json!({
                "first_name": "Marie",
                "last_name": "Curie",
                "skills": ["physics", "chemistry"],
                "linkedin_url": ""
            })),
            Some(&session),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["profile"]["first_name"], "Marie");

    let (status, body) = send(&app, json_request("GET", "/profile", None, Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["last_name"], "Curie");
    assert_eq!(body["profile"]["skills"], json!(["physics", "chemistry"]));
}

#[tokio::test]
async fn oversized_cv_creates_no_rows() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let job = create_job(&pool, "Oversized CV target", None).await;
    let job_id = job.id.to_string();
    let email = format!("big-cv+{}@example.com", Uuid::new_v4().simple());
    let cv = pdf_bytes(5 * 1024 * 1024 + 1);
    let parts = [
        Part::Text("job_id", &job_id),
        Part::Text("name", "Big File"),
        Part::Text("email", &email),
        Part::File {
            name: "cv",
            file_name: "cv.pdf",
            content_type: "application/pdf",
            data: &cv,
        },
    ];

    let (status, _) = send(&app, multipart_request("/applications", &parts, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM users_sync WHERE email = $1", &email).await,
        0
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM applications WHERE job_id::text = $1",
            &job_id
        )
        .await,
        0
    );
}

#[tokio::test]
async fn notifications_must_reference_existing_records() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let sub = format!("idp-{}", Uuid::new_v4());
    let email = format!("notify+{}@example.com", Uuid::new_v4().simple());
    let session = token(&sub, Some(&email), "CANDIDATE");
    let title = format!("Reminder {}", Uuid::new_v4().simple());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/notifications",
            Some(&json!({
                "type": "system",
                "title": title,
                "message": "Check this job",
                "job_id": 999999999
            })),
            Some(&session),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "job_not_found");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/notifications",
            Some(&json!({
                "type": "system",
                "title": title,
                "message": "Check this application",
                "application_id": 999999999
            })),
            Some(&session),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "application_not_found");
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM notifications WHERE title = $1", &title).await,
        0
    );

    let job = create_job(&pool, "Notification target", None).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/notifications",
            Some(&json!({
                "type": "system",
                "title": title,
                "message": "Check this job",
                "job_id": job.id
            })),
            Some(&session),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM notifications WHERE title = $1", &title).await,
        1
    );
}
