use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use school_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ServerSettings;
use crate::handlers::{
    app::health_check,
    attendance::{attendance_for_date, record_attendance},
    auth::{login_handler, logout_handler, me_handler, refresh_handler},
    classes::class_grades,
    dashboard::dashboard_handler,
    messages::{
        get_conversation, list_contacts, list_conversations, mark_message_read, recent_messages,
        send_message, unread_messages,
    },
    people::{get_teacher, parent_students},
    students::{get_student, register_student, student_attendance, student_grades},
};
use crate::AppState;

pub fn build_router(state: AppState, server: &ServerSettings) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            server.session_idle_hours,
        )));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/students", post(register_student))
        .route("/students/:id", get(get_student))
        .route("/students/:id/attendance", get(student_attendance))
        .route("/students/:id/grades", get(student_grades))
        .route("/parents/:id/students", get(parent_students))
        .route("/teachers/:id", get(get_teacher))
        .route(
            "/attendance",
            get(attendance_for_date).post(record_attendance),
        )
        .route("/classes/:id/grades", get(class_grades))
        .route("/messages", get(list_conversations).post(send_message))
        .route("/messages/recent", get(recent_messages))
        .route("/messages/unread", get(unread_messages))
        .route("/messages/:id", get(get_conversation))
        .route("/messages/:id/read", post(mark_message_read))
        .route("/contacts", get(list_contacts))
        .layer(session_layer)
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
