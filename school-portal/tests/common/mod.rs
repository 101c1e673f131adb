#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use school_portal::config::ServerSettings;
use school_portal::models::{
    AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, ParentRecord, StudentRecord,
    TeacherRecord,
};
use school_portal::services::{
    AdminAllowList, RoleResolver, RosterError, RosterSource, SchoolService,
};
use school_portal::startup::build_router;
use school_portal::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "direction@ecole.fr";
pub const TEACHER_EMAIL: &str = "anne.martin@ecole.fr";
pub const PARENT_EMAIL: &str = "dupont@mail.fr";

#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub teachers: Vec<TeacherRecord>,
    pub parents: Vec<ParentRecord>,
    pub students: Vec<StudentRecord>,
    pub classes: Vec<ClassRecord>,
    pub attendance: Vec<AttendanceRecord>,
    pub grades: Vec<GradeRecord>,
    pub messages: Vec<MessageRecord>,
}

/// Roster held in memory. Setting `failing` makes every lookup fail the way
/// an exhausted retry would.
#[derive(Default)]
pub struct InMemoryRoster {
    data: RwLock<Fixture>,
    failing: AtomicBool,
}

impl InMemoryRoster {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            data: RwLock::new(fixture),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn update(&self, change: impl FnOnce(&mut Fixture)) {
        change(&mut self.data.write().unwrap());
    }

    fn read<T>(&self, sheet: &str, pick: impl FnOnce(&Fixture) -> T) -> Result<T, RosterError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RosterError::lookup(sheet, 3, "connection refused"));
        }
        Ok(pick(&self.data.read().unwrap()))
    }
}

#[async_trait]
impl RosterSource for InMemoryRoster {
    async fn teachers(&self) -> Result<Vec<TeacherRecord>, RosterError> {
        self.read("Enseignants", |f| f.teachers.clone())
    }

    async fn parents(&self) -> Result<Vec<ParentRecord>, RosterError> {
        self.read("Parents", |f| f.parents.clone())
    }

    async fn students(&self) -> Result<Vec<StudentRecord>, RosterError> {
        self.read("Élèves", |f| f.students.clone())
    }

    async fn classes(&self) -> Result<Vec<ClassRecord>, RosterError> {
        self.read("Classes", |f| f.classes.clone())
    }

    async fn attendance(&self) -> Result<Vec<AttendanceRecord>, RosterError> {
        self.read("Présences", |f| f.attendance.clone())
    }

    async fn grades(&self) -> Result<Vec<GradeRecord>, RosterError> {
        self.read("Notes", |f| f.grades.clone())
    }

    async fn messages(&self) -> Result<Vec<MessageRecord>, RosterError> {
        self.read("Messages", |f| f.messages.clone())
    }
}

pub fn teacher(id: &str, email: &str, first: &str, last: &str) -> TeacherRecord {
    TeacherRecord {
        id: id.into(),
        email: email.into(),
        first_name: Some(first.into()),
        last_name: Some(last.into()),
        subject: None,
        phone: None,
    }
}

pub fn parent(id: &str, email: &str, first: &str, last: &str) -> ParentRecord {
    ParentRecord {
        id: id.into(),
        email: email.into(),
        first_name: Some(first.into()),
        last_name: Some(last.into()),
        phone: None,
    }
}

pub fn student(id: &str, parent_id: &str, class_id: &str) -> StudentRecord {
    StudentRecord {
        id: id.into(),
        parent_id: parent_id.into(),
        class_id: Some(class_id.into()),
        first_name: None,
        last_name: None,
        date_of_birth: None,
        created_date: None,
    }
}

pub fn class(id: &str, name: &str, teacher_id: &str) -> ClassRecord {
    ClassRecord {
        id: id.into(),
        name: Some(name.into()),
        level: None,
        teacher_id: Some(teacher_id.into()),
    }
}

pub fn attendance(student_id: &str, date: NaiveDate, present: bool) -> AttendanceRecord {
    AttendanceRecord {
        date,
        student_id: student_id.into(),
        present,
        justified: !present,
        note: None,
        teacher_id: None,
    }
}

pub fn grade(student_id: &str, subject: &str, value: f64, day: u32) -> GradeRecord {
    GradeRecord {
        student_id: student_id.into(),
        subject: subject.into(),
        grade: value,
        date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        comment: None,
        teacher_id: Some("t1".into()),
    }
}

pub fn message(id: &str, from: &str, to: &str, hour: u32, read: bool) -> MessageRecord {
    MessageRecord {
        id: id.into(),
        sender_id: from.into(),
        receiver_id: to.into(),
        date: Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap(),
        content: Some(format!("message {}", id)),
        read,
        kind: None,
    }
}

/// Two teachers, two parents, three students across two classes.
pub fn school_fixture() -> Fixture {
    let today = chrono::Local::now().date_naive();

    Fixture {
        teachers: vec![
            teacher("t1", "Anne.Martin@ecole.fr", "Anne", "Martin"),
            teacher("t2", "paul.durand@ecole.fr", "Paul", "Durand"),
        ],
        parents: vec![
            parent("p1", PARENT_EMAIL, "Marie", "Dupont"),
            parent("p2", "leroy@mail.fr", "Jean", "Leroy"),
        ],
        students: vec![
            student("s1", "p1", "c1"),
            student("s2", "p2", "c1"),
            student("s3", "p1", "c2"),
        ],
        classes: vec![class("c1", "CM1", "t1"), class("c2", "CE2", "t2")],
        attendance: vec![
            attendance("s1", today - Duration::days(1), true),
            attendance("s1", today - Duration::days(2), false),
            attendance("s2", today - Duration::days(1), true),
        ],
        grades: vec![
            grade("s1", "Maths", 14.0, 1),
            grade("s1", "Maths", 16.0, 8),
            grade("s2", "Maths", 9.0, 8),
            grade("s3", "Français", 12.0, 5),
        ],
        messages: vec![
            message("m1", "t1", "p1", 9, false),
            message("m2", "p1", "t1", 8, true),
            message("m3", "t2", "t1", 10, false),
        ],
    }
}

pub fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        session_idle_hours: 1,
    }
}

pub fn spawn_app(roster: Arc<InMemoryRoster>) -> Router {
    let admins = AdminAllowList::new([ADMIN_EMAIL]);
    let state = AppState::new(
        Arc::new(RoleResolver::new(admins, roster.clone())),
        Arc::new(SchoolService::new(roster)),
    );
    build_router(state, &server_settings())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    /// `name=value` part of the session cookie, if one was set.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn login(app: &Router, email: &str) -> TestResponse {
    send(
        app,
        Request::post("/auth/login")
            .header("x-user-email", email)
            .header("x-user-id", format!("auth|{}", email))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Log in and return the session cookie.
pub async fn login_cookie(app: &Router, email: &str) -> String {
    let response = login(app, email).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.session_cookie().expect("login sets a session cookie")
}

pub async fn get(app: &Router, uri: &str, cookie: &str) -> TestResponse {
    send(
        app,
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> TestResponse {
    send(
        app,
        Request::post(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}
