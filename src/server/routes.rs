use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use crate::entity::{Course, Enrollment, Instructor, Record, Student};
use crate::server::AppState;
use crate::store::{Collection, StoreStats};
use crate::Error;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse { message: text.into() })
}

/// Handler failure: a malformed request or a store rejection
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Store(Error),
}

impl ApiError {
    fn missing_fields() -> Self {
        ApiError::BadRequest("Missing required fields".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(err) if !err.is_validation() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(err) => match err {
                Error::DuplicateKey { .. } => StatusCode::CONFLICT,
                Error::NotFound { .. } => StatusCode::NOT_FOUND,
                Error::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                Error::ReferentialIntegrityViolation { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Store(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// A scalar field as posted by clients: form inputs arrive as strings,
/// scripted clients often send numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(i64),
    Text(String),
}

impl Field {
    fn into_text(self) -> String {
        match self {
            Field::Number(n) => n.to_string(),
            Field::Text(s) => s.trim().to_string(),
        }
    }

    fn into_credits(self) -> Result<u32, ApiError> {
        let parsed = match &self {
            Field::Number(n) => u32::try_from(*n).ok(),
            Field::Text(s) => s.trim().parse::<u32>().ok(),
        };
        parsed.ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid credits: {}",
                self.into_text()
            ))
        })
    }
}

fn required_id(field: Option<Field>) -> Result<String, ApiError> {
    required(field.map(Field::into_text))
}

fn required(field: Option<String>) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ApiError::missing_fields()),
    }
}

fn optional(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Turn an extractor rejection (bad JSON, wrong field types, missing
/// content type) into our own 400 body
fn decode<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })
}

/// Request body that decodes into one record
pub trait Payload: DeserializeOwned + Send + 'static {
    type Record: Collection + Send + Sync + 'static;

    fn into_record(self) -> Result<Self::Record, ApiError>;
}

#[derive(Debug, Deserialize)]
pub struct StudentPayload {
    pub student_id: Option<Field>,
    pub name: Option<String>,
    pub credits: Option<Field>,
}

impl Payload for StudentPayload {
    type Record = Student;

    fn into_record(self) -> Result<Student, ApiError> {
        let id = required_id(self.student_id)?;
        let name = required(self.name)?;
        let credits = self.credits.ok_or_else(ApiError::missing_fields)?.into_credits()?;
        Ok(Student::new(id, name, credits))
    }
}

#[derive(Debug, Deserialize)]
pub struct InstructorPayload {
    pub instructor_id: Option<Field>,
    pub name: Option<String>,
    pub department: Option<String>,
}

impl Payload for InstructorPayload {
    type Record = Instructor;

    fn into_record(self) -> Result<Instructor, ApiError> {
        Ok(Instructor::new(
            required_id(self.instructor_id)?,
            required(self.name)?,
            required(self.department)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct CoursePayload {
    pub course_id: Option<Field>,
    pub title: Option<String>,
    /// Optional: an absent or empty value leaves the course unassigned
    pub instructor_id: Option<Field>,
}

impl Payload for CoursePayload {
    type Record = Course;

    fn into_record(self) -> Result<Course, ApiError> {
        let instructor_id = self
            .instructor_id
            .map(Field::into_text)
            .unwrap_or_default();
        Ok(Course::new(
            required_id(self.course_id)?,
            required(self.title)?,
            instructor_id,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentPayload {
    pub enrollment_id: Option<Field>,
    pub student_id: Option<Field>,
    pub course_id: Option<Field>,
    #[serde(alias = "enrollment_semester")]
    pub semester: Option<String>,
    #[serde(alias = "enrollment_grade")]
    pub grade: Option<String>,
}

impl Payload for EnrollmentPayload {
    type Record = Enrollment;

    fn into_record(self) -> Result<Enrollment, ApiError> {
        let enrollment = Enrollment::new(
            required_id(self.enrollment_id)?,
            required_id(self.student_id)?,
            required_id(self.course_id)?,
            required(self.semester)?,
        );
        Ok(match optional(self.grade) {
            Some(grade) => enrollment.with_grade(grade),
            None => enrollment,
        })
    }
}

pub async fn init_db(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.store.write().await.reset();
    message("Database initialized successfully!")
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StoreStats> {
    Json(state.store.read().await.stats())
}

pub async fn list<R>(State(state): State<Arc<AppState>>) -> Json<Vec<R>>
where
    R: Collection + Serialize + Send + Sync + 'static,
{
    let store = state.store.read().await;
    Json(store.list::<R>().to_vec())
}

pub async fn create<P: Payload>(
    State(state): State<Arc<AppState>>,
    body: Result<Json<P>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = decode(body)?.into_record()?;
    state.store.write().await.create(record)?;
    Ok(message(format!("{} added successfully!", <P::Record as Record>::KIND)))
}

pub async fn update<P: Payload>(
    State(state): State<Arc<AppState>>,
    body: Result<Json<P>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = decode(body)?.into_record()?;
    state.store.write().await.update(record)?;
    Ok(message(format!("{} updated successfully!", <P::Record as Record>::KIND)))
}

/// Remove by id; the body carries `<kind>_id`, e.g. `{"student_id": "S1"}`.
///
/// An absent or unreadable body counts as a missing id.
pub async fn remove<R>(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
    R: Collection + Send + Sync + 'static,
{
    let body = decode(body).unwrap_or_default();
    let key = format!("{}_id", R::KIND.as_str());
    let id = body
        .get(&key)
        .cloned()
        .and_then(|value| serde_json::from_value::<Field>(value).ok())
        .map(Field::into_text)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {} ID", R::KIND.as_str())))?;

    state.store.write().await.remove::<R>(&id)?;
    Ok(message(format!("{} removed successfully!", R::KIND)))
}
