//! Course, enrollment and dashboard calls.

use chrono::Utc;
use identity_sdk::Identity;
use serde::Serialize;
use serde::de::IgnoredAny;
use skillstack_http::ApiClient;
use tracing::info;

use crate::error::CoursesError;
use crate::models::{
    Course, CourseDraft, DashboardStats, Enrollment, EnrollmentStatus, RegistrationRecord,
};

const ANONYMOUS_CREATOR: &str = "Anonymous";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCourse<'a> {
    #[serde(flatten)]
    draft: &'a CourseDraft,
    creator_email: &'a str,
    creator_name: &'a str,
    created_at: String,
    enrolled_students: Vec<String>,
    is_published: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest<'a> {
    email: &'a str,
    course_id: &'a str,
}

fn course_path(id: &str) -> String {
    format!("/courses/{}", urlencoding::encode(id))
}

fn validate_draft(draft: &CourseDraft) -> Result<(), CoursesError> {
    if draft.title.trim().is_empty() {
        return Err(CoursesError::InvalidCourse("title is required".to_owned()));
    }
    if draft.total_seats == 0 {
        return Err(CoursesError::InvalidCourse(
            "a course needs at least one seat".to_owned(),
        ));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(CoursesError::InvalidCourse(
            "price must be a non-negative number".to_owned(),
        ));
    }
    Ok(())
}

/// Typed client for the course marketplace endpoints.
#[derive(Clone)]
pub struct CoursesApi {
    http: ApiClient,
}

impl CoursesApi {
    #[must_use]
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &ApiClient {
        &self.http
    }

    /// All published and unpublished courses.
    ///
    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn list_courses(&self) -> Result<Vec<Course>, CoursesError> {
        Ok(self.http.get("/courses", &[]).await?)
    }

    /// Courses created by `email`.
    ///
    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn list_courses_by_creator(&self, email: &str) -> Result<Vec<Course>, CoursesError> {
        Ok(self.http.get("/courses", &[("user", email)]).await?)
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn popular_courses(&self) -> Result<Vec<Course>, CoursesError> {
        Ok(self.http.get("/popular-courses", &[]).await?)
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`]; a missing course is an
    /// `Api` error with status 404.
    pub async fn get_course(&self, id: &str) -> Result<Course, CoursesError> {
        Ok(self.http.get(&course_path(id), &[]).await?)
    }

    /// Publish a new listing owned by `creator`.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` without a creator, `InvalidCourse` for an unusable
    /// draft, otherwise any [`skillstack_http::ApiClientError`].
    pub async fn add_course(
        &self,
        creator: Option<&Identity>,
        draft: &CourseDraft,
    ) -> Result<(), CoursesError> {
        let creator = creator.ok_or(CoursesError::NotSignedIn)?;
        validate_draft(draft)?;

        let body = NewCourse {
            draft,
            creator_email: &creator.email,
            creator_name: creator
                .display_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(ANONYMOUS_CREATOR),
            created_at: Utc::now().to_rfc3339(),
            enrolled_students: Vec::new(),
            is_published: false,
        };
        self.http.post::<_, IgnoredAny>("/courses", &body).await?;
        info!(title = %draft.title, creator = %creator.id, "course added");
        Ok(())
    }

    /// Replace a course's fields. The id travels in the path only.
    ///
    /// # Errors
    ///
    /// `InvalidCourse` if the course cannot be encoded, otherwise any
    /// [`skillstack_http::ApiClientError`].
    pub async fn update_course(&self, course: &Course) -> Result<(), CoursesError> {
        let mut body = serde_json::to_value(course)
            .map_err(|e| CoursesError::InvalidCourse(e.to_string()))?;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("_id");
        }
        self.http
            .put::<_, IgnoredAny>(&course_path(&course.id), &body)
            .await?;
        info!(course_id = %course.id, "course updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn delete_course(&self, id: &str) -> Result<(), CoursesError> {
        self.http.delete::<IgnoredAny>(&course_path(id)).await?;
        info!(course_id = %id, "course deleted");
        Ok(())
    }

    /// Whether `email` is enrolled in `course_id`.
    ///
    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn enrollment_status(
        &self,
        email: &str,
        course_id: &str,
    ) -> Result<bool, CoursesError> {
        let status: EnrollmentStatus = self
            .http
            .get("/enrollments", &[("email", email), ("courseId", course_id)])
            .await?;
        Ok(status.enrolled)
    }

    /// Enroll `student` in `course`. Full courses are rejected without a
    /// request.
    ///
    /// # Errors
    ///
    /// `NotSignedIn`, `NoSeatsLeft`, otherwise any
    /// [`skillstack_http::ApiClientError`].
    pub async fn enroll(
        &self,
        student: Option<&Identity>,
        course: &Course,
    ) -> Result<(), CoursesError> {
        let student = student.ok_or(CoursesError::NotSignedIn)?;
        if !course.has_free_seats() {
            return Err(CoursesError::NoSeatsLeft(course.id.clone()));
        }

        self.http
            .post::<_, IgnoredAny>(
                "/enrollments",
                &EnrollRequest {
                    email: &student.email,
                    course_id: &course.id,
                },
            )
            .await?;
        info!(course_id = %course.id, user_id = %student.id, "enrolled");
        Ok(())
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn my_enrollments(&self, email: &str) -> Result<Vec<Enrollment>, CoursesError> {
        Ok(self.http.get("/my-enrollments", &[("email", email)]).await?)
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn remove_enrollment(&self, enrollment_id: &str) -> Result<(), CoursesError> {
        let path = format!("/enrollments/{}", urlencoding::encode(enrollment_id));
        self.http.delete::<IgnoredAny>(&path).await?;
        info!(enrollment_id, "enrollment removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, CoursesError> {
        Ok(self.http.get("/dashboard-stats", &[]).await?)
    }

    /// Store the profile record of a freshly created account.
    ///
    /// # Errors
    ///
    /// Any [`skillstack_http::ApiClientError`].
    pub async fn register_user(&self, record: &RegistrationRecord) -> Result<(), CoursesError> {
        self.http.post::<_, IgnoredAny>("/register", record).await?;
        Ok(())
    }
}
