//! Backend resource models.

use serde::{Deserialize, Serialize};

/// A course listing as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub duration: String,
    pub category: String,
    pub price: f64,
    pub level: String,
    pub requirements: String,
    pub learnings: String,
    pub total_seats: Option<u32>,
    pub seats_left: Option<u32>,
    pub creator_email: String,
    pub creator_name: String,
    pub created_at: Option<String>,
    pub is_published: bool,
    pub enrolled_students: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}

impl Course {
    /// `false` only when the backend reports zero seats left.
    #[must_use]
    pub fn has_free_seats(&self) -> bool {
        self.seats_left != Some(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub name: String,
    pub comment: String,
}

/// Creator-supplied fields of a new course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub duration: String,
    pub category: String,
    pub price: f64,
    pub level: String,
    pub requirements: String,
    pub learnings: String,
    pub total_seats: u32,
}

/// One of the signed-in user's enrollments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id")]
    pub id: String,
    pub course: Option<Course>,
    pub enrolled_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
}

/// Aggregates shown on the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub popular_courses: Vec<PopularCourse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopularCourse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub enrollment_count: u64,
}

/// Profile record stored by the backend after sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub name: String,
    pub email: String,
    pub accepted_terms: bool,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn course_decodes_backend_document() {
        let course: Course = serde_json::from_value(json!({
            "_id": "665f",
            "title": "Rust for Web",
            "price": 49.5,
            "totalSeats": 20,
            "seatsLeft": 0,
            "creatorEmail": "ann@example.com",
            "reviews": [{ "name": "Bo", "comment": "great" }],
            "unknownField": true
        }))
        .unwrap();

        assert_eq!(course.id, "665f");
        assert_eq!(course.total_seats, Some(20));
        assert!(!course.has_free_seats());
        assert_eq!(course.reviews.len(), 1);
        assert!(!course.is_published);
    }

    #[test]
    fn missing_seat_count_means_free_seats() {
        let course: Course = serde_json::from_value(json!({ "_id": "1" })).unwrap();
        assert!(course.has_free_seats());
    }

    #[test]
    fn dashboard_stats_default_missing_counts() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "popularCourses": [{ "title": "Rust", "enrollmentCount": 7 }]
        }))
        .unwrap();

        assert_eq!(stats.total_courses, 0);
        assert_eq!(stats.popular_courses[0].enrollment_count, 7);
    }

    #[test]
    fn registration_record_uses_backend_field_names() {
        let record = RegistrationRecord {
            name: "Ann".to_owned(),
            email: "ann@example.com".to_owned(),
            accepted_terms: true,
            photo_url: "https://img.test/a.png".to_owned(),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "name": "Ann",
                "email": "ann@example.com",
                "acceptedTerms": true,
                "photoURL": "https://img.test/a.png"
            })
        );
    }
}
