//! Courses API client.
//!
//! Typed calls for courses, enrollments, dashboard statistics and the
//! registration record, issued through the authenticated [`ApiClient`].
//!
//! [`ApiClient`]: skillstack_http::ApiClient
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

pub use api::CoursesApi;
pub use error::CoursesError;
pub use models::{
    Course, CourseDraft, DashboardStats, Enrollment, EnrollmentStatus, PopularCourse,
    RegistrationRecord, Review,
};
