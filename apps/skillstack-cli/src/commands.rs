//! Subcommand handlers. Output goes to the given writer, one record per line.

use std::io::Write;

use anyhow::{Context, bail};
use identity_sdk::{Identity, IdentityState};
use skillstack_courses::Course;
use skillstack_session::{GuardOutcome, SessionState};

use crate::bootstrap::App;
use crate::cli::{Command, CoursesCommand, EnrollmentsCommand};

const MANAGE_COURSES_PATH: &str = "/manage-courses";
const MY_ENROLLMENTS_PATH: &str = "/my-enrollments";
const DASHBOARD_PATH: &str = "/dashboard";

/// Run `command` against `app`.
///
/// # Errors
///
/// Denied navigation, backend failures and write errors.
pub async fn run(app: &App, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::Whoami => whoami(app, out),
        Command::Guard { path } => {
            match app.guard.await_decision(&path).await {
                GuardOutcome::Granted => writeln!(out, "granted")?,
                GuardOutcome::Denied { redirect_to } => writeln!(out, "denied -> {redirect_to}")?,
                GuardOutcome::Resolving => writeln!(out, "resolving")?,
            }
            Ok(())
        }
        Command::Courses { command } => courses(app, command, out).await,
        Command::Enrollments {
            command: EnrollmentsCommand::List,
        } => {
            let user = require_access(app, MY_ENROLLMENTS_PATH).await?;
            for enrollment in app.courses.my_enrollments(&user.email).await? {
                let title = enrollment.course.as_ref().map_or("", |c| c.title.as_str());
                writeln!(out, "{}\t{title}", enrollment.id)?;
            }
            Ok(())
        }
        Command::Enroll { course_id } => {
            let course = app
                .courses
                .get_course(&course_id)
                .await
                .with_context(|| format!("course {course_id} not found"))?;
            let user = app.session.snapshot().identity().cloned();
            app.courses.enroll(user.as_ref(), &course).await?;
            writeln!(out, "enrolled in {}", course.title)?;
            Ok(())
        }
        Command::Stats => {
            require_access(app, DASHBOARD_PATH).await?;
            let stats = app.courses.dashboard_stats().await?;
            writeln!(out, "courses\t{}", stats.total_courses)?;
            writeln!(out, "enrollments\t{}", stats.total_enrollments)?;
            for popular in &stats.popular_courses {
                writeln!(out, "popular\t{}\t{}", popular.title, popular.enrollment_count)?;
            }
            Ok(())
        }
    }
}

fn whoami(app: &App, out: &mut dyn Write) -> anyhow::Result<()> {
    match app.session.snapshot() {
        SessionState::Resolving => writeln!(out, "resolving")?,
        SessionState::Resolved(IdentityState::SignedOut) => writeln!(out, "not signed in")?,
        SessionState::Resolved(IdentityState::SignedIn(identity)) => {
            let name = identity.display_name.as_deref().unwrap_or("-");
            writeln!(out, "{}\t{}\t{name}", identity.id, identity.email)?;
        }
    }
    Ok(())
}

async fn courses(app: &App, command: CoursesCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let listing = match command {
        CoursesCommand::List { mine: false } => app.courses.list_courses().await?,
        CoursesCommand::List { mine: true } => {
            let user = require_access(app, MANAGE_COURSES_PATH).await?;
            app.courses.list_courses_by_creator(&user.email).await?
        }
        CoursesCommand::Popular => app.courses.popular_courses().await?,
        CoursesCommand::Show { id } => {
            let course = app.courses.get_course(&id).await?;
            writeln!(out, "{}", course_line(&course))?;
            writeln!(out, "by {} <{}>", course.creator_name, course.creator_email)?;
            writeln!(out, "{}", course.description)?;
            return Ok(());
        }
    };
    for course in &listing {
        writeln!(out, "{}", course_line(course))?;
    }
    Ok(())
}

fn course_line(course: &Course) -> String {
    let seats = course
        .seats_left
        .map_or_else(|| "-".to_owned(), |n| n.to_string());
    format!(
        "{}\t{}\t{:.2}\t{}\tseats:{seats}",
        course.id, course.title, course.price, course.level
    )
}

/// The signed-in user, if the guard grants `path`.
async fn require_access(app: &App, path: &str) -> anyhow::Result<Identity> {
    match app.guard.await_decision(path).await {
        GuardOutcome::Granted => {}
        GuardOutcome::Denied { redirect_to } => {
            bail!("{path} requires sign-in (redirected to {redirect_to}); pass --email")
        }
        GuardOutcome::Resolving => bail!("session closed before it resolved"),
    }
    // Public paths are granted to anonymous users too.
    app.session
        .snapshot()
        .identity()
        .cloned()
        .with_context(|| format!("{path} requires sign-in"))
}
