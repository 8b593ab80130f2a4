use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "skillstack", version, about = "SkillStack course marketplace client")]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sign in with this email before running the command.
    #[arg(long, global = true)]
    pub email: Option<String>,

    #[arg(long, global = true, env = "SKILLSTACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signed-in user.
    Whoami,
    /// Show the route guard decision for a path.
    Guard { path: String },
    /// Browse courses.
    Courses {
        #[command(subcommand)]
        command: CoursesCommand,
    },
    /// Your enrollments.
    Enrollments {
        #[command(subcommand)]
        command: EnrollmentsCommand,
    },
    /// Enroll in a course.
    Enroll { course_id: String },
    /// Dashboard statistics.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum CoursesCommand {
    List {
        /// Only courses you created.
        #[arg(long)]
        mine: bool,
    },
    Show {
        id: String,
    },
    Popular,
}

#[derive(Debug, Subcommand)]
pub enum EnrollmentsCommand {
    List,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "skillstack",
            "courses",
            "list",
            "--mine",
            "--email",
            "a@b.com",
            "--password",
            "Secret#123",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Command::Courses {
                command: CoursesCommand::List { mine: true }
            }
        ));
        assert_eq!(cli.email.as_deref(), Some("a@b.com"));
        assert_eq!(cli.password.as_deref(), Some("Secret#123"));
    }

    #[test]
    fn guard_requires_a_path() {
        assert!(Cli::try_parse_from(["skillstack", "guard"]).is_err());
        let cli = Cli::try_parse_from(["skillstack", "guard", "/dashboard"]).unwrap();
        assert!(matches!(cli.command, Command::Guard { path } if path == "/dashboard"));
    }
}
