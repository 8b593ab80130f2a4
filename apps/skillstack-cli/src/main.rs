#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod bootstrap;
mod cli;
mod commands;
mod config;
mod logging;

use anyhow::Context;
use clap::Parser;
use identity_sdk::Credentials;

use crate::bootstrap::App;
use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;
    logging::init(&cfg.logging);

    let app = App::build(&cfg).await?;
    if let Some(email) = cli.email.as_deref() {
        let password = cli
            .password
            .as_deref()
            .context("--password or SKILLSTACK_PASSWORD is required with --email")?;
        app.flows
            .sign_in(&Credentials::new(email, password))
            .await
            .context("sign-in failed")?;
    }

    let mut stdout = std::io::stdout();
    let result = commands::run(&app, cli.command, &mut stdout).await;
    app.session.close();
    result
}
