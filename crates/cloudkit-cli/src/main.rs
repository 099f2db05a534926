//! cloud - command-line client for the hosting platform.
//!
//! Thin command glue over `cloudkit-core`: every command that talks to the
//! platform goes through the token-refreshing API client, and an expired
//! session is reported as a request to log in again.

use std::io;

use anyhow::{bail, Context, Result};
use cloudkit_core::{ClientError, CloudApi, Config, HttpTransport, TokenStore};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "\
Usage: cloud <command> [args]

Commands:
  login <email>            Log in and store a session
  logout                   Forget the stored session
  me                       Show the logged-in account
  apps                     List applications
  app <project> <slug> <name>
                           Create an application in a project
  envs <app>               List environments of an application
  hosting <app> <git-url>  Add hosting to an application";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        if let Some(ClientError::LoginRequired) = e.downcast_ref::<ClientError>() {
            eprintln!("You need to be logged in to use the platform.");
            eprintln!("Log in with: cloud login <email>");
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load().context("Failed to load config")?;
    let config_dir = Config::config_dir()?;
    debug!(api_url = %config.api_url, config_dir = %config_dir.display(), "Loaded config");

    match command.as_str() {
        "login" => {
            let email = arg(args, 1, "email")?;
            let store = TokenStore::open(&config_dir)?;
            let api = connect(config, store)?;
            let password = rpassword::prompt_password("Password: ")
                .context("Failed to read password")?;
            api.login(email, &password).await?;
            println!("Logged in as {}", email);
        }
        "logout" => {
            let store = TokenStore::open(&config_dir)?;
            connect(config, store)?.logout()?;
            println!("Logged out");
        }
        "me" => {
            let api = connect(config, TokenStore::require_global(&config_dir)?)?;
            let user = api.me().await?;
            match user.full_name() {
                Some(name) => println!("{} <{}>", name, user.email),
                None => println!("{}", user.email),
            }
        }
        "apps" => {
            let api = connect(config, TokenStore::require_global(&config_dir)?)?;
            let apps = api.applications().await?;
            if apps.is_empty() {
                println!("No applications");
            }
            for app in apps {
                println!("{:<24} {}", app.repo_name, app.name);
            }
        }
        "app" => {
            let project_id = arg(args, 1, "project")?;
            let repo_name = arg(args, 2, "slug")?;
            let name = arg(args, 3, "name")?;
            let api = connect(config, TokenStore::require_global(&config_dir)?)?;
            let app = api.create_application(project_id, repo_name, name).await?;
            info!(id = ?app.id, "Application created");
            println!("Created application '{}' ({})", app.name, app.repo_name);
        }
        "envs" => {
            let repo_name = arg(args, 1, "app")?;
            let api = connect(config, TokenStore::require_global(&config_dir)?)?;
            for env in api.environments(repo_name).await? {
                println!(
                    "{:<16} {:<12} {}",
                    env.name,
                    env.default_branch.as_deref().unwrap_or("-"),
                    env.display_replicas()
                );
            }
        }
        "hosting" => {
            let repo_name = arg(args, 1, "app")?;
            let git_url = arg(args, 2, "git-url")?;
            let api = connect(config, TokenStore::require_global(&config_dir)?)?;
            let hosting = api.create_hosting(repo_name, git_url).await?;
            info!(id = ?hosting.id, "Hosting created");
            println!("Added hosting to '{}' ({})", repo_name, hosting.git_url);
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
    Ok(())
}

fn connect(config: Config, store: TokenStore) -> Result<CloudApi<HttpTransport>> {
    Ok(CloudApi::connect(config, store)?)
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("Missing <{}>\n\n{}", name, USAGE))
}
