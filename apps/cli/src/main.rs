//! Warden command-line evaluator.

#![forbid(unsafe_code)]

mod cli_config;
mod state;

use std::env;

use tracing_subscriber::EnvFilter;
use warden_application::RegisterParams;
use warden_core::{AppError, AppResult, TeamId, UserId, UserIdentity};
use warden_domain::{Action, Subject};

use crate::cli_config::CliConfig;
use crate::state::AppState;

const USAGE: &str = "usage:
  warden-cli can <user> <action> <subject>
  warden-cli feature <user> <feature-key>
  warden-cli limit <user> <limit-key>
  warden-cli team-role <user> <team>
  warden-cli products <user> <team>
  warden-cli overview <user>
  warden-cli register <email> <display-name>

The store is rebuilt from the seed on every run: `register` validates a
registration against the seed and prints the would-be user, nothing is kept.";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = CliConfig::load()?;
    let state = AppState::build(&config).await?;

    run(&state, &args).await
}

async fn run(state: &AppState, args: &[String]) -> AppResult<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["can", user, action, subject] => {
            let allowed = state
                .authorization_service
                .user_can(
                    &UserId::new(*user)?,
                    &Action::parse(action)?,
                    &Subject::parse(subject)?,
                )
                .await;
            println!("{}", decision(allowed));
        }
        ["feature", user, key] => {
            let enabled = state
                .entitlement_service
                .can(&UserId::new(*user)?, key)
                .await;
            println!("{}", if enabled { "enabled" } else { "disabled" });
        }
        ["limit", user, key] => {
            let limit = state
                .entitlement_service
                .get_limit(&UserId::new(*user)?, key)
                .await;
            println!("{limit}");
        }
        ["team-role", user, team] => {
            let access = state
                .team_service
                .team_access(&UserId::new(*user)?, &TeamId::new(*team)?)
                .await;
            match access.role() {
                Some(role) => println!(
                    "{role} invite={} manage={} remove={}",
                    access.can_invite_members(),
                    access.can_manage_members(),
                    access.can_remove_members()
                ),
                None => println!("not a member"),
            }
        }
        ["products", user, team] => {
            let actor = identity(state, user, Some(*team)).await?;
            for product in state.product_service.list_products(&actor).await? {
                println!(
                    "{}\t{}\t{:?}",
                    product.id, product.name, product.status
                );
            }
        }
        ["overview", user] => {
            let overview = state
                .dashboard_service
                .overview(&identity(state, user, None).await?)
                .await?;
            println!(
                "users={} teams={}",
                overview.total_users, overview.total_teams
            );
            for entry in overview.plan_distribution {
                println!("{}\t{}\t{}", entry.plan_id, entry.plan_name, entry.users);
            }
        }
        ["register", email, display_name] => {
            let user = state
                .user_service
                .register_user(RegisterParams {
                    display_name: (*display_name).to_owned(),
                    email: (*email).to_owned(),
                    credential_ref: None,
                    plan_id: None,
                })
                .await?;
            println!("{}\t{}\t{}", user.id, user.email, user.plan_id);
        }
        _ => return Err(AppError::Validation(USAGE.to_owned())),
    }

    Ok(())
}

async fn identity(state: &AppState, user: &str, team: Option<&str>) -> AppResult<UserIdentity> {
    let user_id = UserId::new(user)?;
    let team_id = team.map(TeamId::new).transpose()?;
    let user = state
        .user_service
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

    Ok(UserIdentity::new(
        user.id,
        user.display_name,
        Some(user.email.to_string()),
        team_id,
    ))
}

fn decision(allowed: bool) -> &'static str {
    if allowed { "allowed" } else { "denied" }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
