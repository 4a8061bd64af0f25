use std::env;
use std::path::PathBuf;

use warden_core::{AppError, AppResult, PlanId, RoleId};

const DEFAULT_ROLE_ID: &str = "2";
const DEFAULT_PLAN_ID: &str = "1";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub seed_path: Option<PathBuf>,
    pub default_role_id: RoleId,
    pub default_plan_id: PlanId,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        let seed_path = optional_env("WARDEN_SEED_PATH").map(PathBuf::from);
        let default_role_id = RoleId::new(
            optional_env("WARDEN_DEFAULT_ROLE_ID").unwrap_or_else(|| DEFAULT_ROLE_ID.to_owned()),
        )
        .map_err(|_| invalid("WARDEN_DEFAULT_ROLE_ID"))?;
        let default_plan_id = PlanId::new(
            optional_env("WARDEN_DEFAULT_PLAN_ID").unwrap_or_else(|| DEFAULT_PLAN_ID.to_owned()),
        )
        .map_err(|_| invalid("WARDEN_DEFAULT_PLAN_ID"))?;

        Ok(Self {
            seed_path,
            default_role_id,
            default_plan_id,
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn invalid(name: &str) -> AppError {
    AppError::Validation(format!("{name} must be a non-empty identifier"))
}
