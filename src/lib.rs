pub mod auth;
pub mod authoring;
pub mod authz;
pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod filters;
pub mod models;
pub mod routes;
pub mod states;

pub use config::Config;
pub use routes::router;
pub use states::AppState;

use tracing::{info, warn};

/// Builds the shared state and runs the startup bootstrap: groups, the
/// optional superuser, and seeded categories.
pub fn init_state(config: Config) -> Result<AppState, errors::ApiError> {
    let state = AppState::new(config);

    bootstrap::setup_groups(&state);

    if let Some(seed) = state.config.admin.clone() {
        bootstrap::ensure_superuser(&state, &seed)?;
    } else {
        warn!("ADMIN_USERNAME/ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping superuser seed");
    }

    let seeded = bootstrap::seed_categories(&state, &state.config.seed_categories);
    if seeded > 0 {
        info!("Seeded {} categories", seeded);
    }

    Ok(state)
}
