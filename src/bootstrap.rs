use crate::{
    config::AdminSeed,
    errors::ApiError,
    models::{Permission, User},
    states::{AUTHORS_GROUP, AppState, COMMON_GROUP, NewUser},
};
use bcrypt::hash;
use tracing::{info, warn};

/// Permissions granted to the `authors` group.
pub const AUTHOR_PERMISSIONS: [Permission; 2] = [Permission::AddPost, Permission::ChangePost];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub common_created: bool,
    pub authors_created: bool,
}

/// Ensures the `common` and `authors` groups exist and that `authors`
/// holds the post add/change permissions. Safe to run any number of times.
pub fn setup_groups(state: &AppState) -> BootstrapReport {
    let (_, common_created) = state.get_or_create_group(COMMON_GROUP);
    if common_created {
        info!("Group {} created", COMMON_GROUP);
    } else {
        warn!("Group {} already exists", COMMON_GROUP);
    }

    let (authors, authors_created) = state.get_or_create_group(AUTHORS_GROUP);
    if let Err(e) = state.grant_permissions(authors.id, &AUTHOR_PERMISSIONS) {
        warn!("Could not grant permissions to {}: {:?}", AUTHORS_GROUP, e);
    } else if authors_created {
        info!("Group {} created with add/change post permissions", AUTHORS_GROUP);
    } else {
        warn!("Group {} already exists", AUTHORS_GROUP);
    }

    BootstrapReport {
        common_created,
        authors_created,
    }
}

/// Creates the configured superuser unless an account with that username
/// already exists. An existing regular account is never promoted.
pub fn ensure_superuser(state: &AppState, seed: &AdminSeed) -> Result<User, ApiError> {
    if let Some(existing) = state.user_by_username(&seed.username) {
        warn_if_not_superuser(&existing);
        return Ok(existing);
    }

    let hashed_password = hash(&seed.password, state.config.bcrypt_cost)
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

    let (user, created) = state.get_or_create_user(NewUser {
        email: seed.email.clone(),
        username: seed.username.clone(),
        hashed_password: Some(hashed_password),
        is_superuser: true,
        ..Default::default()
    })?;

    if created {
        info!("Superuser {} created", user.username);
    } else {
        warn_if_not_superuser(&user);
    }
    Ok(user)
}

fn warn_if_not_superuser(user: &User) {
    if !user.is_superuser {
        warn!(
            "Configured admin username {} belongs to a regular account; not promoting it",
            user.username
        );
    }
}

pub fn seed_categories(state: &AppState, names: &[String]) -> usize {
    names
        .iter()
        .filter(|name| {
            let (category, created) = state.get_or_create_category(name);
            if created {
                info!("Category {} ({}) created", category.name, category.id);
            }
            created
        })
        .count()
}
