//! Capability checks for post mutations.
//!
//! A user holds a permission when they are a superuser or when any of
//! their groups grants it. Every mutating operation calls [`require`]
//! before touching the store.

use crate::{
    errors::ApiError,
    models::{Permission, User},
    states::AppState,
};
use std::collections::BTreeSet;
use tracing::warn;

pub fn permissions_for(state: &AppState, user: &User) -> BTreeSet<Permission> {
    if user.is_superuser {
        return BTreeSet::from([
            Permission::ViewPost,
            Permission::AddPost,
            Permission::ChangePost,
            Permission::DeletePost,
        ]);
    }
    state.group_permissions(user)
}

pub fn has_perm(state: &AppState, user: &User, permission: Permission) -> bool {
    user.is_superuser || state.group_permissions(user).contains(&permission)
}

pub fn require(state: &AppState, user: &User, permission: Permission) -> Result<(), ApiError> {
    if has_perm(state, user, permission) {
        return Ok(());
    }

    warn!("Permission {} denied for user {}", permission, user.username);
    Err(ApiError::Forbidden(format!(
        "You do not have permission to perform this action ({})",
        permission
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bootstrap::setup_groups,
        config::Config,
        states::{AUTHORS_GROUP, NewUser},
    };

    fn state_with_groups() -> AppState {
        let state = AppState::new(Config::new("test-secret"));
        setup_groups(&state);
        state
    }

    fn reader(state: &AppState, username: &str) -> User {
        state
            .create_user(NewUser {
                username: username.into(),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn common_members_hold_no_post_permissions() {
        let state = state_with_groups();
        let user = reader(&state, "reader");

        assert!(permissions_for(&state, &user).is_empty());
        assert!(matches!(
            require(&state, &user, Permission::AddPost),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn authors_may_add_and_change_but_not_delete() {
        let state = state_with_groups();
        let user = reader(&state, "writer");
        let user = state.add_user_to_group(&user.id, AUTHORS_GROUP).unwrap();

        assert!(has_perm(&state, &user, Permission::AddPost));
        assert!(has_perm(&state, &user, Permission::ChangePost));
        assert!(!has_perm(&state, &user, Permission::DeletePost));
    }

    #[test]
    fn superusers_hold_everything() {
        let state = state_with_groups();
        let user = state
            .create_user(NewUser {
                username: "root".into(),
                is_superuser: true,
                ..Default::default()
            })
            .unwrap();

        assert!(require(&state, &user, Permission::DeletePost).is_ok());
        assert_eq!(permissions_for(&state, &user).len(), 4);
    }
}
