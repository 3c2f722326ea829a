//! Post creation, editing and deletion.
//!
//! Each operation takes the acting user explicitly and asks [`authz`] for
//! the matching permission before it reads or validates anything else.

use crate::{
    authz,
    dto::PostForm,
    errors::ApiError,
    models::{Author, Permission, Post, PostType, User},
    states::{AppState, NewUser},
};
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{info, warn};
use validator::Validate;

/// Username of the placeholder account created when no author exists.
pub const AUTO_AUTHOR_USERNAME: &str = "auto_author";

pub fn create_post(
    state: &AppState,
    user: &User,
    post_type: PostType,
    form: PostForm,
) -> Result<Post, ApiError> {
    authz::require(state, user, Permission::AddPost)?;
    form.validate()?;
    let categories = resolve_categories(state, &form.categories)?;
    let author = resolve_author(state, form.author_id)?;

    let now = Utc::now();
    let post = Post {
        id: state.next_post_id(),
        author_id: author.id,
        post_type,
        title: form.title,
        text: form.text,
        categories,
        created_at: now,
        updated_at: now,
    };

    state.posts.insert(post.id, post.clone());

    info!(
        "{} {} created by user {} (author {})",
        post_type.as_str(),
        post.id,
        user.username,
        author.id
    );

    Ok(post)
}

pub fn update_post(
    state: &AppState,
    user: &User,
    post_type: PostType,
    id: u64,
    form: PostForm,
) -> Result<Post, ApiError> {
    authz::require(state, user, Permission::ChangePost)?;
    state.post_of_type(post_type, id).ok_or(ApiError::NotFound)?;
    form.validate()?;
    let categories = resolve_categories(state, &form.categories)?;
    let author_id = match form.author_id {
        Some(author_id) => Some(explicit_author(state, author_id)?.id),
        None => None,
    };

    // Mutate under the entry lock so a concurrent delete is never undone.
    let post = {
        let mut post = state
            .posts
            .get_mut(&id)
            .filter(|p| p.post_type == post_type)
            .ok_or(ApiError::NotFound)?;
        if let Some(author_id) = author_id {
            post.author_id = author_id;
        }
        post.title = form.title;
        post.text = form.text;
        post.categories = categories;
        post.updated_at = Utc::now();
        post.clone()
    };

    info!("{} {} updated by user {}", post_type.as_str(), id, user.username);

    Ok(post)
}

pub fn delete_post(
    state: &AppState,
    user: &User,
    post_type: PostType,
    id: u64,
) -> Result<Post, ApiError> {
    authz::require(state, user, Permission::DeletePost)?;

    let (_, post) = state
        .posts
        .remove_if(&id, |_, p| p.post_type == post_type)
        .ok_or(ApiError::NotFound)?;

    info!("{} {} deleted by user {}", post_type.as_str(), id, user.username);

    Ok(post)
}

/// Usernames signup may not claim: the fallback chain resolves authors
/// through them.
pub fn is_reserved_username(state: &AppState, username: &str) -> bool {
    username == AUTO_AUTHOR_USERNAME || username == state.config.default_author_username
}

/// Picks the author for a new post.
///
/// An explicit id must exist. Without one, and unless the deployment
/// requires explicit authors, falls back to the configured default
/// author's record, then the first author by id, then a freshly created
/// placeholder account.
pub fn resolve_author(state: &AppState, requested: Option<u64>) -> Result<Author, ApiError> {
    if let Some(author_id) = requested {
        return explicit_author(state, author_id);
    }

    if state.config.require_explicit_author {
        return Err(ApiError::field(
            "author_id",
            "required",
            "An author must be selected",
        ));
    }

    if let Some(author) = state
        .user_by_username(&state.config.default_author_username)
        .and_then(|user| state.author_for_user(&user.id))
    {
        return Ok(author);
    }

    if let Some(author) = state.first_author() {
        return Ok(author);
    }

    let (placeholder, created) = state.get_or_create_user(NewUser {
        username: AUTO_AUTHOR_USERNAME.to_string(),
        first_name: "Automatic".to_string(),
        last_name: "Author".to_string(),
        ..Default::default()
    })?;
    if created {
        info!("Placeholder user {} created", placeholder.username);
    } else if placeholder.hashed_password.is_some() {
        warn!(
            "Refusing to attribute posts to {}: the account can log in",
            placeholder.username
        );
        return Err(ApiError::field(
            "author_id",
            "required",
            "No author is available; select one",
        ));
    }

    let (author, _) = state.get_or_create_author(placeholder.id);
    Ok(author)
}

fn explicit_author(state: &AppState, author_id: u64) -> Result<Author, ApiError> {
    state.author(author_id).ok_or_else(|| {
        ApiError::field(
            "author_id",
            "invalid_choice",
            format!("Author {} does not exist", author_id),
        )
    })
}

fn resolve_categories(state: &AppState, ids: &[u64]) -> Result<BTreeSet<u64>, ApiError> {
    if let Some(missing) = ids.iter().find(|id| state.category(**id).is_none()) {
        return Err(ApiError::field(
            "categories",
            "invalid_choice",
            format!("Category {} does not exist", missing),
        ));
    }
    Ok(ids.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bootstrap::setup_groups,
        config::Config,
        states::AUTHORS_GROUP,
    };

    fn state_with(config: Config) -> AppState {
        let state = AppState::new(config);
        setup_groups(&state);
        state
    }

    fn state() -> AppState {
        state_with(Config::new("test-secret"))
    }

    fn user(state: &AppState, username: &str) -> User {
        state
            .create_user(NewUser {
                username: username.into(),
                ..Default::default()
            })
            .unwrap()
    }

    fn author_user(state: &AppState, username: &str) -> User {
        let u = user(state, username);
        state.add_user_to_group(&u.id, AUTHORS_GROUP).unwrap()
    }

    fn form(title: &str) -> PostForm {
        PostForm {
            title: title.into(),
            text: "Body text".into(),
            categories: vec![],
            author_id: None,
        }
    }

    #[test]
    fn fallback_creates_single_placeholder_author() {
        let state = state();
        let writer = author_user(&state, "writer");

        let first = create_post(&state, &writer, PostType::News, form("one")).unwrap();
        let second = create_post(&state, &writer, PostType::News, form("two")).unwrap();

        assert_eq!(first.author_id, second.author_id);
        assert_eq!(state.authors.len(), 1);
        let placeholder = state.user_by_username(AUTO_AUTHOR_USERNAME).unwrap();
        assert!(placeholder.hashed_password.is_none());
        assert_eq!(
            state.author_for_user(&placeholder.id).map(|a| a.id),
            Some(first.author_id)
        );
    }

    #[test]
    fn fallback_prefers_default_author_then_first_author() {
        let state = state();
        let someone = user(&state, "someone");
        let (first_author, _) = state.get_or_create_author(someone.id);

        assert_eq!(resolve_author(&state, None).unwrap().id, first_author.id);

        let default = user(&state, "default_author");
        let (default_author, _) = state.get_or_create_author(default.id);

        assert_eq!(resolve_author(&state, None).unwrap().id, default_author.id);
        assert!(state.user_by_username(AUTO_AUTHOR_USERNAME).is_none());
    }

    #[test]
    fn explicit_author_must_exist() {
        let state = state();
        let writer = author_user(&state, "writer");
        let mut f = form("t");
        f.author_id = Some(42);

        let err = create_post(&state, &writer, PostType::Article, f).unwrap_err();
        assert!(matches!(err, ApiError::FormInvalid(_)));
        assert!(state.posts.is_empty());
    }

    #[test]
    fn strict_mode_rejects_missing_author() {
        let mut config = Config::new("test-secret");
        config.require_explicit_author = true;
        let state = state_with(config);
        let writer = author_user(&state, "writer");

        let err = create_post(&state, &writer, PostType::News, form("t")).unwrap_err();
        assert!(matches!(err, ApiError::FormInvalid(_)));
        assert!(state.posts.is_empty());
        assert!(state.authors.is_empty());
    }

    #[test]
    fn permission_is_checked_before_validation() {
        let state = state();
        let reader = user(&state, "reader");

        let err = create_post(&state, &reader, PostType::News, form("")).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = update_post(&state, &reader, PostType::News, 999, form("")).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn unknown_category_is_a_form_error() {
        let state = state();
        let writer = author_user(&state, "writer");
        let mut f = form("t");
        f.categories = vec![5];

        let err = create_post(&state, &writer, PostType::News, f).unwrap_err();
        assert!(matches!(err, ApiError::FormInvalid(_)));
    }

    #[test]
    fn update_is_scoped_to_post_type() {
        let state = state();
        let writer = author_user(&state, "writer");
        let (category, _) = state.get_or_create_category("Science");
        let post = create_post(&state, &writer, PostType::Article, form("orig")).unwrap();

        let err = update_post(&state, &writer, PostType::News, post.id, form("x")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let mut f = form("edited");
        f.categories = vec![category.id];
        let updated = update_post(&state, &writer, PostType::Article, post.id, f).unwrap();
        assert_eq!(updated.title, "edited");
        assert_eq!(updated.post_type, PostType::Article);
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.categories.contains(&category.id));
    }

    #[test]
    fn authors_cannot_delete_but_superusers_can() {
        let state = state();
        let writer = author_user(&state, "writer");
        let post = create_post(&state, &writer, PostType::News, form("t")).unwrap();

        let err = delete_post(&state, &writer, PostType::News, post.id).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let root = state
            .create_user(NewUser {
                username: "root".into(),
                is_superuser: true,
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(
            delete_post(&state, &root, PostType::Article, post.id),
            Err(ApiError::NotFound)
        ));
        delete_post(&state, &root, PostType::News, post.id).unwrap();
        assert!(state.posts.is_empty());
    }

    #[test]
    fn placeholder_name_held_by_real_account_is_refused() {
        let state = state();
        let writer = author_user(&state, "writer");
        state
            .create_user(NewUser {
                username: AUTO_AUTHOR_USERNAME.into(),
                hashed_password: Some("$2b$04$not-a-real-hash".into()),
                ..Default::default()
            })
            .unwrap();

        let err = create_post(&state, &writer, PostType::News, form("t")).unwrap_err();
        assert!(matches!(err, ApiError::FormInvalid(_)));
        assert!(state.posts.is_empty());
        assert!(state.authors.is_empty());
    }

    #[test]
    fn reserved_usernames_include_configured_default_author() {
        let mut config = Config::new("test-secret");
        config.default_author_username = "desk".into();
        let state = state_with(config);

        assert!(is_reserved_username(&state, AUTO_AUTHOR_USERNAME));
        assert!(is_reserved_username(&state, "desk"));
        assert!(!is_reserved_username(&state, "default_author"));
    }

    #[test]
    fn update_after_delete_does_not_restore_post() {
        let state = state();
        let writer = author_user(&state, "writer");
        let root = state
            .create_user(NewUser {
                username: "root".into(),
                is_superuser: true,
                ..Default::default()
            })
            .unwrap();
        let post = create_post(&state, &writer, PostType::News, form("t")).unwrap();

        delete_post(&state, &root, PostType::News, post.id).unwrap();
        let err = update_post(&state, &writer, PostType::News, post.id, form("late")).unwrap_err();

        assert!(matches!(err, ApiError::NotFound));
        assert!(state.posts.is_empty());
    }

    #[test]
    fn delete_through_other_collection_keeps_post() {
        let state = state();
        let writer = author_user(&state, "writer");
        let root = state
            .create_user(NewUser {
                username: "root".into(),
                is_superuser: true,
                ..Default::default()
            })
            .unwrap();
        let post = create_post(&state, &writer, PostType::Article, form("t")).unwrap();

        assert!(matches!(
            delete_post(&state, &root, PostType::News, post.id),
            Err(ApiError::NotFound)
        ));
        assert!(state.post_of_type(PostType::Article, post.id).is_some());
    }
}
