use crate::{
    AppState,
    auth::{CurrentUser, create_token},
    authoring, authz,
    dto::{AuthResponse, BecomeAuthorResponse, LoginRequest, SignupRequest, UserResponse},
    errors::ApiError,
    extract::ApiJson,
    models::User,
    states::{AUTHORS_GROUP, NewUser},
};
use axum::{
    Json,
    extract::State,
    response::Redirect,
};
use bcrypt::{hash, verify};
use tracing::info;
use validator::Validate;

fn user_response(state: &AppState, user: User) -> UserResponse {
    let groups = state.group_names(&user);
    let permissions = authz::permissions_for(state, &user)
        .into_iter()
        .map(|p| p.to_string())
        .collect();
    let author_id = state.author_for_user(&user.id).map(|a| a.id);
    UserResponse::new(user, groups, permissions, author_id)
}

/// POST /auth/signup
/// Body: { "email": "...", "username": "...", "password": "..." }
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;

    if authoring::is_reserved_username(&state, &payload.username) {
        return Err(ApiError::field(
            "username",
            "reserved",
            "This username is reserved",
        ));
    }

    let hashed_password = hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

    let user = state.create_user(NewUser {
        email: payload.email,
        username: payload.username,
        hashed_password: Some(hashed_password),
        first_name: payload.first_name,
        last_name: payload.last_name,
        is_superuser: false,
    })?;

    let token = create_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;

    info!("New user registered: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user_response(&state, user),
    }))
}

/// POST /auth/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .user_by_email(&payload.email)
        .ok_or(ApiError::InvalidCredentials)?;

    // Placeholder accounts have no password and never log in
    let hashed = user
        .hashed_password
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = verify(&payload.password, hashed)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;

    info!("User logged in: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user_response(&state, user),
    }))
}

/// GET /users/me
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<UserResponse> {
    Json(user_response(&state, user))
}

/// GET /become-author/
pub async fn become_author_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<BecomeAuthorResponse> {
    Json(BecomeAuthorResponse {
        is_author: state.is_member(&user, AUTHORS_GROUP),
        author_id: state.author_for_user(&user.id).map(|a| a.id),
    })
}

/// POST /become-author/
/// Joins the `authors` group, makes sure the user has an author record,
/// and redirects to the news list.
pub async fn become_author(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Redirect, ApiError> {
    state.add_user_to_group(&user.id, AUTHORS_GROUP)?;
    let (author, created) = state.get_or_create_author(user.id);

    info!("User {} joined {}", user.username, AUTHORS_GROUP);
    if created {
        info!("Author {} created for user {}", author.id, user.username);
    }

    Ok(Redirect::to("/news/"))
}
