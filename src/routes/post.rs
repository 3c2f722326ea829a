use crate::{
    AppState,
    auth::CurrentUser,
    authoring, authz,
    dto::{
        AuthorChoice, CategoryPostsResponse, PaginatedResponse, PaginationParams, PostForm,
        PostFormResponse, PostResponse, SearchResponse,
    },
    errors::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    filters::PostFilter,
    models::{Permission, Post, PostType},
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

fn to_response(state: &AppState, post: Post) -> PostResponse {
    let author = state.author_username(post.author_id);
    PostResponse::new(post, author)
}

fn paginate(
    state: &AppState,
    posts: Vec<Post>,
    params: &PaginationParams,
) -> PaginatedResponse<PostResponse> {
    PaginatedResponse::paginate(posts, params, state.config.page_size)
        .map(|post| to_response(state, post))
}

/// GET /news/ and /articles/?page=1&limit=10
pub async fn list_posts(
    post_type: PostType,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Json<PaginatedResponse<PostResponse>> {
    let posts = state.posts_of_type(post_type);
    Json(paginate(&state, posts, &params))
}

/// GET /news/search/?title=...&author=...&category=...&created_after=YYYY-MM-DD
pub async fn search_posts(
    post_type: PostType,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(filter): ApiQuery<PostFilter>,
) -> Json<SearchResponse> {
    let posts = filter.apply(&state, state.posts_of_type(post_type));
    Json(SearchResponse {
        page: paginate(&state, posts, &params),
        filter,
    })
}

/// GET /news/category/{id}/
pub async fn posts_by_category(
    post_type: PostType,
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<u64>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<CategoryPostsResponse>, ApiError> {
    let category = state.category(category_id).ok_or(ApiError::NotFound)?;

    let posts: Vec<Post> = state
        .posts_of_type(post_type)
        .into_iter()
        .filter(|p| p.categories.contains(&category.id))
        .collect();

    Ok(Json(CategoryPostsResponse {
        page: paginate(&state, posts, &params),
        category,
    }))
}

/// GET /news/{id}/
pub async fn get_post(
    post_type: PostType,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_of_type(post_type, id).ok_or(ApiError::NotFound)?;
    Ok(Json(to_response(&state, post)))
}

/// GET /news/create/
/// Headers: Authorization: Bearer <token>
pub async fn create_form(
    post_type: PostType,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<PostFormResponse>, ApiError> {
    authz::require(&state, &user, Permission::AddPost)?;
    let authors = state
        .all_authors()
        .into_iter()
        .map(|author| AuthorChoice {
            username: state.author_username(author.id),
            id: author.id,
        })
        .collect();

    Ok(Json(PostFormResponse {
        post_type,
        categories: state.all_categories(),
        authors,
    }))
}

/// POST /news/create/
/// Headers: Authorization: Bearer <token>
/// Body: { "title": "...", "text": "...", "categories": [1, 2], "author_id": 3 }
pub async fn create_post(
    post_type: PostType,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(form): ApiJson<PostForm>,
) -> Result<impl IntoResponse, ApiError> {
    let post = authoring::create_post(&state, &user, post_type, form)?;
    let location = post.detail_path();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(to_response(&state, post)),
    ))
}

/// GET /news/{id}/edit/
/// Headers: Authorization: Bearer <token>
pub async fn edit_form(
    post_type: PostType,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<PostResponse>, ApiError> {
    authz::require(&state, &user, Permission::ChangePost)?;
    let post = state.post_of_type(post_type, id).ok_or(ApiError::NotFound)?;
    Ok(Json(to_response(&state, post)))
}

/// POST /news/{id}/edit/
/// Headers: Authorization: Bearer <token>
pub async fn update_post(
    post_type: PostType,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<u64>,
    ApiJson(form): ApiJson<PostForm>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = authoring::update_post(&state, &user, post_type, id, form)?;
    Ok(Json(to_response(&state, post)))
}

/// POST /news/{id}/delete/
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    post_type: PostType,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    authoring::delete_post(&state, &user, post_type, id)?;
    Ok(StatusCode::NO_CONTENT)
}
