pub mod category;
pub mod health;
pub mod post;
pub mod user;

use crate::{
    AppState,
    auth::CurrentUser,
    dto::{PaginationParams, PostForm},
    extract::{ApiJson, ApiPath, ApiQuery},
    filters::PostFilter,
    models::PostType,
};
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// List, search, category, detail and mutation routes for one post type.
fn collection_routes(post_type: PostType) -> Router<AppState> {
    let prefix = post_type.route_prefix();

    Router::new()
        .route(
            &format!("{}/", prefix),
            get(move |state: State<AppState>, params: ApiQuery<PaginationParams>| {
                post::list_posts(post_type, state, params)
            }),
        )
        .route(
            &format!("{}/search/", prefix),
            get(
                move |state: State<AppState>,
                      params: ApiQuery<PaginationParams>,
                      filter: ApiQuery<PostFilter>| {
                    post::search_posts(post_type, state, params, filter)
                },
            ),
        )
        .route(
            &format!("{}/category/{{id}}/", prefix),
            get(
                move |state: State<AppState>,
                      id: ApiPath<u64>,
                      params: ApiQuery<PaginationParams>| {
                    post::posts_by_category(post_type, state, id, params)
                },
            ),
        )
        .route(
            &format!("{}/create/", prefix),
            get(move |state: State<AppState>, user: CurrentUser| {
                post::create_form(post_type, state, user)
            })
            .post(
                move |state: State<AppState>, user: CurrentUser, form: ApiJson<PostForm>| {
                    post::create_post(post_type, state, user, form)
                },
            ),
        )
        .route(
            &format!("{}/{{id}}/", prefix),
            get(move |state: State<AppState>, id: ApiPath<u64>| {
                post::get_post(post_type, state, id)
            }),
        )
        .route(
            &format!("{}/{{id}}/edit/", prefix),
            get(move |state: State<AppState>, user: CurrentUser, id: ApiPath<u64>| {
                post::edit_form(post_type, state, user, id)
            })
            .post(
                move |state: State<AppState>,
                      user: CurrentUser,
                      id: ApiPath<u64>,
                      form: ApiJson<PostForm>| {
                    post::update_post(post_type, state, user, id, form)
                },
            ),
        )
        .route(
            &format!("{}/{{id}}/delete/", prefix),
            post(move |state: State<AppState>, user: CurrentUser, id: ApiPath<u64>| {
                post::delete_post(post_type, state, user, id)
            }),
        )
}

pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public routes (no auth required)
        .route("/health", get(health::health_check))
        .route("/auth/signup", post(user::signup))
        .route("/auth/login", post(user::login))
        .route("/categories/", get(category::list_categories))
        // Protected routes (auth required)
        .route("/users/me", get(user::get_current_user))
        .route(
            "/become-author/",
            get(user::become_author_page).post(user::become_author),
        )
        .merge(collection_routes(PostType::News))
        .merge(collection_routes(PostType::Article))
        // Add state and middleware
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
