use crate::{
    AppState,
    dto::{CategoryCount, CategoryListResponse},
    models::PostType,
};
use axum::{Json, extract::State};

/// GET /categories/
/// Every category with its news and article counts.
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoryListResponse> {
    let categories: Vec<CategoryCount> = state
        .all_categories()
        .into_iter()
        .map(|category| CategoryCount {
            news_count: state.count_posts(PostType::News, category.id),
            articles_count: state.count_posts(PostType::Article, category.id),
            id: category.id,
            name: category.name,
        })
        .collect();

    let total_news = categories.iter().map(|c| c.news_count).sum();
    let total_articles = categories.iter().map(|c| c.articles_count).sum();

    Json(CategoryListResponse {
        categories,
        total_news,
        total_articles,
    })
}
