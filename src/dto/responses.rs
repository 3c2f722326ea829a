use crate::{
    filters::{PostFilter, empty_string_as_none},
    models::{Category, Post, PostType, User},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

const MAX_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub groups: Vec<String>,
    pub permissions: Vec<String>,
    /// Set once the user has an author record.
    pub author_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Group names and permissions are resolved by the caller.
    pub fn new(
        user: User,
        groups: Vec<String>,
        permissions: Vec<String>,
        author_id: Option<u64>,
    ) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            groups,
            permissions,
            author_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BecomeAuthorResponse {
    pub is_author: bool,
    pub author_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: u64,
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub preview: String,
    pub author_id: u64,
    pub author: Option<String>,
    pub categories: BTreeSet<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author: Option<String>) -> Self {
        Self {
            preview: post.preview(),
            id: post.id,
            post_type: post.post_type,
            title: post.title,
            text: post.text,
            author_id: post.author_id,
            author,
            categories: post.categories,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// What a client needs to render an empty create form.
#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub post_type: PostType,
    pub categories: Vec<Category>,
    pub authors: Vec<AuthorChoice>,
}

#[derive(Debug, Serialize)]
pub struct AuthorChoice {
    pub id: u64,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub filter: PostFilter,
    #[serde(flatten)]
    pub page: PaginatedResponse<PostResponse>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPostsResponse {
    pub category: Category,
    #[serde(flatten)]
    pub page: PaginatedResponse<PostResponse>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub id: u64,
    pub name: String,
    pub news_count: usize,
    pub articles_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryCount>,
    pub total_news: usize,
    pub total_articles: usize,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    /// 1-based; defaults to the first page.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<usize>,
    /// Falls back to the configured page size.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<usize>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    /// Slices one page out of an already ordered collection. Pages past the
    /// end come back empty.
    pub fn paginate(items: Vec<T>, params: &PaginationParams, default_limit: usize) -> Self {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT);

        let total = items.len();
        let start = (page - 1).saturating_mul(limit);

        let data = if start < total {
            items.into_iter().skip(start).take(limit).collect()
        } else {
            vec![]
        };

        Self {
            data,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
