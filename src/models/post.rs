use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const PREVIEW_CHARS: usize = 124;

/// Splits the post table into two collections with identical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    News,
    Article,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::News => "news",
            PostType::Article => "article",
        }
    }

    /// Leading path segment of this collection's routes.
    pub fn route_prefix(self) -> &'static str {
        match self {
            PostType::News => "/news",
            PostType::Article => "/articles",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub post_type: PostType,
    pub title: String,
    pub text: String,
    pub categories: BTreeSet<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn preview(&self) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    pub fn detail_path(&self) -> String {
        format!("{}/{}/", self.post_type.route_prefix(), self.id)
    }
}
