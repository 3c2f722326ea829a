use crate::{models::Post, states::AppState};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Search criteria for one post collection. Absent (or empty) fields match
/// everything.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    /// Matched against the author's username.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<u64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_after: Option<NaiveDate>,
}

impl PostFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.created_after.is_none()
    }

    pub fn matches(&self, post: &Post, author_username: Option<&str>) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&post.title, title) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            match author_username {
                Some(username) if contains_ignore_case(username, author) => {}
                _ => return false,
            }
        }
        if let Some(category) = self.category {
            if !post.categories.contains(&category) {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if post.created_at.date_naive() < after {
                return false;
            }
        }
        true
    }

    /// Keeps matching posts in their input order.
    pub fn apply(&self, state: &AppState, posts: Vec<Post>) -> Vec<Post> {
        if self.is_empty() {
            return posts;
        }

        posts
            .into_iter()
            .filter(|post| {
                let username = match self.author {
                    Some(_) => state.author_username(post.author_id),
                    None => None,
                };
                self.matches(post, username.as_deref())
            })
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Query strings send `?title=` for an untouched form field.
pub(crate) fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s)
            .map_err(serde::de::Error::custom)
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostType;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn post(id: u64, title: &str, categories: &[u64], day: u32) -> Post {
        let created_at = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        Post {
            id,
            author_id: 1,
            post_type: PostType::News,
            title: title.into(),
            text: "body".into(),
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn empty_filter_passes_everything() {
        let filter = PostFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&post(1, "Anything", &[], 1), None));
    }

    #[test]
    fn title_match_ignores_case() {
        let filter = PostFilter {
            title: Some("ELECTION".into()),
            ..Default::default()
        };
        assert!(filter.matches(&post(1, "Local election results", &[], 1), None));
        assert!(!filter.matches(&post(2, "Weather", &[], 1), None));
    }

    #[test]
    fn author_requires_a_known_username() {
        let filter = PostFilter {
            author: Some("ann".into()),
            ..Default::default()
        };
        let p = post(1, "t", &[], 1);
        assert!(filter.matches(&p, Some("Joanna")));
        assert!(!filter.matches(&p, Some("bob")));
        assert!(!filter.matches(&p, None));
    }

    #[test]
    fn category_and_date_criteria_combine() {
        let filter = PostFilter {
            category: Some(3),
            created_after: NaiveDate::from_ymd_opt(2024, 5, 10),
            ..Default::default()
        };
        assert!(filter.matches(&post(1, "t", &[3, 4], 10), None));
        assert!(!filter.matches(&post(2, "t", &[3], 9), None));
        assert!(!filter.matches(&post(3, "t", &[4], 20), None));
    }

    #[test]
    fn empty_query_values_deserialize_as_absent() {
        let filter: PostFilter =
            serde_json::from_value(serde_json::json!({"title": "", "category": "", "created_after": "2024-01-31"}))
                .unwrap();
        assert!(filter.title.is_none());
        assert!(filter.category.is_none());
        assert_eq!(filter.created_after, NaiveDate::from_ymd_opt(2024, 1, 31));
    }
}
