use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Per-action permissions on posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewPost,
    AddPost,
    ChangePost,
    DeletePost,
}

impl Permission {
    pub fn codename(self) -> &'static str {
        match self {
            Permission::ViewPost => "view_post",
            Permission::AddPost => "add_post",
            Permission::ChangePost => "change_post",
            Permission::DeletePost => "delete_post",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "news.{}", self.codename())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub permissions: BTreeSet<Permission>,
}
