use crate::{
    config::Config,
    errors::ApiError,
    models::{Author, Category, Group, Permission, Post, PostType, User},
};
use chrono::Utc;
use dashmap::DashMap;
use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use uuid::Uuid;

/// Name of the group every new user joins.
pub const COMMON_GROUP: &str = "common";
/// Name of the group that carries post add/change permissions.
pub const AUTHORS_GROUP: &str = "authors";

/// Integer primary keys, one counter per table.
#[derive(Default)]
pub struct Sequences {
    authors: AtomicU64,
    posts: AtomicU64,
    categories: AtomicU64,
    groups: AtomicU64,
}

impl Sequences {
    fn next(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Fields needed to create a user account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
}

/// Shared by every handler. Clones are cheap; all maps are behind `Arc`.
///
/// Never hold a `Ref` from one of these maps across a write to the same
/// map: `DashMap` shards lock and the write would deadlock.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<DashMap<Uuid, User>>,
    pub email_index: Arc<DashMap<String, Uuid>>,
    pub username_index: Arc<DashMap<String, Uuid>>,
    pub authors: Arc<DashMap<u64, Author>>,
    pub author_by_user: Arc<DashMap<Uuid, u64>>,
    pub posts: Arc<DashMap<u64, Post>>,
    pub categories: Arc<DashMap<u64, Category>>,
    pub category_names: Arc<DashMap<String, u64>>,
    pub groups: Arc<DashMap<u64, Group>>,
    pub group_names: Arc<DashMap<String, u64>>,
    pub sequences: Arc<Sequences>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
            username_index: Arc::new(DashMap::new()),
            authors: Arc::new(DashMap::new()),
            author_by_user: Arc::new(DashMap::new()),
            posts: Arc::new(DashMap::new()),
            categories: Arc::new(DashMap::new()),
            category_names: Arc::new(DashMap::new()),
            groups: Arc::new(DashMap::new()),
            group_names: Arc::new(DashMap::new()),
            sequences: Arc::new(Sequences::default()),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn user(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = *self.email_index.get(&email.trim().to_lowercase())?;
        self.user(&id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        let id = *self.username_index.get(username)?;
        self.user(&id)
    }

    /// Creates a user and puts it in the `common` group.
    ///
    /// Fails with `UserAlreadyExists` when the username or a non-empty
    /// email is taken.
    pub fn create_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        let (user, created) = self.get_or_create_user(new_user)?;
        if !created {
            return Err(ApiError::UserAlreadyExists);
        }
        Ok(user)
    }

    /// Looks the user up by username, creating it when absent. Concurrent
    /// callers with the same username observe a single account.
    pub fn get_or_create_user(&self, new_user: NewUser) -> Result<(User, bool), ApiError> {
        let common = self.get_or_create_group(COMMON_GROUP).0;

        let email = new_user.email.trim().to_lowercase();
        if !email.is_empty() && self.email_index.contains_key(&email) {
            // Email belongs to a different username, or to this one.
            return match self.user_by_username(&new_user.username) {
                Some(existing) if existing.email == email => Ok((existing, false)),
                _ => Err(ApiError::UserAlreadyExists),
            };
        }

        let mut created = false;
        let id = *self
            .username_index
            .entry(new_user.username.clone())
            .or_insert_with(|| {
                let user = User {
                    id: Uuid::new_v4(),
                    email: email.clone(),
                    username: new_user.username.clone(),
                    hashed_password: new_user.hashed_password.clone(),
                    first_name: new_user.first_name.clone(),
                    last_name: new_user.last_name.clone(),
                    is_superuser: new_user.is_superuser,
                    groups: BTreeSet::from([common.id]),
                    created_at: Utc::now(),
                };
                if !user.email.is_empty() {
                    self.email_index.insert(user.email.clone(), user.id);
                }
                self.users.insert(user.id, user.clone());
                created = true;
                user.id
            });

        let user = self
            .user(&id)
            .ok_or_else(|| ApiError::InternalError(format!("user {} missing from store", id)))?;
        Ok((user, created))
    }

    pub fn add_user_to_group(&self, user_id: &Uuid, group_name: &str) -> Result<User, ApiError> {
        let group_id = self
            .group_id(group_name)
            .ok_or_else(|| ApiError::InternalError(format!("group {} does not exist", group_name)))?;

        let mut user = self.users.get_mut(user_id).ok_or(ApiError::NotFound)?;
        user.groups.insert(group_id);
        Ok(user.clone())
    }

    pub fn is_member(&self, user: &User, group_name: &str) -> bool {
        self.group_id(group_name)
            .is_some_and(|id| user.groups.contains(&id))
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn group_id(&self, name: &str) -> Option<u64> {
        self.group_names.get(name).map(|id| *id)
    }

    pub fn group(&self, name: &str) -> Option<Group> {
        let id = self.group_id(name)?;
        self.groups.get(&id).map(|g| g.clone())
    }

    /// Returns the group and whether this call created it.
    pub fn get_or_create_group(&self, name: &str) -> (Group, bool) {
        let mut created = false;
        let id = *self.group_names.entry(name.to_string()).or_insert_with(|| {
            let id = Sequences::next(&self.sequences.groups);
            self.groups.insert(
                id,
                Group {
                    id,
                    name: name.to_string(),
                    permissions: BTreeSet::new(),
                },
            );
            created = true;
            id
        });

        let group = self
            .groups
            .get(&id)
            .map(|g| g.clone())
            .unwrap_or_else(|| Group {
                id,
                name: name.to_string(),
                permissions: BTreeSet::new(),
            });
        (group, created)
    }

    /// Adds permissions to a group; already granted ones are left alone.
    pub fn grant_permissions(
        &self,
        group_id: u64,
        permissions: &[Permission],
    ) -> Result<Group, ApiError> {
        let mut group = self.groups.get_mut(&group_id).ok_or(ApiError::NotFound)?;
        group.permissions.extend(permissions.iter().copied());
        Ok(group.clone())
    }

    pub fn group_names(&self, user: &User) -> Vec<String> {
        user.groups
            .iter()
            .filter_map(|id| self.groups.get(id).map(|g| g.name.clone()))
            .collect()
    }

    /// Union of the permissions of every group the user belongs to.
    pub fn group_permissions(&self, user: &User) -> BTreeSet<Permission> {
        user.groups
            .iter()
            .filter_map(|id| self.groups.get(id).map(|g| g.permissions.clone()))
            .flatten()
            .collect()
    }

    // ------------------------------------------------------------------
    // Authors
    // ------------------------------------------------------------------

    pub fn author(&self, id: u64) -> Option<Author> {
        self.authors.get(&id).map(|a| a.clone())
    }

    pub fn author_for_user(&self, user_id: &Uuid) -> Option<Author> {
        let id = *self.author_by_user.get(user_id)?;
        self.author(id)
    }

    /// All authors ordered by id.
    pub fn all_authors(&self) -> Vec<Author> {
        let mut authors: Vec<Author> = self.authors.iter().map(|a| a.value().clone()).collect();
        authors.sort_by_key(|a| a.id);
        authors
    }

    /// Author with the lowest id.
    pub fn first_author(&self) -> Option<Author> {
        self.authors
            .iter()
            .map(|a| a.value().clone())
            .min_by_key(|a| a.id)
    }

    /// At most one author per user, even under concurrent calls.
    pub fn get_or_create_author(&self, user_id: Uuid) -> (Author, bool) {
        let mut created = false;
        let id = *self.author_by_user.entry(user_id).or_insert_with(|| {
            let id = Sequences::next(&self.sequences.authors);
            self.authors.insert(id, Author { id, user_id });
            created = true;
            id
        });
        (Author { id, user_id }, created)
    }

    pub fn author_username(&self, author_id: u64) -> Option<String> {
        let author = self.author(author_id)?;
        self.user(&author.user_id).map(|u| u.username)
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub fn category(&self, id: u64) -> Option<Category> {
        self.categories.get(&id).map(|c| c.clone())
    }

    pub fn get_or_create_category(&self, name: &str) -> (Category, bool) {
        let mut created = false;
        let id = *self
            .category_names
            .entry(name.to_string())
            .or_insert_with(|| {
                let id = Sequences::next(&self.sequences.categories);
                self.categories.insert(
                    id,
                    Category {
                        id,
                        name: name.to_string(),
                    },
                );
                created = true;
                id
            });
        (
            Category {
                id,
                name: name.to_string(),
            },
            created,
        )
    }

    /// All categories ordered by id.
    pub fn all_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.categories.iter().map(|c| c.value().clone()).collect();
        categories.sort_by_key(|c| c.id);
        categories
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub fn next_post_id(&self) -> u64 {
        Sequences::next(&self.sequences.posts)
    }

    /// Looks a post up within one type's collection only.
    pub fn post_of_type(&self, post_type: PostType, id: u64) -> Option<Post> {
        self.posts
            .get(&id)
            .filter(|p| p.post_type == post_type)
            .map(|p| p.clone())
    }

    /// Posts of one type, newest first. Equal timestamps fall back to the
    /// higher id first so the order is total.
    pub fn posts_of_type(&self, post_type: PostType) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.post_type == post_type)
            .map(|entry| entry.value().clone())
            .collect();

        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }

    pub fn count_posts(&self, post_type: PostType, category_id: u64) -> usize {
        self.posts
            .iter()
            .filter(|p| p.post_type == post_type && p.categories.contains(&category_id))
            .count()
    }
}
