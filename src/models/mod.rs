mod author;
mod category;
mod group;
mod post;
mod user;

pub use author::Author;
pub use category::Category;
pub use group::{Group, Permission};
pub use post::{Post, PostType};
pub use user::User;
