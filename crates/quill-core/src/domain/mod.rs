//! Domain entities - the core business objects.

mod comment;
mod like;
mod page;
mod post;
mod tag;
mod user;

pub use comment::{Comment, CommentView};
pub use like::Like;
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page};
pub use post::{NewPost, Post, PostChanges, PostDetails, PostSummary, PostUpdate};
pub use tag::Tag;
pub use user::{Author, User};
