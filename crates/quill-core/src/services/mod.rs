//! Services - business operations composed over the ports.

mod account;
mod comment;
mod like;
mod post;
mod upload;

pub use account::{AccountService, MIN_PASSWORD_LEN, Session};
pub use comment::CommentService;
pub use like::LikeService;
pub use post::{MAX_SLUG_ATTEMPTS, PostService};
pub use upload::{UploadPolicy, UploadRequest, UploadService, UploadTicket};
