//! Database connection management and SeaORM repositories.

mod connections;

#[cfg(feature = "postgres")]
mod comment_repo;
#[cfg(feature = "postgres")]
mod errors;
#[cfg(feature = "postgres")]
mod like_repo;
#[cfg(feature = "postgres")]
mod post_repo;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod user_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use comment_repo::PostgresCommentRepository;
#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use sea_orm::DbConn;
#[cfg(feature = "postgres")]
pub use like_repo::PostgresLikeRepository;
#[cfg(feature = "postgres")]
pub use post_repo::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use postgres_base::PostgresBaseRepository;
#[cfg(feature = "postgres")]
pub use user_repo::PostgresUserRepository;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
