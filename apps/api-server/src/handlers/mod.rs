//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod convert;
mod health;
mod likes;
mod posts;
mod uploads;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        // Registered before `/{id}` so "count" is not parsed as an id.
                        .route("/count", web::get().to(posts::count))
                        .route("/{id}", web::get().to(posts::get))
                        .route("/{id}", web::patch().to(posts::update))
                        .route("/{id}", web::delete().to(posts::delete))
                        .route("/{id}/like", web::post().to(likes::like))
                        .route("/{id}/like", web::delete().to(likes::unlike))
                        .route("/{id}/likes", web::get().to(likes::status))
                        .route("/{id}/comments", web::get().to(comments::list))
                        .route("/{id}/comments", web::post().to(comments::create))
                        .route("/{id}/comments/count", web::get().to(comments::count)),
                )
                .service(
                    web::scope("/users")
                        .route("/{id}/posts", web::get().to(posts::list_by_user))
                        .route("/{id}/posts/count", web::get().to(posts::count_by_user)),
                )
                .route("/uploads/url", web::post().to(uploads::create_upload_url)),
        );
}

/// Malformed bodies and parameters answer with problem details, not plain text.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
