//! HTTP handlers and route configuration.

mod health;
mod oauth;
mod posts;

use actix_web::web;

use crate::middleware::error::{json_config, method_not_allowed, path_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        // Public routes
        .service(
            web::resource("/health")
                .route(web::get().to(health::health_check))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/all")
                .route(web::get().to(posts::list_posts))
                .default_service(web::route().to(method_not_allowed)),
        )
        // Post routes
        .service(
            web::resource(["/post", "/post/"])
                .route(web::get().to(posts::missing_post_id))
                .route(web::post().to(posts::create_post))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/post/{id}")
                .route(web::get().to(posts::get_post))
                .route(web::patch().to(posts::update_post))
                .route(web::delete().to(posts::delete_post))
                .default_service(web::route().to(method_not_allowed)),
        )
        // Sign-in routes
        .service(
            web::scope("/oauth")
                .service(
                    web::resource("/signin")
                        .route(web::get().to(oauth::sign_in))
                        .default_service(web::route().to(method_not_allowed)),
                )
                .service(
                    web::resource("/reply")
                        .route(web::get().to(oauth::reply))
                        .default_service(web::route().to(method_not_allowed)),
                )
                .service(
                    web::resource("/signout")
                        .route(web::post().to(oauth::sign_out))
                        .default_service(web::route().to(method_not_allowed)),
                ),
        );
}
