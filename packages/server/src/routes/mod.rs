use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{self, auth, blog, comment, user};
use crate::state::AppState;

/// Every API route, relative to `/api`.
pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let max_image_size = config.media.max_image_size;

    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(max_image_size))
        .nest("/blogs", blog_routes(max_image_size))
        .nest("/comments", comment_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn user_routes(max_image_size: usize) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(user::list_users, user::create_user))
        .routes(routes!(user::list_all_users))
        .routes(routes!(user::get_user, user::update_user, user::delete_user))
        .routes(routes!(user::delete_user_image));

    let upload = OpenApiRouter::new()
        .routes(routes!(user::upload_user_image))
        .layer(handlers::image_body_limit(max_image_size));

    crud.merge(upload)
}

fn blog_routes(max_image_size: usize) -> OpenApiRouter<AppState> {
    let queries = OpenApiRouter::new()
        .routes(routes!(blog::search_blogs))
        .routes(routes!(blog::list_blogs_by_user));

    // Create and update both carry an image.
    let crud = OpenApiRouter::new()
        .routes(routes!(blog::list_blogs, blog::create_blog))
        .routes(routes!(blog::get_blog, blog::update_blog, blog::delete_blog))
        .layer(handlers::image_body_limit(max_image_size));

    queries.merge(crud)
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(comment::list_comments, comment::create_comment))
        .routes(routes!(
            comment::get_comment,
            comment::update_comment,
            comment::delete_comment
        ))
        .routes(routes!(comment::list_comments_by_blog))
        .routes(routes!(comment::list_comments_by_user))
}
