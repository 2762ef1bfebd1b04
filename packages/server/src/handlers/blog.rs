use std::collections::HashSet;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, IntoColumnRef, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::{find_blog, find_user};
use crate::entity::{blog, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppQuery;
use crate::models::blog::*;
use crate::models::shared::{PageParams, PageQuery, escape_like};
use crate::policy::Operation;
use crate::state::AppState;
use crate::utils::image::{IMAGE_FIELD, read_image_field};

#[utoipa::path(
    post,
    path = "/",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Create a blog post",
    description = "Multipart form with `title`, `description`, `userId` and an `image` file part. The image is uploaded to the media host before the record is written. Callers may only create blogs for themselves unless they are an admin.",
    request_body(content_type = "multipart/form-data", description = "title, description, userId, image"),
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Validation or media host error (VALIDATION_ERROR, MEDIA_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Owning user not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize(Operation::CreateBlog)?;

    let new_blog = read_blog_form(multipart, state.config.media.max_image_size)
        .await?
        .into_new_blog()?;
    auth_user.authorize_owned(Operation::CreateBlog, new_blog.user_id)?;

    let owner = find_user(&state.db, new_blog.user_id).await?;

    let uploaded = state.media.upload(new_blog.image).await?;

    let active = blog::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(new_blog.title),
        description: Set(new_blog.description),
        image_url: Set(uploaded.url),
        image_delete_hash: Set(uploaded.delete_hash.clone()),
        user_id: Set(owner.id),
        created_at: Set(Utc::now()),
    };

    let model = match active.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            // Best effort: the record was never written, so the image is unreachable.
            if let Err(cleanup) = state.media.delete(&uploaded.delete_hash).await {
                tracing::warn!("Failed to clean up image after insert error: {cleanup}");
            }
            return Err(e.into());
        }
    };
    tracing::info!(blog_id = %model.id, user_id = %owner.id, "Blog created");

    let authors = AuthorNames::from([(owner.id, AuthorName::from(&owner))]);
    Ok((
        StatusCode::CREATED,
        Json(BlogResponse::with_author(model, &authors)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Get a blog by ID",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog details", body = BlogResponse),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogResponse>, AppError> {
    let model = find_blog(&state.db, id).await?;
    let authors = author_names(&state.db, std::slice::from_ref(&model)).await?;
    Ok(Json(BlogResponse::with_author(model, &authors)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Blogs",
    operation_id = "listBlogs",
    summary = "List blogs with pagination",
    description = "Returns one page of blogs in creation order, each with its owner's name.",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of blogs", body = BlogListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_blogs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<BlogListResponse>, AppError> {
    let page = PageParams::from(&query);
    let response = list_page(&state.db, blog::Entity::find(), page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Blogs",
    operation_id = "listBlogsByUser",
    summary = "List a user's blogs",
    description = "Returns one page of blogs owned by the user. An empty page is reported as 404.",
    params(
        ("user_id" = Uuid, Path, description = "Owning user ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Page of blogs", body = BlogListResponse),
        (status = 404, description = "No blogs on this page (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(user_id = %user_id))]
pub async fn list_blogs_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<BlogListResponse>, AppError> {
    let page = PageParams::from(&query);
    let select = blog::Entity::find().filter(blog::Column::UserId.eq(user_id));
    let response = list_page(&state.db, select, page).await?;

    if response.blogs.is_empty() {
        return Err(AppError::NotFound(format!(
            "No blogs found for user {user_id}"
        )));
    }
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Blogs",
    operation_id = "searchBlogs",
    summary = "Search blogs by title or author name",
    description = "Matches blog titles and author names case-insensitively, and returns the union of blogs matched by title and blogs owned by matched authors, without duplicates. `totalCount` is the number of title matches plus the number of matched authors, so it can differ from the number of distinct blogs.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = BlogListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(query = %query.query))]
pub async fn search_blogs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<BlogListResponse>, AppError> {
    let term = query.query.trim().to_lowercase();
    if term.is_empty() {
        return Err(AppError::Validation("Query must not be empty".into()));
    }
    let page = query.page_params();

    let title_match = lower_like(blog::Column::Title, &term);
    let name_match = term
        .split_whitespace()
        .fold(Condition::all(), |cond, word| {
            cond.add(
                Condition::any()
                    .add(lower_like(user::Column::FirstName, word))
                    .add(lower_like(user::Column::LastName, word)),
            )
        });

    let (title_count, matched_users) = tokio::try_join!(
        blog::Entity::find()
            .filter(title_match.clone())
            .count(&state.db),
        user::Entity::find().filter(name_match).all(&state.db),
    )?;

    let mut combined = Condition::any().add(title_match);
    if !matched_users.is_empty() {
        let owner_ids: Vec<Uuid> = matched_users.iter().map(|u| u.id).collect();
        combined = combined.add(blog::Column::UserId.is_in(owner_ids));
    }

    let blogs = blog::Entity::find()
        .filter(combined)
        .order_by_asc(blog::Column::Id)
        .offset(page.offset())
        .limit(page.page_size)
        .all(&state.db)
        .await?;

    let total = title_count + matched_users.len() as u64;
    let authors = author_names(&state.db, &blogs).await?;

    Ok(Json(BlogListResponse {
        pagination: page.pagination(total),
        blogs: blogs
            .into_iter()
            .map(|b| BlogResponse::with_author(b, &authors))
            .collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "updateBlog",
    summary = "Update a blog",
    description = "Multipart form where every part is optional: `title`, `description`, `userId`, `image`. Omitted fields keep their values. When a new image is supplied the current one is deleted from the media host first; if that fails nothing is changed.",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body(content_type = "multipart/form-data", description = "Optional title, description, userId, image"),
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 400, description = "Validation or media host error (VALIDATION_ERROR, MEDIA_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog or new owner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id = %id))]
pub async fn update_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<BlogResponse>, AppError> {
    auth_user.authorize(Operation::UpdateBlog)?;

    let form = read_blog_form(multipart, state.config.media.max_image_size).await?;
    form.validate_update()?;

    let existing = find_blog(&state.db, id).await?;
    auth_user.authorize_owned(Operation::UpdateBlog, existing.user_id)?;

    if let Some(new_owner) = form.user_id
        && new_owner != existing.user_id
    {
        auth_user.authorize_owned(Operation::UpdateBlog, new_owner)?;
        find_user(&state.db, new_owner).await?;
    }

    let mut active: blog::ActiveModel = existing.clone().into();

    if let Some(image) = form.image {
        state.media.delete(&existing.image_delete_hash).await?;
        let uploaded = state.media.upload(image).await.map_err(|e| {
            tracing::warn!(
                blog_id = %id,
                old_delete_hash = %existing.image_delete_hash,
                "Old image deleted but replacement upload failed: {e}"
            );
            e
        })?;
        active.image_url = Set(uploaded.url);
        active.image_delete_hash = Set(uploaded.delete_hash);
    }
    if let Some(title) = form.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = form.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(user_id) = form.user_id {
        active.user_id = Set(user_id);
    }

    let model = if active.is_changed() {
        active.update(&state.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound(format!("Blog {id} not found")),
            other => other.into(),
        })?
    } else {
        existing
    };

    let authors = author_names(&state.db, std::slice::from_ref(&model)).await?;
    Ok(Json(BlogResponse::with_author(model, &authors)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "deleteBlog",
    summary = "Delete a blog",
    description = "Deletes the blog's image from the media host, then the record. If the image deletion fails the record is kept.",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 400, description = "Media host error (MEDIA_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize(Operation::DeleteBlog)?;

    let existing = find_blog(&state.db, id).await?;
    auth_user.authorize_owned(Operation::DeleteBlog, existing.user_id)?;

    state.media.delete(&existing.image_delete_hash).await?;

    let result = blog::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Blog {id} not found")));
    }
    tracing::info!(blog_id = %id, "Blog deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Count, fetch one page in creation order, and attach author names.
async fn list_page(
    db: &DatabaseConnection,
    select: Select<blog::Entity>,
    page: PageParams,
) -> Result<BlogListResponse, AppError> {
    let total = select.clone().count(db).await?;

    let blogs = select
        .order_by_asc(blog::Column::Id)
        .offset(page.offset())
        .limit(page.page_size)
        .all(db)
        .await?;

    let authors = author_names(db, &blogs).await?;

    Ok(BlogListResponse {
        pagination: page.pagination(total),
        blogs: blogs
            .into_iter()
            .map(|b| BlogResponse::with_author(b, &authors))
            .collect(),
    })
}

/// Resolve owner names for a batch of blogs with a single query.
async fn author_names<C: ConnectionTrait>(
    db: &C,
    blogs: &[blog::Model],
) -> Result<AuthorNames, AppError> {
    let ids: HashSet<Uuid> = blogs.iter().map(|b| b.user_id).collect();
    if ids.is_empty() {
        return Ok(AuthorNames::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users.iter().map(|u| (u.id, AuthorName::from(u))).collect())
}

/// Case-insensitive substring match on a text column.
fn lower_like<C: IntoColumnRef>(column: C, term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col(column)))
            .like(LikeExpr::new(pattern).escape('\\')),
    )
}

async fn read_blog_form(mut multipart: Multipart, max_image_size: usize) -> Result<BlogForm, AppError> {
    let mut form = BlogForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("title") => form.title = Some(read_text(field).await?),
            Some("description") => form.description = Some(read_text(field).await?),
            Some("userId") => {
                let text = read_text(field).await?;
                let user_id = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::Validation("userId must be a UUID".into()))?;
                form.user_id = Some(user_id);
            }
            Some(IMAGE_FIELD) => {
                form.image = Some(read_image_field(field, max_image_size).await?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}
