use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::{find_blog, find_user};
use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::comment::*;
use crate::models::shared::{PageParams, PageQuery};
use crate::policy::Operation;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments with pagination",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of comments", body = CommentListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_comments(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    let page = PageParams::from(&query);
    let response = list_page(&state.db, comment::Entity::find(), page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Comments",
    operation_id = "getComment",
    summary = "Get a comment by ID",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment details", body = CommentResponse),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommentResponse>, AppError> {
    let model = find_comment(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/blog/{blog_id}",
    tag = "Comments",
    operation_id = "listCommentsByBlog",
    summary = "List comments on a blog",
    description = "Returns one page of the blog's comments in creation order. An unknown blog yields an empty page.",
    params(
        ("blog_id" = Uuid, Path, description = "Blog ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Page of comments", body = CommentListResponse),
    ),
)]
#[instrument(skip(state, query), fields(blog_id = %blog_id))]
pub async fn list_comments_by_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    let page = PageParams::from(&query);
    let select = comment::Entity::find().filter(comment::Column::BlogId.eq(blog_id));
    let response = list_page(&state.db, select, page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Comments",
    operation_id = "listCommentsByUser",
    summary = "List comments written by a user",
    params(
        ("user_id" = Uuid, Path, description = "Author user ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Page of comments", body = CommentListResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(user_id = %user_id))]
pub async fn list_comments_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    find_user(&state.db, user_id).await?;

    let page = PageParams::from(&query);
    let select = comment::Entity::find().filter(comment::Column::UserId.eq(user_id));
    let response = list_page(&state.db, select, page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Create a comment",
    description = "The referenced blog and user must exist. Callers may only comment as themselves unless they are an admin.",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Blog or user not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize(Operation::CreateComment)?;
    validate_comment(&payload)?;
    auth_user.authorize_owned(Operation::CreateComment, payload.user_id)?;

    find_blog(&state.db, payload.blog_id).await?;
    find_user(&state.db, payload.user_id).await?;

    let active = comment::ActiveModel {
        id: Set(Uuid::now_v7()),
        blog_id: Set(payload.blog_id),
        user_id: Set(payload.user_id),
        content: Set(payload.content.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
    };
    let model = active.insert(&state.db).await?;
    tracing::info!(comment_id = %model.id, blog_id = %model.blog_id, "Comment created");

    Ok((StatusCode::CREATED, Json(CommentResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Replace a comment",
    description = "Replaces the blog reference, author and content. The original `createdAt` is kept.",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment, blog or user not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    auth_user.authorize(Operation::UpdateComment)?;
    validate_comment(&payload)?;

    let existing = find_comment(&state.db, id).await?;
    auth_user.authorize_owned(Operation::UpdateComment, existing.user_id)?;
    if payload.user_id != existing.user_id {
        auth_user.authorize_owned(Operation::UpdateComment, payload.user_id)?;
    }

    find_blog(&state.db, payload.blog_id).await?;
    find_user(&state.db, payload.user_id).await?;

    let mut active: comment::ActiveModel = existing.into();
    active.blog_id = Set(payload.blog_id);
    active.user_id = Set(payload.user_id);
    active.content = Set(payload.content.trim().to_string());

    let model = active.update(&state.db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => AppError::NotFound(format!("Comment {id} not found")),
        other => other.into(),
    })?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize(Operation::DeleteComment)?;

    let existing = find_comment(&state.db, id).await?;
    auth_user.authorize_owned(Operation::DeleteComment, existing.user_id)?;

    let result = comment::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Comment {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {id} not found")))
}

async fn list_page(
    db: &DatabaseConnection,
    select: Select<comment::Entity>,
    page: PageParams,
) -> Result<CommentListResponse, AppError> {
    let total = select.clone().count(db).await?;

    let comments = select
        .order_by_asc(comment::Column::Id)
        .offset(page.offset())
        .limit(page.page_size)
        .all(db)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(CommentListResponse {
        pagination: page.pagination(total),
        comments,
    })
}
