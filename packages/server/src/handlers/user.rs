use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::auth::map_unique_email;
use super::find_user;
use crate::entity::{role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::shared::{PageParams, PageQuery};
use crate::models::user::*;
use crate::policy::Operation;
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::image::{IMAGE_FIELD, read_image_field};

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users with pagination",
    description = "Returns one page of users in creation order. Requires any authenticated role.",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = UserListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.authorize(Operation::ListUsers)?;

    let page = PageParams::from(&query);
    let total = user::Entity::find().count(&state.db).await?;

    let items = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .offset(page.offset())
        .limit(page.page_size)
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        pagination: page.pagination(total),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Users",
    operation_id = "listAllUsers",
    summary = "List every user",
    description = "Returns all users without pagination. Requires the `ADMIN` role.",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth_user.authorize(Operation::ListAllUsers)?;

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    description = "Requires the `ADMIN` or `USER` role.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.authorize(Operation::GetUser)?;

    let model = find_user(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user directly",
    description = "Inserts a user with an explicit role (default `USER`). Requires the `ADMIN` role.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize(Operation::CreateUser)?;
    let email = validate_create_user(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(email),
        password: Set(hash),
        role: Set(payload.role.unwrap_or(role::DEFAULT_ROLE)),
        image_url: Set(None),
        image_delete_hash: Set(None),
    };

    let model = new_user.insert(&state.db).await.map_err(map_unique_email)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Replace a user's profile",
    description = "Replaces names and email, and optionally role and password. Callers may only update themselves unless they are an admin; only admins may change a role.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.authorize(Operation::UpdateUser)?;
    let email = validate_update_user(&payload)?;

    let existing = find_user(&state.db, id).await?;
    auth_user.authorize_owned(Operation::UpdateUser, existing.id)?;

    if let Some(new_role) = payload.role
        && new_role != existing.role
        && !auth_user.is_admin()
    {
        return Err(AppError::PermissionDenied);
    }

    let password = match payload.password {
        Some(ref password) => hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?,
        None => existing.password.clone(),
    };

    let mut active: user::ActiveModel = existing.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.email = Set(email);
    active.password = Set(password);
    if let Some(new_role) = payload.role {
        active.role = Set(new_role);
    }

    let model = active.update(&state.db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => AppError::NotFound(format!("User {id} not found")),
        other => map_unique_email(other),
    })?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Removes the user record. Blogs, comments and the remote profile image owned by the user are left in place.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize_owned(Operation::DeleteUser, id)?;

    let result = user::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/uploadImage",
    tag = "Users",
    operation_id = "uploadUserImage",
    summary = "Upload a profile image",
    description = "Uploads the `image` multipart part to the media host and stores its URL and delete hash on the user. A previously stored image is replaced without being deleted from the host.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body(content_type = "multipart/form-data", description = "Multipart form with an `image` file part"),
    responses(
        (status = 200, description = "Image stored", body = UserResponse),
        (status = 400, description = "Validation or media host error (VALIDATION_ERROR, MEDIA_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id = %id))]
pub async fn upload_user_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.authorize_owned(Operation::UploadUserImage, id)?;

    let existing = find_user(&state.db, id).await?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            image = Some(read_image_field(field, state.config.media.max_image_size).await?);
        }
    }
    let image = image.ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;

    let uploaded = state.media.upload(image).await?;

    if existing.image_delete_hash.is_some() {
        tracing::warn!(user_id = %id, "Replacing profile image; previous remote image is kept");
    }

    let mut active: user::ActiveModel = existing.into();
    active.image_url = Set(Some(uploaded.url));
    active.image_delete_hash = Set(Some(uploaded.delete_hash));
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/deleteImage",
    tag = "Users",
    operation_id = "deleteUserImage",
    summary = "Delete the profile image",
    description = "Deletes the image from the media host and clears it on the user. The stored reference is only cleared when the host confirms the deletion.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "No image stored, or media host error (BAD_REQUEST, MEDIA_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_user_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.authorize_owned(Operation::DeleteUserImage, id)?;

    let existing = find_user(&state.db, id).await?;
    let delete_hash = existing
        .image_delete_hash
        .clone()
        .ok_or_else(|| AppError::BadRequest("User has no profile image".into()))?;

    state.media.delete(&delete_hash).await?;

    let mut active: user::ActiveModel = existing.into();
    active.image_url = Set(None);
    active.image_delete_hash = Set(None);
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}
