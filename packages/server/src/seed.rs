use anyhow::{Context, anyhow};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::entity::role::Role;
use crate::entity::user;
use crate::models::shared::{normalize_email, validate_password};
use crate::utils::hash;

/// Create the bootstrap administrator when one is configured.
///
/// Registration always assigns the `USER` role, so without this there is no
/// way to obtain the first admin account. An existing account with the same
/// email is left untouched.
pub async fn ensure_admin(db: &DatabaseConnection, seed: &SeedConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
        return Ok(());
    };

    let email =
        normalize_email(email).map_err(|e| anyhow!("Invalid bootstrap admin email: {e:?}"))?;
    validate_password(password).map_err(|e| anyhow!("Invalid bootstrap admin password: {e:?}"))?;

    let password_hash =
        hash::hash_password(password).context("Failed to hash bootstrap admin password")?;

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        first_name: Set(seed.admin_first_name.clone()),
        last_name: Set(seed.admin_last_name.clone()),
        email: Set(email.clone()),
        password: Set(password_hash),
        role: Set(Role::Admin),
        image_url: Set(None),
        image_delete_hash: Set(None),
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {
            info!("Bootstrap admin {email} already exists");
        }
        Ok(_) => info!("Created bootstrap admin {email}"),
        Err(e) => return Err(e).context("Failed to insert bootstrap admin"),
    }

    Ok(())
}
