use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::role::Role;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,
    pub last_name: String,

    /// Stored lowercased and trimmed.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id PHC string.
    pub password: String,

    pub role: Role,

    /// Profile image; URL and delete hash are set and cleared together.
    pub image_url: Option<String>,
    pub image_delete_hash: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
