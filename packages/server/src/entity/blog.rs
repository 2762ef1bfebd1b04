use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    /// UUIDv7 primary key; ordering by it is insertion order.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Always a matched pair from a single upload call.
    pub image_url: String,
    pub image_delete_hash: String,

    /// Owning user. Checked for existence on write, not constrained.
    pub user_id: Uuid,

    /// Server-assigned, never modified after insert.
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
