use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub blog_id: Uuid,
    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Carried over unchanged on update.
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
