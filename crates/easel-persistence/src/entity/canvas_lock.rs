//! Canvas lock entity
//!
//! One row per locked resource. The unique index on `resource_id` is the
//! arbiter for concurrent acquires; a row with `expires_at` in the past is
//! semantically absent. Timestamps are unix epoch milliseconds.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "canvas_lock")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub resource_id: String,
    pub acquired_at: i64,
    pub expires_at: i64,
    pub holder: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
