use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  /// Caller-supplied application key, never changed after creation
  #[sea_orm(unique)]
  pub app_key: String,
  pub app_name: String,
  /// Last-known status, reconciled lazily against `expiry_date`
  pub active: bool,
  pub expiry_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
