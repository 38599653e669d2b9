use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Subscriptions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Subscriptions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Subscriptions::AppKey)
              .string_len(50)
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Subscriptions::AppName).string_len(100).not_null())
          .col(
            ColumnDef::new(Subscriptions::Active)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Subscriptions::ExpiryDate).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Subscriptions {
  Table,
  Id,
  AppKey,
  AppName,
  Active,
  ExpiryDate,
}
