use sea_orm::SqlErr;

use crate::{
  entity::subscription,
  model::{Message, Status},
  prelude::*,
};

/// Name given to every newly registered application
pub const PLACEHOLDER_APP_NAME: &str = "New App";

pub struct Subscription<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Subscription<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<subscription::Model>> {
    let sub = subscription::Entity::find_by_id(id).one(self.db).await?;
    Ok(sub)
  }

  pub async fn by_key(
    &self,
    app_key: &str,
  ) -> Result<Option<subscription::Model>> {
    let sub = subscription::Entity::find()
      .filter(subscription::Column::AppKey.eq(app_key))
      .one(self.db)
      .await?;
    Ok(sub)
  }

  /// All records as stored, without reconciling `active` against expiry.
  pub async fn all(&self) -> Result<Vec<subscription::Model>> {
    let subs = subscription::Entity::find()
      .order_by_asc(subscription::Column::Id)
      .all(self.db)
      .await?;
    Ok(subs)
  }

  pub async fn create(
    &self,
    app_key: Option<&str>,
    expiry_date: Option<&str>,
  ) -> Result<subscription::Model> {
    let (Some(app_key), Some(expiry_date)) =
      (utils::field(app_key), utils::field(expiry_date))
    else {
      return Err(Form::MissingFields.into());
    };
    let expiry_date = utils::parse_expiry(expiry_date)?;

    if self.by_key(app_key).await?.is_some() {
      return Err(Error::Conflict);
    }

    self.insert(app_key, expiry_date).await
  }

  /// Stores a new active record; a key taken by a concurrent insert is
  /// reported as a conflict.
  async fn insert(
    &self,
    app_key: &str,
    expiry_date: DateTime,
  ) -> Result<subscription::Model> {
    let sub = subscription::ActiveModel {
      id: NotSet,
      app_key: Set(app_key.to_string()),
      app_name: Set(PLACEHOLDER_APP_NAME.to_string()),
      active: Set(true),
      expiry_date: Set(expiry_date),
    };

    match sub.insert(self.db).await {
      Ok(sub) => {
        info!("Registered `{}` until {}", sub.app_key, sub.expiry_date);
        Ok(sub)
      }
      Err(err)
        if matches!(
          err.sql_err(),
          Some(SqlErr::UniqueConstraintViolation(_))
        ) =>
      {
        Err(Error::Conflict)
      }
      Err(err) => Err(err.into()),
    }
  }

  /// Reports the effective status of `app_key` as of `now`.
  ///
  /// A record whose expiry has passed is flipped to inactive and persisted.
  /// A deactivated record that has not expired yet stays inactive.
  pub async fn evaluate(&self, app_key: &str, now: DateTime) -> Result<Status> {
    let Some(sub) = self.by_key(app_key).await? else {
      return Ok(Status::invalid(Message::InvalidKey));
    };

    if now > sub.expiry_date {
      if sub.active {
        info!("Subscription `{}` expired at {}", sub.app_key, sub.expiry_date);
      }

      subscription::ActiveModel { active: Set(false), ..sub.into() }
        .update(self.db)
        .await?;

      return Ok(Status::invalid(Message::Expired));
    }

    Ok(Status::ok(sub.active))
  }

  pub async fn edit(
    &self,
    id: i32,
    expiry_date: Option<&str>,
    now: DateTime,
  ) -> Result<subscription::Model> {
    let sub = self.by_id(id).await?.ok_or(Error::NotFound)?;

    let expiry_date =
      utils::field(expiry_date).ok_or(Error::Form(Form::MissingFields))?;
    let expiry_date = utils::parse_expiry(expiry_date)?;
    let active = expiry_date > now;

    let sub = subscription::ActiveModel {
      expiry_date: Set(expiry_date),
      active: Set(active),
      ..sub.into()
    }
    .update(self.db)
    .await?;

    info!(
      "Subscription `{}` now expires at {} (active: {})",
      sub.app_key, sub.expiry_date, sub.active
    );
    Ok(sub)
  }

  pub async fn deactivate(&self, id: i32) -> Result<subscription::Model> {
    let sub = self.by_id(id).await?.ok_or(Error::NotFound)?;

    let sub = subscription::ActiveModel { active: Set(false), ..sub.into() }
      .update(self.db)
      .await?;

    info!("Subscription `{}` deactivated", sub.app_key);
    Ok(sub)
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(subscription::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  fn date(s: &str) -> DateTime {
    utils::parse_expiry(s).unwrap()
  }

  #[tokio::test]
  async fn test_create_subscription() {
    let db = setup_test_db().await;

    let sub = Subscription::new(&db)
      .create(Some("k1"), Some("2099-01-01"))
      .await
      .unwrap();

    assert_eq!(sub.app_key, "k1");
    assert_eq!(sub.app_name, PLACEHOLDER_APP_NAME);
    assert_eq!(sub.expiry_date, date("2099-01-01"));
    assert!(sub.active);
  }

  #[tokio::test]
  async fn test_create_validation_order() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    assert!(matches!(
      sv.create(None, Some("garbage")).await,
      Err(Error::Form(Form::MissingFields))
    ));
    assert!(matches!(
      sv.create(Some("k1"), Some("")).await,
      Err(Error::Form(Form::MissingFields))
    ));
    assert!(matches!(
      sv.create(Some("k1"), Some("2024-13-40")).await,
      Err(Error::Form(Form::BadDateFormat))
    ));

    assert!(sv.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_duplicate_key() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    sv.create(Some("k1"), Some("2099-01-01")).await.unwrap();

    assert!(matches!(
      sv.create(Some("k1"), Some("2100-01-01")).await,
      Err(Error::Conflict)
    ));
    assert_eq!(sv.all().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_insert_unique_violation_is_conflict() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);
    let expiry = date("2099-01-01");

    // skip the lookup in `create`, as a racing request would
    sv.insert("k1", expiry).await.unwrap();

    assert!(matches!(sv.insert("k1", expiry).await, Err(Error::Conflict)));
    assert_eq!(sv.all().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_create_with_past_expiry_starts_active() {
    let db = setup_test_db().await;

    let sub = Subscription::new(&db)
      .create(Some("k1"), Some("2000-01-01"))
      .await
      .unwrap();

    assert!(sub.active);
  }

  #[tokio::test]
  async fn test_evaluate_active() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    sv.create(Some("k1"), Some("2099-01-01")).await.unwrap();
    let status = sv.evaluate("k1", date("2024-01-01")).await.unwrap();

    assert_eq!(status, Status { active: true, message: Message::Ok });
  }

  #[tokio::test]
  async fn test_evaluate_unknown_key() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    let status = sv.evaluate("missing", date("2024-01-01")).await.unwrap();

    assert_eq!(status, Status { active: false, message: Message::InvalidKey });
    assert!(sv.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_evaluate_expired() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    sv.create(Some("k1"), Some("2020-01-01")).await.unwrap();
    let status = sv.evaluate("k1", date("2024-01-01")).await.unwrap();

    assert_eq!(status, Status { active: false, message: Message::Expired });
    assert!(!sv.by_key("k1").await.unwrap().unwrap().active);
  }

  #[tokio::test]
  async fn test_expiry_is_sticky_until_edit() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    let sub = sv.create(Some("k1"), Some("2020-01-01")).await.unwrap();
    sv.evaluate("k1", date("2024-01-01")).await.unwrap();

    // an earlier clock must not resurrect the flag
    let status = sv.evaluate("k1", date("2019-01-01")).await.unwrap();
    assert_eq!(status, Status { active: false, message: Message::Ok });

    sv.edit(sub.id, Some("2099-01-01"), date("2024-01-01")).await.unwrap();
    let status = sv.evaluate("k1", date("2024-01-01")).await.unwrap();
    assert_eq!(status, Status::ok(true));
  }

  #[tokio::test]
  async fn test_expiry_boundary() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    sv.create(Some("k1"), Some("2024-01-01")).await.unwrap();

    // expired only strictly after midnight of the expiry date
    let status = sv.evaluate("k1", date("2024-01-01")).await.unwrap();
    assert_eq!(status, Status::ok(true));

    let later = date("2024-01-01") + chrono::TimeDelta::seconds(1);
    let status = sv.evaluate("k1", later).await.unwrap();
    assert_eq!(status.message, Message::Expired);
  }

  #[tokio::test]
  async fn test_deactivate() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);

    let sub = sv.create(Some("k1"), Some("2099-01-01")).await.unwrap();

    let once = sv.deactivate(sub.id).await.unwrap();
    let twice = sv.deactivate(sub.id).await.unwrap();

    assert!(!once.active);
    assert_eq!(once, twice);
    assert_eq!(twice.expiry_date, sub.expiry_date);

    let status = sv.evaluate("k1", date("2024-01-01")).await.unwrap();
    assert_eq!(status, Status { active: false, message: Message::Ok });
  }

  #[tokio::test]
  async fn test_deactivate_unknown_id() {
    let db = setup_test_db().await;

    assert!(matches!(
      Subscription::new(&db).deactivate(42).await,
      Err(Error::NotFound)
    ));
  }

  #[tokio::test]
  async fn test_edit_recomputes_active() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);
    let now = date("2024-01-01");

    let sub = sv.create(Some("k1"), Some("2099-01-01")).await.unwrap();

    let sub = sv.edit(sub.id, Some("2023-06-01"), now).await.unwrap();
    assert!(!sub.active);
    assert_eq!(sub.expiry_date, date("2023-06-01"));

    // equal to now is not in the future
    let sub = sv.edit(sub.id, Some("2024-01-01"), now).await.unwrap();
    assert!(!sub.active);

    sv.deactivate(sub.id).await.unwrap();
    let sub = sv.edit(sub.id, Some("2030-01-01"), now).await.unwrap();
    assert!(sub.active);
    assert_eq!(sub.app_key, "k1");
  }

  #[tokio::test]
  async fn test_edit_errors() {
    let db = setup_test_db().await;
    let sv = Subscription::new(&db);
    let now = date("2024-01-01");

    assert!(matches!(
      sv.edit(7, Some("2099-01-01"), now).await,
      Err(Error::NotFound)
    ));

    let sub = sv.create(Some("k1"), Some("2099-01-01")).await.unwrap();

    assert!(matches!(
      sv.edit(sub.id, None, now).await,
      Err(Error::Form(Form::MissingFields))
    ));
    assert!(matches!(
      sv.edit(sub.id, Some("2024-02-30"), now).await,
      Err(Error::Form(Form::BadDateFormat))
    ));

    let unchanged = sv.by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(unchanged, sub);
  }
}
