pub use std::time::Duration;

pub use anyhow::Context;
pub use chrono::{Local, NaiveDate, NaiveDateTime as DateTime, NaiveTime};
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait,
  NotSet, QueryFilter, QueryOrder, Set,
};
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Form, Result};
pub(crate) use crate::utils;
