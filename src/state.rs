use std::{env, net::IpAddr, str::FromStr};

use migration::Migrator;

use crate::{prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub host: IpAddr,
  pub port: u16,
  /// Rate limiter replenish interval, one request per this many seconds
  pub rate_per_second: u64,
  pub rate_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:subscriptions.db?mode=rwc"),
      host: IpAddr::from([0, 0, 0, 0]),
      port: 8000,
      rate_per_second: 2,
      rate_burst: 100,
    }
  }
}

fn var<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(name) {
    Ok(value) => {
      value.trim().parse().with_context(|| format!("Invalid {name}: {value}"))
    }
    Err(_) => Ok(default),
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let default = Self::default();

    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
      host: var("HOST", default.host)?,
      port: var("PORT", default.port)?,
      rate_per_second: var("RATE_PER_SECOND", default.rate_per_second)?,
      rate_burst: var("RATE_BURST", default.rate_burst)?,
    })
  }
}

/// Source of the current time for status decisions
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime;
}

/// Server-local wall clock, the frame expiry dates are entered in
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime {
    Local::now().naive_local()
  }
}

pub struct Services<'a> {
  pub subscription: sv::Subscription<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub clock: Box<dyn Clock>,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::with_db(db, config, SystemClock))
  }

  pub fn with_db(
    db: DatabaseConnection,
    config: Config,
    clock: impl Clock + 'static,
  ) -> Self {
    Self { db, config, clock: Box::new(clock) }
  }

  pub fn sv(&self) -> Services<'_> {
    Services { subscription: sv::Subscription::new(&self.db) }
  }

  pub fn now(&self) -> DateTime {
    self.clock.now()
  }
}
