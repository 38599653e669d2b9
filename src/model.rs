use std::fmt;

use serde::Serialize;

/// Outcome code of a subscription check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
  Ok,
  InvalidKey,
  Expired,
  MissingKey,
}

impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Message::Ok => "Subscription is active.",
      Message::InvalidKey => "Invalid app key.",
      Message::Expired => "Subscription has expired.",
      Message::MissingKey => "Please provide an app key.",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
  pub active: bool,
  pub message: Message,
}

impl Status {
  pub fn ok(active: bool) -> Self {
    Self { active, message: Message::Ok }
  }

  pub fn invalid(message: Message) -> Self {
    Self { active: false, message }
  }
}
