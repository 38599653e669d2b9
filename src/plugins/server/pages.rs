//! Server-rendered HTML pages

use std::fmt::Write;

use crate::{entity::subscription, model::Status, prelude::*};

const NAV: &str = "\
<nav>
  <a href=\"/\">Home</a> |
  <a href=\"/add_subscription\">Add subscription</a> |
  <a href=\"/list_subscriptions\">Subscriptions</a> |
  <a href=\"/check_subscription_ui\">Check subscription</a>
</nav>";

fn layout(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>
<html>
<head>
  <meta charset=\"utf-8\">
  <title>{title}</title>
</head>
<body>
{NAV}
<h1>{title}</h1>
{body}
</body>
</html>
"
  )
}

fn error_line(error: Option<&str>) -> String {
  error
    .map(|msg| format!("<p class=\"error\">{}</p>\n", utils::escape(msg)))
    .unwrap_or_default()
}

pub fn index() -> String {
  layout(
    "Subscription Manager",
    "<p>Register application keys, track their expiry and check whether \
     they are active.</p>",
  )
}

pub fn add_form(error: Option<&str>) -> String {
  let body = format!(
    "{}<form method=\"post\" action=\"/add_subscription\">
  <label>App key <input type=\"text\" name=\"app_key\"></label>
  <label>Expiry date <input type=\"date\" name=\"expiry_date\"></label>
  <button type=\"submit\">Add</button>
</form>",
    error_line(error)
  );
  layout("Add Subscription", &body)
}

pub fn list(subs: &[subscription::Model]) -> String {
  let mut rows = String::new();
  for sub in subs {
    let _ = write!(
      rows,
      "<tr>
  <td>{id}</td>
  <td>{key}</td>
  <td>{name}</td>
  <td>{status}</td>
  <td>{expiry}</td>
  <td>
    <a href=\"/edit_subscription/{id}\">Edit</a>
    <form method=\"post\" action=\"/deactivate_subscription/{id}\">
      <button type=\"submit\">Deactivate</button>
    </form>
  </td>
</tr>
",
      id = sub.id,
      key = utils::escape(&sub.app_key),
      name = utils::escape(&sub.app_name),
      status = if sub.active { "Active" } else { "Inactive" },
      expiry = utils::format_date(sub.expiry_date),
    );
  }

  if subs.is_empty() {
    rows.push_str("<tr><td colspan=\"6\">No subscriptions</td></tr>\n");
  }

  let body = format!(
    "<table>
<tr><th>ID</th><th>App key</th><th>App name</th><th>Status</th>\
<th>Expiry date</th><th></th></tr>
{rows}</table>"
  );
  layout("Subscriptions", &body)
}

pub fn check(result: Option<&Status>) -> String {
  let result = result
    .map(|status| {
      format!(
        "<p class=\"{}\">{}</p>\n",
        if status.active { "active" } else { "inactive" },
        status.message
      )
    })
    .unwrap_or_default();

  let body = format!(
    "<form method=\"post\" action=\"/check_subscription_ui\">
  <label>App key <input type=\"text\" name=\"app_key\"></label>
  <button type=\"submit\">Check</button>
</form>
{result}"
  );
  layout("Check Subscription", &body)
}

pub fn edit_form(sub: &subscription::Model, error: Option<&str>) -> String {
  let body = format!(
    "{error}<p>App key: <code>{key}</code></p>
<form method=\"post\" action=\"/edit_subscription/{id}\">
  <label>Expiry date
    <input type=\"date\" name=\"expiry_date\" value=\"{expiry}\">
  </label>
  <button type=\"submit\">Save</button>
</form>",
    error = error_line(error),
    key = utils::escape(&sub.app_key),
    id = sub.id,
    expiry = utils::format_date(sub.expiry_date),
  );
  layout("Edit Subscription", &body)
}

pub fn error(message: &str) -> String {
  layout("Error", &format!("<p>{}</p>", utils::escape(message)))
}
