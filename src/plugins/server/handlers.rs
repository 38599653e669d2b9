use std::sync::Arc;

use axum::{
  Form, Json,
  extract::{Path, Query, State, rejection::PathRejection},
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::pages;
use crate::{
  model::{Message, Status},
  prelude::*,
  state::AppState,
};

const LIST: &str = "/list_subscriptions";

#[derive(Debug, Default, Deserialize)]
pub struct AddForm {
  pub app_key: Option<String>,
  pub expiry_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditForm {
  pub expiry_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
  pub app_key: Option<String>,
}

type IdPath = std::result::Result<Path<i32>, PathRejection>;

/// Ids that are not integers name no record.
fn id(path: IdPath) -> Result<i32> {
  path.map(|Path(id)| id).map_err(|_| Error::NotFound)
}

/// Renders form-level failures inline, everything else as an error response.
fn inline(err: Error, page: impl FnOnce(&str) -> String) -> Response {
  match err {
    Error::Form(_) | Error::Conflict => {
      (err.status(), Html(page(&err.to_string()))).into_response()
    }
    err => err.into_response(),
  }
}

pub async fn index() -> Html<String> {
  Html(pages::index())
}

pub async fn add_form() -> Html<String> {
  Html(pages::add_form(None))
}

pub async fn add(
  State(app): State<Arc<AppState>>,
  Form(form): Form<AddForm>,
) -> Response {
  let created = app
    .sv()
    .subscription
    .create(form.app_key.as_deref(), form.expiry_date.as_deref())
    .await;

  match created {
    Ok(_) => Redirect::to(LIST).into_response(),
    Err(err) => inline(err, |msg| pages::add_form(Some(msg))),
  }
}

pub async fn list(State(app): State<Arc<AppState>>) -> Result<Html<String>> {
  let subs = app.sv().subscription.all().await?;
  Ok(Html(pages::list(&subs)))
}

pub async fn check_form() -> Html<String> {
  Html(pages::check(None))
}

pub async fn check_ui(
  State(app): State<Arc<AppState>>,
  Form(form): Form<KeyQuery>,
) -> Result<Html<String>> {
  let status = match utils::field(form.app_key.as_deref()) {
    Some(key) => app.sv().subscription.evaluate(key, app.now()).await?,
    None => Status::invalid(Message::MissingKey),
  };

  Ok(Html(pages::check(Some(&status))))
}

pub async fn check(
  State(app): State<Arc<AppState>>,
  Query(query): Query<KeyQuery>,
) -> Result<(StatusCode, Json<Status>)> {
  let Some(key) = utils::field(query.app_key.as_deref()) else {
    return Ok((
      StatusCode::BAD_REQUEST,
      Json(Status::invalid(Message::MissingKey)),
    ));
  };

  let status = app.sv().subscription.evaluate(key, app.now()).await?;
  debug!("Checked `{key}`: {status:?}");

  Ok((StatusCode::OK, Json(status)))
}

pub async fn edit_form(
  State(app): State<Arc<AppState>>,
  path: IdPath,
) -> Result<Html<String>> {
  let id = id(path)?;
  let sub = app.sv().subscription.by_id(id).await?.ok_or(Error::NotFound)?;
  Ok(Html(pages::edit_form(&sub, None)))
}

pub async fn edit(
  State(app): State<Arc<AppState>>,
  path: IdPath,
  Form(form): Form<EditForm>,
) -> Response {
  let id = match id(path) {
    Ok(id) => id,
    Err(err) => return err.into_response(),
  };
  let sv = app.sv();
  let edited =
    sv.subscription.edit(id, form.expiry_date.as_deref(), app.now()).await;

  match edited {
    Ok(_) => Redirect::to(LIST).into_response(),
    Err(err @ Error::Form(_)) => match sv.subscription.by_id(id).await {
      Ok(Some(sub)) => inline(err, |msg| pages::edit_form(&sub, Some(msg))),
      Ok(None) => Error::NotFound.into_response(),
      Err(err) => err.into_response(),
    },
    Err(err) => err.into_response(),
  }
}

pub async fn deactivate(
  State(app): State<Arc<AppState>>,
  path: IdPath,
) -> Result<Redirect> {
  let id = id(path)?;
  app.sv().subscription.deactivate(id).await?;
  Ok(Redirect::to(LIST))
}

pub async fn error() -> Html<String> {
  Html(pages::error("Something went wrong."))
}

pub async fn health() -> &'static str {
  "OK"
}
