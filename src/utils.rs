use crate::prelude::*;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: DateTime) -> String {
  date.format(DATE_FORMAT).to_string()
}

/// Four-digit year, then one or two digits each for month and day.
fn is_date_shaped(input: &str) -> bool {
  let digits = |part: &str, len: std::ops::RangeInclusive<usize>| {
    len.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
  };

  let mut parts = input.split('-');
  match (parts.next(), parts.next(), parts.next(), parts.next()) {
    (Some(year), Some(month), Some(day), None) => {
      digits(year, 4..=4) && digits(month, 1..=2) && digits(day, 1..=2)
    }
    _ => false,
  }
}

/// Parses a `YYYY-MM-DD` expiry date, returning midnight of that day.
pub fn parse_expiry(input: &str) -> Result<DateTime> {
  if !is_date_shaped(input) {
    return Err(Error::Form(Form::BadDateFormat));
  }

  NaiveDate::parse_from_str(input, DATE_FORMAT)
    .map(|date| date.and_time(NaiveTime::MIN))
    .map_err(|_| Error::Form(Form::BadDateFormat))
}

/// Treats absent and blank form values alike.
pub fn field(value: Option<&str>) -> Option<&str> {
  value.filter(|s| !s.is_empty())
}

/// Minimal HTML escaping for values interpolated into pages.
pub fn escape(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for ch in input.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      _ => out.push(ch),
    }
  }
  out
}
