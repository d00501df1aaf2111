//! Mail ingestion from CSV exports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::brain::keywords::SUPPORT_FILTER_TERMS;
use crate::error::AppError;

/// A normalized inbound email, as handed to the triage pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingEmail {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Raw send date; resolved with [`resolve_sent_at`].
    pub sent_date: Option<String>,
}

impl IncomingEmail {
    pub fn new(sender: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            sent_date: None,
        }
    }

    pub fn with_sent_date(mut self, sent_date: impl Into<String>) -> Self {
        self.sent_date = Some(sent_date.into());
        self
    }

    /// Text the analysis and retrieval stages look at.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.subject, self.body)
    }
}

/// Reads a CSV export with (case-insensitive) `sender`, `subject`, `body` and
/// optional `sent_date` columns. Missing columns read as empty.
pub fn load_from_csv(path: &Path) -> Result<Vec<IncomingEmail>, AppError> {
    let file = std::fs::File::open(path)?;
    let emails = read_csv(file)?;
    info!("Loaded {} row(s) from {:?}", emails.len(), path);
    Ok(emails)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<IncomingEmail>, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (sender, subject, body, sent_date) = (
        column("sender"),
        column("subject"),
        column("body"),
        column("sent_date"),
    );

    let mut emails = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or_default();

        emails.push(IncomingEmail {
            sender: field(sender).to_string(),
            subject: field(subject).to_string(),
            body: field(body).to_string(),
            sent_date: Some(field(sent_date).trim().to_string()).filter(|s| !s.is_empty()),
        });
    }
    Ok(emails)
}

/// True when the subject mentions a support term. Empty subjects are ineligible.
pub fn is_support_email(email: &IncomingEmail) -> bool {
    let subject = email.subject.to_lowercase();
    !subject.trim().is_empty() && SUPPORT_FILTER_TERMS.iter().any(|term| subject.contains(term))
}

/// Keeps only support emails, preserving order.
pub fn filter_support_emails(emails: Vec<IncomingEmail>) -> Vec<IncomingEmail> {
    emails.into_iter().filter(is_support_email).collect()
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parses the date formats seen in mailbox exports. Naive values are UTC and
/// ambiguous numeric dates are read day-first.
pub fn parse_sent_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Unix timestamp for a raw send date, defaulting to `now` when absent or
/// unparseable.
pub fn resolve_sent_at(raw: Option<&str>, now: DateTime<Utc>) -> i64 {
    match raw.and_then(parse_sent_date) {
        Some(dt) => dt.timestamp(),
        None => {
            if let Some(raw) = raw {
                debug!("Unparseable sent_date {:?}; using ingestion time", raw);
            }
            now.timestamp()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_read_csv_normalizes_headers() {
        let data = " Sender ,SUBJECT,Body,Sent_Date\n\
                    a@b.com,Support needed,\"Line one\nLine two\",2024-03-01 10:00:00\n\
                    c@d.com,Hello,Hi,\n";
        let emails = read_csv(data.as_bytes()).unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].sender, "a@b.com");
        assert_eq!(emails[0].body, "Line one\nLine two");
        assert_eq!(emails[0].sent_date.as_deref(), Some("2024-03-01 10:00:00"));
        assert_eq!(emails[1].sent_date, None);
    }

    #[test]
    fn test_read_csv_missing_columns() {
        let emails = read_csv("subject\nRequest: access\n".as_bytes()).unwrap();
        assert_eq!(emails[0].sender, "");
        assert_eq!(emails[0].body, "");
        assert_eq!(emails[0].subject, "Request: access");
    }

    #[test]
    fn test_filter_support_emails() {
        let emails = vec![
            IncomingEmail::new("a@x.com", "Need HELP with login", ""),
            IncomingEmail::new("b@x.com", "Lunch on friday?", ""),
            IncomingEmail::new("c@x.com", "", "support please"),
            IncomingEmail::new("d@x.com", "Query about invoice", ""),
            IncomingEmail::new("e@x.com", "Feature request", ""),
        ];
        let kept: Vec<String> = filter_support_emails(emails)
            .into_iter()
            .map(|e| e.sender)
            .collect();
        assert_eq!(kept, vec!["a@x.com", "d@x.com", "e@x.com"]);
    }

    #[test]
    fn test_parse_sent_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();

        assert_eq!(parse_sent_date("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_sent_date("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_sent_date("Fri, 01 Mar 2024 10:30:00 +0000"), Some(expected));
        assert_eq!(parse_sent_date("2024-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_sent_date("2024-03-01 10:30"), Some(expected));
        assert_eq!(parse_sent_date("01/03/2024 10:30"), Some(expected));
        assert_eq!(parse_sent_date("01-03-2024 10:30:00"), Some(expected));
        assert_eq!(
            parse_sent_date("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(parse_sent_date("yesterday"), None);
        assert_eq!(resolve_sent_at(Some("yesterday"), now), now.timestamp());
        assert_eq!(resolve_sent_at(Some("31/02/2024"), now), now.timestamp());
        assert_eq!(resolve_sent_at(None, now), now.timestamp());
        assert_eq!(
            resolve_sent_at(Some("2024-03-01"), now),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp()
        );
    }
}
