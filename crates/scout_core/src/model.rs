use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::export::MISSING_FIELD;

/// Wire format of the optional date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DEFAULT_MAX_RESULTS: u32 = 5;

/// Parameters entered in the search form, sent verbatim as the task input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub query: String,
    /// Optional location identifier; empty means "anywhere".
    #[serde(default)]
    pub location: String,
    #[serde(default, with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    pub max_results: u32,
    #[serde(default)]
    pub recent_only: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            query: String::new(),
            location: String::new(),
            start_date: None,
            end_date: None,
            max_results: DEFAULT_MAX_RESULTS,
            recent_only: false,
        }
    }
}

/// The form sends `""` for an untouched date input, so that is what `None`
/// looks like on the wire.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.collect_str(&date.format(DATE_FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

/// Identifies one remote run and the dataset it writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    #[serde(rename = "defaultDatasetId")]
    pub dataset_id: String,
}

/// Status of a remote run as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    Other(String),
}

/// How the poller should react to a [`JobStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Succeeded,
    Failed,
    Pending,
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Ready => "READY",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::TimingOut => "TIMING-OUT",
            JobStatus::TimedOut => "TIMED-OUT",
            JobStatus::Aborting => "ABORTING",
            JobStatus::Aborted => "ABORTED",
            JobStatus::Other(raw) => raw,
        }
    }

    /// `TIMING-OUT` and `ABORTING` are transitional; only their settled
    /// counterparts end the run.
    pub fn class(&self) -> StatusClass {
        match self {
            JobStatus::Succeeded => StatusClass::Succeeded,
            JobStatus::Failed | JobStatus::TimedOut | JobStatus::Aborted => StatusClass::Failed,
            _ => StatusClass::Pending,
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "READY" => JobStatus::Ready,
            "RUNNING" => JobStatus::Running,
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" => JobStatus::Failed,
            "TIMING-OUT" => JobStatus::TimingOut,
            "TIMED-OUT" => JobStatus::TimedOut,
            "ABORTING" => JobStatus::Aborting,
            "ABORTED" => JobStatus::Aborted,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        JobStatus::from(raw.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped record from the run's dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default, deserialize_with = "loose_text::deserialize")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_text::deserialize")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "loose_text::deserialize")]
    pub date: Option<String>,
}

/// Scrapers are not consistent about field types: numbers and booleans are
/// kept as their text, while null, arrays and objects count as missing.
mod loose_text {
    use std::fmt;

    use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_any(LooseText)
    }

    struct LooseText;

    impl<'de> Visitor<'de> for LooseText {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number, boolean or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_owned()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(LooseText)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }
}

impl ResultItem {
    pub fn new(title: Option<&str>, url: Option<&str>, date: Option<&str>) -> Self {
        Self {
            title: title.map(ToOwned::to_owned),
            url: url.map(ToOwned::to_owned),
            date: date.map(ToOwned::to_owned),
        }
    }

    pub fn display_title(&self) -> &str {
        or_missing(&self.title)
    }

    pub fn display_url(&self) -> &str {
        or_missing(&self.url)
    }

    pub fn display_date(&self) -> &str {
        or_missing(&self.date)
    }
}

// Empty strings count as missing, same as null.
fn or_missing(field: &Option<String>) -> &str {
    match field.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => MISSING_FIELD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_class_separates_terminal_failures() {
        assert_eq!(JobStatus::Succeeded.class(), StatusClass::Succeeded);
        assert_eq!(JobStatus::Failed.class(), StatusClass::Failed);
        assert_eq!(JobStatus::TimedOut.class(), StatusClass::Failed);
        assert_eq!(JobStatus::Aborted.class(), StatusClass::Failed);
        assert_eq!(JobStatus::Aborting.class(), StatusClass::Pending);
        assert_eq!(JobStatus::from("PAUSED").class(), StatusClass::Pending);
    }

    #[test]
    fn unknown_status_keeps_raw_text() {
        let status = JobStatus::from("PAUSED");
        assert_eq!(status, JobStatus::Other("PAUSED".into()));
        assert_eq!(String::from(status), "PAUSED");
    }

    #[test]
    fn empty_fields_display_as_missing() {
        let item = ResultItem::new(Some(""), Some("http://y"), None);
        assert_eq!(item.display_title(), "N/A");
        assert_eq!(item.display_url(), "http://y");
        assert_eq!(item.display_date(), "N/A");
    }
}
