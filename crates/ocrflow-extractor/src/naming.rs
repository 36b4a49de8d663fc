//! Artifact naming

use chrono::{DateTime, TimeZone};
use ocrflow_domain::artifact_key;
use std::fmt::Display;

/// Format of the processing timestamp (`20260101_120000`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const TEXT_SUFFIX: &str = "_extracted.txt";
const JSON_SUFFIX: &str = "_result.json";

/// Format a processing timestamp
pub fn timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `{base}_{timestamp}` prefix shared by the artifacts of one result
pub(crate) fn output_prefix(base_name: &str, processed_at: &str) -> String {
    format!("{}_{}", base_name, processed_at)
}

/// Key of the plain-text artifact
pub(crate) fn text_key(namespace: &str, prefix: &str) -> String {
    artifact_key(namespace, &format!("{}{}", prefix, TEXT_SUFFIX))
}

/// Key of the JSON result artifact
pub(crate) fn json_key(namespace: &str, prefix: &str) -> String {
    artifact_key(namespace, &format!("{}{}", prefix, JSON_SUFFIX))
}
