//! Submission options understood by the remote OCR service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default bound on the completion wait (seconds)
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

/// How the remote service lays out the returned text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Retain the spatial layout of the original document
    #[default]
    LayoutPreserving,

    /// Plain reading-order text
    Text,
}

impl OutputMode {
    /// Wire value of the output mode
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::LayoutPreserving => "layout_preserving",
            OutputMode::Text => "text",
        }
    }

    /// Parse an output mode from its wire value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "layout_preserving" => Some(OutputMode::LayoutPreserving),
            "text" => Some(OutputMode::Text),
            _ => None,
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid output mode: {}", s))
    }
}

/// OCR engine mode of the remote service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Text layer only, no OCR (born-digital PDFs)
    NativeText,

    /// Fast OCR for clean scans
    LowCost,

    /// Best-quality OCR for noisy scans and handwriting
    HighQuality,

    /// High-quality OCR with form element detection (checkboxes, radios)
    #[default]
    Form,
}

impl ProcessingMode {
    /// Wire value of the processing mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::NativeText => "native_text",
            ProcessingMode::LowCost => "low_cost",
            ProcessingMode::HighQuality => "high_quality",
            ProcessingMode::Form => "form",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lines to request highlight metadata for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineSelector {
    /// Every line of the document
    #[default]
    All,

    /// An inclusive, 1-based line range
    Range {
        /// First line (>= 1)
        start: u32,
        /// Last line (>= start)
        end: u32,
    },
}

impl LineSelector {
    /// Create a validated range selector
    pub fn range(start: u32, end: u32) -> Result<Self, String> {
        if start == 0 {
            return Err("line numbers start at 1".to_string());
        }
        if end < start {
            return Err(format!("invalid line range {}-{}", start, end));
        }
        Ok(LineSelector::Range { start, end })
    }
}

impl fmt::Display for LineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSelector::All => f.write_str("all"),
            LineSelector::Range { start, end } if start == end => write!(f, "{}", start),
            LineSelector::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

impl FromStr for LineSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(LineSelector::All);
        }

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid line selector: {}", s))
        };

        match s.split_once('-') {
            Some((start, end)) => Self::range(parse(start)?, parse(end)?),
            None => {
                let line = parse(s)?;
                Self::range(line, line)
            }
        }
    }
}

impl Serialize for LineSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LineSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parameters of one submission to the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionParams {
    /// Block until the remote job completes (or the wait times out)
    pub wait_for_completion: bool,

    /// Upper bound on the completion wait, in seconds
    pub wait_timeout_secs: u64,

    /// Prefix every returned line with its line number
    pub add_line_nos: bool,

    /// Layout of the returned text
    pub output_mode: OutputMode,

    /// OCR engine mode
    pub mode: ProcessingMode,
}

impl Default for SubmissionParams {
    fn default() -> Self {
        Self {
            wait_for_completion: true,
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            add_line_nos: true,
            output_mode: OutputMode::LayoutPreserving,
            mode: ProcessingMode::Form,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_wire_values() {
        assert_eq!(OutputMode::LayoutPreserving.as_str(), "layout_preserving");
        assert_eq!(OutputMode::Text.to_string(), "text");
        assert_eq!("Layout_Preserving".parse::<OutputMode>(), Ok(OutputMode::LayoutPreserving));
        assert!("columns".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_output_mode_serde_matches_wire() {
        let json = serde_json::to_string(&OutputMode::LayoutPreserving).unwrap();
        assert_eq!(json, "\"layout_preserving\"");
        let mode: ProcessingMode = serde_json::from_str("\"high_quality\"").unwrap();
        assert_eq!(mode, ProcessingMode::HighQuality);
    }

    #[test]
    fn test_line_selector_parse() {
        assert_eq!("all".parse::<LineSelector>(), Ok(LineSelector::All));
        assert_eq!("ALL".parse::<LineSelector>(), Ok(LineSelector::All));
        assert_eq!(
            "3-9".parse::<LineSelector>(),
            Ok(LineSelector::Range { start: 3, end: 9 })
        );
        assert_eq!(
            " 4 ".parse::<LineSelector>(),
            Ok(LineSelector::Range { start: 4, end: 4 })
        );
    }

    #[test]
    fn test_line_selector_rejects_bad_ranges() {
        for bad in ["0", "0-3", "9-3", "a-b", "", "1-"] {
            assert!(bad.parse::<LineSelector>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_line_selector_display() {
        assert_eq!(LineSelector::All.to_string(), "all");
        assert_eq!(LineSelector::range(2, 5).unwrap().to_string(), "2-5");
        assert_eq!(LineSelector::range(7, 7).unwrap().to_string(), "7");
    }

    #[test]
    fn test_default_submission_params() {
        let params = SubmissionParams::default();
        assert!(params.wait_for_completion);
        assert_eq!(params.wait_timeout_secs, 300);
        assert!(params.add_line_nos);
        assert_eq!(params.output_mode, OutputMode::LayoutPreserving);
        assert_eq!(params.mode, ProcessingMode::Form);
    }
}
