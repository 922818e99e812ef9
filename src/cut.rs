//! A cut is a segment of a recording along with the supervisions (transcripts, speaker and
//! language labels) that fall inside it. Each line of a manifest is one cut serialised as JSON.
//! Only the fields we actually look at are typed, everything else (recording sources, feature
//! locations, custom fields) is carried along untouched so a cut can be written back out without
//! losing information.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervision {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_id: Option<String>,
    pub start: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub id: String,
    /// Offset into the recording in seconds
    pub start: f64,
    /// Length of the cut in seconds
    pub duration: f64,
    /// Channel, this is sometimes a list for multi-channel cuts so it's left untyped
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub channel: Value,
    #[serde(default)]
    pub supervisions: Vec<Supervision>,
    /// Recording, features and anything else the manifest had in it
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cut {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// All the supervision transcripts joined with a space
    pub fn text(&self) -> String {
        self.supervisions
            .iter()
            .filter_map(|s| s.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
