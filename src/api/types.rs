use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Which side of the conversation authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::Patient => "Patient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(deserialize_with = "deserialize_backend_time")]
    pub created_at: DateTime<Utc>,
    pub doctor_lang: String,
    pub patient_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub original_text: String,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(deserialize_with = "deserialize_backend_time")]
    pub timestamp: DateTime<Utc>,
}

pub const TRANSLATING_PLACEHOLDER: &str = "Translating...";

impl Message {
    pub fn local_time(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }

    /// Primary text as seen by `viewer`: own messages as authored, the
    /// peer's in translation.
    pub fn display_text(&self, viewer: Role) -> &str {
        if self.role == viewer {
            &self.original_text
        } else {
            self.translated_text
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(TRANSLATING_PLACEHOLDER)
        }
    }

    /// The other rendering, revealed by the "show original" toggle.
    pub fn alternate_text(&self, viewer: Role) -> Option<&str> {
        let alternate = if self.role == viewer {
            self.translated_text.as_deref()
        } else {
            Some(self.original_text.as_str())
        };
        alternate.filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSessionRequest<'a> {
    pub doctor_lang: &'a str,
    pub patient_lang: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// A finished recording ready for `POST /audio`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Accepts RFC 3339 or the backend's offset-less ISO form, which is UTC.
pub fn parse_backend_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_backend_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw}")))
}
