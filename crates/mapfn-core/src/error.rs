use crate::dimension::Axis;
use crate::messages::{MessageKey, Messages};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a coordinate pair failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoField {
    Lat,
    Lng,
}

impl GeoField {
    pub fn as_str(self) -> &'static str {
        match self {
            GeoField::Lat => "lat",
            GeoField::Lng => "lng",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GeoField::Lat => "latitude",
            GeoField::Lng => "longitude",
        }
    }
}

impl std::fmt::Display for GeoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid or omitted value of {}: {raw_value}", field.label())]
    GeoValidation { field: GeoField, raw_value: String },

    #[error("Unsupported {axis} unit: {raw_value}")]
    UnsupportedUnit { axis: Axis, raw_value: String },

    #[error("Map marker description cannot be empty")]
    EmptyMarkerDescription,

    #[error("Map state desync: {message}")]
    StateDesync { message: String },

    #[error("Invalid map payload JSON: {message}")]
    InvalidPayload { message: String },

    #[error("Page scan failed: {message}")]
    PageScan { message: String },
}

impl Error {
    pub(crate) fn geo(field: GeoField, raw_value: &str) -> Self {
        Self::GeoValidation {
            field,
            raw_value: raw_value.to_string(),
        }
    }

    pub fn state_desync(message: impl Into<String>) -> Self {
        Self::StateDesync {
            message: message.into(),
        }
    }

    /// Errors that replace a single tag's output with an inline message.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::GeoValidation { .. }
                | Error::UnsupportedUnit { .. }
                | Error::EmptyMarkerDescription
        )
    }

    /// Message identifier used for the user-visible text of this error, if any.
    pub fn message_key(&self) -> Option<MessageKey> {
        match self {
            Error::GeoValidation {
                field: GeoField::Lat,
                ..
            } => Some(MessageKey::ErrorLat),
            Error::GeoValidation {
                field: GeoField::Lng,
                ..
            } => Some(MessageKey::ErrorLng),
            Error::UnsupportedUnit {
                axis: Axis::Width, ..
            } => Some(MessageKey::ErrorWidth),
            Error::UnsupportedUnit {
                axis: Axis::Height,
                ..
            } => Some(MessageKey::ErrorHeight),
            Error::EmptyMarkerDescription => Some(MessageKey::ErrorEmptyMarkerDescription),
            Error::StateDesync { .. } | Error::InvalidPayload { .. } | Error::PageScan { .. } => {
                None
            }
        }
    }

    fn raw_value(&self) -> Option<&str> {
        match self {
            Error::GeoValidation { raw_value, .. } | Error::UnsupportedUnit { raw_value, .. } => {
                Some(raw_value.as_str())
            }
            _ => None,
        }
    }

    /// Localized plain text for this error. Falls back to the `Display` text.
    pub fn message_text(&self, messages: &Messages) -> String {
        match self.message_key() {
            Some(key) => messages.format(key, self.raw_value()),
            None => self.to_string(),
        }
    }

    /// Like [`Error::message_text`], with the offending value and the fallback HTML-escaped.
    pub fn user_message(&self, messages: &Messages) -> String {
        let raw = self
            .raw_value()
            .map(|raw| htmlize::escape_text(raw).into_owned());
        match self.message_key() {
            Some(key) => messages.format(key, raw.as_deref()),
            None => htmlize::escape_text(self.to_string()).into_owned(),
        }
    }
}
