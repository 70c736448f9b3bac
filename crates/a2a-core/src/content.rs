//! ContentPart — the internal, tagged representation of message content.
//!
//! Unlike the wire [`crate::message::Part`] (a bag of optional fields),
//! `ContentPart` is a sealed discriminated union: it is always exactly one
//! of text or media, and media always carries a concrete kind. The codec
//! in [`crate::part_codec`] is the only place that converts between the
//! two shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single unit of content in its internal, tagged form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ContentPart {
    Text { text: String },
    Image { media: Media },
    Audio { media: Media },
    Video { media: Media },
    Document { media: Media },
}

impl ContentPart {
    /// Wrap `media` as the `ContentPart` variant matching `kind`.
    pub fn media(kind: MediaKind, media: Media) -> Self {
        match kind {
            MediaKind::Image => ContentPart::Image { media },
            MediaKind::Audio => ContentPart::Audio { media },
            MediaKind::Video => ContentPart::Video { media },
            MediaKind::Document => ContentPart::Document { media },
        }
    }

    /// The `Media` payload, if this is a media variant.
    pub fn media_ref(&self) -> Option<&Media> {
        match self {
            ContentPart::Text { .. } => None,
            ContentPart::Image { media }
            | ContentPart::Audio { media }
            | ContentPart::Video { media }
            | ContentPart::Document { media } => Some(media),
        }
    }
}

/// The inferred media category, used to pick a `ContentPart` variant from
/// a MIME type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

impl MediaKind {
    /// Classify a MIME type by its top-level prefix (`image/*`, `audio/*`,
    /// `video/*`); anything else is treated as an opaque document.
    pub fn infer(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            MediaKind::Image
        } else if mime_type.starts_with("audio/") {
            MediaKind::Audio
        } else if mime_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }
}

/// Media content: exactly one of `url`, `data` (base64), or `raw` (bytes)
/// is populated alongside a MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
}

impl Media {
    pub fn url(mime_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            url: Some(url.into()),
            data: None,
            raw: None,
        }
    }

    pub fn base64(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            url: None,
            data: Some(data.into()),
            raw: None,
        }
    }

    pub fn raw(mime_type: impl Into<String>, raw: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            url: None,
            data: None,
            raw: Some(raw),
        }
    }
}
