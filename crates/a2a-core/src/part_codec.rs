//! Bidirectional translation between the wire [`Part`] and the internal
//! [`ContentPart`].
//!
//! The two directions are deliberately asymmetric: inbound base64 `data`
//! is preserved as base64 in the `ContentPart`, but outbound it is decoded
//! and re-emitted as `raw` bytes, so a client always receives a single
//! canonical binary form regardless of how the agent produced it.

use base64::Engine;

use crate::content::{ContentPart, Media, MediaKind};
use crate::error::A2AError;
use crate::message::Part;

/// Translate one wire `Part` into its internal `ContentPart`.
///
/// Field precedence mirrors the order a reader would check them: `text`,
/// then `raw`, then `url`, then `data`. A `data` field holding a JSON
/// object or array (as opposed to a base64 string) is rejected, as is a
/// part with no content field set at all.
pub fn decode_part(part: &Part) -> Result<ContentPart, A2AError> {
    if let Some(text) = &part.text {
        return Ok(ContentPart::Text { text: text.clone() });
    }

    let media_type = part.media_type.clone().unwrap_or_default();
    let kind = MediaKind::infer(&media_type);

    if let Some(raw) = &part.raw {
        if !raw.is_empty() {
            return Ok(ContentPart::media(kind, Media::raw(media_type, raw.clone())));
        }
    }

    if let Some(url) = &part.url {
        return Ok(ContentPart::media(kind, Media::url(media_type, url.clone())));
    }

    if let Some(data) = &part.data {
        return match data {
            serde_json::Value::String(b64) => {
                Ok(ContentPart::media(kind, Media::base64(media_type, b64.clone())))
            }
            _ => Err(A2AError::InvalidParams(
                "structured data parts unsupported: `data` must be a base64-encoded string".into(),
            )),
        };
    }

    Err(A2AError::InvalidParams("empty part: no content field set".into()))
}

/// Translate an internal `ContentPart` into its wire `Part`.
///
/// Base64 `data` is decoded into `raw` bytes on the way out (see module
/// docs); `url` and `raw` pass through unchanged.
pub fn encode_part(content: &ContentPart) -> Result<Part, A2AError> {
    match content {
        ContentPart::Text { text } => Ok(Part::text(text.clone())),
        _ => {
            let media = content
                .media_ref()
                .expect("non-text ContentPart variants always carry media");
            if let Some(raw) = &media.raw {
                Ok(Part::raw(raw.clone(), media.mime_type.clone()))
            } else if let Some(data) = &media.data {
                let raw = base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|e| A2AError::InvalidParams(format!("invalid base64 data: {e}")))?;
                Ok(Part::raw(raw, media.mime_type.clone()))
            } else if let Some(url) = &media.url {
                Ok(Part::url(url.clone(), media.mime_type.clone()))
            } else {
                Err(A2AError::Internal("media content with no source set".into()))
            }
        }
    }
}

/// Translate a whole part list, stopping at the first invalid part.
pub fn decode_parts(parts: &[Part]) -> Result<Vec<ContentPart>, A2AError> {
    parts.iter().map(decode_part).collect()
}

/// Translate a whole content list back to the wire form.
pub fn encode_parts(parts: &[ContentPart]) -> Result<Vec<Part>, A2AError> {
    parts.iter().map(encode_part).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_part_round_trips() {
        let part = Part::text("hello");
        let content = decode_part(&part).unwrap();
        assert_eq!(content, ContentPart::Text { text: "hello".into() });
        let back = encode_part(&content).unwrap();
        assert_eq!(back.text.as_deref(), Some("hello"));
    }

    #[test]
    fn url_part_round_trips_byte_equal() {
        let part = Part::url("https://example.com/a.png", "image/png");
        let content = decode_part(&part).unwrap();
        let back = encode_part(&content).unwrap();
        assert_eq!(back.url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(back.media_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn raw_part_round_trips_byte_equal() {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        let part = Part::raw(bytes.clone(), "image/png");
        let content = decode_part(&part).unwrap();
        let back = encode_part(&content).unwrap();
        assert_eq!(back.raw, Some(bytes));
    }

    #[test]
    fn base64_data_materializes_as_raw_bytes_outbound() {
        let bytes = vec![1, 2, 3, 4, 5];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let part = Part::base64_data(b64, "application/octet-stream");
        let content = decode_part(&part).unwrap();
        match &content {
            ContentPart::Document { media } => assert_eq!(media.data.as_deref(), Some(part.data.as_ref().unwrap().as_str().unwrap())),
            other => panic!("unexpected variant: {other:?}"),
        }
        let back = encode_part(&content).unwrap();
        assert_eq!(back.raw, Some(bytes));
        assert!(back.data.is_none());
    }

    #[test]
    fn structured_data_part_is_rejected() {
        let part = Part {
            data: Some(serde_json::json!({"key": "val"})),
            media_type: Some("application/json".into()),
            ..Default::default()
        };
        let err = decode_part(&part).unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams(_)));
    }

    #[test]
    fn empty_part_is_rejected() {
        let err = decode_part(&Part::default()).unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams(_)));
    }

    #[test]
    fn media_kind_inference_by_mime_prefix() {
        assert_eq!(MediaKind::infer("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::infer("audio/mpeg"), MediaKind::Audio);
        assert_eq!(MediaKind::infer("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::infer("application/pdf"), MediaKind::Document);
    }
}
