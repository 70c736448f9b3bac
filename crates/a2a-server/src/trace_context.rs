//! Minimal W3C `traceparent` propagation.
//!
//! This is the "pluggable text-map propagator" the request flow needs:
//! extract the inbound header, thread it through the dispatcher into the
//! conversation invocation, and format it back out for any downstream
//! call we make on the caller's behalf.

const TRACEPARENT_HEADER: &str = "traceparent";
const VERSION: &str = "00";

/// A parsed `traceparent` header value: `{version}-{trace-id}-{parent-id}-{flags}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub parent_id: String,
    pub flags: String,
}

impl TraceContext {
    /// Parse a `traceparent` header value. Returns `None` if it doesn't
    /// match the expected four-field, hyphen-separated shape.
    pub fn parse(header: &str) -> Option<Self> {
        let mut fields = header.trim().split('-');
        let version = fields.next()?;
        let trace_id = fields.next()?;
        let parent_id = fields.next()?;
        let flags = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        if version.len() != 2 || trace_id.len() != 32 || parent_id.len() != 16 || flags.len() != 2
        {
            return None;
        }
        Some(Self {
            trace_id: trace_id.to_string(),
            parent_id: parent_id.to_string(),
            flags: flags.to_string(),
        })
    }

    /// Extract a `TraceContext` from an axum/http header map, if a valid
    /// `traceparent` header is present.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Option<Self> {
        let raw = headers.get(TRACEPARENT_HEADER)?.to_str().ok()?;
        Self::parse(raw)
    }

    /// Format this context back out as a `traceparent` header value.
    pub fn to_header_value(&self) -> String {
        format!(
            "{VERSION}-{}-{}-{}",
            self.trace_id, self.parent_id, self.flags
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_header() {
        let raw = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
        let ctx = TraceContext::parse(raw).unwrap();
        assert_eq!(ctx.trace_id, "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(ctx.parent_id, "00f067aa0ba902b7");
        assert_eq!(ctx.to_header_value(), raw);
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(TraceContext::parse("not-a-traceparent").is_none());
        assert!(TraceContext::parse("00-shortid-00f067aa0ba902b7-01").is_none());
    }
}
