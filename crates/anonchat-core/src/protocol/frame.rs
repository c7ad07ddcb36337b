//! Inbound frame decoding (panic-free).
//!
//! Every inbound line is classified into exactly one of four mutually
//! exclusive textual shapes, tried in a fixed order:
//!
//! 1. `<id>[<single-token>]` — single-element list, e.g. `43149[null]`
//! 2. `<id>{...}` — JSON object appended to the id, e.g. `40{"sid":"..."}`
//! 3. `<id>["<name>"|null,<bool|object|array>]` — the canonical event
//!    frame, e.g. `42["open-onetime-image",{"messageId":"..."}]`
//! 4. `<id>[a,b,c]` — opaque three-element list, e.g.
//!    `43150[null,"2024-12-09T22:34:24.329Z",[]]`
//!
//! Anything else is a `MalformedFrame` error. Each shape gets its own
//! tagged parser instead of positional regex groups, so payload extraction
//! cannot silently pick the wrong group.
//!
//! Parsing rules (as elsewhere in this crate):
//! - never index without a prior length/shape check;
//! - never `unwrap()` / `expect()` / `panic!()`.

use serde_json::{Map, Value};

use crate::error::{AnonchatError, Result};

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Single-element list frame. `token` is `None` for a literal `null`.
    Ack { id: u64, token: Option<String> },
    /// JSON object directly appended to the id (handshake shape).
    Open { id: u64, data: Value },
    /// Two-element event frame: quoted name (or `null`) plus a boolean,
    /// object, or array payload.
    Event {
        id: u64,
        name: Option<String>,
        payload: Value,
    },
    /// Three-element list frame. The body is opaque: no caller consumes
    /// it, so the elements are intentionally not decomposed.
    Triple { id: u64 },
}

impl InboundFrame {
    /// Frame id as it appeared on the wire.
    pub fn id(&self) -> u64 {
        match self {
            InboundFrame::Ack { id, .. }
            | InboundFrame::Open { id, .. }
            | InboundFrame::Event { id, .. }
            | InboundFrame::Triple { id } => *id,
        }
    }

    /// Event or token name, when the shape carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            InboundFrame::Ack { token, .. } => token.as_deref(),
            InboundFrame::Event { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Normalized payload: `Open` yields its object, `Event` its typed
    /// payload, `Ack` and `Triple` an empty object.
    pub fn payload(&self) -> Value {
        match self {
            InboundFrame::Open { data, .. } => data.clone(),
            InboundFrame::Event { payload, .. } => payload.clone(),
            InboundFrame::Ack { .. } | InboundFrame::Triple { .. } => {
                Value::Object(Map::new())
            }
        }
    }
}

/// Decode one inbound line into an [`InboundFrame`].
pub fn decode(raw: &str) -> Result<InboundFrame> {
    let digits = raw.len() - raw.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return Err(malformed(raw));
    }
    let id: u64 = raw[..digits].parse().map_err(|_| malformed(raw))?;
    let rest = &raw[digits..];

    if rest.starts_with('{') && rest.ends_with('}') {
        return decode_open(id, rest).ok_or_else(|| malformed(raw));
    }

    if rest.len() >= 2 && rest.starts_with('[') && rest.ends_with(']') {
        let inner = &rest[1..rest.len() - 1];
        return decode_ack(id, inner)
            .or_else(|| decode_event(id, inner))
            .or_else(|| decode_triple(id, inner))
            .ok_or_else(|| malformed(raw));
    }

    Err(malformed(raw))
}

fn malformed(raw: &str) -> AnonchatError {
    AnonchatError::MalformedFrame(raw.to_string())
}

/// Shape 2: `<id>{...}`. The body must parse as a JSON object.
fn decode_open(id: u64, rest: &str) -> Option<InboundFrame> {
    let data: Value = serde_json::from_str(rest).ok()?;
    data.is_object().then(|| InboundFrame::Open { id, data })
}

/// Shape 1: a single token with no comma or newline, e.g. `null`.
fn decode_ack(id: u64, inner: &str) -> Option<InboundFrame> {
    if inner.is_empty() || inner.contains(',') || inner.contains('\n') {
        return None;
    }
    let token = (inner != "null").then(|| inner.to_string());
    Some(InboundFrame::Ack { id, token })
}

/// Shape 3: `"name"` or `null`, a comma, then a bool, object, or array.
fn decode_event(id: u64, inner: &str) -> Option<InboundFrame> {
    let (name, body) = if let Some(after) = inner.strip_prefix("null,") {
        (None, after)
    } else {
        let quoted = inner.strip_prefix('"')?;
        let end = quoted.find('"')?;
        let name = &quoted[..end];
        if name.is_empty() || name.contains(',') || name.contains('\n') {
            return None;
        }
        let body = quoted[end + 1..].strip_prefix(',')?;
        (Some(name.to_string()), body)
    };

    let payload = match body {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        b if b.len() > 2 && b.starts_with('{') && b.ends_with('}') => {
            let v: Value = serde_json::from_str(b).ok()?;
            v.is_object().then_some(v)?
        }
        b if b.len() > 2 && b.starts_with('[') && b.ends_with(']') => {
            let v: Value = serde_json::from_str(b).ok()?;
            v.is_array().then_some(v)?
        }
        _ => return None,
    };

    Some(InboundFrame::Event { id, name, payload })
}

/// Shape 4: exactly three comma-free elements.
fn decode_triple(id: u64, inner: &str) -> Option<InboundFrame> {
    let mut parts = inner.split(',');
    for _ in 0..3 {
        let part = parts.next()?;
        if part.is_empty() || part.contains('\n') {
            return None;
        }
    }
    if parts.next().is_some() {
        return None;
    }
    Some(InboundFrame::Triple { id })
}
