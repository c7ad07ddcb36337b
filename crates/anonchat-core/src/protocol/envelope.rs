//! Outbound envelope encoding.

use serde_json::Value;

/// Outbound unit on the wire: an id plus an optional bracketed payload.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Request id chosen by the caller. Unique among pending requests only.
    pub id: u64,
    /// Optional method name.
    pub method: Option<String>,
    /// Optional params, rendered as canonical JSON text on the wire.
    pub params: Option<Value>,
}

impl Envelope {
    /// Bare id frame (acks, handshake frames like `40`).
    pub fn bare(id: u64) -> Self {
        Self {
            id,
            method: None,
            params: None,
        }
    }

    /// `id[method]` frame.
    pub fn method(id: u64, method: impl Into<String>) -> Self {
        Self {
            id,
            method: Some(method.into()),
            params: None,
        }
    }

    /// `id[method,params]` frame.
    pub fn call(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: Some(method.into()),
            params: Some(params),
        }
    }

    /// Render the envelope into its wire form.
    pub fn encode(&self) -> String {
        match (&self.method, &self.params) {
            (None, _) => self.id.to_string(),
            (Some(method), None) => format!("{}[{}]", self.id, method),
            (Some(method), Some(params)) => {
                format!("{}[{},{}]", self.id, method, params)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_bare() {
        assert_eq!(Envelope::bare(40).encode(), "40");
    }

    #[test]
    fn encode_method_only() {
        assert_eq!(Envelope::method(421, "typing").encode(), "421[typing]");
    }

    #[test]
    fn encode_method_with_params() {
        let env = Envelope::call(42, "\"ping\"", json!({"a": 1}));
        assert_eq!(env.encode(), "42[\"ping\",{\"a\":1}]");
    }

    #[test]
    fn encode_array_params() {
        let env = Envelope::call(430, "\"join\"", json!(["room", 7]));
        assert_eq!(env.encode(), "430[\"join\",[\"room\",7]]");
    }
}
