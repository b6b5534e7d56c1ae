//! Context propagators: carry context values across workflow boundaries
//! through headers.

use crate::workflow::context::WorkflowContext;
use cascade_core::api::common::Header;
use cascade_core::converter::DataConverter;
use serde_json::Value;

/// Copies selected context values into outgoing headers (continue-as-new,
/// child workflows, scheduled activities) and back out of incoming ones.
pub trait ContextPropagator: Send + Sync {
    /// Move values from the workflow context into the header.
    fn inject(&self, ctx: &WorkflowContext, header: &mut Header);

    /// Extract `(key, value)` pairs from an incoming header; they seed the
    /// root context's value chain.
    fn extract(&self, header: &Header) -> Vec<(String, Value)>;
}

/// Propagates a fixed set of string keys, encoding values with the default
/// converter.
pub struct KeysPropagator {
    keys: Vec<String>,
    converter: DataConverter,
}

impl KeysPropagator {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            converter: DataConverter::default(),
        }
    }
}

impl ContextPropagator for KeysPropagator {
    fn inject(&self, ctx: &WorkflowContext, header: &mut Header) {
        for key in &self.keys {
            let Some(value) = ctx.value(key) else {
                continue;
            };
            match self.converter.to_payload(&value) {
                Ok(payload) => {
                    header.fields.insert(key.clone(), payload);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to inject header value")
                }
            }
        }
    }

    fn extract(&self, header: &Header) -> Vec<(String, Value)> {
        let mut values = Vec::new();
        for key in &self.keys {
            let Some(payload) = header.fields.get(key) else {
                continue;
            };
            match self.converter.from_payload::<Value>(payload) {
                Ok(value) => values.push((key.clone(), value)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to extract header value")
                }
            }
        }
        values
    }
}
