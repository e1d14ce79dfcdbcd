//! Caller-facing call descriptions.
//!
//! A [`CallRequest`] is whatever shape the caller had at hand: a command line
//! such as `"get_survey_properties 123"`, a method name with positional
//! arguments, or a method name with a bag of named fields. Turning any of
//! these into the remote method's positional parameter list is the job of
//! the normalizer in `limerc-rpc`.

use serde_json::Value;

/// Named-field parameter bag.
///
/// Backed by an insertion-ordered map (`serde_json` is built with
/// `preserve_order`), so fallback normalization sees values in the order the
/// caller supplied them.
pub type FieldBag = serde_json::Map<String, Value>;

/// A single call as described by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum CallRequest {
    /// Whitespace-separated command; token 0 is the method name.
    FreeformCommand(String),
    /// Method name plus ready-made positional arguments.
    PositionalCall {
        /// Remote method name.
        method: String,
        /// Arguments in signature order (session token excluded).
        args: Vec<Value>,
    },
    /// Method name plus named fields.
    ///
    /// Recognized keys are `surveyId`, `participantData` and `args`; any
    /// other keys are used only when none of those are present.
    StructuredCall {
        /// Remote method name.
        method: String,
        /// Named fields in insertion order.
        fields: FieldBag,
    },
}

/// Errors from parsing a JSON call description.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CallParseError {
    /// The description was not a JSON object.
    #[error("call description must be a JSON object")]
    NotAnObject,
    /// The `method` member was missing, empty, or not a string.
    #[error("call description is missing a method name")]
    MissingMethod,
    /// `params` was present but neither an array nor an object.
    #[error("params must be an array or an object, got {0}")]
    InvalidParams(&'static str),
}

impl CallRequest {
    /// Build a free-form command.
    pub fn freeform(command: impl Into<String>) -> Self {
        Self::FreeformCommand(command.into())
    }

    /// Build a positional call.
    pub fn positional(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self::PositionalCall {
            method: method.into(),
            args,
        }
    }

    /// Build a structured call.
    pub fn structured(method: impl Into<String>, fields: FieldBag) -> Self {
        Self::StructuredCall {
            method: method.into(),
            fields,
        }
    }

    /// Parse `{"method": ..., "params": ...}`.
    ///
    /// Array params become a [`CallRequest::PositionalCall`], object params
    /// (or no params) become a [`CallRequest::StructuredCall`].
    pub fn from_json(value: &Value) -> Result<Self, CallParseError> {
        let obj = value.as_object().ok_or(CallParseError::NotAnObject)?;
        let method = obj
            .get("method")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(CallParseError::MissingMethod)?;

        match obj.get("params") {
            None | Some(Value::Null) => Ok(Self::structured(method, FieldBag::new())),
            Some(Value::Array(args)) => Ok(Self::positional(method, args.clone())),
            Some(Value::Object(fields)) => Ok(Self::structured(method, fields.clone())),
            Some(other) => Err(CallParseError::InvalidParams(json_type_name(other))),
        }
    }

    /// Method name this call targets, if one can be determined.
    ///
    /// Free-form commands report their first token; an empty command has none.
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Self::FreeformCommand(cmd) => cmd.split_whitespace().next(),
            Self::PositionalCall { method, .. } | Self::StructuredCall { method, .. } => {
                Some(method.as_str())
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
