//! Parameter normalization.
//!
//! Maps a [`CallRequest`] onto the positional parameter list of the remote
//! method (session token excluded). For structured calls the order is fixed:
//!
//! 1. `surveyId`
//! 2. every element of `participantData`
//! 3. every element of `args`
//! 4. only when none of the above keys is present: every value of the bag,
//!    in insertion order
//!
//! Free-form commands are first turned into such a bag, so both shapes go
//! through the same ordering. Nothing here validates arity or types; a
//! malformed call comes back from the remote as a fault.

use limerc_core::{CallRequest, FieldBag};
use serde_json::Value;

/// Bag key for the survey identifier.
pub const SURVEY_ID: &str = "surveyId";
/// Bag key for participant entries.
pub const PARTICIPANT_DATA: &str = "participantData";
/// Bag key for generic positional arguments.
pub const ARGS: &str = "args";

/// Methods whose only free-form argument is a survey id.
const SURVEY_ID_METHODS: &[&str] = &[
    "get_survey_properties",
    "list_participants",
    "get_participant_properties",
];

/// Method whose free-form arguments are a survey id then participants.
const ADD_PARTICIPANTS: &str = "add_participants";

/// A call ready to be put on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCall {
    /// Remote method name. Empty when the caller gave none.
    pub method: String,
    /// Positional arguments, session token excluded.
    pub args: Vec<Value>,
}

/// Normalize any call shape into `(method, args)`.
pub fn normalize(call: CallRequest) -> NormalizedCall {
    match call {
        CallRequest::FreeformCommand(command) => {
            let (method, fields) = parse_freeform(&command);
            NormalizedCall {
                args: order_fields(&fields),
                method,
            }
        }
        CallRequest::PositionalCall { method, args } => NormalizedCall { method, args },
        CallRequest::StructuredCall { method, fields } => NormalizedCall {
            args: order_fields(&fields),
            method,
        },
    }
}

/// Split a command line into its method name and a field bag.
///
/// Extra tokens after the survey id of a [`SURVEY_ID_METHODS`] method are
/// dropped.
pub fn parse_freeform(command: &str) -> (String, FieldBag) {
    let mut tokens = command.split_whitespace();
    let method = tokens.next().unwrap_or_default().to_string();
    let rest: Vec<Value> = tokens.map(token_value).collect();

    let mut fields = FieldBag::new();
    if rest.is_empty() {
        return (method, fields);
    }

    let mut rest = rest.into_iter();
    if SURVEY_ID_METHODS.contains(&method.as_str()) {
        if let Some(id) = rest.next() {
            let _ = fields.insert(SURVEY_ID.to_string(), id);
        }
    } else if method == ADD_PARTICIPANTS {
        if let Some(id) = rest.next() {
            let _ = fields.insert(SURVEY_ID.to_string(), id);
        }
        let _ = fields.insert(PARTICIPANT_DATA.to_string(), Value::Array(rest.collect()));
    } else {
        let _ = fields.insert(ARGS.to_string(), Value::Array(rest.collect()));
    }
    (method, fields)
}

/// Apply the structured-call precedence to a field bag.
pub fn order_fields(fields: &FieldBag) -> Vec<Value> {
    let survey_id = present(fields, SURVEY_ID);
    let participants = present(fields, PARTICIPANT_DATA);
    let args = present(fields, ARGS);

    let mut ordered = Vec::new();
    if let Some(id) = survey_id {
        ordered.push(id.clone());
    }
    if let Some(data) = participants {
        extend_sequence(&mut ordered, data);
    }
    if let Some(extra) = args {
        extend_sequence(&mut ordered, extra);
    }

    if survey_id.is_none() && participants.is_none() && args.is_none() {
        ordered.extend(fields.values().cloned());
    }
    ordered
}

/// A key counts as present when it exists with a non-null value.
fn present<'a>(fields: &'a FieldBag, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

/// Append a sequence element-wise; a scalar counts as a one-element sequence.
fn extend_sequence(out: &mut Vec<Value>, value: &Value) {
    match value {
        Value::Array(items) => out.extend(items.iter().cloned()),
        other => out.push(other.clone()),
    }
}

/// Type a command-line token: canonical unsigned integers become numbers,
/// everything else stays a string.
pub(crate) fn token_value(token: &str) -> Value {
    let canonical = token == "0" || !token.starts_with('0');
    if canonical && token.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = token.parse::<u64>() {
            return Value::from(n);
        }
    }
    Value::String(token.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
