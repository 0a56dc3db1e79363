//! Typed input-parameter values for approval requests.
//!
//! Approval flows declare each input parameter's type; submitted values are
//! parsed against that declaration and mismatches are rejected at the
//! boundary rather than coerced.

use serde::{Deserialize, Serialize};

/// Declared type of a flow input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "string[]")]
    StringList,
}

/// A submitted parameter value. Closed sum — unknown shapes never survive
/// deserialization into the lifecycle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    String(String),
    StringList(Vec<String>),
}

impl ParamType {
    /// Parse a raw JSON value against this declared type.
    /// Returns a caller-facing message on mismatch.
    pub fn parse(&self, raw: &serde_json::Value) -> Result<ParamValue, String> {
        match self {
            ParamType::String => raw
                .as_str()
                .map(|s| ParamValue::String(s.to_string()))
                .ok_or_else(|| "expected a string".to_string()),
            ParamType::Number => match raw {
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .map(ParamValue::Number)
                    .ok_or_else(|| "number out of range".to_string()),
                // Form posts deliver numbers as strings.
                serde_json::Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(ParamValue::Number)
                    .map_err(|_| format!("'{}' is not a number", s)),
                _ => Err("expected a number".to_string()),
            },
            ParamType::Boolean => match raw {
                serde_json::Value::Bool(b) => Ok(ParamValue::Bool(*b)),
                serde_json::Value::String(s) => match s.as_str() {
                    "true" => Ok(ParamValue::Bool(true)),
                    "false" => Ok(ParamValue::Bool(false)),
                    _ => Err(format!("'{}' is not a boolean", s)),
                },
                _ => Err("expected a boolean".to_string()),
            },
            ParamType::StringList => raw
                .as_array()
                .ok_or_else(|| "expected a list of strings".to_string())?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| "expected a list of strings".to_string())
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::StringList),
        }
    }
}

/// Declaration of one input parameter on an approval flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
}

/// A submitted `{id, value}` pair on an approval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParam {
    pub id: String,
    pub value: ParamValue,
}
