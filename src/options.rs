use std::collections::HashMap;

use crate::error::{Error, Result};

pub const BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH: &str = "buildLegacyCtxUtilAbsolutePath";

/// Options every transform call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Module specifier the rewritten pages import `buildLegacyCtx` from.
    pub build_legacy_ctx_util_absolute_path: String,
}

impl TransformOptions {
    pub fn new(build_legacy_ctx_util_absolute_path: impl Into<String>) -> Self {
        Self {
            build_legacy_ctx_util_absolute_path: build_legacy_ctx_util_absolute_path.into(),
        }
    }

    /// Reads the options out of a loosely typed config object. Unknown keys
    /// are ignored.
    pub fn from_config(config: &HashMap<String, serde_json::Value>) -> Result<Self> {
        match config.get(BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH) {
            Some(serde_json::Value::String(path)) => Ok(Self::new(path.clone())),
            other => Err(Error::Config {
                key: BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH,
                found: json_type_name(other),
            }),
        }
    }
}

fn json_type_name(value: Option<&serde_json::Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(serde_json::Value::Null) => "null",
        Some(serde_json::Value::Bool(_)) => "boolean",
        Some(serde_json::Value::Number(_)) => "number",
        Some(serde_json::Value::String(_)) => "string",
        Some(serde_json::Value::Array(_) | serde_json::Value::Object(_)) => "object",
    }
}
