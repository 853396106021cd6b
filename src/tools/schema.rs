//! 工具参数校验：注册时把 Tool::parameters_schema 编译成 JSONSchema，执行前用它检查 args
//!
//! 校验失败统一映射为 ToolError::InvalidArgs；缺少必填字段的消息固定为 `Missing required argument: <name>`。

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::error::{SetupError, ToolError};

/// 编译工具声明的参数 schema
pub fn compile_schema(tool: &str, schema: &Value) -> Result<JSONSchema, SetupError> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|e| SetupError::ToolSchema {
            tool: tool.to_string(),
            message: e.to_string(),
        })
}

/// 按已编译的 schema 校验 args；多个错误以 "; " 连接
pub fn check_args(validator: &JSONSchema, args: &Value) -> Result<(), ToolError> {
    if let Err(errors) = validator.validate(args) {
        let message = errors
            .map(|e| describe(&e))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ToolError::InvalidArgs(message));
    }
    Ok(())
}

fn describe(error: &ValidationError<'_>) -> String {
    if let ValidationErrorKind::Required { property } = &error.kind {
        let name = property
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| property.to_string());
        return format!("Missing required argument: {}", name);
    }
    let path = error.instance_path.to_string();
    if path.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", path, error)
    }
}

/// 读取已校验过的字符串参数
pub fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArgs(format!("Missing required argument: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> JSONSchema {
        compile_schema(
            "writeFile",
            &json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "content": { "type": "string" },
                    "mode": { "type": "string", "enum": ["overwrite", "append"] }
                },
                "required": ["path", "content"]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_args() {
        assert!(check_args(&validator(), &json!({"path": "a", "content": ""})).is_ok());
    }

    #[test]
    fn test_missing_field() {
        let err = check_args(&validator(), &json!({"path": "a"})).unwrap_err();
        assert_eq!(err, ToolError::InvalidArgs("Missing required argument: content".into()));
    }

    #[test]
    fn test_wrong_type_names_the_argument() {
        let err = check_args(&validator(), &json!({"path": 3, "content": "x"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("/path: "), "{msg}");
        assert!(msg.contains("string"), "{msg}");
    }

    #[test]
    fn test_keywords_beyond_required_and_type() {
        let err = check_args(
            &validator(),
            &json!({"path": "a", "content": "x", "mode": "truncate"}),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("/mode: "), "{err}");
    }

    #[test]
    fn test_non_object_args_rejected() {
        assert!(check_args(&validator(), &json!("path")).is_err());
        assert!(check_args(&validator(), &Value::Null).is_err());
    }

    #[test]
    fn test_broken_schema_fails_to_compile() {
        let err = compile_schema("bad", &json!({"type": 12})).unwrap_err();
        assert!(err.to_string().starts_with("Invalid parameters schema for tool 'bad'"));
    }
}
