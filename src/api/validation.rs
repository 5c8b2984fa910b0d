use actix_web::{HttpResponse, error::InternalError, web};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

impl ErrorResponse {
    /// Body for a single failing field, optionally listing its allowed values
    pub fn field(field: &str, messages: Vec<String>, allowed: Option<&[&str]>) -> Self {
        let mut detail = serde_json::json!({ "errors": messages });
        if let Some(allowed) = allowed {
            detail["allowed"] = serde_json::json!(allowed);
        }

        let mut fields = serde_json::Map::new();
        fields.insert(field.to_string(), detail);

        ErrorResponse {
            error: "Validation failed".to_string(),
            fields: serde_json::Value::Object(fields),
        }
    }

    pub fn message(error: &str, message: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.to_string(),
            fields: serde_json::json!({ "message": message.into() }),
        }
    }
}

fn bad_request(body: ErrorResponse) -> actix_web::Error {
    InternalError::from_response("", HttpResponse::BadRequest().json(body)).into()
}

/// Turn a serde/payload failure into a message a client can act on
pub fn describe_payload_error(err: &str) -> String {
    // serde appends " at line X column Y"; the position is noise for clients
    let reason = err
        .split_once(" at line ")
        .map_or(err, |(head, _)| head)
        .trim_start_matches("Json deserialize error: ");

    if reason.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload".to_string()
    } else if reason.contains("unknown variant") {
        format!("Invalid enum value: {}", reason)
    } else if reason.contains("missing field") || reason.contains("invalid type") {
        reason.to_string()
    } else if reason.to_lowercase().contains("content type") {
        "Expected Content-Type: application/json".to_string()
    } else {
        "Invalid JSON format".to_string()
    }
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config(max_payload_size: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(|err, _req| {
            match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    let mut fields = serde_json::Map::new();
                    for (field, errors) in validation_errors.field_errors() {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
                            })
                            .collect();
                        fields.insert(
                            field.to_string(),
                            serde_json::json!({"errors": messages})
                        );
                    }

                    bad_request(ErrorResponse {
                        error: "Validation failed".to_string(),
                        fields: serde_json::Value::Object(fields),
                    })
                }
                actix_web_validator::Error::Deserialize(de_err) => bad_request(ErrorResponse::message(
                    "Request validation failed",
                    describe_payload_error(&de_err.to_string()),
                )),
                actix_web_validator::Error::JsonPayloadError(payload_err) => bad_request(ErrorResponse::message(
                    "Request validation failed",
                    describe_payload_error(&payload_err.to_string()),
                )),
                _ => bad_request(ErrorResponse::message("Validation failed", "Validation error")),
            }
        })
}

/// Query-string extraction errors share the JSON error body
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        bad_request(ErrorResponse::message(
            "Invalid query parameters",
            err.to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_message_keeps_allowed_values() {
        let msg = describe_payload_error(
            "Json deserialize error: unknown variant `EXPLODED`, expected one of `PENDING`, `RUNNING`, `COMPLETED`, `FAILED` at line 1 column 25",
        );
        assert_eq!(
            msg,
            "Invalid enum value: unknown variant `EXPLODED`, expected one of `PENDING`, `RUNNING`, `COMPLETED`, `FAILED`"
        );
    }

    #[test]
    fn empty_body_and_garbage_are_distinguished() {
        assert_eq!(
            describe_payload_error("Json deserialize error: EOF while parsing a value at line 1 column 0"),
            "Request body is empty. Expected JSON payload"
        );
        assert_eq!(
            describe_payload_error("Json deserialize error: expected value at line 1 column 1"),
            "Invalid JSON format"
        );
        assert_eq!(
            describe_payload_error("Json deserialize error: missing field `name` at line 1 column 2"),
            "missing field `name`"
        );
    }

    #[test]
    fn field_body_lists_allowed_values() {
        let body = ErrorResponse::field("sort", vec!["bad".into()], Some(&["name", "-name"]));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["fields"]["sort"]["errors"][0], "bad");
        assert_eq!(json["fields"]["sort"]["allowed"][1], "-name");
    }
}
