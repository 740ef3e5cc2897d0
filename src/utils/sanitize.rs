use serde_json::Value;

/// Masks sensitive fields in JSON payloads before they are logged
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password"
            | "secret"
            | "secret_key"
            | "key"
            | "token"
            | "paylike_token"
            | "api_key"
            | "authorization"
            | "card"
            | "card_id"
            | "cardid"
            | "email"
            | "customerip"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let visible: String = chars[..4].iter().collect();
            let end: String = chars[chars.len() - 4..].iter().collect();
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_card_object() {
        let input = json!({
            "transaction": {
                "id": "5da8594aa6b3fe0001d2ab8d",
                "card": { "bin": "410000", "last4": "0000" },
                "amount": 2500
            }
        });

        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["transaction"]["card"], "****");
        assert_eq!(sanitized["transaction"]["amount"], 2500);
        assert_eq!(sanitized["transaction"]["id"], "5da8594aa6b3fe0001d2ab8d");
    }

    #[test]
    fn test_sanitize_nested_custom_fields() {
        let input = json!({
            "custom": {
                "email": "shopper@example.com",
                "orderNo": "42"
            }
        });

        let sanitized = sanitize_json(&input);
        let email = sanitized["custom"]["email"].as_str().unwrap();
        assert_eq!(email, "shop****.com");
        assert_eq!(sanitized["custom"]["orderNo"], "42");
    }

    #[test]
    fn test_short_values_fully_masked() {
        let sanitized = sanitize_json(&json!({ "token": "abc" }));
        assert_eq!(sanitized["token"], "****");
    }
}
