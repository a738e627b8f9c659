use std::collections::HashMap;

use crate::{ContextValue, FlattenedContext, ResolutionError, User, TARGETING_KEY};

/// Convert a flattened evaluation context into a Bucketeer [`User`].
///
/// The targeting key becomes the user id and must be a string. Every other attribute is copied
/// into `User::data`: strings verbatim, anything else as its JSON encoding.
///
/// # Errors
///
/// - `TARGETING_KEY_MISSING` if the context is empty, has no targeting key, or the targeting key
///   is not a string.
/// - `PARSE_ERROR` if an attribute value cannot be encoded as JSON.
pub(crate) fn to_bucketeer_user(
    evaluation_context: &FlattenedContext,
) -> Result<User, ResolutionError> {
    if evaluation_context.is_empty() {
        return Err(ResolutionError::targeting_key_missing(
            "evaluation context is empty",
        ));
    }

    let id = match evaluation_context.get(TARGETING_KEY) {
        None => {
            return Err(ResolutionError::targeting_key_missing(
                "targeting key is missing",
            ))
        }
        Some(value) => match value.as_str() {
            Some(id) => id.to_owned(),
            None => {
                return Err(ResolutionError::targeting_key_missing(format!(
                    "key {TARGETING_KEY:?}, value {value:?} can not be converted to string"
                )))
            }
        },
    };

    let data = evaluation_context
        .iter()
        .filter(|(key, _)| key.as_str() != TARGETING_KEY)
        .map(|(key, value)| {
            encode_attribute(value)
                .map(|encoded| (key.clone(), encoded))
                .map_err(|err| {
                    ResolutionError::parse_error(format!(
                        "key {key:?}, value {value:?} cannot be converted to JSON string: {err}"
                    ))
                })
        })
        .collect::<Result<HashMap<_, _>, ResolutionError>>()?;

    Ok(User { id, data })
}

fn encode_attribute(value: &ContextValue) -> Result<String, serde_json::Error> {
    match value {
        ContextValue::String(s) | ContextValue::Structured(serde_json::Value::String(s)) => {
            Ok(s.clone())
        }
        ContextValue::Boolean(b) => serde_json::to_string(b),
        ContextValue::Integer(i) => serde_json::to_string(i),
        // serde_json writes non-finite floats as `null`, which would silently change the value.
        ContextValue::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => serde_json::to_string(&n),
            None => Err(serde::ser::Error::custom(format!(
                "{f} is not representable in JSON"
            ))),
        },
        ContextValue::Structured(v) => serde_json::to_string(v),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::to_bucketeer_user;
    use crate::{ContextValue, ErrorCode, FlattenedContext, User, TARGETING_KEY};

    fn context<const N: usize>(entries: [(&str, ContextValue); N]) -> FlattenedContext {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }

    #[test]
    fn valid_targeting_key() {
        let user = to_bucketeer_user(&context([(TARGETING_KEY, "user-1".into())])).unwrap();
        assert_eq!(
            user,
            User {
                id: "user-1".to_owned(),
                data: Default::default(),
            }
        );
    }

    #[test]
    fn valid_targeting_key_and_data() {
        let user = to_bucketeer_user(&context([
            (TARGETING_KEY, "user-1".into()),
            ("plan", "premium".into()),
            ("beta", true.into()),
            ("age", 42i64.into()),
            ("score", 0.5f64.into()),
            ("tags", json!(["a", "b"]).into()),
            ("address", json!({"zip": "100", "city": "tokyo"}).into()),
            ("nothing", json!(null).into()),
        ]))
        .unwrap();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.data.len(), 7);
        assert_eq!(user.data["plan"], "premium");
        assert_eq!(user.data["beta"], "true");
        assert_eq!(user.data["age"], "42");
        assert_eq!(user.data["score"], "0.5");
        assert_eq!(user.data["tags"], r#"["a","b"]"#);
        assert_eq!(user.data["address"], r#"{"city":"tokyo","zip":"100"}"#);
        assert_eq!(user.data["nothing"], "null");
    }

    #[test]
    fn string_attributes_are_not_double_encoded() {
        let user = to_bucketeer_user(&context([
            (TARGETING_KEY, "user-1".into()),
            ("quoted", r#""already quoted""#.into()),
        ]))
        .unwrap();
        assert_eq!(user.data["quoted"], r#""already quoted""#);
    }

    #[test]
    fn every_kind_of_string_is_copied_verbatim() {
        let user = to_bucketeer_user(&context([
            (TARGETING_KEY, json!("user-1").into()),
            ("from_str", "premium".into()),
            ("from_string", "premium".to_owned().into()),
            ("from_json", json!("premium").into()),
            ("structured", ContextValue::Structured(json!("premium"))),
            ("deserialized", serde_json::from_str(r#""premium""#).unwrap()),
        ]))
        .unwrap();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.data.len(), 5);
        for (key, value) in &user.data {
            assert_eq!(value, "premium", "{key}");
        }
    }

    #[test]
    fn structured_string_targeting_key_is_accepted() {
        let user = to_bucketeer_user(&context([(
            TARGETING_KEY,
            ContextValue::Structured(json!("user-1")),
        )]))
        .unwrap();
        assert_eq!(user.id, "user-1");
    }

    #[test]
    fn large_integers_are_encoded_exactly() {
        let user = to_bucketeer_user(&context([
            (TARGETING_KEY, "user-1".into()),
            ("big", json!(u64::MAX).into()),
        ]))
        .unwrap();
        assert_eq!(user.data["big"], "18446744073709551615");
    }

    #[test]
    fn empty_context() {
        let err = to_bucketeer_user(&FlattenedContext::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::TargetingKeyMissing);
    }

    #[test]
    fn missing_targeting_key() {
        let err = to_bucketeer_user(&context([("plan", "premium".into())])).unwrap_err();
        assert_eq!(err.code, ErrorCode::TargetingKeyMissing);
        assert_eq!(err.message, "targeting key is missing");
    }

    #[test]
    fn invalid_targeting_key_type() {
        for value in [
            ContextValue::Integer(123),
            ContextValue::Float(1.5),
            ContextValue::Boolean(true),
            ContextValue::Structured(json!({"id": "user-1"})),
        ] {
            let err = to_bucketeer_user(&context([(TARGETING_KEY, value)])).unwrap_err();
            assert_eq!(err.code, ErrorCode::TargetingKeyMissing);
        }
    }

    #[test]
    fn non_finite_float_is_parse_error() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = to_bucketeer_user(&context([
                (TARGETING_KEY, "user-1".into()),
                ("ratio", value.into()),
            ]))
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::ParseError);
            assert!(err.message.contains("\"ratio\""), "{}", err.message);
        }
    }
}
