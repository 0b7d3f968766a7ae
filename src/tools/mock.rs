//! Fake records shaped like a JSON template
//!
//! Each template key picks a generator by name (`firstName`, `email`,
//! `homeAddressCity`, ...); keys with no recognised name fall back to the
//! sample value's type.

use chrono::{SecondsFormat, TimeDelta, Utc};
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, StateName, StreetName, ZipCode,
};
use fake::faker::boolean::en::Boolean;
use fake::faker::internet::en::{Password, SafeEmail, Username};
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::ToolError;

pub const MAX_RECORDS: usize = 100;

const PAST_WINDOW_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// `count` records, each with the keys of `template`
pub fn generate(template: &Value, count: usize) -> Result<Vec<Value>, ToolError> {
    let template = template
        .as_object()
        .ok_or_else(|| ToolError::invalid("Input must be a valid JSON object."))?;
    if !(1..=MAX_RECORDS).contains(&count) {
        return Err(ToolError::invalid(format!(
            "Number of items must be between 1 and {}",
            MAX_RECORDS
        )));
    }
    Ok((0..count).map(|_| record(template)).collect())
}

fn record(template: &Map<String, Value>) -> Value {
    Value::Object(
        template
            .iter()
            .map(|(key, sample)| (key.clone(), infer(key, sample)))
            .collect(),
    )
}

fn street_address() -> String {
    format!(
        "{} {}",
        BuildingNumber().fake::<String>(),
        StreetName().fake::<String>()
    )
}

fn infer(key: &str, sample: &Value) -> Value {
    let key = key.to_lowercase();
    let has = |part: &str| key.contains(part);

    if has("username") {
        return Value::String(Username().fake());
    }
    if has("name") {
        return Value::String(if has("first") {
            FirstName().fake()
        } else if has("last") {
            LastName().fake()
        } else {
            Name().fake()
        });
    }
    if has("email") {
        let email = match sample.as_str().and_then(|s| s.split_once('@')) {
            Some((_, domain)) if !domain.is_empty() => {
                format!("{}@{}", Username().fake::<String>(), domain)
            }
            _ => SafeEmail().fake(),
        };
        return Value::String(email);
    }
    if has("address") {
        return Value::String(if has("street") {
            street_address()
        } else if has("city") {
            CityName().fake()
        } else if has("state") {
            StateName().fake()
        } else if has("zip") || has("postal") {
            ZipCode().fake()
        } else if has("country") {
            CountryName().fake()
        } else {
            format!("{}, {}", street_address(), CityName().fake::<String>())
        });
    }
    if has("phone") {
        return Value::String(PhoneNumber().fake());
    }
    if has("age") {
        return Value::from((18i64..=80).fake::<i64>());
    }
    if has("sex") || has("gender") {
        let sex = if Boolean(50).fake::<bool>() { "female" } else { "male" };
        return Value::String(sex.to_string());
    }
    if has("id") || has("uuid") {
        return Value::String(Uuid::new_v4().to_string());
    }
    if has("date") || has("birth") {
        let ago = TimeDelta::milliseconds((1..PAST_WINDOW_MS).fake::<i64>());
        return Value::String((Utc::now() - ago).to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    if has("password") {
        return Value::String(Password(8..20).fake());
    }

    match sample {
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(0.0);
            let low = (n - 10.0).max(0.0).ceil() as i64;
            let high = ((n + 10.0).floor() as i64).max(low);
            Value::from((low..=high).fake::<i64>())
        }
        Value::Bool(_) => Value::Bool(Boolean(50).fake()),
        Value::Array(items) => {
            let first = items.first().unwrap_or(&Value::Null);
            Value::Array(items.iter().map(|_| infer(&key, first)).collect())
        }
        Value::Object(fields) => record(fields),
        _ => Value::String(Word().fake()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one(template: Value) -> Value {
        generate(&template, 1).unwrap().remove(0)
    }

    #[test]
    fn test_fields_picked_by_key() {
        let record = one(json!({
            "firstName": "",
            "userName": "",
            "contactEmail": "someone@corp.example",
            "email": 1,
            "age": 0,
            "userId": "",
            "birthDate": "",
            "gender": "",
            "phoneNumber": "",
        }));

        assert!(!record["firstName"].as_str().unwrap().is_empty());
        assert!(!record["userName"].as_str().unwrap().contains(' '));
        assert!(record["contactEmail"].as_str().unwrap().ends_with("@corp.example"));
        assert!(record["email"].as_str().unwrap().contains('@'));

        let age = record["age"].as_i64().unwrap();
        assert!((18..=80).contains(&age));

        assert!(Uuid::parse_str(record["userId"].as_str().unwrap()).is_ok());

        let born = chrono::DateTime::parse_from_rfc3339(record["birthDate"].as_str().unwrap())
            .unwrap();
        assert!(born < Utc::now());
        assert!(record["birthDate"].as_str().unwrap().ends_with('Z'));

        assert!(["male", "female"].contains(&record["gender"].as_str().unwrap()));
        assert!(record["phoneNumber"].is_string());
    }

    #[test]
    fn test_fields_follow_sample_type() {
        let record = one(json!({
            "score": 50,
            "small": 3,
            "active": true,
            "tags": ["a", "b", "c"],
            "profile": { "city": "x", "nested": { "level": 1 } },
            "note": null,
        }));

        let score = record["score"].as_i64().unwrap();
        assert!((40..=60).contains(&score));
        let small = record["small"].as_i64().unwrap();
        assert!((0..=13).contains(&small));
        assert!(record["active"].is_boolean());

        let tags = record["tags"].as_array().unwrap();
        assert_eq!(tags.len(), 3);
        assert!(tags.iter().all(Value::is_string));

        assert!(record["profile"]["nested"]["level"].is_number());
        assert!(record["note"].is_string());
    }

    #[test]
    fn test_keys_kept_in_order() {
        let record = one(json!({ "b": "", "a": "", "c": "" }));
        let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_count_bounds() {
        let template = json!({ "name": "" });
        assert_eq!(generate(&template, 100).unwrap().len(), 100);
        assert!(generate(&template, 0).is_err());
        assert!(generate(&template, 101).is_err());
    }

    #[test]
    fn test_template_must_be_object() {
        for template in [json!([1, 2]), json!("text"), json!(null)] {
            let err = generate(&template, 1).unwrap_err();
            assert_eq!(err.to_string(), "Input must be a valid JSON object.");
        }
    }
}
