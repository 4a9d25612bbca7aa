//! JSON serialization for Record
//!
//! A record serializes as a flat JSON object with its keys in sorted order.
//! The advanced-filter override list is written under `shownByAdvancedFilters`
//! only when it is non-empty, and read back from the same key.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;

const OVERRIDE_KEY: &str = "shownByAdvancedFilters";

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let extra = usize::from(!self.shown_by_advanced_filters.is_empty());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;

        let mut keys: Vec<&String> = self.fields.keys().collect();
        keys.sort();
        for key in keys {
            map.serialize_entry(key, &self.fields[key])?;
        }

        if !self.shown_by_advanced_filters.is_empty() {
            map.serialize_entry(OVERRIDE_KEY, &self.shown_by_advanced_filters)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map representing a table record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut record = Record::new();

        while let Some(key) = map.next_key::<String>()? {
            if key == OVERRIDE_KEY {
                record.shown_by_advanced_filters = map.next_value()?;
                continue;
            }
            let value: serde_json::Value = map.next_value()?;
            record.fields.insert(key, Value::from_json(value));
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_sorted_keys() {
        let record = Record::new().set("b", 2i64).set("a", "x");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"a":"x","b":2}"#);
    }

    #[test]
    fn test_serialize_override_list_only_when_set() {
        let record = Record::new().set("x", 1i64);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains(OVERRIDE_KEY));

        let json = serde_json::to_string(&record.with_override("x")).unwrap();
        assert!(json.contains(r#""shownByAdvancedFilters":["x"]"#));
    }

    #[test]
    fn test_deserialize_nested_values_stay_opaque() {
        let json = r#"{"name": "Contoso", "tags": ["a", "b"], "n": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.value("name"), &Value::from("Contoso"));
        assert_eq!(
            record.get("tags"),
            Some(&Value::Json(serde_json::json!(["a", "b"])))
        );
        assert_eq!(record.get("n"), Some(&Value::Null));
    }
}
