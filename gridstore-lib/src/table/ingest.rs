//! Data received and failure hooks

use std::fmt::Write;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;

use super::RenderSettings;
use super::Table;
use crate::model::ColumnDefinition;
use crate::model::DataType;
use crate::model::Record;
use crate::model::SortDirection;
use crate::model::Value;

const INVALID_DATE: &str = "Invalid date";

impl Table {
    /// Ingests a freshly fetched payload, using the current time for status columns.
    pub fn on_data_received(&mut self, payload: serde_json::Value) {
        self.on_data_received_at(payload, Utc::now());
    }

    /// Ingests a payload with an explicit "now".
    ///
    /// Normalizes the payload into records (or runs the data formatter),
    /// captures each column's baseline sort direction, applies the
    /// per-column transforms, clears selection and quick filter, and
    /// re-sorts when a sort column is set.
    pub fn on_data_received_at(&mut self, payload: serde_json::Value, now: DateTime<Utc>) {
        let mut records = match &self.data_formatter {
            Some(formatter) => formatter.apply(&payload),
            None => normalize_payload(payload),
        };
        log::debug!("[table] {} received {} records", self.id, records.len());

        for col in &mut self.cols {
            col.capture_default_direction();
        }

        for record in &mut records {
            for col in &self.cols {
                transform_cell(record, col, &self.render, now);
            }
        }

        self.data = Some(records);
        self.selected_items.clear();
        self.filter_value = None;

        if let Some(index) = self.sort_col_index {
            let direction = self
                .cols
                .get(index)
                .and_then(|col| col.sort_direction)
                .unwrap_or(SortDirection::Ascending);
            self.sort_data(index, direction);
        }
    }

    /// Marks data as unavailable after a failed request.
    pub fn error_function(&mut self) {
        log::debug!("[table] {} data unavailable", self.id);
        self.data = None;
    }
}

/// Turns a payload into records: arrays yield their elements, objects their values.
fn normalize_payload(payload: serde_json::Value) -> Vec<Record> {
    let items: Vec<serde_json::Value> = match payload {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            log::debug!("[table] ignoring {} payload", json_kind(&other));
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| {
            let kind = json_kind(&item);
            let record = Record::from_json(item);
            if record.is_none() {
                log::debug!("[table] skipping {} item", kind);
            }
            record
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn transform_cell(record: &mut Record, col: &ColumnDefinition, render: &RenderSettings, now: DateTime<Utc>) {
    let property = col.data_property.as_str();
    match col.data_type {
        DataType::Percent => {
            let value = record.value(property);
            if !value.is_null() {
                let shown = format!("{}%", value.to_display_string());
                record.insert(property, shown);
            }
        }
        DataType::Time | DataType::Status => {
            let raw = record.value(property).clone();
            let timestamp_key = col.timestamp_key();
            if raw.is_blank() {
                record.insert(property, render.missing_placeholder.as_str());
                record.insert(timestamp_key, Value::Null);
                return;
            }

            let parsed = parse_timestamp(&raw);
            if col.data_type == DataType::Status {
                let limit = col
                    .online_limit
                    .filter(|minutes| *minutes >= 1.0)
                    .unwrap_or(render.default_online_limit);
                let online = parsed.is_some_and(|ts| is_online(ts, limit, now));
                record.insert("online", online);
            }

            let format = col.time_format.as_deref().unwrap_or(&render.default_time_format);
            let shown = match parsed {
                Some(ts) => format_timestamp(ts, render, format),
                None => INVALID_DATE.to_string(),
            };
            record.insert(property, shown);
            record.insert(timestamp_key, raw);
        }
        DataType::String | DataType::Number | DataType::Select => {}
    }
}

fn is_online(ts: DateTime<Utc>, limit_minutes: f64, now: DateTime<Utc>) -> bool {
    let window_millis = (limit_minutes * 60_000.0) as i64;
    ts.timestamp_millis() > now.timestamp_millis().saturating_sub(window_millis)
}

/// Parses a timestamp: epoch milliseconds, RFC 3339, or a naive UTC datetime.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Int(millis) => Utc.timestamp_millis_opt(*millis).single(),
        Value::Float(millis) if millis.is_finite() => {
            Utc.timestamp_millis_opt(millis.round() as i64).single()
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = s.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

fn format_timestamp(ts: DateTime<Utc>, render: &RenderSettings, format: &str) -> String {
    let local = ts.with_timezone(&render.time_zone);
    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_err() {
        log::warn!("[table] invalid time format {:?}", format);
        return INVALID_DATE.to_string();
    }
    out
}
