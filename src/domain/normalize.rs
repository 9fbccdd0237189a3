use crate::domain::{ModuleRecord, ModuleStatus, ZERO_DATE};
use serde::Deserialize;
use serde_json::Value;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const CATALOG_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month]/[day]/[year]");

// Every field is kept as a raw JSON value so that one oddly typed field
// degrades to its default instead of rejecting the whole payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawModule {
    pub certificate_number: Value,
    pub certificate_detail_url: Value,
    pub vendor_name: Value,
    pub module_name: Value,
    pub module_type: Value,
    pub validation_date: Value,
    pub sunset_date: Value,
    pub standard: Value,
    pub overall_level: Value,
    pub algorithms: Value,
    pub algorithms_detailed: Value,
    pub embodiment: Value,
    pub caveat: Value,
    pub description: Value,
    pub lab: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawInProcessModule {
    pub module_name: Value,
    pub vendor_name: Value,
    pub module_type: Value,
    pub standard: Value,
    pub status: Value,
    pub lab: Value,
}

/// Security level as it arrives from decoded JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum LevelValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Absent,
}

impl LevelValue {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => {
                if let Some(integer) = number.as_i64() {
                    Self::Integer(integer)
                } else if let Some(unsigned) = number.as_u64() {
                    Self::Integer(i64::try_from(unsigned).unwrap_or(i64::MAX))
                } else {
                    number.as_f64().map(Self::Number).unwrap_or(Self::Absent)
                }
            }
            Some(Value::String(text)) => Self::Text(text.clone()),
            _ => Self::Absent,
        }
    }
}

/// Parses an `MM/DD/YYYY` catalog date. Anything else, including the empty
/// string, yields [`ZERO_DATE`].
pub fn parse_date(value: &str) -> Date {
    Date::parse(value.trim(), CATALOG_DATE_FORMAT).unwrap_or(ZERO_DATE)
}

/// Floats truncate toward zero; text and missing values mean "no level" (0).
pub fn parse_overall_level(value: &LevelValue) -> i64 {
    match value {
        LevelValue::Number(number) if number.is_finite() => number.trunc() as i64,
        LevelValue::Number(_) => 0,
        LevelValue::Integer(level) => *level,
        LevelValue::Text(_) | LevelValue::Absent => 0,
    }
}

/// Normalizes a record from the active or historical collection.
pub fn normalize_module(raw: RawModule, status: ModuleStatus) -> ModuleRecord {
    ModuleRecord {
        certificate_number: text(&raw.certificate_number),
        certificate_url: optional_text(&raw.certificate_detail_url),
        vendor_name: text(&raw.vendor_name),
        module_name: text(&raw.module_name),
        module_type: text(&raw.module_type),
        standards: standards(&raw.standard),
        validation_date: parse_date(&text(&raw.validation_date)),
        sunset_date: parse_date(&text(&raw.sunset_date)),
        status,
        overall_level: parse_overall_level(&LevelValue::from_json(Some(&raw.overall_level))),
        algorithms: string_list(&raw.algorithms),
        algorithms_detailed: string_list(&raw.algorithms_detailed),
        embodiment: optional_text(&raw.embodiment),
        caveat: optional_text(&raw.caveat),
        description: optional_text(&raw.description),
        review_status: None,
        lab_name: optional_text(&raw.lab),
    }
}

/// Normalizes a record from the in-process collection. These have no
/// certificate, validation date or level yet.
pub fn normalize_in_process(raw: RawInProcessModule) -> ModuleRecord {
    let mut record = ModuleRecord::placeholder(ModuleStatus::InProcess);
    record.vendor_name = text(&raw.vendor_name);
    record.module_name = text(&raw.module_name);
    record.module_type = text(&raw.module_type);
    record.standards = standards(&raw.standard);
    record.review_status = optional_text(&raw.status);
    record.lab_name = optional_text(&raw.lab);
    record
}

fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: &Value) -> Option<String> {
    let text = text(value);
    (!text.is_empty()).then_some(text)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(_) => optional_text(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn standards(value: &Value) -> Vec<String> {
    match value {
        Value::String(raw) => raw
            .split([',', ';'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => string_list(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::Month;

    fn raw_module(value: Value) -> RawModule {
        serde_json::from_value(value).expect("raw module")
    }

    #[test]
    fn parses_catalog_dates() {
        let date = parse_date("01/15/2024");
        assert_eq!(
            date,
            Date::from_calendar_date(2024, Month::January, 15).expect("date")
        );
    }

    #[test]
    fn malformed_dates_become_zero_date() {
        assert_eq!(parse_date(""), ZERO_DATE);
        assert_eq!(parse_date("2024-01-15"), ZERO_DATE);
        assert_eq!(parse_date("13/45/2024"), ZERO_DATE);
        assert_eq!(parse_date("not a date"), ZERO_DATE);
        assert_eq!(ZERO_DATE.to_string(), "0001-01-01");
    }

    #[test]
    fn overall_level_from_loose_values() {
        assert_eq!(parse_overall_level(&LevelValue::Number(3.0)), 3);
        assert_eq!(parse_overall_level(&LevelValue::Number(2.9)), 2);
        assert_eq!(parse_overall_level(&LevelValue::Number(f64::NAN)), 0);
        assert_eq!(parse_overall_level(&LevelValue::Integer(2)), 2);
        assert_eq!(
            parse_overall_level(&LevelValue::Text("Tested Configuration(s)".to_string())),
            0
        );
        assert_eq!(parse_overall_level(&LevelValue::Absent), 0);
    }

    #[test]
    fn level_value_from_json_shapes() {
        assert_eq!(
            LevelValue::from_json(Some(&json!(3.0))),
            LevelValue::Number(3.0)
        );
        assert_eq!(LevelValue::from_json(Some(&json!(2))), LevelValue::Integer(2));
        assert_eq!(
            LevelValue::from_json(Some(&json!("2"))),
            LevelValue::Text("2".to_string())
        );
        assert_eq!(LevelValue::from_json(Some(&Value::Null)), LevelValue::Absent);
        assert_eq!(LevelValue::from_json(Some(&json!(true))), LevelValue::Absent);
        assert_eq!(LevelValue::from_json(None), LevelValue::Absent);
    }

    #[test]
    fn normalizes_active_module() {
        let raw = raw_module(json!({
            "certificate_number": "4711",
            "vendor_name": " Acme ",
            "module_name": "Acme Crypto Core",
            "module_type": "Software",
            "validation_date": "01/15/2024",
            "standard": "FIPS 140-3",
            "overall_level": 2.0,
            "algorithms": ["AES", "SHA-256"],
            "algorithms_detailed": ["AES-CBC: A1234", "SHA2-256: A1235"]
        }));
        let record = normalize_module(raw, ModuleStatus::Active);
        assert_eq!(record.status, ModuleStatus::Active);
        assert_eq!(record.certificate_number, "4711");
        assert_eq!(record.vendor_name, "Acme");
        assert_eq!(record.overall_level, 2);
        assert_eq!(record.standards, vec!["FIPS 140-3".to_string()]);
        assert_eq!(record.algorithms.len(), 2);
        assert_eq!(record.algorithms_detailed.len(), 2);
        assert_ne!(record.validation_date, ZERO_DATE);
        assert_eq!(record.sunset_date, ZERO_DATE);
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let raw = raw_module(json!({
            "certificate_number": 1234,
            "module_name": ["not", "a", "string"],
            "validation_date": 20240115,
            "overall_level": "Tested Configuration(s)",
            "algorithms": {"unexpected": true}
        }));
        let record = normalize_module(raw, ModuleStatus::Historical);
        assert_eq!(record.status, ModuleStatus::Historical);
        assert_eq!(record.certificate_number, "1234");
        assert_eq!(record.module_name, "");
        assert_eq!(record.validation_date, ZERO_DATE);
        assert_eq!(record.overall_level, 0);
        assert!(record.algorithms.is_empty());
    }

    #[test]
    fn normalizes_in_process_module() {
        let raw: RawInProcessModule = serde_json::from_value(json!({
            "module_name": "Pending Module",
            "vendor_name": "IP Vendor",
            "standard": "FIPS 140-3",
            "status": "Review Pending"
        }))
        .expect("raw in-process module");
        let record = normalize_in_process(raw);
        assert_eq!(record.status, ModuleStatus::InProcess);
        assert!(record.certificate_number.is_empty());
        assert_eq!(record.validation_date, ZERO_DATE);
        assert_eq!(record.overall_level, 0);
        assert_eq!(record.review_status.as_deref(), Some("Review Pending"));
    }

    #[test]
    fn standards_split_on_separators() {
        let raw = raw_module(json!({ "standard": "FIPS 140-2, FIPS 140-3" }));
        let record = normalize_module(raw, ModuleStatus::Active);
        assert_eq!(
            record.standards,
            vec!["FIPS 140-2".to_string(), "FIPS 140-3".to_string()]
        );
    }
}
