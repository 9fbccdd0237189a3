use crate::domain::{ModuleRecord, ModuleStatus, ZERO_DATE};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

const EMPTY_VALUE: &str = "—";

pub fn status_badge(status: ModuleStatus) -> String {
    match status {
        ModuleStatus::Active => "● ACTIVE".to_string(),
        ModuleStatus::Historical => "◆ HISTORICAL".to_string(),
        ModuleStatus::InProcess => "◐ IN PROCESS".to_string(),
        ModuleStatus::Unknown => String::new(),
    }
}

/// Security levels run 1 through 4; anything else gets no badge.
pub fn level_badge(level: i64) -> String {
    if (1..=4).contains(&level) {
        format!("▲ Level {level}")
    } else {
        String::new()
    }
}

pub fn display_date(date: Date) -> String {
    if date == ZERO_DATE {
        return EMPTY_VALUE.to_string();
    }
    date.format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| EMPTY_VALUE.to_string())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl DetailField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Labelled fields of the detail pane. Optional fields the record lacks are
/// skipped; the per-algorithm breakdown only shows when `expanded`.
pub fn detail_fields(record: &ModuleRecord, expanded: bool) -> Vec<DetailField> {
    let mut fields = vec![
        DetailField::new("Certificate", or_empty(&record.certificate_number)),
        DetailField::new("Status", record.status.label()),
        DetailField::new("Module", record.title()),
        DetailField::new("Vendor", or_empty(&record.vendor_name)),
        DetailField::new("Type", or_empty(&record.module_type)),
        DetailField::new("Standard", joined_or_empty(&record.standards, ", ")),
        DetailField::new("Security Level", or_empty(&level_badge(record.overall_level))),
        DetailField::new("Validation Date", display_date(record.validation_date)),
    ];

    if record.sunset_date != ZERO_DATE {
        fields.push(DetailField::new("Sunset Date", display_date(record.sunset_date)));
    }

    let optional = [
        ("Embodiment", &record.embodiment),
        ("Lab", &record.lab_name),
        ("Review Status", &record.review_status),
        ("Caveat", &record.caveat),
        ("Description", &record.description),
        ("Certificate URL", &record.certificate_url),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|value| !value.trim().is_empty()) {
            fields.push(DetailField::new(label, value));
        }
    }

    if !record.algorithms.is_empty() {
        fields.push(DetailField::new("Algorithms", record.algorithms.join(", ")));
    }

    if !record.algorithms_detailed.is_empty() {
        let value = if expanded {
            record.algorithms_detailed.join("\n")
        } else {
            let count = record.algorithms_detailed.len();
            let noun = if count == 1 { "entry" } else { "entries" };
            format!("{count} {noun} hidden · press d to show")
        };
        fields.push(DetailField::new("Algorithm Details", value));
    }

    fields
}

/// Plain-text rendering of [`detail_fields`], one `Label: value` per field.
/// Continuation lines of multi-line values are indented under the value.
pub fn format_detail_block(record: &ModuleRecord, expanded: bool) -> String {
    let fields = detail_fields(record, expanded);
    let label_width = fields
        .iter()
        .map(|field| field.label.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for field in &fields {
        let mut lines = field.value.lines();
        let first = lines.next().unwrap_or("");
        let label = format!("{}:", field.label);
        out.push_str(&format!("{label:<width$}  {first}\n", width = label_width + 1));
        for line in lines {
            out.push_str(&" ".repeat(label_width + 3));
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn or_empty(value: &str) -> String {
    if value.trim().is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        value.to_string()
    }
}

fn joined_or_empty(values: &[String], separator: &str) -> String {
    if values.is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        values.join(separator)
    }
}
