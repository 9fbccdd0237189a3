use time::Date;
use time::macros::date;

/// Stand-in for a missing or unparseable date.
pub const ZERO_DATE: Date = date!(0001-01-01);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ModuleStatus {
    Active,
    Historical,
    InProcess,
    Unknown,
}

impl ModuleStatus {
    /// Maps a numeric status code; codes outside 0..=2 are `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Active,
            1 => Self::Historical,
            2 => Self::InProcess,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Historical => "Historical",
            Self::InProcess => "In Process",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleRecord {
    pub certificate_number: String,
    pub certificate_url: Option<String>,
    pub vendor_name: String,
    pub module_name: String,
    pub module_type: String,
    pub standards: Vec<String>,
    pub validation_date: Date,
    pub sunset_date: Date,
    pub status: ModuleStatus,
    pub overall_level: i64,
    pub algorithms: Vec<String>,
    pub algorithms_detailed: Vec<String>,
    pub embodiment: Option<String>,
    pub caveat: Option<String>,
    pub description: Option<String>,
    pub review_status: Option<String>,
    pub lab_name: Option<String>,
}

impl ModuleRecord {
    /// An empty record carrying only a status; fields default the same way a
    /// raw record with every field missing would.
    pub fn placeholder(status: ModuleStatus) -> Self {
        Self {
            certificate_number: String::new(),
            certificate_url: None,
            vendor_name: String::new(),
            module_name: String::new(),
            module_type: String::new(),
            standards: Vec::new(),
            validation_date: ZERO_DATE,
            sunset_date: ZERO_DATE,
            status,
            overall_level: 0,
            algorithms: Vec::new(),
            algorithms_detailed: Vec::new(),
            embodiment: None,
            caveat: None,
            description: None,
            review_status: None,
            lab_name: None,
        }
    }

    /// Primary line shown for the record in the list.
    pub fn title(&self) -> String {
        if self.module_name.trim().is_empty() {
            "(unnamed module)".to_string()
        } else {
            self.module_name.clone()
        }
    }

    /// Secondary line shown for the record in the list.
    pub fn subtitle(&self) -> String {
        let vendor = if self.vendor_name.trim().is_empty() {
            "unknown vendor"
        } else {
            self.vendor_name.as_str()
        };
        if self.certificate_number.is_empty() {
            vendor.to_string()
        } else {
            format!("#{} · {vendor}", self.certificate_number)
        }
    }

    /// Lowercased text the list filter matches against.
    pub fn filter_text(&self) -> String {
        let mut text = String::new();
        for part in [
            self.certificate_number.as_str(),
            self.vendor_name.as_str(),
            self.module_name.as_str(),
            self.module_type.as_str(),
        ] {
            text.push_str(&part.to_lowercase());
            text.push('\n');
        }
        for standard in &self.standards {
            text.push_str(&standard.to_lowercase());
            text.push('\n');
        }
        text
    }
}

/// Active records first, then historical, then in process; each batch keeps
/// the order the API returned it in.
pub type CatalogSnapshot = Vec<ModuleRecord>;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogMetadata {
    pub generated_at: String,
    pub total_modules: u64,
    pub total_historical_modules: u64,
    pub total_modules_in_process: u64,
    pub source: String,
    pub version: String,
}
