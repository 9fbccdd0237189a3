use crate::domain::{ModuleRecord, ModuleStatus};

// Header (3) + footer (1) + list borders (2).
const LIST_CHROME_ROWS: u16 = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusFilter {
    All,
    Active,
    Historical,
    InProcess,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Historical => "Historical",
            Self::InProcess => "In Process",
        }
    }

    /// Filter showing only `status`; `Unknown` has no tab and shows everything.
    pub fn for_status(status: ModuleStatus) -> Self {
        match status {
            ModuleStatus::Active => Self::Active,
            ModuleStatus::Historical => Self::Historical,
            ModuleStatus::InProcess => Self::InProcess,
            ModuleStatus::Unknown => Self::All,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Historical,
            Self::Historical => Self::InProcess,
            Self::InProcess => Self::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::All => Self::InProcess,
            Self::Active => Self::All,
            Self::Historical => Self::Active,
            Self::InProcess => Self::Historical,
        }
    }

    pub fn matches(self, status: ModuleStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == ModuleStatus::Active,
            Self::Historical => status == ModuleStatus::Historical,
            Self::InProcess => status == ModuleStatus::InProcess,
        }
    }
}

/// Cursor, filter and viewport state of the module list. Only exists once
/// the catalog has loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleListView {
    pub query: String,
    pub filter_input: bool,
    pub status_filter: StatusFilter,
    pub filtered_indices: Vec<usize>,
    pub selected: usize,
    pub viewport: (u16, u16),
}

impl ModuleListView {
    pub fn new(records: &[ModuleRecord]) -> Self {
        Self {
            query: String::new(),
            filter_input: false,
            status_filter: StatusFilter::All,
            filtered_indices: (0..records.len()).collect(),
            selected: 0,
            viewport: (0, 0),
        }
    }

    /// Takes the full terminal size and keeps the area the list rows get.
    pub fn set_size(&mut self, width: u16, height: u16) {
        let (inner_width, inner_height) = inner_terminal_size((width, height));
        self.viewport = (
            inner_width.saturating_sub(2),
            inner_height.saturating_sub(LIST_CHROME_ROWS),
        );
    }

    pub fn page_step(&self) -> usize {
        usize::from(self.viewport.1.max(1))
    }

    /// Index into the snapshot of the highlighted record.
    pub fn highlighted(&self) -> Option<usize> {
        self.filtered_indices.get(self.selected).copied()
    }

    pub fn move_up(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub fn move_down(&mut self, step: usize) {
        if self.filtered_indices.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .saturating_add(step)
            .min(self.filtered_indices.len().saturating_sub(1));
    }

    pub fn move_to_start(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_end(&mut self) {
        self.selected = self.filtered_indices.len().saturating_sub(1);
    }

    pub fn is_filtered(&self) -> bool {
        !self.query.trim().is_empty() || self.status_filter != StatusFilter::All
    }

    /// Recomputes the visible rows, keeping the highlighted record when it
    /// survives the new filter.
    pub fn apply_filter(&mut self, records: &[ModuleRecord]) {
        let previous = self.highlighted();
        let query = self.query.trim().to_lowercase();
        let status_filter = self.status_filter;

        self.filtered_indices = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                if !status_filter.matches(record.status) {
                    return None;
                }
                if !query.is_empty() && !record.filter_text().contains(&query) {
                    return None;
                }
                Some(index)
            })
            .collect();

        let kept = previous.and_then(|index| {
            self.filtered_indices
                .iter()
                .position(|candidate| *candidate == index)
        });
        self.selected = match kept {
            Some(position) => position,
            None => self
                .selected
                .min(self.filtered_indices.len().saturating_sub(1)),
        };
    }
}

/// Horizontal and vertical margin around every screen. Terminals smaller
/// than 40x12 get none.
pub(crate) fn screen_margin((width, height): (u16, u16)) -> (u16, u16) {
    if width < 40 || height < 12 {
        (0, 0)
    } else {
        (2, 1)
    }
}

pub(crate) fn inner_terminal_size(terminal_size: (u16, u16)) -> (u16, u16) {
    let (horizontal, vertical) = screen_margin(terminal_size);
    (
        terminal_size.0.saturating_sub(horizontal * 2),
        terminal_size.1.saturating_sub(vertical * 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: ModuleStatus, vendor: &str) -> ModuleRecord {
        let mut record = ModuleRecord::placeholder(status);
        record.vendor_name = vendor.to_string();
        record.module_name = format!("{vendor} module");
        record
    }

    fn sample() -> Vec<ModuleRecord> {
        vec![
            record(ModuleStatus::Active, "Acme"),
            record(ModuleStatus::Active, "Globex"),
            record(ModuleStatus::Historical, "Acme"),
            record(ModuleStatus::InProcess, "Initech"),
        ]
    }

    #[test]
    fn cursor_is_clamped() {
        let records = sample();
        let mut list = ModuleListView::new(&records);
        list.move_up(1);
        assert_eq!(list.selected, 0);
        list.move_down(10);
        assert_eq!(list.selected, 3);
        list.move_to_start();
        assert_eq!(list.highlighted(), Some(0));
        list.move_to_end();
        assert_eq!(list.highlighted(), Some(3));
    }

    #[test]
    fn small_terminals_get_no_margin() {
        assert_eq!(inner_terminal_size((120, 30)), (116, 28));
        assert_eq!(inner_terminal_size((39, 30)), (39, 30));
        assert_eq!(inner_terminal_size((80, 11)), (80, 11));
    }

    #[test]
    fn page_step_follows_viewport() {
        let mut list = ModuleListView::new(&sample());
        assert_eq!(list.page_step(), 1);
        list.set_size(100, 40);
        // 40 - 2 (outer margin) - 6 (chrome)
        assert_eq!(list.viewport, (94, 32));
        assert_eq!(list.page_step(), 32);
    }

    #[test]
    fn query_filter_keeps_highlighted_record() {
        let records = sample();
        let mut list = ModuleListView::new(&records);
        list.move_down(2);
        assert_eq!(list.highlighted(), Some(2));

        list.query = "acme".to_string();
        list.apply_filter(&records);
        assert_eq!(list.filtered_indices, vec![0, 2]);
        assert_eq!(list.highlighted(), Some(2));
    }

    #[test]
    fn status_filter_cycles_and_filters() {
        let records = sample();
        let mut list = ModuleListView::new(&records);
        list.status_filter = list.status_filter.next();
        assert_eq!(list.status_filter, StatusFilter::Active);
        list.apply_filter(&records);
        assert_eq!(list.filtered_indices, vec![0, 1]);

        list.status_filter = StatusFilter::InProcess;
        list.apply_filter(&records);
        assert_eq!(list.filtered_indices, vec![3]);
        assert_eq!(list.selected, 0);
        assert!(list.is_filtered());

        assert_eq!(StatusFilter::All.prev(), StatusFilter::InProcess);
    }

    #[test]
    fn empty_filter_result_has_no_highlight() {
        let records = sample();
        let mut list = ModuleListView::new(&records);
        list.query = "no such vendor".to_string();
        list.apply_filter(&records);
        assert!(list.filtered_indices.is_empty());
        assert_eq!(list.highlighted(), None);
        list.move_down(1);
        assert_eq!(list.selected, 0);
    }
}
