mod list;
mod mouse;

use crate::domain::{CatalogMetadata, CatalogSnapshot, ModuleRecord, ModuleStatus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::sync::Arc;
use thiserror::Error;

pub use list::{ModuleListView, StatusFilter};
pub(crate) use list::{inner_terminal_size, screen_margin};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Loading,
    Error,
    Ready,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    List,
    Detail,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum View {
    List,
    Detail(DetailView),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DetailView {
    pub record_index: usize,
    pub expanded: bool,
    pub scroll: u16,
}

impl DetailView {
    fn new(record_index: usize) -> Self {
        Self {
            record_index,
            expanded: false,
            scroll: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub phase: Phase,
    pub view: View,
    pub records: Arc<CatalogSnapshot>,
    pub metadata: Option<CatalogMetadata>,
    pub list: Option<ModuleListView>,
    pub terminal_size: (u16, u16),
    pub last_error: Option<String>,
    pub notice: Option<String>,
    pub help_open: bool,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            view: View::List,
            records: Arc::new(Vec::new()),
            metadata: None,
            list: None,
            terminal_size: (0, 0),
            last_error: None,
            notice: None,
            help_open: false,
        }
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    /// The command to run before the first event arrives.
    pub fn init(&self) -> AppCommand {
        match self.phase {
            Phase::Loading => AppCommand::LoadCatalog,
            Phase::Error | Phase::Ready => AppCommand::None,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.view {
            View::List => Mode::List,
            View::Detail(_) => Mode::Detail,
        }
    }

    /// Record shown in the detail view; `None` while browsing the list.
    pub fn selected_record(&self) -> Option<&ModuleRecord> {
        match &self.view {
            View::Detail(detail) => self.records.get(detail.record_index),
            View::List => None,
        }
    }

    pub fn detail_expanded(&self) -> bool {
        matches!(&self.view, View::Detail(detail) if detail.expanded)
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize {
        width: u16,
        height: u16,
    },
    CatalogLoaded {
        records: CatalogSnapshot,
        metadata: Result<CatalogMetadata, String>,
    },
    CatalogFailed {
        message: String,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    LoadCatalog,
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Mouse(mouse) => mouse::update_on_mouse(model, mouse),
        AppEvent::Resize { width, height } => (update_on_resize(model, width, height), AppCommand::None),
        AppEvent::CatalogLoaded { records, metadata } => {
            (update_on_loaded(model, records, metadata), AppCommand::None)
        }
        AppEvent::CatalogFailed { message } => (update_on_failed(model, message), AppCommand::None),
    }
}

fn update_on_resize(mut model: AppModel, width: u16, height: u16) -> AppModel {
    model.terminal_size = (width, height);
    if model.phase != Phase::Ready {
        return model;
    }
    if let Some(list) = model.list.as_mut() {
        list.set_size(width, height);
    }
    model
}

fn update_on_loaded(
    mut model: AppModel,
    records: CatalogSnapshot,
    metadata: Result<CatalogMetadata, String>,
) -> AppModel {
    tracing::info!(records = records.len(), "catalog ready");

    let mut list = ModuleListView::new(&records);
    let (width, height) = model.terminal_size;
    if width > 0 && height > 0 {
        list.set_size(width, height);
    }

    model.notice = match &metadata {
        Ok(_) => None,
        Err(message) => Some(format!("Metadata unavailable: {message}")),
    };
    model.metadata = metadata.ok();
    model.records = Arc::new(records);
    model.list = Some(list);
    model.view = View::List;
    model.phase = Phase::Ready;
    model.last_error = None;
    model
}

fn update_on_failed(mut model: AppModel, message: String) -> AppModel {
    tracing::error!(error = %message, "catalog load failed");
    model.phase = Phase::Error;
    model.last_error = Some(message);
    model.help_open = false;
    model
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    model.notice = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (model, AppCommand::Quit);
    }

    if model.help_open {
        model.help_open = false;
        return (model, AppCommand::None);
    }

    match model.phase {
        Phase::Loading => (model, AppCommand::None),
        Phase::Error => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => (model, AppCommand::Quit),
            _ => (model, AppCommand::None),
        },
        Phase::Ready => match model.view.clone() {
            View::List => update_list(model, key),
            View::Detail(detail) => update_detail(model, detail, key),
        },
    }
}

fn update_list(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(mut list) = model.list.take() else {
        return (model, AppCommand::None);
    };

    if list.filter_input {
        update_filter_input(&mut list, &model.records, key);
        model.list = Some(list);
        return (model, AppCommand::None);
    }

    let mut command = AppCommand::None;
    match key.code {
        KeyCode::Char('q') => command = AppCommand::Quit,
        KeyCode::Enter => {
            if let Some(record_index) = list.highlighted() {
                model.view = View::Detail(DetailView::new(record_index));
            }
        }
        KeyCode::Char('/') => list.filter_input = true,
        KeyCode::Char('?') => model.help_open = true,
        KeyCode::Esc => {
            if !list.query.is_empty() {
                list.query.clear();
                list.apply_filter(&model.records);
            }
        }
        KeyCode::Tab => {
            list.status_filter = list.status_filter.next();
            list.apply_filter(&model.records);
        }
        KeyCode::BackTab => {
            list.status_filter = list.status_filter.prev();
            list.apply_filter(&model.records);
        }
        KeyCode::Char(digit @ '0'..='3') => {
            list.status_filter = status_filter_for_digit(digit);
            list.apply_filter(&model.records);
        }
        KeyCode::Up | KeyCode::Char('k') => list.move_up(1),
        KeyCode::Down | KeyCode::Char('j') => list.move_down(1),
        KeyCode::PageUp => list.move_up(list.page_step()),
        KeyCode::PageDown => list.move_down(list.page_step()),
        KeyCode::Home | KeyCode::Char('g') => list.move_to_start(),
        KeyCode::End | KeyCode::Char('G') => list.move_to_end(),
        _ => {}
    }

    model.list = Some(list);
    (model, command)
}

/// `0` shows every status; `1` to `3` pick one in catalog order.
fn status_filter_for_digit(digit: char) -> StatusFilter {
    match digit.to_digit(10) {
        Some(n) if n > 0 => StatusFilter::for_status(ModuleStatus::from_code(i64::from(n) - 1)),
        _ => StatusFilter::All,
    }
}

fn update_filter_input(list: &mut ModuleListView, records: &[ModuleRecord], key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            list.filter_input = false;
            list.query.clear();
            list.apply_filter(records);
        }
        KeyCode::Enter => list.filter_input = false,
        KeyCode::Backspace => {
            if list.query.pop().is_some() {
                list.apply_filter(records);
            }
        }
        KeyCode::Up => list.move_up(1),
        KeyCode::Down => list.move_down(1),
        KeyCode::Char(ch)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            list.query.push(ch);
            list.apply_filter(records);
        }
        _ => {}
    }
}

fn update_detail(
    mut model: AppModel,
    mut detail: DetailView,
    key: KeyEvent,
) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Backspace => {
            model.view = View::List;
            return (model, AppCommand::None);
        }
        KeyCode::Char('d') => {
            detail.expanded = !detail.expanded;
            if !detail.expanded {
                detail.scroll = 0;
            }
        }
        KeyCode::Char('?') => model.help_open = true,
        KeyCode::Up | KeyCode::Char('k') => detail.scroll = detail.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => detail.scroll = detail.scroll.saturating_add(1),
        KeyCode::PageUp => detail.scroll = detail.scroll.saturating_sub(detail_page_step(&model)),
        KeyCode::PageDown => detail.scroll = detail.scroll.saturating_add(detail_page_step(&model)),
        KeyCode::Home | KeyCode::Char('g') => detail.scroll = 0,
        _ => {}
    }

    model.view = View::Detail(detail);
    (model, AppCommand::None)
}

fn detail_page_step(model: &AppModel) -> u16 {
    let (_, height) = inner_terminal_size(model.terminal_size);
    // Header (3) + footer (1) + pane borders (2).
    height.saturating_sub(6).max(1)
}
