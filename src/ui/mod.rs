mod present;
mod theme;

use crate::app::{AppModel, Mode, ModuleListView, Phase, View, inner_terminal_size, screen_margin};
use crate::domain::{ModuleRecord, ModuleStatus};
use present::{display_date, format_detail_block, level_badge, status_badge};
use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::*;
use unicode_width::UnicodeWidthStr;

const STATUS_COL_WIDTH: usize = 14;
const CERT_COL_WIDTH: usize = 6;
const LEVEL_COL_WIDTH: usize = 9;
const DATE_COL_WIDTH: usize = 10;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    match model.phase {
        Phase::Loading => render_loading(frame, area),
        Phase::Error => render_error(frame, area, model),
        Phase::Ready => match model.mode() {
            Mode::List => {
                if let Some(list) = &model.list {
                    render_list(frame, area, model, list);
                }
            }
            Mode::Detail => render_detail(frame, area, model),
        },
    }

    if model.help_open {
        render_help_overlay(frame, area);
    }
}

/// Keeps the detail scroll offset inside the rendered text. Runs before each
/// draw since the line count depends on the terminal width.
pub fn clamp_scroll_state(model: &mut AppModel) {
    let records = model.records.clone();
    let terminal_size = model.terminal_size;
    let View::Detail(detail_view) = &mut model.view else {
        return;
    };
    let Some(record) = records.get(detail_view.record_index) else {
        return;
    };

    let (width, height) = inner_terminal_size(terminal_size);
    // Borders (2) + horizontal padding (2).
    let text_width = width.saturating_sub(4);
    // Header (3) + footer (1) + pane borders (2).
    let viewport = usize::from(height.saturating_sub(6));
    if text_width == 0 || viewport == 0 {
        detail_view.scroll = 0;
        return;
    }

    let paragraph = Paragraph::new(detail_lines(record, detail_view.expanded))
        .wrap(Wrap { trim: false });
    let total = paragraph.line_count(text_width);
    let max_scroll = u16::try_from(total.saturating_sub(viewport)).unwrap_or(u16::MAX);
    detail_view.scroll = detail_view.scroll.min(max_scroll);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let area = inner_area(area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "Loading CMVP modules…",
            Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Fetching the validated module catalog from the NIST CMVP API.",
            Style::default().fg(theme::MUTED),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Keys: Ctrl+C=quit",
            Style::default().fg(theme::DIM),
        )),
    ])
    .block(
        Block::default()
            .title("cmvp")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, area: Rect, model: &AppModel) {
    let area = inner_area(area);
    let error_text = model
        .last_error
        .clone()
        .unwrap_or_else(|| "unknown error".to_string());

    let paragraph = Paragraph::new(vec![
        Line::from("Failed to load the CMVP catalog."),
        Line::from(""),
        Line::from(Span::styled(
            format!("Error: {error_text}"),
            Style::default().fg(theme::ERROR),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Restart cmvp to try again.  Keys: q/Esc/Ctrl+C=quit",
            Style::default().fg(theme::DIM),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .title("cmvp")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ERROR))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, area: Rect, model: &AppModel, list: &ModuleListView) {
    let area = inner_area(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(list_header_line(model, list, chunks[0].width)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .padding(Padding::horizontal(1))
            .title(format!(
                "CMVP Modules · {} · {}/{}",
                list.status_filter.label(),
                list.filtered_indices.len(),
                model.records.len()
            )),
    );
    frame.render_widget(header, chunks[0]);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .padding(Padding::horizontal(1));

    if list.filtered_indices.is_empty() {
        let message = if list.is_filtered() {
            "No matching modules. Press Esc to clear the filter, Tab to change status."
        } else {
            "The catalog is empty."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(theme::MUTED))
            .block(list_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let max_width = (chunks[1].width as usize).saturating_sub(6);
        let items: Vec<ListItem> = list
            .filtered_indices
            .iter()
            .filter_map(|index| model.records.get(*index))
            .map(|record| module_list_item(record, max_width))
            .collect();

        let widget = List::new(items)
            .block(list_block)
            .highlight_style(
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        let mut state = ListState::default();
        state.select(Some(
            list.selected
                .min(list.filtered_indices.len().saturating_sub(1)),
        ));
        frame.render_stateful_widget(widget, chunks[1], &mut state);
    }

    let keys = if list.filter_input {
        "Filter: type to narrow  Enter=keep  Esc=clear  ↑/↓=move"
    } else {
        "Keys: ↑/↓=move  PgUp/PgDn=page  Enter=open  /=filter  Tab=status  q=quit  ?=help"
    };
    frame.render_widget(footer_paragraph(keys, model.notice.as_deref()), chunks[2]);
}

fn list_header_line(model: &AppModel, list: &ModuleListView, width: u16) -> Line<'static> {
    let max_width = (width as usize).saturating_sub(4);

    if list.filter_input || !list.query.is_empty() {
        let cursor = if list.filter_input { "▏" } else { "" };
        return Line::from(vec![
            Span::styled("/", Style::default().fg(theme::ACCENT)),
            Span::styled(
                truncate_end(&format!("{}{cursor}", list.query), max_width.saturating_sub(1)),
                Style::default().fg(theme::FG),
            ),
        ]);
    }

    let summary = match &model.metadata {
        Some(metadata) => {
            let mut text = format!(
                "{} active · {} historical · {} in process",
                metadata.total_modules,
                metadata.total_historical_modules,
                metadata.total_modules_in_process
            );
            if !metadata.generated_at.is_empty() {
                text.push_str(&format!(" · updated {}", metadata.generated_at));
            }
            if !metadata.source.is_empty() {
                text.push_str(&format!(" · {}", metadata.source));
            }
            if !metadata.version.is_empty() {
                text.push_str(&format!(" v{}", metadata.version));
            }
            text
        }
        None => format!("{} modules · press / to filter", model.records.len()),
    };
    Line::from(Span::styled(
        truncate_end(&summary, max_width),
        Style::default().fg(theme::MUTED),
    ))
}

fn module_list_item(record: &ModuleRecord, max_width: usize) -> ListItem<'static> {
    let status = pad(&status_badge(record.status), STATUS_COL_WIDTH, Align::Left);
    let cert = pad(&record.certificate_number, CERT_COL_WIDTH, Align::Left);
    let level = pad(&level_badge(record.overall_level), LEVEL_COL_WIDTH, Align::Left);
    let date = pad(&display_date(record.validation_date), DATE_COL_WIDTH, Align::Right);

    let fixed = STATUS_COL_WIDTH + CERT_COL_WIDTH + LEVEL_COL_WIDTH + DATE_COL_WIDTH + 6;
    let name_width = max_width.saturating_sub(fixed);
    let name = if record.vendor_name.trim().is_empty() {
        record.title()
    } else {
        format!("{} · {}", record.title(), record.vendor_name)
    };
    let name = pad(&truncate_end(&name, name_width), name_width, Align::Left);

    ListItem::new(Line::from(vec![
        Span::styled(status, Style::default().fg(status_color(record.status))),
        Span::raw("  "),
        Span::styled(cert, Style::default().fg(theme::MUTED)),
        Span::raw("  "),
        Span::styled(name, Style::default().fg(theme::FG)),
        Span::raw(" "),
        Span::styled(level, Style::default().fg(theme::LEVEL)),
        Span::raw(" "),
        Span::styled(date, Style::default().fg(theme::DIM)),
    ]))
}

fn render_detail(frame: &mut Frame, area: Rect, model: &AppModel) {
    let View::Detail(detail_view) = &model.view else {
        return;
    };
    let Some(record) = model.selected_record() else {
        return;
    };

    let area = inner_area(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = format!("{} · {}", record.title(), status_badge(record.status));
    let header = Paragraph::new(Line::from(Span::styled(
        truncate_end(&record.subtitle(), (chunks[0].width as usize).saturating_sub(4)),
        Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(status_color(record.status)))
            .padding(Padding::horizontal(1))
            .title(title),
    );
    frame.render_widget(header, chunks[0]);

    let details_title = if model.detail_expanded() {
        "Details · algorithm details shown (d to hide)"
    } else {
        "Details · d to show algorithm details"
    };
    let body = Paragraph::new(detail_lines(record, model.detail_expanded()))
        .wrap(Wrap { trim: false })
        .scroll((detail_view.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .padding(Padding::horizontal(1))
                .title(details_title),
        );
    frame.render_widget(body, chunks[1]);

    frame.render_widget(
        footer_paragraph(
            "Keys: ↑/↓=scroll  PgUp/PgDn=page  d=algorithm details  q/Esc=back  ?=help",
            model.notice.as_deref(),
        ),
        chunks[2],
    );
}

/// Styles the plain detail block: labels muted, values colored by field.
fn detail_lines(record: &ModuleRecord, expanded: bool) -> Vec<Line<'static>> {
    let mut value_style = Style::default().fg(theme::FG);
    format_detail_block(record, expanded)
        .lines()
        .map(|line| {
            // Continuation lines are indented; labels never start with a space.
            let value_start = if line.starts_with(' ') {
                0
            } else {
                value_style = if line.starts_with("Status:") {
                    Style::default().fg(status_color(record.status))
                } else if line.starts_with("Security Level:") {
                    Style::default().fg(theme::LEVEL)
                } else {
                    Style::default().fg(theme::FG)
                };
                line.find(':').map(|colon| colon + 1).unwrap_or(0)
            };
            let rest = &line[value_start..];
            let value_start = value_start + (rest.len() - rest.trim_start().len());
            Line::from(vec![
                Span::styled(line[..value_start].to_string(), Style::default().fg(theme::MUTED)),
                Span::styled(line[value_start..].to_string(), value_style),
            ])
        })
        .collect()
}

fn status_color(status: ModuleStatus) -> Color {
    match status {
        ModuleStatus::Active => theme::ACTIVE,
        ModuleStatus::Historical => theme::HISTORICAL,
        ModuleStatus::InProcess => theme::IN_PROCESS,
        ModuleStatus::Unknown => theme::DIM,
    }
}

fn footer_paragraph(keys: &str, notice: Option<&str>) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(keys.to_string(), Style::default().fg(theme::DIM))];
    if let Some(message) = notice.filter(|message| !message.trim().is_empty()) {
        spans.push(Span::styled("  ·  ", Style::default().fg(theme::DIM)));
        spans.push(Span::styled(
            message.to_string(),
            Style::default().fg(theme::ACCENT),
        ));
    }
    Paragraph::new(Line::from(spans))
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Fills `text` with spaces up to `width` columns; wider text is left alone.
fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(UnicodeWidthStr::width(text)));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > available {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}

fn inner_area(area: Rect) -> Rect {
    let (horizontal, vertical) = screen_margin((area.width, area.height));
    area.inner(Margin {
        horizontal,
        vertical,
    })
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from("Module list"),
        Line::from("  - ↑/↓, k/j or mouse wheel: move selection"),
        Line::from("  - PgUp/PgDn: page up/down"),
        Line::from("  - Home/End or g/G: first/last module"),
        Line::from("  - Enter: open module details"),
        Line::from("  - /: filter by certificate, vendor, module, type or standard"),
        Line::from("  - Tab/Shift+Tab: cycle status (All, Active, Historical, In Process)"),
        Line::from("  - 0-3: jump to a status (0 shows all)"),
        Line::from("  - Esc: clear filter"),
        Line::from("  - q: quit"),
        Line::from(""),
        Line::from("Module details"),
        Line::from("  - d: show/hide algorithm details"),
        Line::from("  - ↑/↓ or k/j, PgUp/PgDn, Home, mouse wheel: scroll"),
        Line::from("  - q, Esc or Backspace: back to the list"),
        Line::from(""),
        Line::from("Global"),
        Line::from("  - Ctrl+C: quit"),
        Line::from("  - ?: toggle this help"),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .padding(Padding::horizontal(1))
            .title("Help (any key to close)"),
    );
    frame.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [band] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(band);
    popup
}
