//! Run stages and the payloads of the selected stage.

use of_protocol::run_models::{RunState, StageState, StageStatus};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState,
};
use ratatui::Frame;
use serde_json::Value;

use crate::widgets::graph_view::status_color;

/// Format a stage payload for display: `-` for null, pretty JSON otherwise.
pub fn format_payload(value: &Value) -> String {
    if value.is_null() {
        return "-".to_string();
    }
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render the four stages with the selected one's payloads below.
pub fn render_stage_panel(
    frame: &mut Frame,
    area: Rect,
    state: &RunState,
    selected: usize,
    payload_view: &PayloadView,
    focused: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(3)])
        .split(area);

    let items: Vec<ListItem> = state.iter().map(stage_item).collect();
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Run stages (Enter: run until stage)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(3)));
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    let stage = state.iter().nth(selected);
    payload_view.render(frame, chunks[1], stage);
}

fn stage_item(stage: &StageState) -> ListItem<'static> {
    let badge_style = Style::default()
        .fg(status_color(stage.status))
        .add_modifier(Modifier::BOLD);
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(format!("[{:<7}] ", stage.status.label()), badge_style),
            Span::raw(stage.title.clone()),
        ]),
        Line::styled(
            format!("          {}", stage.detail),
            Style::default().fg(Color::Gray),
        ),
    ])
}

/// Scrollable input/output view of one stage.
#[derive(Debug, Default)]
pub struct PayloadView {
    /// Current scroll offset (number of lines scrolled from the top).
    pub scroll_offset: usize,
}

impl PayloadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, stage: Option<&StageState>) {
        let block = Block::default().borders(Borders::ALL).title("Input / Output");

        let lines: Vec<Line> = match stage {
            Some(stage) => payload_lines(stage),
            None => vec![Line::from("No stage selected.")],
        };
        let total_lines = lines.len();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, area);

        let visible_lines = area.height.saturating_sub(2) as usize;
        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(self.scroll_offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }
}

fn payload_lines(stage: &StageState) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::styled("Input", heading)];
    lines.extend(format_payload(&stage.input).lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::styled("Output", heading));
    lines.extend(format_payload(&stage.output).lines().map(|l| Line::from(l.to_string())));
    if stage.status == StageStatus::Running {
        lines.push(Line::styled("…", Style::default().fg(Color::Yellow)));
    }
    lines
}
