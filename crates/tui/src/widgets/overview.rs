//! Ontology overview: per-method test status and the token mitigation plan.

use of_protocol::dashboard_models::{status_label, DashboardPayload, TokenMitigationStep};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

fn status_style(status: &str) -> Style {
    match status {
        "ready" | "done" => Style::default().fg(Color::Green),
        "partial" => Style::default().fg(Color::Yellow),
        "missing" => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

/// Renders the overview screen that replaces the main panels.
pub fn render_overview(frame: &mut Frame, area: Rect, dashboard: Option<&DashboardPayload>) {
    let Some(dashboard) = dashboard else {
        let empty = Paragraph::new("Dashboard not loaded.")
            .block(Block::default().borders(Borders::ALL).title("Overview"));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let rows: Vec<Row> = dashboard
        .ontology_test_status
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.method_name.clone()),
                Cell::from(s.ontology_type.clone()),
                Cell::from(s.classes.to_string()),
                Cell::from(s.instances.to_string()),
                Cell::from(s.relations.to_string()),
                Cell::from(status_label(&s.status).to_string()).style(status_style(&s.status)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("Method"),
        Cell::from("Type"),
        Cell::from("Classes"),
        Cell::from("Instances"),
        Cell::from("Relations"),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Min(18),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(15),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Ontology test status (o: close)"),
    );
    frame.render_widget(table, chunks[0]);

    let steps = Paragraph::new(mitigation_lines(&dashboard.token_mitigation_status))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Token mitigation"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(steps, chunks[1]);
}

fn mitigation_lines(steps: &[TokenMitigationStep]) -> Vec<Line<'static>> {
    if steps.is_empty() {
        return vec![Line::from("No mitigation steps reported.")];
    }

    let mut lines = Vec::new();
    for step in steps {
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", status_label(&step.status)),
                status_style(&step.status),
            ),
            Span::styled(
                step.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        if !step.summary.is_empty() {
            lines.push(Line::from(format!("    {}", step.summary)));
        }
        for item in &step.process {
            lines.push(Line::from(format!("    - {item}")));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn render(dashboard: Option<&DashboardPayload>) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_overview(frame, frame.area(), dashboard))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_overview_without_dashboard() {
        assert!(render(None).contains("Dashboard not loaded."));
    }

    #[test]
    fn test_render_overview_with_status_and_steps() {
        let dashboard: DashboardPayload = serde_json::from_value(json!({
            "ontology_test_status": [
                { "method_id": "method1", "method_name": "Keyword Grounding",
                  "ontology_type": "OWL", "classes": 12, "instances": 340,
                  "relations": 25, "status": "missing" }
            ],
            "token_mitigation_status": [
                { "step_id": "s1", "title": "Trim context", "status": "done",
                  "process": ["Drop duplicate facts"] }
            ]
        }))
        .unwrap();

        let content = render(Some(&dashboard));

        assert!(content.contains("Method"));
        assert!(content.contains("Keyword Grounding"));
        assert!(content.contains("340"));
        assert!(content.contains("not configured"));
        assert!(content.contains("Trim context"));
        assert!(content.contains("- Drop duplicate facts"));
    }
}
