//! Keyword trace of the lookup stage and the final answer.

use of_core::trace::KeywordTrace;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const NO_TRACE: &str = "Run the lookup stage to see matched keywords.";
const NO_ANSWER: &str = "No answer yet.";

fn join_or_dash(terms: &[String]) -> String {
    if terms.is_empty() {
        "-".to_string()
    } else {
        terms.join(", ")
    }
}

fn trace_lines(trace: Option<&KeywordTrace>) -> Vec<Line<'static>> {
    let Some(trace) = trace else {
        return vec![Line::styled(NO_TRACE, Style::default().fg(Color::DarkGray))];
    };

    let key = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Query terms: ", key),
            Span::raw(join_or_dash(&trace.query_terms)),
        ]),
        Line::from(vec![
            Span::styled("Prioritized: ", key),
            Span::raw(join_or_dash(&trace.prioritized_terms)),
        ]),
    ];

    if trace.candidates.is_empty() {
        lines.push(Line::from("No candidates matched."));
    }
    for (idx, candidate) in trace.candidates.iter().enumerate() {
        lines.push(Line::styled(
            format!("{}. {}", idx + 1, candidate.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::styled(
            format!("   {}", candidate.summary()),
            Style::default().fg(Color::Gray),
        ));
    }
    lines
}

/// Render the keyword trace above the answer.
pub fn render_trace_panel(
    frame: &mut Frame,
    area: Rect,
    trace: Option<&KeywordTrace>,
    answer: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let trace_widget = Paragraph::new(trace_lines(trace))
        .block(Block::default().borders(Borders::ALL).title("Keyword trace"))
        .wrap(Wrap { trim: false });
    frame.render_widget(trace_widget, chunks[0]);

    let answer_line = if answer.is_empty() {
        Line::styled(NO_ANSWER, Style::default().fg(Color::DarkGray))
    } else {
        Line::from(answer.to_string())
    };
    let answer_widget = Paragraph::new(answer_line)
        .block(Block::default().borders(Borders::ALL).title("Answer"))
        .wrap(Wrap { trim: true });
    frame.render_widget(answer_widget, chunks[1]);
}
