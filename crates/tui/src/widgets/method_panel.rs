//! Method picker and method details.

use of_protocol::dashboard_models::{
    status_label, DashboardPayload, ExampleSetup, MethodMeta, OntologyReflection,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

/// Render the method list above the details of the selected method.
///
/// `sample` is the index of the sample question last loaded with `n`.
pub fn render_method_panel(
    frame: &mut Frame,
    area: Rect,
    dashboard: Option<&DashboardPayload>,
    selected: usize,
    sample: usize,
    focused: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let methods = dashboard
        .map(|d| d.ontology_utilization.as_slice())
        .unwrap_or_default();

    let items: Vec<ListItem> = methods
        .iter()
        .map(|m| ListItem::new(m.display_name()))
        .collect();

    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Method"),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !methods.is_empty() {
        state.select(Some(selected.min(methods.len() - 1)));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let method = methods.get(selected);
    let details = Paragraph::new(method_details(dashboard, method, sample))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Details"));
    frame.render_widget(details, chunks[1]);
}

fn method_details(
    dashboard: Option<&DashboardPayload>,
    method: Option<&MethodMeta>,
    sample: usize,
) -> Vec<Line<'static>> {
    let Some(method) = method else {
        return vec![Line::from("No method available.")];
    };

    let test_status = dashboard
        .and_then(|d| d.test_status_for(&method.method_id))
        .map(|s| status_label(&s.status).to_string())
        .unwrap_or_else(|| "-".to_string());

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled(method.highlight.clone(), bold),
        field("Compare rule", &method.compare_rule),
        field("Paper basis", &method.paper_basis),
        field("Type", &method.ontology_type),
        field("Ontology file", &method.ontology_file),
        field("Test status", &test_status),
    ];

    if let Some(reflection) = method.reflection() {
        lines.extend(reflection_lines(&reflection));
    }

    if let Some(example) = dashboard.and_then(|d| d.example_for(&method.method_id)) {
        lines.push(field("Scenario", &example.scenario));
        lines.push(field("Expected", &example.expected_outcome));
        let ready = if example.is_ready() { "ready" } else { "not ready" };
        lines.push(field("Environment", ready));
        if let Some(setup) = example.setup_report() {
            lines.extend(setup_lines(&setup));
        }
        if let Some(question) = example.first_question() {
            lines.push(field("Example (x)", question));
        }
        if !example.sample_questions.is_empty() {
            lines.push(Line::styled("Samples (n)", label_style()));
            let active = sample % example.sample_questions.len();
            for (index, question) in example.sample_questions.iter().enumerate() {
                let marker = if index == active { ">" } else { " " };
                lines.push(Line::from(format!(" {marker} {}. {question}", index + 1)));
            }
        }
    }

    for reference in &method.references {
        let year = reference.year.map(|y| format!(" {y}")).unwrap_or_default();
        lines.push(Line::from(format!(
            "  · {} ({}{year})",
            reference.title, reference.venue
        )));
    }

    lines
}

fn reflection_lines(reflection: &OntologyReflection) -> Vec<Line<'static>> {
    let counts = &reflection.counts;
    let mut lines = vec![
        Line::styled("Ontology reflection", label_style()),
        field(
            "Graph",
            &format!(
                "C:{} I:{} R:{}",
                counts.classes, counts.instances, counts.relations
            ),
        ),
        field("Candidates", &counts.candidates.to_string()),
    ];
    for (name, items) in [
        ("Products", &reflection.product_labels),
        ("Rules", &reflection.rule_ids),
        ("Relations", &reflection.relation_types),
        ("Properties", &reflection.focus_properties),
    ] {
        lines.push(field(name, &items.join(", ")));
    }
    lines
}

fn setup_lines(setup: &ExampleSetup) -> Vec<Line<'static>> {
    let mut lines = vec![field(
        "Ontology",
        if setup.ontology_ready { "OK" } else { "MISSING" },
    )];
    for dependency in &setup.dependencies {
        lines.push(readiness(
            &dependency.module,
            dependency.ready,
            ("OK", "MISSING"),
        ));
    }
    for env in &setup.env {
        lines.push(readiness(&env.key, env.ready, ("SET", "EMPTY")));
    }
    lines
}

fn readiness(name: &str, ready: bool, (yes, no): (&str, &str)) -> Line<'static> {
    let (text, color) = if ready { (yes, Color::Green) } else { (no, Color::Red) };
    Line::from(vec![
        Span::raw(format!("  {name}: ")),
        Span::styled(text.to_string(), Style::default().fg(color)),
    ])
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan)
}

fn field(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), label_style()),
        Span::raw(or_dash(value).to_string()),
    ])
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
