//! Task graph drawn on a ratatui canvas.
//!
//! The layout engine works in abstract layout space where `y` grows downward.
//! This module adapts that space onto a `Canvas`, whose `y` grows upward.

use of_core::layout::{EdgeFlow, GraphLayout, NodeKind, Position, PositionedNode};
use of_protocol::run_models::StageStatus;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Layout-space width reserved for a node label.
pub const NODE_WIDTH: f64 = 420.0;

/// Layout-space height of a node.
pub const NODE_HEIGHT: f64 = 60.0;

const MARGIN: f64 = 40.0;

/// Map a layout position to canvas coordinates.
pub fn to_canvas(position: Position) -> (f64, f64) {
    (position.x, -position.y)
}

/// Canvas bounds enclosing every node of `layout`.
pub fn canvas_bounds(layout: &GraphLayout) -> ([f64; 2], [f64; 2]) {
    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    for node in &layout.nodes {
        let (x, y) = to_canvas(node.position);
        min_x = min_x.min(x);
        max_x = max_x.max(x + NODE_WIDTH);
        min_y = min_y.min(y - NODE_HEIGHT);
        max_y = max_y.max(y);
    }
    if layout.nodes.is_empty() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }
    (
        [min_x - MARGIN, max_x + MARGIN],
        [min_y - MARGIN, max_y + MARGIN],
    )
}

/// Color of a node for its live status.
pub fn status_color(status: StageStatus) -> Color {
    match status {
        StageStatus::Prep => Color::DarkGray,
        StageStatus::Running => Color::Yellow,
        StageStatus::Done => Color::Green,
    }
}

/// Render the graph; `selected` is the index of the highlighted node.
pub fn render_graph(
    frame: &mut Frame,
    area: Rect,
    layout: &GraphLayout,
    selected: usize,
    focused: bool,
) {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title("Task graph (Enter: run until node's stage, Shift+arrows: move)");

    if layout.is_empty() {
        let paragraph = Paragraph::new("No method DAG available.").block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let (x_bounds, y_bounds) = canvas_bounds(layout);
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            let mut labels = Vec::with_capacity(layout.edges.len());
            for edge in &layout.edges {
                let source = layout.node(&edge.source);
                let target = layout.node(&edge.target);
                let (Some(source), Some(target)) = (source, target) else {
                    continue;
                };
                let ((x1, y1), (x2, y2)) = edge_anchors(source, target, edge.flow);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: Color::Gray,
                });
                labels.push(((x1 + x2) / 2.0, (y1 + y2) / 2.0, edge.sequence));
            }
            ctx.layer();
            // Edge numbers first so node labels win where they overlap.
            for (x, y, sequence) in labels {
                let style = Style::default().fg(Color::DarkGray);
                ctx.print(x, y, Line::styled(sequence.to_string(), style));
            }
            for (index, node) in layout.nodes.iter().enumerate() {
                let (x, y) = to_canvas(node.position);
                ctx.print(x, y, node_line(node, index == selected));
            }
        });

    frame.render_widget(canvas, area);
}

fn node_line(node: &PositionedNode, selected: bool) -> Line<'static> {
    let marker = match node.kind {
        NodeKind::Card => "■",
        NodeKind::Decision => "◆",
    };
    let mut style = Style::default().fg(status_color(node.status));
    if selected {
        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    Line::styled(format!("{marker} {}", node.display_label), style)
}

/// Connection points: right to left across stages, bottom to top within one.
fn edge_anchors(
    source: &PositionedNode,
    target: &PositionedNode,
    flow: EdgeFlow,
) -> ((f64, f64), (f64, f64)) {
    let (sx, sy) = to_canvas(source.position);
    let (tx, ty) = to_canvas(target.position);
    match flow {
        EdgeFlow::CrossStage => ((sx + NODE_WIDTH, sy), (tx, ty)),
        EdgeFlow::SameStage => (
            (sx + NODE_WIDTH / 2.0, sy - NODE_HEIGHT / 2.0),
            (tx + NODE_WIDTH / 2.0, ty),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use of_core::config::models::LayoutConfig;
    use of_core::layout::compute_layout;
    use of_core::stages::build_stage_template;
    use of_protocol::topology::MethodDag;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn layout() -> GraphLayout {
        let dag: MethodDag = serde_json::from_value(json!({
            "nodes": [
                { "id": "n01", "label": "Parse", "runtime_stage": "received" },
                { "id": "n02", "label": "Match", "runtime_stage": "lookup" },
                { "id": "n03", "label": "Known?", "runtime_stage": "lookup", "lane": 1 }
            ],
            "edges": [
                { "source": "n01", "target": "n02" },
                { "source": "n02", "target": "n03" }
            ]
        }))
        .unwrap();
        compute_layout(Some(&dag), &build_stage_template(None), &LayoutConfig::default())
    }

    #[test]
    fn test_canvas_flips_vertical_axis() {
        let layout = layout();
        let (_, upper) = to_canvas(layout.nodes[1].position);
        let (_, lower) = to_canvas(layout.nodes[2].position);
        assert!(upper > lower);
    }

    #[test]
    fn test_bounds_enclose_all_nodes() {
        let layout = layout();
        let (xs, ys) = canvas_bounds(&layout);
        for node in &layout.nodes {
            let (x, y) = to_canvas(node.position);
            assert!(xs[0] <= x && x + NODE_WIDTH <= xs[1]);
            assert!(ys[0] <= y && y <= ys[1]);
        }
    }

    #[test]
    fn test_render_empty_graph() {
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal
            .draw(|frame| {
                render_graph(frame, frame.area(), &GraphLayout::default(), 0, false)
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("No method DAG available."));
    }

    #[test]
    fn test_render_graph_prints_labels() {
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();
        let layout = layout();
        terminal
            .draw(|frame| render_graph(frame, frame.area(), &layout, 0, true))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("01. Parse"));
        assert!(text.contains("03. Known?"));
    }

    #[test]
    fn test_render_graph_numbers_edges() {
        let mut layout = layout();
        layout.edges[0].sequence = 7;
        layout.edges[1].sequence = 8;

        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal
            .draw(|frame| render_graph(frame, frame.area(), &layout, 0, false))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains('7'));
        assert!(text.contains('8'));
    }
}
