use crate::simulation::alerts::AlertKind;
use crate::state::snapshot::{EdgeLoad, PathStatus, StateSnapshot};
use crate::tui::app::App;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::Color::White;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Sparkline, Table};

pub fn draw_app(frame: &mut Frame, app: &App) {
    let snapshot = app.engine.full_state_snapshot();
    let budget = app.engine.alert_system().budget();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length((snapshot.paths.len() + 3) as u16),
            Constraint::Min(5),
            Constraint::Length((budget.max(1) + snapshot.flow_clears.len() + 2) as u16),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(build_header(app, &snapshot), chunks[0]);
    frame.render_widget(build_sparkline(app), chunks[1]);
    frame.render_widget(build_path_table(app, &snapshot), chunks[2]);
    frame.render_widget(build_edge_table(&snapshot), chunks[3]);
    frame.render_widget(build_alerts(app, &snapshot), chunks[4]);
    frame.render_widget(build_reply(app), chunks[5]);
    frame.render_widget(build_help(), chunks[6]);
}

fn util_style(utilization: f64) -> Style {
    if utilization < 80.0 {
        Style::default().fg(Color::Green)
    } else if utilization <= 100.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn build_header<'a>(app: &'a App, snapshot: &'a StateSnapshot) -> Block<'a> {
    let m = &snapshot.metrics;
    let cut = snapshot
        .min_cut
        .iter()
        .map(|e| app.engine.graph().edge_by_id(*e).name())
        .collect::<Vec<&str>>()
        .join(" ");
    Block::new()
        .title(Line::from(vec![
            Span::raw(" Flowctl ").style(Style::default().bold().cyan()),
            Span::raw("|").style(dim()),
            Span::raw(" Tick: ").style(dim()),
            Span::raw(format!("{}", snapshot.tick)).style(Style::default().bold()),
            Span::raw("  Throughput: ").style(dim()),
            Span::raw(format!("{:.2}", m.throughput)).style(Style::default().bold()),
            Span::raw("  Max flow: ").style(dim()),
            Span::raw(format!("{:.2}", m.max_flow)).style(Style::default().bold()),
            Span::raw("  Path sum: ").style(dim()),
            Span::raw(format!("{:.2}", m.path_capacity)),
            Span::raw("  Cut: ").style(dim()),
            Span::raw(cut),
            Span::raw("  Efficiency: ").style(dim()),
            Span::raw(format!("{:.1}%", m.efficiency * 100.0))
                .style(util_style(m.efficiency * 100.0)),
            Span::raw(" "),
        ]))
        .title_alignment(Alignment::Center)
}

fn build_sparkline(app: &'_ App) -> Sparkline<'_> {
    // scaled by 100 so fractional throughput still registers
    let data = app
        .engine
        .history()
        .iter()
        .map(|m| (m.throughput * 100.0).round() as u64)
        .collect::<Vec<u64>>();
    let max = app
        .engine
        .history()
        .iter()
        .map(|m| (m.max_flow * 100.0).round() as u64)
        .max()
        .unwrap_or(1)
        .max(1);

    Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::from(" Throughput ").style(Style::default().bold())),
        )
        .data(data)
        .max(max)
        .style(Style::default().fg(Color::Cyan))
}

fn path_style(status: PathStatus) -> Style {
    match status {
        PathStatus::Low => dim(),
        PathStatus::Normal => Style::default().green(),
        PathStatus::High => Style::default().yellow(),
        PathStatus::Saturated => Style::default().light_red(),
        PathStatus::Blocked => Style::default().red().bold(),
    }
}

fn build_path_table<'a>(app: &'a App, snapshot: &'a StateSnapshot) -> Table<'a> {
    let graph = app.engine.graph();
    Table::new(
        snapshot.paths.iter().map(|p| {
            let route = p
                .edges
                .iter()
                .map(|e| graph.edge_by_id(*e).name())
                .collect::<Vec<&str>>()
                .join(" ");
            let row = Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(route),
                Cell::from(format!("{:>6.2}", p.current_flow)),
                Cell::from(format!("{:>6.2}", p.bottleneck.capacity)),
                Cell::from(graph.edge_by_id(p.bottleneck.edge).name()),
                Cell::from(format!("{:>6.1}", p.utilization)).style(util_style(p.utilization)),
                Cell::from(p.status.label()).style(path_style(p.status)),
            ]);
            if p.id == app.selected() {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        }),
        [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new([
            Cell::from("Path"),
            Cell::from("Edges"),
            Cell::from("  Flow"),
            Cell::from("  Bneck"),
            Cell::from("At"),
            Cell::from("  Util"),
            Cell::from("Status"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Paths ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn load_style(load: EdgeLoad) -> Style {
    match load {
        EdgeLoad::Low => dim(),
        EdgeLoad::Normal => Style::default().green(),
        EdgeLoad::High => Style::default().yellow(),
        EdgeLoad::Overload => Style::default().red().bold(),
        EdgeLoad::Disabled => Style::default().red(),
    }
}

fn build_edge_table(snapshot: &'_ StateSnapshot) -> Table<'_> {
    let mut rows = snapshot.edges.iter().collect::<Vec<_>>();
    rows.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));

    Table::new(
        rows.into_iter().map(|e| {
            Row::new(vec![
                Cell::from(e.name.as_str()),
                Cell::from(format!("{} -> {}", e.from, e.to)),
                Cell::from(format!("{:>6.2}", e.flow)),
                Cell::from(format!("{:>6.2}", e.capacity)),
                Cell::from(format!("{:>6.2}", e.residual)),
                Cell::from(format!("{:>6.2}", e.base_capacity)).style(dim()),
                Cell::from(format!("{:>6.1}", e.utilization)).style(util_style(e.utilization)),
                Cell::from(e.load.label()).style(load_style(e.load)),
            ])
        }),
        [
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new([
            Cell::from("Edge"),
            Cell::from("Link"),
            Cell::from("  Flow"),
            Cell::from("   Cap"),
            Cell::from("  Free"),
            Cell::from("  Base"),
            Cell::from("  Util"),
            Cell::from("Load"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Edges ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_alerts<'a>(app: &'a App, snapshot: &'a StateSnapshot) -> Paragraph<'a> {
    let graph = app.engine.graph();
    let mut lines = snapshot
        .alerts
        .iter()
        .map(|a| {
            let style = match a.kind {
                AlertKind::Failure => Style::default().red().bold(),
                AlertKind::Overload => Style::default().yellow(),
                AlertKind::Recovery => Style::default().green(),
            };
            Line::from(Span::raw(a.describe(graph)).style(style))
        })
        .chain(
            snapshot
                .flow_clears
                .iter()
                .map(|c| Line::from(Span::raw(c.describe(graph)).light_red())),
        )
        .collect::<Vec<Line>>();
    if lines.is_empty() {
        lines.push(Line::from(Span::raw("no alerts").style(dim())));
    }

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Alerts ").style(Style::default().bold()),
                Span::from(format!(
                    "({} suppressed) ",
                    app.engine.alert_system().suppressed()
                ))
                .style(dim()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_reply(app: &'_ App) -> Line<'_> {
    match app.reply() {
        Some(reply) if reply.ok => Line::from(Span::raw(format!(" ok: {}", reply.message)).green()),
        Some(reply) => Line::from(Span::raw(format!(" rejected: {}", reply.message)).red()),
        None => Line::from(Span::raw(" ready").style(dim())),
    }
}

fn build_help() -> Line<'static> {
    Line::from(
        Span::raw(concat!(
            " space step  up/down select  s saturate  +/- adjust  c clear",
            "  x fail bottleneck  e enable  a greedy  q quit"
        ))
        .style(dim()),
    )
}
