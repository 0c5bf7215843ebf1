//! Dashboard view rendering.
//!
//! Displays every sensor in a table, with the selected sensor's key and
//! supplementary attributes in a side panel.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_seconds;
use crate::data::{Reading, Sensor, SyncReport};

/// Render the sensor table and the detail panel side by side.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(area);

    render_sensors(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_sensors(frame: &mut Frame, app: &App, area: Rect) {
    let report = app.report();

    let header = Row::new(vec![
        Cell::from("Sensor"),
        Cell::from("Value"),
        Cell::from("Unit"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = Sensor::ALL
        .iter()
        .map(|sensor| {
            let reading = report.map_or(Reading::Unavailable, |r| sensor.value(r));
            let value_style = value_style(app, *sensor, report, &reading);

            Row::new(vec![
                Cell::from(sensor.name()),
                Cell::from(reading.to_string()).style(value_style),
                Cell::from(sensor.unit().unwrap_or("")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Min(10),
    ];

    let selected = app.selected_sensor_index.min(Sensor::ALL.len() - 1);
    let title = format!(" Sensors [{}/{}] ", selected + 1, Sensor::ALL.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn value_style(app: &App, sensor: Sensor, report: Option<&SyncReport>, reading: &Reading) -> Style {
    if !reading.is_available() {
        return Style::default().fg(app.theme.muted);
    }
    match (sensor, report) {
        (Sensor::SyncStatus | Sensor::BlocksBehind, Some(r)) => {
            app.theme.status_style(r.sync_status.health())
        }
        _ => Style::default(),
    }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let sensor = app.selected_sensor();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", sensor.name()), bold)),
        Line::from(""),
        Line::from(vec![Span::raw(" Key:    "), Span::raw(sensor.key())]),
    ];

    match app.report() {
        Some(report) => {
            let reading = sensor.value(report);
            let value = match (sensor, &reading) {
                (Sensor::RemainingSyncTime, Reading::Integer(secs)) => {
                    format!("{} ({})", reading, format_seconds(*secs))
                }
                _ => reading.to_string(),
            };
            lines.push(Line::from(vec![
                Span::raw(" Value:  "),
                Span::styled(value, bold),
            ]));

            if let Some(attrs) = sensor.attributes(report) {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(" Attributes", app.theme.header)));
                lines.push(Line::from(vec![
                    Span::raw("  sync status:   "),
                    Span::styled(
                        attrs.sync_status.label(),
                        app.theme.status_style(attrs.sync_status.health()),
                    ),
                ]));
                lines.push(Line::from(format!("  blocks behind: {}", attrs.blocks_behind)));
            }

            if !reading.is_available() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    " Needs two samples while catching up",
                    Style::default().fg(app.theme.muted),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                " No data yet",
                Style::default().fg(app.theme.muted),
            )));
        }
    }

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
