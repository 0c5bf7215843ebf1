//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar with the node's sync overview.
///
/// Displays: status indicator, node name, sync status, percentage,
/// blocks behind and price.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(
        format!(" {} ", app.node_name.to_uppercase()),
        Style::default().add_modifier(Modifier::BOLD),
    );

    let Some(report) = app.report() else {
        let line = Line::from(vec![title, Span::raw("| Waiting for first refresh...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let health = report.sync_status.health();
    let status_style = app.theme.status_style(health);

    let line = Line::from(vec![
        Span::styled(format!(" ● {} ", health.symbol()), status_style),
        title,
        Span::raw("│ "),
        Span::styled(report.sync_status.label(), status_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{:.2}%", report.sync_percentage),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::raw(format!("{} behind", report.blocks_behind)),
        Span::raw(" │ "),
        Span::raw(format!("${:.2}", report.price_usd)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows the time of the last successful refresh, the interval, and the
/// error of the latest cycle when the displayed data is stale.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "r:refresh e:export ?:help q:quit";
    let interval = app.refresh_interval.as_secs();

    let Some(ref state) = app.state else {
        let paragraph = Paragraph::new(format!(" Loading... | {}", controls))
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    };

    let updated = state
        .last_success
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let activity = if state.in_flight { " | refreshing" } else { "" };

    if let Some(ref err) = state.last_error {
        let text = if state.is_stale() {
            format!(" Stale (updated {}): {} | {}", updated, err, controls)
        } else {
            format!(" Error: {} | {}", err, controls)
        };
        let paragraph = Paragraph::new(text).style(Style::default().fg(app.theme.warning));
        frame.render_widget(paragraph, area);
        return;
    }

    let text = format!(
        " {} | Updated {} | every {}s{} | {}",
        app.source_description(),
        updated,
        interval,
        activity,
        controls,
    );
    let paragraph = Paragraph::new(text).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select sensor"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q/Esc     Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 15u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
