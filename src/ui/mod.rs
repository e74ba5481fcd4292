//! Main UI layout and rendering.
//!
//! The screen is an app shell: a header bar with the view title and back
//! affordance, the routed content in the middle, and a footer holding the
//! playback bar, key bindings, and one-line status. Overlays draw on top.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::action::PlayerState;
use crate::app::App;
use crate::markup::{Node, Target};
use crate::prefs::Theme;
use crate::router::RouteState;

/// Colors resolved from the theme preference.
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    dim: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            fg: Color::White,
            bg: Color::Reset,
            accent: Color::Cyan,
            dim: Color::DarkGray,
        },
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            dim: Color::Gray,
        },
    }
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let colors = palette(app.services.prefs.theme());

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        area,
    );

    // Main layout: [header] [content] [footer]
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(area);

    render_header(frame, main_chunks[0], app, &colors);
    render_content(frame, main_chunks[1], app, &colors);
    render_footer(frame, main_chunks[2], app, &colors);

    if app.show_help {
        render_help(frame, area, &colors);
    }

    if app.random_prompt {
        render_random_prompt(frame, area, &colors);
    }

    if let Some(input) = &app.input {
        render_input(frame, area, &input.label, &input.value, &colors);
    }

    if let Some(error) = &app.error_message {
        render_error(frame, area, error);
    }
}

/// Render the header bar: back affordance and the current view title.
fn render_header(frame: &mut Frame, area: Rect, app: &App, colors: &Palette) {
    let mut spans = Vec::new();
    if app.chrome.back_visible {
        spans.push(Span::styled("← back  ", Style::default().fg(colors.dim)));
    }
    let title = if app.chrome.title.is_empty() {
        "Pelsall Songs and Sermons"
    } else {
        app.chrome.title.as_str()
    };
    spans.push(Span::styled(
        title,
        Style::default()
            .fg(colors.fg)
            .add_modifier(Modifier::BOLD),
    ));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(header, area);
}

/// Render the routed content for the current route state.
fn render_content(frame: &mut Frame, area: Rect, app: &mut App, colors: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.dim));

    let lines: Vec<Line> = match app.router.state() {
        RouteState::Idle => vec![Line::from("")],
        RouteState::Loading { .. } => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading...",
                Style::default().fg(colors.dim),
            )),
        ],
        RouteState::NotFound { fragment } => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  404 - Page Not Found",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  No view is registered for {:?}.", fragment),
                Style::default().fg(colors.dim),
            )),
            Line::from(Span::styled(
                "  Press Esc to go back.",
                Style::default().fg(colors.dim),
            )),
        ],
        RouteState::Failed { message, .. } => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Something went wrong loading this page.",
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::styled(
                format!("  {}", message),
                Style::default().fg(colors.dim),
            )),
            Line::from(Span::styled(
                "  Press R to retry or Esc to go back.",
                Style::default().fg(colors.dim),
            )),
        ],
        RouteState::Rendered { markup, .. } => {
            let mut lines = Vec::with_capacity(markup.nodes.len());
            let mut link_index = 0usize;
            for node in &markup.nodes {
                let line = match node {
                    Node::Heading(text) => Line::from(Span::styled(
                        format!(" {}", text),
                        Style::default()
                            .fg(colors.accent)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Node::Text(text) => Line::from(Span::styled(
                        format!(" {}", text),
                        Style::default().fg(colors.fg),
                    )),
                    Node::Blank => Line::from(""),
                    Node::Notice(text) => Line::from(Span::styled(
                        format!(" {}", text),
                        Style::default().fg(Color::Yellow),
                    )),
                    Node::Link(link) => {
                        let selected = link_index == app.selected_link;
                        link_index += 1;
                        let marker = if selected { " ❯ " } else { "   " };
                        let style = if selected {
                            Style::default()
                                .fg(Color::Black)
                                .bg(colors.accent)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(colors.fg)
                        };
                        Line::from(vec![
                            Span::styled(marker, Style::default().fg(colors.accent)),
                            Span::styled(&link.label, style),
                            Span::styled(
                                match &link.target {
                                    Target::External(_) => "  ↗",
                                    _ => "",
                                },
                                Style::default().fg(colors.dim),
                            ),
                        ])
                    }
                };
                lines.push(line);
            }

            // Keep the selected link on screen.
            let viewport = area.height.saturating_sub(2) as usize;
            if let Some(selected_row) = markup.node_index_of_link(app.selected_link) {
                let scroll = app.scroll as usize;
                if selected_row < scroll {
                    app.scroll = selected_row as u16;
                } else if viewport > 0 && selected_row >= scroll + viewport {
                    app.scroll = (selected_row + 1 - viewport) as u16;
                }
            }

            lines
        }
    };

    let paragraph = Paragraph::new(lines).block(block).scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Render the footer: playback bar, view key bindings, and status line.
fn render_footer(frame: &mut Frame, area: Rect, app: &App, colors: &Palette) {
    let mut lines = Vec::new();

    // Playback bar, when a sermon is loaded.
    if let Some(title) = &app.playing_title {
        let symbol = match app.player_state {
            PlayerState::Playing => "▶",
            PlayerState::Paused => "⏸",
            PlayerState::Stopped => "⏹",
        };
        let time = if app.duration > 0 {
            format!(
                "{} / {}",
                format_time(app.position),
                format_time(app.duration)
            )
        } else {
            format_time(app.position)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {}", symbol, title),
                Style::default().fg(colors.accent),
            ),
            Span::styled(format!("  {}", time), Style::default().fg(colors.dim)),
        ]));
    } else {
        lines.push(Line::from(""));
    }

    // Key bindings: globals first, then what the view contributed.
    let mut bindings = vec![
        Span::styled("↑/↓", Style::default().fg(colors.accent)),
        Span::styled(" move  ", Style::default().fg(colors.dim)),
        Span::styled("⏎", Style::default().fg(colors.accent)),
        Span::styled(" open  ", Style::default().fg(colors.dim)),
    ];
    if app.chrome.back_visible {
        bindings.push(Span::styled("esc", Style::default().fg(colors.accent)));
        bindings.push(Span::styled(" back  ", Style::default().fg(colors.dim)));
    }
    for bind in &app.chrome.bindings {
        bindings.push(Span::styled(
            bind.key.to_string(),
            Style::default().fg(colors.accent),
        ));
        bindings.push(Span::styled(
            format!(" {}  ", bind.label.to_lowercase()),
            Style::default().fg(colors.dim),
        ));
    }
    bindings.push(Span::styled("?", Style::default().fg(colors.accent)));
    bindings.push(Span::styled(" help", Style::default().fg(colors.dim)));
    lines.push(Line::from(bindings));

    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let footer = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(colors.dim)),
    );
    frame.render_widget(footer, area);
}

fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render the help overlay.
fn render_help(frame: &mut Frame, area: Rect, colors: &Palette) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Navigation", section)),
        Line::from("  j/k or ↑/↓    Move between links"),
        Line::from("  Enter         Open the selected link"),
        Line::from("  Esc/Backspace Go back"),
        Line::from("  h             Go home"),
        Line::from("  R             Reload the current page"),
        Line::from(""),
        Line::from(Span::styled("Playback", section)),
        Line::from("  Space         Play/Pause"),
        Line::from("  S             Stop"),
        Line::from("  ,/.           Seek backward/forward (10s)"),
        Line::from("  +/-           Volume up/down"),
        Line::from(""),
        Line::from(Span::styled("Other", section)),
        Line::from("  Letter keys   View actions shown in the footer"),
        Line::from("  x             Clear error message"),
        Line::from("  ?             Show this help"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(colors.dim),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(colors.accent));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render the random play count prompt.
fn render_random_prompt(frame: &mut Frame, area: Rect, colors: &Palette) {
    let popup_area = centered_rect(40, 25, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  How many songs do you want to play?",
            Style::default().fg(colors.fg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1", Style::default().fg(colors.accent)),
            Span::styled(" 5 songs   ", Style::default().fg(colors.dim)),
            Span::styled("2", Style::default().fg(colors.accent)),
            Span::styled(" 10 songs   ", Style::default().fg(colors.dim)),
            Span::styled("3", Style::default().fg(colors.accent)),
            Span::styled(" 15 songs   ", Style::default().fg(colors.dim)),
            Span::styled("4", Style::default().fg(colors.accent)),
            Span::styled(" 20 songs", Style::default().fg(colors.dim)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Esc to cancel",
            Style::default().fg(colors.dim),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Random Play")
        .border_style(Style::default().fg(colors.accent));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Render the text input overlay.
fn render_input(frame: &mut Frame, area: Rect, label: &str, value: &str, colors: &Palette) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(colors.accent)),
            Span::styled(value, Style::default().fg(colors.fg)),
            Span::styled("█", Style::default().fg(colors.accent)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter to confirm, Esc to cancel",
            Style::default().fg(colors.dim),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(label.to_string())
        .border_style(Style::default().fg(colors.accent));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Render an error message overlay.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
