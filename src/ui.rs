use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::App;

const TAGLINE: &str = "India's First AI Assistant";
const POWERED_BY: &str = "Powered by WebTech Infinity";

/// Parse a line of text, styling `**bold**` and `*italic*` spans.
/// Unclosed markers are kept as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find('*') {
        let (marker, modifier) = if rest[start..].starts_with("**") {
            ("**", Modifier::BOLD)
        } else {
            ("*", Modifier::ITALIC)
        };
        let after = &rest[start + marker.len()..];

        match after.find(marker) {
            Some(end) if end > 0 => {
                plain.push_str(&rest[..start]);
                if !plain.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut plain)));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(modifier),
                ));
                rest = &after[end + marker.len()..];
            }
            _ => {
                plain.push_str(&rest[..start + marker.len()]);
                rest = after;
            }
        }
    }
    plain.push_str(rest);

    if !plain.is_empty() {
        spans.push(Span::raw(plain));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", app.title), Style::default().fg(Color::Cyan).bold()),
        Span::styled(TAGLINE, Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(app.model.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let bot_label = format!("{}:", app.title);
    let mut lines: Vec<Line> = Vec::new();

    for turn in app.snapshot.transcript.turns() {
        if turn.is_bot {
            lines.push(Line::from(Span::styled(
                bot_label.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            for line in turn.text.lines() {
                lines.push(parse_markdown_line(line));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(turn.text.clone()));
        }
        lines.push(Line::default());
    }

    if app.is_awaiting() {
        lines.push(Line::from(Span::styled(
            bot_label,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    // Count lines with the same wrapping the pane renders with (inner size minus borders)
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    let wrapped_lines = chat.line_count(area.width.saturating_sub(2));
    app.update_chat_layout(
        wrapped_lines.min(u16::MAX as usize) as u16,
        area.height.saturating_sub(2),
    );

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let awaiting = app.is_awaiting();
    let border_color = if awaiting { Color::DarkGray } else { Color::Yellow };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ");

    if awaiting || app.input.is_empty() {
        let placeholder = if awaiting { "AI is thinking..." } else { "Type your message..." };
        let input = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(input_block);
        frame.render_widget(input, area);

        if !awaiting {
            frame.set_cursor_position((area.x + 1, area.y + 1));
        }
        return;
    }

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else {
        app.cursor.saturating_sub(inner_width.saturating_sub(1))
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    let cursor_x = (app.cursor - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.is_awaiting() {
        (" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(
            " Enter send | PgUp/PgDn scroll | Esc quit ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(POWERED_BY, Style::default().fg(Color::Green)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}
