use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use editcore::{Command, Selection};
use mdcore::{LineKind, PreviewLine, SpanStyle};

use crate::app::App;
use crate::keymap::BINDINGS;
use crate::status_manager::Severity;
use crate::storage::Theme;
use crate::text_width;
use crate::ui_state::Mode;

#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Style,
    muted: Style,
    accent: Style,
    selection: Style,
    code: Style,
    bar: Style,
    border: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                text: Style::default().fg(Color::Black).bg(Color::White),
                muted: Style::default().fg(Color::DarkGray).bg(Color::White),
                accent: Style::default().fg(Color::Blue).bg(Color::White),
                selection: Style::default().fg(Color::White).bg(Color::Blue),
                code: Style::default().fg(Color::Magenta).bg(Color::Rgb(241, 245, 249)),
                bar: Style::default().fg(Color::Black).bg(Color::Rgb(226, 232, 240)),
                border: Style::default().fg(Color::Gray).bg(Color::White),
            },
            // Slate tones.
            Theme::Dark => {
                let bg = Color::Rgb(15, 23, 42);
                Self {
                    text: Style::default().fg(Color::Rgb(226, 232, 240)).bg(bg),
                    muted: Style::default().fg(Color::Rgb(148, 163, 184)).bg(bg),
                    accent: Style::default().fg(Color::Rgb(56, 189, 248)).bg(bg),
                    selection: Style::default()
                        .fg(Color::Rgb(15, 23, 42))
                        .bg(Color::Rgb(125, 211, 252)),
                    code: Style::default()
                        .fg(Color::Rgb(244, 114, 182))
                        .bg(Color::Rgb(30, 41, 59)),
                    bar: Style::default()
                        .fg(Color::Rgb(226, 232, 240))
                        .bg(Color::Rgb(51, 65, 85)),
                    border: Style::default().fg(Color::Rgb(71, 85, 105)).bg(bg),
                }
            }
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let palette = Palette::for_theme(app.theme);
    f.render_widget(Block::default().style(palette.text), f.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    draw_header(f, app, chunks[0], &palette);

    if app.show_preview {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        draw_editor(f, app, panes[0], &palette);
        draw_preview(f, app, panes[1], &palette);
    } else {
        draw_editor(f, app, chunks[1], &palette);
    }

    draw_status_bar(f, app, chunks[2], &palette);

    if app.ui_state.is_help_shown() {
        draw_help(f, f.size(), &palette);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let theme = if app.theme.is_dark() { "☾ dark" } else { "☀ light" };
    let unsaved = if app.unsaved { " [+]" } else { "" };

    let title = Line::from(vec![
        Span::styled(" Marknote", palette.bar.add_modifier(Modifier::BOLD)),
        Span::styled(unsaved, palette.bar),
    ]);
    f.render_widget(Paragraph::new(title).style(palette.bar), area);
    f.render_widget(
        Paragraph::new(format!("{} ", theme))
            .style(palette.bar)
            .alignment(Alignment::Right),
        area,
    );
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border)
        .title(" Editor ")
        .style(palette.text);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = inner.height as usize;
    let cols = inner.width as usize;
    app.ensure_caret_visible(rows, cols);
    let app: &App = app;

    let selection = app.editor.selection();
    let buffer = app.editor.buffer();
    let last_row = (app.scroll_row + rows).min(buffer.len_lines());
    let lines: Vec<Line> = (app.scroll_row..last_row)
        .map(|row| editor_line(app, row, selection, palette))
        .collect();
    f.render_widget(Paragraph::new(lines).style(palette.text), inner);

    if app.ui_state.mode() == Mode::Edit {
        let (row, col) = text_width::caret_cell(app.editor.buffer(), app.editor.head());
        let x = inner.x + col.saturating_sub(app.scroll_col) as u16;
        let y = inner.y + row.saturating_sub(app.scroll_row) as u16;
        f.set_cursor(x, y);
    }
}

/// One buffer line with the selected part highlighted, scrolled horizontally.
fn editor_line(app: &App, row: usize, selection: Selection, palette: &Palette) -> Line<'static> {
    let buffer = app.editor.buffer();
    let start = buffer.line_to_char(row);
    let len = buffer.line_len(row);
    let selected_range = selection.range();

    let mut runs: Vec<(String, bool)> = Vec::new();
    for (i, c) in buffer.slice(start..start + len).chars().enumerate() {
        let selected = selected_range.contains(&(start + i));
        match runs.last_mut() {
            Some((text, s)) if *s == selected => text.push(c),
            _ => runs.push((c.to_string(), selected)),
        }
    }
    // Show a selected line break as one highlighted cell.
    if selected_range.contains(&(start + len)) && start + len < buffer.len_chars() {
        runs.push((" ".to_string(), true));
    }

    let mut skip = app.scroll_col;
    let spans: Vec<Span> = runs
        .into_iter()
        .filter_map(|(text, selected)| {
            let text = if skip > 0 {
                let width = text_width::str_width(&text);
                if width <= skip {
                    skip -= width;
                    return None;
                }
                let rest = text_width::skip_cells(&text, skip);
                skip = 0;
                rest
            } else {
                text
            };
            let style = if selected {
                palette.selection
            } else {
                palette.text
            };
            Some(Span::styled(text_width::expand_tabs(&text), style))
        })
        .collect();

    Line::from(spans)
}

fn draw_preview(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border)
        .title(" Preview ")
        .style(palette.text);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let lines: Vec<Line> = app
        .preview_lines()
        .iter()
        .map(|line| preview_line(line, width, palette))
        .collect();

    f.render_widget(
        Paragraph::new(lines)
            .style(palette.text)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn preview_line(line: &PreviewLine, width: usize, palette: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    if line.quote_depth > 0 {
        spans.push(Span::styled("▎ ".repeat(line.quote_depth), palette.muted));
    }
    if line.indent > 0 {
        spans.push(Span::raw("  ".repeat(line.indent)));
    }

    let base = match line.kind {
        LineKind::Heading(1) => palette
            .accent
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineKind::Heading(_) => palette.accent.add_modifier(Modifier::BOLD),
        LineKind::CodeBlock => palette.code,
        LineKind::Html | LineKind::Footnote => palette.muted,
        LineKind::TableRow { header: true } => palette.text.add_modifier(Modifier::BOLD),
        LineKind::Rule => {
            spans.push(Span::styled("─".repeat(width.max(1)), palette.muted));
            return Line::from(spans);
        }
        _ => palette.text,
    };

    for span in &line.spans {
        spans.push(Span::styled(
            span.text.clone(),
            inline_style(base, span.style, palette),
        ));
    }
    Line::from(spans)
}

fn inline_style(base: Style, style: SpanStyle, palette: &Palette) -> Style {
    let mut out = base;
    if style.code {
        out = out.patch(palette.code);
    }
    if style.link {
        out = out.patch(palette.accent).add_modifier(Modifier::UNDERLINED);
    }
    if style.marker {
        out = out.patch(palette.muted);
    }
    if style.strong {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.emphasis {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.strikethrough {
        out = out.add_modifier(Modifier::CROSSED_OUT);
    }
    if style.superscript {
        out = out.add_modifier(Modifier::DIM);
    }
    out
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (row, col) = text_width::caret_cell(app.editor.buffer(), app.editor.head());
    let position = format!("Ln {}, Col {} ", row + 1, col + 1);

    let left = match app.ui_state.mode() {
        Mode::Command => {
            let line = format!(":{}", app.ui_state.command_buffer());
            let x = area.x + text_width::str_width(&line) as u16;
            f.set_cursor(x.min(area.right().saturating_sub(1)), area.y);
            Line::from(Span::styled(line, palette.bar))
        }
        _ => match app.ui_state.status.current() {
            Some(message) => Line::from(Span::styled(
                format!(" {}", message.content),
                palette.bar.fg(severity_color(message.severity)),
            )),
            None => {
                let saved = app
                    .storage
                    .saved_at()
                    .map(|at| {
                        format!(
                            " saved {}",
                            at.with_timezone(&chrono::Local).format("%H:%M:%S")
                        )
                    })
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(" F1 help  Ctrl+P commands  Ctrl+Q quit", palette.bar),
                    Span::styled(saved, palette.bar.add_modifier(Modifier::DIM)),
                ])
            }
        },
    };

    f.render_widget(Paragraph::new(left).style(palette.bar), area);
    if app.ui_state.mode() != Mode::Command {
        f.render_widget(
            Paragraph::new(position)
                .style(palette.bar)
                .alignment(Alignment::Right),
            area,
        );
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

fn draw_help(f: &mut Frame, area: Rect, palette: &Palette) {
    let popup = centered_rect(70, 80, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Keys",
            palette.accent.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (keys, what) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<24}", keys), palette.accent),
            Span::styled(*what, palette.text),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Commands (Ctrl+P, or Esc then :)",
        palette.accent.add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    for command in Command::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<24}", command.name()), palette.accent),
            Span::styled(command.label(), palette.text),
        ]));
    }
    for (name, what) in [
        ("theme", "Toggle light/dark theme"),
        ("export <file>", "Write the document as HTML"),
        ("import <file>", "Replace the document with a file"),
        ("help", "Show this help"),
        ("q", "Quit"),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<24}", name), palette.accent),
            Span::styled(what, palette.text),
        ]));
    }

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border)
                .title(" Help (any key to close) "),
        )
        .style(palette.text)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(help, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::Storage;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_draws_editor_and_preview() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with_parts(Config::default(), Storage::at(dir.path().join("store.json")))
            .await
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let screen = screen_text(&terminal);

        assert!(screen.contains("Marknote"));
        assert!(screen.contains("# Welcome"));
        assert!(screen.contains("Preview"));
        assert!(screen.contains("light"));
        assert!(screen.contains("Ln 3"));
    }

    #[tokio::test]
    async fn test_help_overlay_lists_commands() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with_parts(Config::default(), Storage::at(dir.path().join("store.json")))
            .await
            .unwrap();
        app.ui_state.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(120, 80)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let screen = screen_text(&terminal);

        assert!(screen.contains("footnote"));
        assert!(screen.contains("Ctrl+Z"));
    }

    #[test]
    fn test_preview_line_styles() {
        let palette = Palette::for_theme(Theme::Dark);
        let lines = mdcore::preview("## Title\n\n---\n");
        let heading = preview_line(&lines[0], 10, &palette);
        assert!(heading.spans[0].style.add_modifier.contains(Modifier::BOLD));

        let rule = preview_line(&lines[2], 10, &palette);
        assert_eq!(rule.spans[0].content, "─".repeat(10));
    }
}
