use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode};
use crate::core::{FormField, SessionState};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(12),   // Form + result
            Constraint::Length(3), // Status bar
            Constraint::Length(1), // Help line
        ])
        .split(frame.area());

    draw_title(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_form(frame, app, body[0]);
    draw_result(frame, app, body[1]);
    draw_status(frame, app, chunks[2]);
    draw_help(frame, app, chunks[3]);
}

fn accent(app: &App) -> Color {
    if app.config.tui.theme == "light" {
        Color::Blue
    } else {
        Color::Magenta
    }
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "3D Mockup Generator",
            Style::default().fg(accent(app)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " - turn a 2D product photo into a 3D or 360° view",
            Style::default().fg(Color::Gray),
        ),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent(app))),
    );
    frame.render_widget(title, area);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_field();

    let items: Vec<ListItem> = app
        .visible_fields()
        .into_iter()
        .map(|field| {
            let is_selected = field == selected;
            let value = if is_selected && app.mode == AppMode::Editing {
                format!("{}▏", app.edit_buffer)
            } else {
                display_value(app, field)
            };
            let hint = if field.options().is_some() { " [←→]" } else { "" };

            let label_style = if is_selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let value_style = if is_selected && app.mode == AppMode::Editing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };

            ListItem::new(vec![
                Line::from(Span::styled(field.label(), label_style)),
                Line::from(Span::styled(format!("      {}{}", value, hint), value_style)),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Generation Settings"),
    );
    frame.render_widget(list, area);
}

fn display_value(app: &App, field: FormField) -> String {
    let value = app.form.value(field);
    match field {
        FormField::ProductImage if value.is_empty() => "(none - press Enter to choose a file path)".to_string(),
        FormField::Watermark if value.is_empty() => "(e.g. YourShop.com)".to_string(),
        FormField::OutputKind => app.form.output_kind.display_name().to_string(),
        FormField::FrameCount => format!("{} frames", value),
        FormField::Reflections => (if app.form.reflections { "on" } else { "off" }).to_string(),
        _ => value,
    }
}

fn draw_result(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Result");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if matches!(app.session.state(), SessionState::Succeeded(_)) {
        draw_success(frame, app, inner);
        return;
    }

    match app.session.state() {
        SessionState::Idle => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Your 3D visualization will appear here",
                    Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Fill in the settings, choose your product image and press g to generate.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            frame.render_widget(
                Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }),
                inner,
            );
        }
        SessionState::Generating { .. } => draw_progress(frame, app, inner),
        SessionState::Failed(message) => {
            let text = vec![
                Line::from(Span::styled(
                    "Generation Error",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Red))),
            ];
            frame.render_widget(
                Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }),
                inner,
            );
        }
        SessionState::Succeeded(_) => {}
    }
}

/// Current frame as an image when a preview is available, with its details underneath
fn draw_success(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(index) = app.session.current_frame().map(|f| f.index as usize) else {
        return;
    };
    let lines = success_lines(app);

    let show_image = app.preview.as_ref().is_some_and(|p| p.has_frame(index));
    if !show_image {
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(lines.len() as u16)])
        .split(area);

    if let Some(preview) = app.preview.as_mut() {
        preview.render(frame, index, chunks[0]);
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        chunks[1],
    );
}

fn success_lines(app: &App) -> Vec<Line<'static>> {
    let (Some(current), SessionState::Succeeded(result)) = (app.session.current_frame(), app.session.state())
    else {
        return Vec::new();
    };

    // Spinning indicator that follows the frame angle
    let dial = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"][((current.angle + 22) % 360 / 45) as usize];
    let headline = if app.session.is_cycling() {
        format!("{} {}", dial, result.kind().display_name())
    } else {
        result.kind().display_name().to_string()
    };

    let mut lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(accent(app)).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Frame {} of {}  ·  {}°",
            current.index + 1,
            result.len(),
            current.angle
        )),
        Line::from(Span::styled(
            format!("{} · {} KB", current.media_type, current.data.len() * 3 / 4 / 1024),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if let Some(saved) = &app.saved {
        if let Some(path) = saved.frames.get(current.index as usize) {
            lines.push(Line::from(Span::styled(
                path.display().to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
        if let Some(animation) = &saved.animation {
            lines.push(Line::from(Span::styled(
                format!("Animation: {}", animation.display()),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    lines
}

fn draw_progress(frame: &mut Frame, app: &App, area: Rect) {
    let Some((percent, headline, phase)) = app.session.progress_view() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3), // Gauge
            Constraint::Length(1), // Headline
            Constraint::Length(1), // Phase message
            Constraint::Min(1),
        ])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(accent(app)).bg(Color::DarkGray))
        .percent(u16::from(percent))
        .label(format!("{}%", percent));
    frame.render_widget(gauge, chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(headline, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)))
            .alignment(Alignment::Center),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(phase, Style::default().fg(Color::Gray))).alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (message, style) = if let Some(err) = &app.error_message {
        (err.as_str(), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status_message {
        (status.as_str(), Style::default().fg(Color::Green))
    } else if app.session.is_generating() {
        ("Generating...", Style::default().fg(Color::Yellow))
    } else {
        ("Ready", Style::default().fg(Color::Gray))
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        AppMode::Editing => "Enter: Save | Esc: Cancel",
        AppMode::Form => "↑↓: Navigate | ←→/Space: Change | Enter: Edit | g: Generate | q: Quit",
    };

    let help = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{GenerationResult, OutputKind};
    use crate::tui::app::GenerationEvent;
    use crate::tui::preview::{tests::png_frame, FramePreview};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn finish(app: &mut App, kind: OutputKind, frames: u32) {
        let (tx, rx) = async_channel::unbounded();
        app.events = Some(rx);
        app.session.begin(frames, kind);
        let frames = (0..frames).map(|i| png_frame(i, i * 360 / frames)).collect();
        tx.try_send(GenerationEvent::Finished {
            result: GenerationResult::new(kind, frames),
            saved: None,
            save_error: None,
        })
        .unwrap();
        app.drain_events();
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn idle_screen_shows_the_form() {
        let mut app = App::new(Config::default());
        let screen = render(&mut app);
        assert!(screen.contains("Generation Settings"));
        assert!(screen.contains("Rotation Frames"));
        assert!(screen.contains("appear here"));
    }

    #[test]
    fn progress_shows_frame_count_and_percent() {
        let mut app = App::new(Config::default());
        app.session.begin(12, OutputKind::Video);
        app.session.set_progress(25);

        let screen = render(&mut app);
        assert!(screen.contains("25%"));
        assert!(screen.contains("Generating frame 3 of 12..."));
    }

    #[test]
    fn failure_replaces_progress_with_error_panel() {
        let mut app = App::new(Config::default());
        app.session.begin(1, OutputKind::Static);
        app.session.fail("Generation blocked by the service: SAFETY");

        let screen = render(&mut app);
        assert!(screen.contains("Generation Error"));
        assert!(!screen.contains("Generating 3D image"));
    }

    #[test]
    fn success_draws_the_frame_image() {
        let mut app = App::new(Config::default()).with_preview(FramePreview::halfblocks());
        finish(&mut app, OutputKind::Static, 1);

        let screen = render(&mut app);
        assert!(screen.contains("3D Static Image"));
        assert!(screen.contains("Frame 1 of 1"));
        assert!(screen.contains('▀'));
    }

    #[test]
    fn animated_success_cycles_through_frames() {
        let mut app = App::new(Config::default()).with_preview(FramePreview::halfblocks());
        finish(&mut app, OutputKind::Video, 2);

        assert!(render(&mut app).contains("Frame 1 of 2"));

        let t0 = Instant::now();
        app.tick(t0);
        assert!(app.tick(t0 + Duration::from_millis(100)));
        let screen = render(&mut app);
        assert!(screen.contains("Frame 2 of 2"));
        assert!(screen.contains("180°"));
    }

    #[test]
    fn success_without_preview_shows_details_only() {
        let mut app = App::new(Config::default());
        finish(&mut app, OutputKind::LoopingImage, 2);

        let screen = render(&mut app);
        assert!(screen.contains("Frame 1 of 2"));
        assert!(!screen.contains('▀'));
    }
}
