use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, AppMode, GenerationEvent};
use crate::api::GeminiClient;
use crate::core::{generate_frames, FormField, GenerationRequest};
use crate::output::{save_run, RunSettings};

/// Handle input while navigating the form
pub async fn handle_form_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let field = app.selected_field();

    match key.code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.select_next(),
        KeyCode::Home => app.selected = 0,
        KeyCode::End => app.selected = app.visible_fields().len() - 1,

        // Change enumerated values
        KeyCode::Left | KeyCode::Char('h') => cycle(app, field, false),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => cycle(app, field, true),

        // Edit text fields, cycle the rest
        KeyCode::Enter => {
            if field.options().is_some() {
                cycle(app, field, true);
            } else {
                app.edit_buffer = app.form.value(field);
                app.mode = AppMode::Editing;
                app.clear_messages();
            }
        }

        // Submit
        KeyCode::Char('g') => submit(app).await?,

        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        _ => {}
    }
    Ok(())
}

/// Handle input while typing into a text field
pub fn handle_edit_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::Form;
            app.edit_buffer.clear();
        }

        KeyCode::Enter => {
            let field = app.selected_field();
            let value = std::mem::take(&mut app.edit_buffer);
            match app.form.set(field, &value) {
                Ok(()) => app.set_status(format!("Updated {}", field.label().trim())),
                Err(e) => app.set_error(e.to_string()),
            }
            app.mode = AppMode::Form;
        }

        KeyCode::Char(c) => app.edit_buffer.push(c),

        KeyCode::Backspace => {
            app.edit_buffer.pop();
        }

        _ => {}
    }
    Ok(())
}

fn cycle(app: &mut App, field: FormField, forward: bool) {
    if let Err(e) = app.form.cycle(field, forward) {
        app.set_error(e.to_string());
        return;
    }
    // Frame count appears and disappears with the output type
    app.reselect(field);
}

/// Validate the form and start a generation in the background
pub async fn submit(app: &mut App) -> Result<()> {
    if app.session.is_generating() {
        app.set_status("A generation is already running");
        return Ok(());
    }

    let request = match app.form.submit().await {
        Ok(request) => request,
        Err(e) => {
            app.session.fail(e.to_string());
            app.set_error(e.to_string());
            return Ok(());
        }
    };

    let client = match GeminiClient::from_config(&app.config) {
        Ok(client) => client,
        Err(e) => {
            app.session.fail(e.to_string());
            app.set_error(e.to_string());
            return Ok(());
        }
    };

    app.saved = None;
    if let Some(preview) = &mut app.preview {
        preview.clear();
    }
    app.session.begin(request.total_frames(), request.output_kind);
    app.set_status(format!("Generating {} frame(s)...", request.total_frames()));

    let (tx, rx) = async_channel::unbounded();
    app.events = Some(rx);

    let save_to = app
        .config
        .output
        .auto_save
        .then(|| std::path::PathBuf::from(&app.config.output.directory));
    let interval = app.config.frame_interval();

    tokio::spawn(async move {
        let event = run_generation(client, request, &tx, save_to, interval).await;
        let _ = tx.send(event).await;
    });

    Ok(())
}

async fn run_generation(
    client: GeminiClient,
    request: GenerationRequest,
    tx: &async_channel::Sender<GenerationEvent>,
    save_to: Option<std::path::PathBuf>,
    interval: std::time::Duration,
) -> GenerationEvent {
    let outcome = generate_frames(&client, &request, |percent| {
        let _ = tx.try_send(GenerationEvent::Progress(percent));
    })
    .await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => return GenerationEvent::Failed(e.to_string()),
    };

    let Some(dir) = save_to else {
        return GenerationEvent::Finished {
            result,
            saved: None,
            save_error: None,
        };
    };

    let settings = RunSettings::from_request(&request, client.model());
    match save_run(&result, settings, &dir, interval).await {
        Ok(saved) => GenerationEvent::Finished {
            result,
            saved: Some(saved),
            save_error: None,
        },
        Err(e) => {
            tracing::warn!("Failed to save frames: {:#}", e);
            GenerationEvent::Finished {
                result,
                saved: None,
                save_error: Some(e.to_string()),
            }
        }
    }
}
