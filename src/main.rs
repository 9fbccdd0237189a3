mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel};
use crate::cli::CliInvocation;
use crate::domain::{CatalogMetadata, CatalogSnapshot};
use crate::infra::{ApiClient, LogTarget, init_logging, resolve_api_config};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::mpsc::{Sender, channel};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Config(#[from] crate::infra::ConfigError),

    #[error(transparent)]
    Logging(#[from] crate::infra::LoggingError),
}

/// Outcome of one background catalog load.
#[derive(Debug)]
enum LoadSignal {
    Loaded {
        records: CatalogSnapshot,
        metadata: Result<CatalogMetadata, String>,
    },
    Failed {
        message: String,
    },
}

impl LoadSignal {
    fn into_event(self) -> AppEvent {
        match self {
            Self::Loaded { records, metadata } => AppEvent::CatalogLoaded { records, metadata },
            Self::Failed { message } => AppEvent::CatalogFailed { message },
        }
    }
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(
                out,
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
        CliInvocation::Tui { overrides } => {
            let config = resolve_api_config(&overrides)?;
            if let LogTarget::File { path, filter } = init_logging()? {
                tracing::info!(path = %path.display(), filter = %filter, "logging enabled");
            }
            tracing::info!(
                api_url = %config.base_url,
                timeout_secs = config.timeout.as_secs(),
                version = env!("CARGO_PKG_VERSION"),
                "starting"
            );
            Ok(run_tui(ApiClient::new(&config))?)
        }
    }
}

fn print_help() {
    let text = crate::cli::help_text(env!("CARGO_PKG_NAME"));
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(client: ApiClient) -> Result<(), crate::app::AppError> {
    let mut model = AppModel::new();
    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    let result = run(&mut terminal, &mut model, &client);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableMouseCapture);
    let keyboard_flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    let _ = stdout.execute(PushKeyboardEnhancementFlags(keyboard_flags));
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    let _ = execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        PopKeyboardEnhancementFlags
    );
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    client: &ApiClient,
) -> Result<(), app::AppError> {
    let (load_tx, load_rx) = channel::<LoadSignal>();
    if handle_command(model.init(), client, &load_tx) {
        return Ok(());
    }

    loop {
        while let Ok(signal) = load_rx.try_recv() {
            let (next, command) = app::update(model.clone(), signal.into_event());
            *model = next;
            if handle_command(command, client, &load_tx) {
                return Ok(());
            }
        }

        ui::clamp_scroll_state(model);
        terminal.draw(|frame| ui::render(frame, model))?;

        if event::poll(Duration::from_millis(200))? {
            let app_event = match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    AppEvent::Key(key)
                }
                Event::Mouse(mouse) => AppEvent::Mouse(mouse),
                Event::Resize(width, height) => AppEvent::Resize { width, height },
                _ => continue,
            };
            let (next, command) = app::update(model.clone(), app_event);
            *model = next;
            if handle_command(command, client, &load_tx) {
                return Ok(());
            }
        }
    }
}

/// Runs the side effect behind `command`; returns true when the app should exit.
fn handle_command(command: AppCommand, client: &ApiClient, load_tx: &Sender<LoadSignal>) -> bool {
    match command {
        AppCommand::None => false,
        AppCommand::Quit => {
            tracing::info!("quit");
            true
        }
        AppCommand::LoadCatalog => {
            spawn_catalog_load(client.clone(), load_tx.clone());
            false
        }
    }
}

fn spawn_catalog_load(client: ApiClient, tx: Sender<LoadSignal>) {
    std::thread::spawn(move || {
        let _ = tx.send(load_catalog(&client));
    });
}

/// Fetches the catalog and then its metadata. A metadata failure still
/// yields a loaded catalog.
fn load_catalog(client: &ApiClient) -> LoadSignal {
    tracing::info!(api_url = client.base_url(), "loading catalog");
    let records = match client.fetch_all_modules() {
        Ok(records) => records,
        Err(error) => {
            return LoadSignal::Failed {
                message: error.to_string(),
            };
        }
    };

    let metadata = client.fetch_metadata().map_err(|error| {
        tracing::warn!(error = %error, "metadata fetch failed");
        error.to_string()
    });
    LoadSignal::Loaded { records, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ApiConfig;
    use crate::infra::stub_server::{StubResponse, StubServer};

    fn client_for(server: &StubServer) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.base_url(),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn load_catalog_tolerates_missing_metadata() {
        let server = StubServer::start(|path| match path {
            "/api/metadata.json" => StubResponse::status(404),
            "/api/modules.json" => {
                StubResponse::json(r#"{"modules":[{"certificate_number":"1","module_name":"One"}]}"#)
            }
            _ => StubResponse::json(r#"{"modules":[]}"#),
        });

        let (records, metadata) = match load_catalog(&client_for(&server)) {
            LoadSignal::Loaded { records, metadata } => (records, metadata),
            other => panic!("expected a loaded catalog, got {other:?}"),
        };
        assert_eq!(records.len(), 1);
        assert_eq!(
            metadata.expect_err("metadata should fail"),
            "API returned status 404 for metadata"
        );
    }

    #[test]
    fn load_catalog_reports_collection_failure() {
        let server = StubServer::start(|path| match path {
            "/api/modules-in-process.json" => StubResponse::status(500),
            _ => StubResponse::json(r#"{"modules":[]}"#),
        });

        let message = match load_catalog(&client_for(&server)) {
            LoadSignal::Failed { message } => message,
            other => panic!("expected a failure, got {other:?}"),
        };
        assert!(message.starts_with("fetching in-process modules"));
    }

    #[test]
    fn spawned_load_sends_exactly_one_signal() {
        let server = StubServer::start(|_| StubResponse::json(r#"{"modules":[]}"#));
        let (tx, rx) = channel::<LoadSignal>();
        spawn_catalog_load(client_for(&server), tx);

        let signal = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("load signal");
        assert!(matches!(signal, LoadSignal::Loaded { .. }));
        // The worker drops its sender after the single send.
        assert!(rx.recv_timeout(Duration::from_secs(10)).is_err());

        let (model, _) = app::update(AppModel::new(), signal.into_event());
        assert_eq!(model.phase, app::Phase::Ready);
    }
}
