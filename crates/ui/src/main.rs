use std::process::ExitCode;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use zova::app::{ChatShell, HELP_TEXT};
use zova::chat::{ConversationView, TerminalView};
use zova::settings::ClientSettings;
use zova_llm::GenerationBackend;

/// Application entry point.
///
/// Resolves the backend address once, then runs the terminal chat loop on a
/// single-threaded runtime until `/quit` or end of input.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with the conversation on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let settings = ClientSettings::load();
    let config = match settings.backend_config() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("invalid settings: {error}");
            eprintln!("zova: {error}");
            return ExitCode::FAILURE;
        }
    };

    let backend = match zova_llm::create_backend(config) {
        Ok(backend) => backend,
        Err(error) => {
            tracing::error!("failed to initialize backend client: {error}");
            eprintln!("zova: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut view = TerminalView::stdout();
    view.show_notice(&format!("connected to {}", backend.base_url()));
    view.show_notice(HELP_TEXT);

    let mut shell = ChatShell::new(backend, view);
    shell.run(BufReader::new(tokio::io::stdin())).await;

    ExitCode::SUCCESS
}
