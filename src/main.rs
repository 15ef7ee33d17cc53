use std::io::{stdout, Stdout};

use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use folio::app::{App, Outcome};
use folio::config::{BackendKind, Config};
use folio::shell::{Command, HELP};
use folio::state::backend::{Backend, JsonFileBackend, MemoryBackend};
use folio::state::catalog::SqliteBackend;
use folio::state::library::RecordStore;
use folio::state::seed::JsonSeedFile;
use folio::state::session::{Session, SessionFile, StaticAuthenticator};
use folio::ui::surface::TextSurface;

type Folio = App<Box<dyn Backend>, StaticAuthenticator, TextSurface<Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load();

    let mut app = build_app(&config);
    app.start(&JsonSeedFile::new(&config.seed_path));

    let _watch = app.subscribe(|records| {
        debug!(count = records.len(), "project collection changed");
    });

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("❌ Failed to read input: {e}");
                break;
            }
        };

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Show) => app.render(),
            Ok(Command::Tags) => println!("all {}", app.store().categories().join(" ")),
            Ok(Command::Send(message)) => match app.update(message) {
                Ok(outcome) => report(&outcome),
                Err(e) => println!("⚠️  {e}"),
            },
            Err(e) => println!("{e}"),
        }
    }

    println!("Bye.");
}

/// Open the configured backend, falling back to memory if it cannot be opened
fn build_app(config: &Config) -> Folio {
    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::Sqlite => match SqliteBackend::open(config.db_path()) {
            Ok(catalog) => Box::new(catalog),
            Err(e) => {
                warn!("⚠️  Catalog unavailable, keeping projects in memory: {e}");
                Box::new(MemoryBackend::new())
            }
        },
        BackendKind::Json => Box::new(JsonFileBackend::new(config.json_path())),
        BackendKind::Memory => Box::new(MemoryBackend::new()),
    };
    info!("Using {} backend", backend.name());

    let authenticator = StaticAuthenticator::new(config.admin.clone());
    let session = if config.persist_session {
        Session::persisted(authenticator, SessionFile::new(config.session_path()))
    } else {
        Session::new(authenticator)
    };

    App::new(
        RecordStore::new(backend),
        session,
        TextSurface::new(stdout()),
    )
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::LoggedIn => println!("✅ Logged in."),
        Outcome::LoggedOut => println!("Logged out."),
        Outcome::Created(record) => println!("✅ Project {} added.", record.id),
        Outcome::Updated(Some(record)) => println!("✅ Project {} updated.", record.id),
        Outcome::Updated(None) | Outcome::Deleted(false) => println!("No such project."),
        Outcome::Deleted(true) => println!("Project deleted."),
        Outcome::Cleared => println!("All projects deleted."),
        Outcome::FilterChanged | Outcome::Synced => {}
    }
}
