//! Project catalog core of a personal portfolio site.
//!
//! # Layout
//! - [`state::library::RecordStore`] owns the project collection and persists
//!   every change through a [`state::backend::Backend`] (SQLite catalog, JSON
//!   file, memory, or a collection shared between sessions).
//! - [`ui::projection::project`] derives what the project grid shows from the
//!   records, the current filter and the admin permission.
//! - [`app::App`] ties both to a [`state::session::Session`] and a
//!   [`ui::surface::Surface`], handling one [`app::Message`] at a time.
//!
//! # Flow
//! Message -> store / session / filter change -> projection recomputed ->
//! surface redrawn. Nothing is patched incrementally.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=folio=info FOLIO_BACKEND=json cargo run
//! ```
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FOLIO_BACKEND` | `sqlite` (`json`, `memory`) |
//! | `FOLIO_DATA_DIR` | platform data dir + `/folio` |
//! | `FOLIO_SEED` | `data/projects.json` |
//! | `FOLIO_ADMIN_ID` / `FOLIO_ADMIN_PASSWORD` | `admin` / `1234` |
//! | `FOLIO_PERSIST_SESSION` | `true` |

pub mod app;
pub mod config;
pub mod error;
pub mod shell;
pub mod state;
pub mod ui;
