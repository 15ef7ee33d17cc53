//! Rendering surfaces
//! Anything that can present a projection of the project grid
use std::io::Write;

use super::projection::Projection;

/// Receives every recomputed projection
pub trait Surface {
    fn render(&mut self, projection: &Projection<'_>);
}

/// Plain-text project grid written to any `Write` sink
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_grid(&mut self, projection: &Projection<'_>) -> std::io::Result<()> {
        if projection.is_empty() {
            writeln!(self.out, "No projects to show.")?;
            return Ok(());
        }

        for record in &projection.visible {
            let tags: Vec<String> = record.category.iter().map(|t| format!("#{t}")).collect();
            writeln!(self.out, "[{}] {} - {}", record.id, record.title, record.headline)?;
            writeln!(self.out, "    {}  {}", tags.join(" "), record.links.site)?;
            if projection.show_admin_controls {
                writeln!(self.out, "    (edit {0}) (delete {0})", record.id)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn render(&mut self, projection: &Projection<'_>) {
        if let Err(e) = self.write_grid(projection).and_then(|_| self.out.flush()) {
            tracing::warn!("⚠️  Failed to render project grid: {e}");
        }
    }
}

/// Keeps the last projection as owned data, for embedding and tests
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub renders: usize,
    pub visible: Vec<crate::state::data::RecordId>,
    pub show_admin_controls: bool,
}

impl Surface for RecordingSurface {
    fn render(&mut self, projection: &Projection<'_>) {
        self.renders += 1;
        self.visible = projection.visible.iter().map(|r| r.id.clone()).collect();
        self.show_admin_controls = projection.show_admin_controls;
    }
}
