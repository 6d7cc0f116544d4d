//! Text backend that prints scenes to any writer.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use maze_carver_rendering::{mode_caption, render_text, RenderingBackend, Scene};

/// Rendering backend that writes a caption and a text picture per frame.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend writing into `out`.
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        writeln!(self.out, "{}", mode_caption(scene.mode))
            .and_then(|()| write!(self.out, "{}", render_text(scene)))
            .and_then(|()| self.out.flush())
            .context("failed to write frame")
    }
}
