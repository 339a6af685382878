//! Terminal backend that rasterises scenes onto a character grid.

use std::{
    io::Write,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use invaders_core::FRAME_DURATION;

use crate::{Color, Presentation, RenderingBackend, RenderingError, Scene, SpriteKind};

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Character grid the playfield is scaled onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextCanvas {
    columns: usize,
    rows: usize,
    colored: bool,
}

impl TextCanvas {
    /// Creates a monochrome canvas `columns` characters wide and `rows` tall.
    pub fn new(columns: usize, rows: usize) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyCanvas { columns, rows });
        }

        Ok(Self {
            columns,
            rows,
            colored: false,
        })
    }

    /// Enables or disables 24-bit ANSI coloring of glyphs.
    #[must_use]
    pub const fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Width of the grid in characters.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Height of the grid in characters.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Draws the HUD line followed by the framed playfield.
    #[must_use]
    pub fn draw(&self, scene: &Scene) -> String {
        let grid = self.rasterise(scene);
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut frame = String::with_capacity((self.columns + 3) * (self.rows + 3));
        frame.push_str(&scene.hud.status_line());
        frame.push('\n');
        frame.push_str(&border);
        frame.push('\n');
        for row in grid.chunks(self.columns) {
            frame.push('|');
            for cell in row {
                match cell {
                    Some(kind) if self.colored => {
                        push_colored(&mut frame, kind.color(), kind.glyph());
                    }
                    Some(kind) => frame.push(kind.glyph()),
                    None => frame.push(' '),
                }
            }
            frame.push('|');
            frame.push('\n');
        }
        frame.push_str(&border);
        frame.push('\n');
        frame
    }

    fn rasterise(&self, scene: &Scene) -> Vec<Option<SpriteKind>> {
        let mut grid = vec![None; self.columns * self.rows];
        let bounds = Vec2::new(self.columns as f32, self.rows as f32);
        let cell = scene.size() / bounds;
        if cell.x <= 0.0 || cell.y <= 0.0 {
            return grid;
        }

        for sprite in &scene.sprites {
            let start = (sprite.position / cell).floor().max(Vec2::ZERO);
            let end = ((sprite.position + sprite.size) / cell).ceil().min(bounds);
            if end.x <= start.x || end.y <= start.y {
                continue;
            }
            for row in start.y as usize..end.y as usize {
                for column in start.x as usize..end.x as usize {
                    if let Some(slot) = grid.get_mut(row * self.columns + column) {
                        *slot = Some(sprite.kind);
                    }
                }
            }
        }
        grid
    }
}

fn push_colored(frame: &mut String, color: Color, glyph: char) {
    let [red, green, blue] = color.to_rgb_u8();
    frame.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{glyph}{RESET}"));
}

/// Backend writing text frames to any [`Write`] sink.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    canvas: TextCanvas,
    frame_stride: u64,
    real_time: bool,
    clear_screen: bool,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend that draws every frame without pacing.
    pub const fn new(out: W, canvas: TextCanvas) -> Self {
        Self {
            out,
            canvas,
            frame_stride: 1,
            real_time: false,
            clear_screen: false,
        }
    }

    /// Draws only every `stride`-th simulated frame.
    pub fn with_frame_stride(mut self, stride: u64) -> Result<Self, RenderingError> {
        if stride == 0 {
            return Err(RenderingError::ZeroFrameStride);
        }
        self.frame_stride = stride;
        Ok(self)
    }

    /// Waits out each frame's wall-clock duration when enabled.
    #[must_use]
    pub fn with_real_time(mut self, real_time: bool) -> Self {
        self.real_time = real_time;
        self
    }

    /// Clears the terminal before each frame when enabled.
    #[must_use]
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Releases the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn present(&mut self, scene: &Scene, clear_color: Color) -> AnyResult<()> {
        if self.clear_screen {
            self.out
                .write_all(CLEAR_SCREEN.as_bytes())
                .context("failed to clear the terminal")?;
        }
        if self.canvas.colored {
            let [red, green, blue] = clear_color.to_rgb_u8();
            write!(self.out, "\x1b[48;2;{red};{green};{blue}m")
                .context("failed to set the background color")?;
        }
        self.out
            .write_all(self.canvas.draw(scene).as_bytes())
            .context("failed to write a text frame")?;
        if self.canvas.colored {
            self.out
                .write_all(RESET.as_bytes())
                .context("failed to reset terminal colors")?;
        }
        Ok(())
    }
}

impl<W: Write> RenderingBackend for &mut TextBackend<W> {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> bool,
    {
        let Presentation {
            window_title,
            clear_color,
            mut scene,
        } = presentation;
        writeln!(self.out, "{window_title}").context("failed to write the title")?;

        let mut frame: u64 = 0;
        loop {
            let started = Instant::now();
            if !update_scene(FRAME_DURATION, &mut scene) {
                break;
            }
            frame += 1;
            if frame % self.frame_stride == 0 {
                self.present(&scene, clear_color)?;
            }
            if self.real_time {
                if let Some(rest) = FRAME_DURATION.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }

        self.present(&scene, clear_color)?;
        self.out.flush().context("failed to flush text frames")
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> bool,
    {
        (&mut self).run(presentation, update_scene)
    }
}
