use std::io::Write;

use age_engine::{FrameData, Renderer};

const CLEAR_HOME: &str = "\x1b[H\x1b[2J";

/// Draws each frame as a bordered grid of characters followed by the
/// status lines. Spaces in shapes are transparent; cells outside the play
/// field are clipped.
pub struct AsciiView<W: Write> {
    out: W,
    clear_screen: bool,
    crlf: bool,
    grid: Vec<char>,
    text: String,
}

impl<W: Write> AsciiView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: true,
            crlf: false,
            grid: Vec::new(),
            text: String::new(),
        }
    }

    /// Skip the ANSI clear-screen prefix (for piping frames to a file).
    pub fn without_clear(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    /// End lines with `\r\n`; a terminal in raw mode does not return the
    /// cursor on a bare `\n`.
    pub fn with_crlf(mut self) -> Self {
        self.crlf = true;
        self
    }

    /// The most recently composed frame, without the clear prefix.
    pub fn last_frame(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn compose(&mut self, frame: &FrameData<'_>) {
        let width = frame.world_width.max(0);
        let height = frame.world_height.max(0);
        self.grid.clear();
        self.grid.resize((width * height) as usize, ' ');

        for drawable in &frame.snapshot.drawables {
            let Some(shape) = frame.assets.get(drawable.shape) else {
                continue;
            };
            for (row, line) in shape.rows().iter().enumerate() {
                let y = drawable.y + row as i32;
                if y < 0 || y >= height {
                    continue;
                }
                for (col, c) in line.chars().enumerate() {
                    let x = drawable.x + col as i32;
                    if c == ' ' || x < 0 || x >= width {
                        continue;
                    }
                    self.grid[(y * width + x) as usize] = c;
                }
            }
        }

        self.text.clear();
        let edge: String = std::iter::once('+')
            .chain(std::iter::repeat('-').take(width as usize))
            .chain(std::iter::once('+'))
            .collect();
        self.text.push_str(&edge);
        self.text.push('\n');
        for row in self.grid.chunks(width.max(1) as usize).take(height as usize) {
            self.text.push('|');
            self.text.extend(row.iter());
            self.text.push_str("|\n");
        }
        self.text.push_str(&edge);
        self.text.push('\n');
        for line in &frame.snapshot.status {
            self.text.push_str(line);
            self.text.push('\n');
        }
    }
}

impl AsciiView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Renderer for AsciiView<W> {
    type Error = std::io::Error;

    fn backend(&self) -> &'static str {
        "ascii"
    }

    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), Self::Error> {
        self.compose(frame);
        if self.clear_screen {
            self.out.write_all(CLEAR_HOME.as_bytes())?;
        }
        if self.crlf {
            self.out.write_all(self.text.replace('\n', "\r\n").as_bytes())?;
        } else {
            self.out.write_all(self.text.as_bytes())?;
        }
        self.out.flush()
    }
}
