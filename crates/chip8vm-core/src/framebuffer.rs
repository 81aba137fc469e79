pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Monochrome 64x32 display surface.
///
/// Each row is packed into a `u64`; column `x` is bit `x`. Hosts read it to render, the engine
/// writes it only through sprite draws and screen clears.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    rows: [u64; SCREEN_HEIGHT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            rows: [0; SCREEN_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.rows.fill(0);
    }

    /// Returns `false` for coordinates outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        self.rows[y] & (1u64 << x) != 0
    }

    /// XORs a lit pixel into the cell at `(x, y)`, wrapping both coordinates.
    ///
    /// Returns `true` when the cell was lit before, i.e. the write turned it off.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let row = &mut self.rows[y % SCREEN_HEIGHT];
        let mask = 1u64 << (x % SCREEN_WIDTH);
        let was_lit = *row & mask != 0;
        *row ^= mask;
        was_lit
    }

    pub fn rows(&self) -> &[u64; SCREEN_HEIGHT] {
        &self.rows
    }

    pub fn lit_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// `#`/`.` rendering, one line per row. Used for diagnostics and test failure output.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((SCREEN_WIDTH + 1) * SCREEN_HEIGHT);
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                out.push(if self.pixel(x, y) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("lit", &self.lit_count())
            .finish()
    }
}
