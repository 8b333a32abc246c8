//! Data handed to a renderer for display

/// Packed 4-byte color, `0xAARRGGBB`
pub type Argb = u32;

/// Palette used by the host simulation
pub mod colors {
    use super::Argb;

    pub const BLACK: Argb = 0x0000_0000;
    pub const WHITE: Argb = 0x00FF_FFFF;
    pub const RED: Argb = 0x00FF_0000;
    pub const YELLOW: Argb = 0x00FC_BA03;
    pub const GREEN: Argb = 0x0000_FF00;
}

/// Read-only copy of a menu at the moment it was sent to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSnapshot {
    /// Menu title
    pub name: String,
    /// Option labels in display order
    pub options: Vec<String>,
    /// Index of the highlighted option
    pub hover: usize,
}

impl MenuSnapshot {
    /// Label of the highlighted option
    pub fn hovered(&self) -> Option<&str> {
        self.options.get(self.hover).map(String::as_str)
    }
}

/// A row-major ARGB pixel buffer.
///
/// Renderers draw it verbatim; they have no knowledge of what the pixels
/// mean to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Argb>,
}

impl Frame {
    /// Create a frame filled with a single color
    pub fn filled(width: usize, height: usize, color: Argb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Pixel at `(x, y)`, `None` when out of bounds
    pub fn at(&self, x: usize, y: usize) -> Option<Argb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(x + y * self.width).copied()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[Argb]> {
        self.pixels.chunks(self.width.max(1))
    }
}
