use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Self::Output {
        Position {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Position, size: Size) -> Self {
        Self::new(pos.x, pos.y, size.width, size.height)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.x
            && position.x <= self.x + self.width
            && position.y >= self.y
            && position.y <= self.y + self.height
    }

    pub fn pos(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_pos(&mut self, pos: Position) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

/// 8-bit RGBA colour, the document engine's native vertex colour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Colour {
    fn default() -> Self {
        Colour::WHITE
    }
}

impl Colour {
    pub const WHITE: Colour = Colour::rgba(255, 255, 255, 255);
    pub const BLACK: Colour = Colour::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Colour = Colour::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalised `[0, 1]` channels, as the host expects for vertex colours.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Parses a computed colour property as the document engine prints it:
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha 0-255), `#rrggbb` or `#rrggbbaa`.
    pub fn parse(value: &str) -> Option<Colour> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let (body, has_alpha) = if let Some(rest) = value.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = value.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let channels: Vec<u8> = body
            .split(',')
            .map(|c| c.trim().parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8))
            .collect::<Option<Vec<u8>>>()?;

        match (channels.as_slice(), has_alpha) {
            ([r, g, b, a], true) => Some(Colour::rgba(*r, *g, *b, *a)),
            ([r, g, b], false) => Some(Colour::rgba(*r, *g, *b, 255)),
            _ => None,
        }
    }

    fn parse_hex(hex: &str) -> Option<Colour> {
        let byte = |i: usize| -> Option<u8> { u8::from_str_radix(hex.get(i..i + 2)?, 16).ok() };
        match hex.len() {
            6 => Some(Colour::rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Colour::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

/// One vertex of document-engine geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub colour: Colour,
}

impl Vertex {
    pub fn new(position: [f32; 2], tex_coord: [f32; 2], colour: Colour) -> Self {
        Self {
            position,
            tex_coord,
            colour,
        }
    }
}
