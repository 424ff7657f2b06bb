//! Font engine seam. Text shaping and glyph rendering are left to the host;
//! `NullFontEngine` answers every query with a failure sentinel so documents
//! still lay out and render without text.

use log::debug;

use crate::renderer::RenderInterface;
use crate::utils::{Colour, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FontFaceHandle(pub u64);

impl FontFaceHandle {
    pub const NULL: FontFaceHandle = FontFaceHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// CSS-style weight, 100 to 900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

pub trait FontEngine {
    fn load_font_face(&mut self, path: &str, fallback: bool, weight: FontWeight) -> bool;
    fn load_font_face_from_memory(
        &mut self,
        data: &[u8],
        family: &str,
        style: FontStyle,
        weight: FontWeight,
        fallback: bool,
    ) -> bool;
    fn font_face_handle(
        &mut self,
        family: &str,
        style: FontStyle,
        weight: FontWeight,
        size: u32,
    ) -> FontFaceHandle;

    fn size(&self, face: FontFaceHandle) -> i32;
    fn x_height(&self, face: FontFaceHandle) -> i32;
    fn line_height(&self, face: FontFaceHandle) -> i32;
    fn baseline(&self, face: FontFaceHandle) -> i32;
    /// Underline offset and thickness.
    fn underline(&self, face: FontFaceHandle) -> (f32, f32);
    fn string_width(&self, face: FontFaceHandle, text: &str, prior: Option<char>) -> i32;

    /// Emits the glyph geometry for `text` and returns its advance width.
    fn generate_string(
        &mut self,
        renderer: &mut dyn RenderInterface,
        face: FontFaceHandle,
        text: &str,
        position: Position,
        colour: Colour,
        opacity: f32,
    ) -> i32;

    /// Bumped whenever glyph geometry for `face` changes.
    fn version(&self, face: FontFaceHandle) -> i32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullFontEngine;

impl FontEngine for NullFontEngine {
    fn load_font_face(&mut self, path: &str, _fallback: bool, _weight: FontWeight) -> bool {
        debug!("font faces are not supported, ignoring {}", path);
        false
    }

    fn load_font_face_from_memory(
        &mut self,
        _data: &[u8],
        family: &str,
        _style: FontStyle,
        _weight: FontWeight,
        _fallback: bool,
    ) -> bool {
        debug!("font faces are not supported, ignoring family {}", family);
        false
    }

    fn font_face_handle(
        &mut self,
        _family: &str,
        _style: FontStyle,
        _weight: FontWeight,
        _size: u32,
    ) -> FontFaceHandle {
        FontFaceHandle::NULL
    }

    fn size(&self, _face: FontFaceHandle) -> i32 {
        0
    }

    fn x_height(&self, _face: FontFaceHandle) -> i32 {
        0
    }

    fn line_height(&self, _face: FontFaceHandle) -> i32 {
        0
    }

    fn baseline(&self, _face: FontFaceHandle) -> i32 {
        0
    }

    fn underline(&self, _face: FontFaceHandle) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn string_width(&self, _face: FontFaceHandle, _text: &str, _prior: Option<char>) -> i32 {
        0
    }

    fn generate_string(
        &mut self,
        _renderer: &mut dyn RenderInterface,
        _face: FontFaceHandle,
        _text: &str,
        _position: Position,
        _colour: Colour,
        _opacity: f32,
    ) -> i32 {
        0
    }

    fn version(&self, _face: FontFaceHandle) -> i32 {
        0
    }
}
