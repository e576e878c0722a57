//! Draw primitives and the frame protocol.
//!
//! A frame buffer is `[cursor, prim_addr, prim_addr, ...]`. Each non-zero
//! `prim_addr` points at a flat primitive record decoded field by field in
//! the fixed order of [`DrawPrimitive::decode`]. Nothing is optional on the
//! wire: absence is a null address, a zero size or a transparent color.

use crate::codec::BufferCursor;
use crate::error::CodecResult;
use crate::types::Color;
use crate::wire::{CursorStyle, Font, HorizontalAlign, Shape, VerticalAlign};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawPrimitive {
    pub x: f32,
    pub y: f32,
    /// Surface layer; higher draws on top.
    pub z: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in radians about the primitive's centre.
    pub angle: f32,
    pub horizontal_anchor: Option<HorizontalAlign>,
    pub vertical_anchor: Option<VerticalAlign>,
    pub shape: Option<Shape>,
    pub border_color: Color,
    pub border_width: f32,
    pub border_radius: f32,
    pub border_dash_length: f32,
    pub border_gap_length: f32,
    pub background_color: Color,
    pub overlay_color: Color,
    pub image: ImageRef,
    pub text: TextRun,
}

/// Reference to an image and the crop window to draw from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageRef {
    pub source: String,
    pub width: f32,
    pub height: f32,
    /// Crop window, as fractions of the image size.
    pub sx: f32,
    pub sy: f32,
    pub sw: f32,
    pub sh: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub content: String,
    pub font: Option<Font>,
    pub size: f32,
    pub color: Color,
    pub padding: f32,
    pub horizontal_align: Option<HorizontalAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub bold: bool,
    pub italic: bool,
    /// Caret position in characters; negative means no caret.
    pub cursor_index: i32,
    pub fit: bool,
    pub shrink_to_fit: bool,
}

impl DrawPrimitive {
    pub fn decode(cursor: &mut BufferCursor<'_>) -> CodecResult<Self> {
        let x = cursor.read_float()?;
        let y = cursor.read_float()?;
        let z = cursor.read_float()?;
        let width = cursor.read_float()?;
        let height = cursor.read_float()?;
        let angle = cursor.read_float()?;
        let horizontal_anchor = cursor.read_enum()?;
        let vertical_anchor = cursor.read_enum()?;
        let shape = cursor.read_enum()?;
        let border_color = cursor.read_color()?;
        let border_width = cursor.read_float()?;
        let border_radius = cursor.read_float()?;
        let border_dash_length = cursor.read_float()?;
        let border_gap_length = cursor.read_float()?;
        let background_color = cursor.read_color()?;
        let overlay_color = cursor.read_color()?;

        let image = ImageRef {
            source: cursor.read_string()?,
            width: cursor.read_float()?,
            height: cursor.read_float()?,
            sx: cursor.read_float()?,
            sy: cursor.read_float()?,
            sw: cursor.read_float()?,
            sh: cursor.read_float()?,
        };

        let text = TextRun {
            content: cursor.read_string()?,
            font: cursor.read_enum()?,
            size: cursor.read_float()?,
            color: cursor.read_color()?,
            padding: cursor.read_float()?,
            horizontal_align: cursor.read_enum()?,
            vertical_align: cursor.read_enum()?,
            bold: cursor.read_bool()?,
            italic: cursor.read_bool()?,
            cursor_index: cursor.read()?,
            fit: cursor.read_bool()?,
            shrink_to_fit: cursor.read_bool()?,
        };

        Ok(Self {
            x,
            y,
            z,
            width,
            height,
            angle,
            horizontal_anchor,
            vertical_anchor,
            shape,
            border_color,
            border_width,
            border_radius,
            border_dash_length,
            border_gap_length,
            background_color,
            overlay_color,
            image,
            text,
        })
    }

    /// Layer index used to pick the drawing surface.
    pub fn layer(&self) -> i32 {
        self.z.round() as i32
    }

    /// Centre of a `width` x `height` box anchored at the primitive's
    /// position. The size is passed in because shrink-to-fit text may have
    /// narrowed the box.
    pub fn anchored_center(&self, width: f32, height: f32) -> (f32, f32) {
        let dx = match self.horizontal_anchor {
            Some(HorizontalAlign::Left) => width / 2.0,
            Some(HorizontalAlign::Right) => -width / 2.0,
            _ => 0.0,
        };
        let dy = match self.vertical_anchor {
            Some(VerticalAlign::Top) => height / 2.0,
            Some(VerticalAlign::Bottom) => -height / 2.0,
            _ => 0.0,
        };
        (self.x + dx, self.y + dy)
    }
}

/// One decoded frame: an optional cursor change and the primitives in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub cursor: Option<CursorStyle>,
    pub primitives: Vec<DrawPrimitive>,
}

impl Frame {
    /// Decode a whole frame buffer; `cursor` must be bounded by the frame size.
    pub fn decode(cursor: &mut BufferCursor<'_>) -> CodecResult<Self> {
        let style = cursor.read_enum()?;
        let mut primitives = Vec::new();
        while !cursor.is_exhausted() {
            let Some(addr) = cursor.read_sub_buffer_addr()? else {
                continue;
            };
            let mut record = cursor.sub_buffer(addr);
            primitives.push(DrawPrimitive::decode(&mut record)?);
        }
        Ok(Self {
            cursor: style,
            primitives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryView;
    use crate::types::WORD_SIZE;

    const RECORD_WORDS: usize = 35;

    /// Lays out a rectangle primitive at `addr` with a background color at `color_addr`.
    fn write_rect(bytes: &mut [u8], addr: u32, color_addr: u32, x: f32) {
        let mut view = MemoryView::new(bytes);
        let mut words = vec![0u32; RECORD_WORDS];
        words[0] = x.to_bits();
        words[1] = 20.0f32.to_bits();
        words[2] = 1.0f32.to_bits();
        words[3] = 100.0f32.to_bits();
        words[4] = 50.0f32.to_bits();
        words[6] = 0; // left anchor
        words[7] = u32::MAX;
        words[8] = 0; // rectangle
        words[14] = color_addr;
        words[32] = (-1i32) as u32;
        for (i, w) in words.iter().enumerate() {
            view.store(addr + i as u32, *w).unwrap();
        }
        for (i, c) in [10u32, 20, 30, 255].iter().enumerate() {
            view.store(color_addr + i as u32, *c).unwrap();
        }
    }

    #[test]
    fn test_decode_primitive_fields() {
        let mut bytes = vec![0u8; 128 * WORD_SIZE];
        write_rect(&mut bytes, 40, 100, 10.0);
        let mut cursor = BufferCursor::unbounded(MemoryView::new(&mut bytes), 40);
        let prim = DrawPrimitive::decode(&mut cursor).unwrap();
        assert_eq!(cursor.size() as usize, RECORD_WORDS);
        assert_eq!(prim.x, 10.0);
        assert_eq!(prim.layer(), 1);
        assert_eq!(prim.shape, Some(Shape::Rectangle));
        assert_eq!(prim.horizontal_anchor, Some(HorizontalAlign::Left));
        assert_eq!(prim.vertical_anchor, None);
        assert_eq!(prim.background_color, Color::rgba(10, 20, 30, 255));
        assert_eq!(prim.border_color, Color::TRANSPARENT);
        assert_eq!(prim.text.cursor_index, -1);
        assert!(prim.text.content.is_empty());
        assert!(prim.image.source.is_empty());
    }

    #[test]
    fn test_anchored_center() {
        let prim = DrawPrimitive {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 40.0,
            horizontal_anchor: Some(HorizontalAlign::Right),
            vertical_anchor: Some(VerticalAlign::Top),
            ..Default::default()
        };
        assert_eq!(prim.anchored_center(prim.width, prim.height), (0.0, 30.0));
        assert_eq!(prim.anchored_center(10.0, 10.0), (5.0, 15.0));
    }

    #[test]
    fn test_frame_skips_null_addresses() {
        let mut bytes = vec![0u8; 256 * WORD_SIZE];
        write_rect(&mut bytes, 40, 100, 1.0);
        write_rect(&mut bytes, 120, 200, 2.0);
        {
            let mut view = MemoryView::new(&mut bytes);
            view.store(4, 1).unwrap(); // pointer cursor
            view.store(5, 40).unwrap();
            view.store(6, 0).unwrap();
            view.store(7, 120).unwrap();
        }
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 4, 4);
        let frame = Frame::decode(&mut cursor).unwrap();
        assert_eq!(frame.cursor, Some(CursorStyle::Pointer));
        assert_eq!(frame.primitives.len(), 2);
        assert_eq!(frame.primitives[0].x, 1.0);
        assert_eq!(frame.primitives[1].x, 2.0);
    }

    #[test]
    fn test_empty_frame() {
        let mut bytes = vec![0u8; 4 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 1);
        let frame = Frame::decode(&mut cursor).unwrap();
        assert_eq!(frame.cursor, Some(CursorStyle::Default));
        assert!(frame.primitives.is_empty());
    }
}
