use image::{GrayImage, Luma};
use recttrack_rs::{DisplayPolygon, Frame, Orientation, OverlaySink, OverlayStyle};

pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 120;

const DARK: u8 = 20;
const BRIGHT: u8 = 220;

fn shaded_frame(
    sequence: u64,
    (x0, y0, x1, y1): (usize, usize, usize, usize),
    inside: u8,
    outside: u8,
) -> Frame {
    let luma = GrayImage::from_fn(WIDTH as u32, HEIGHT as u32, |col, row| {
        let (col, row) = (col as usize, row as usize);
        if (x0..=x1).contains(&col) && (y0..=y1).contains(&row) {
            Luma([inside])
        } else {
            Luma([outside])
        }
    });
    Frame::new(sequence, luma, Orientation::Portrait)
}

/// Bright rectangle on a dark background covering `x0..=x1`, `y0..=y1`.
pub fn rect_frame(sequence: u64, bounds: (usize, usize, usize, usize)) -> Frame {
    shaded_frame(sequence, bounds, BRIGHT, DARK)
}

/// Dark rectangle on a bright background covering `x0..=x1`, `y0..=y1`.
pub fn dark_rect_frame(sequence: u64, bounds: (usize, usize, usize, usize)) -> Frame {
    shaded_frame(sequence, bounds, DARK, BRIGHT)
}

pub fn blank_frame(sequence: u64) -> Frame {
    Frame::new(
        sequence,
        GrayImage::from_pixel(WIDTH as u32, HEIGHT as u32, Luma([DARK])),
        Orientation::Portrait,
    )
}

/// Remembers every overlay it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<Option<DisplayPolygon>>,
}

impl OverlaySink for RecordingSink {
    fn render(&mut self, polygon: Option<&DisplayPolygon>, _style: &OverlayStyle) {
        self.frames.push(polygon.copied());
    }
}
