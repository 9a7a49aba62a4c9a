//! Connected regions of binary masks.

use image::{GrayImage, Luma};
use imageproc::point::Point;
use imageproc::region_labelling::{Connectivity, connected_components};

/// One 4-connected foreground region.
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// Number of pixels in the region.
    pub pixel_count: usize,
    /// Pixels with at least one 4-neighbour outside the region.
    pub boundary: Vec<Point<i32>>,
    /// Whether the region reaches the first or last row or column.
    pub touches_border: bool,
}

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Label the non-zero pixels of `mask` and return regions with at least
/// `min_pixels` pixels, in raster order of their first pixel.
pub fn foreground_components(mask: &GrayImage, min_pixels: usize) -> Vec<Component> {
    let labels = connected_components(mask, Connectivity::Four, Luma([0u8]));
    let (width, height) = labels.dimensions();
    let label_at = |x: i64, y: i64| -> u32 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            0
        } else {
            labels.get_pixel(x as u32, y as u32)[0]
        }
    };

    let mut components: Vec<Component> = Vec::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        // Labels are consecutive from 1.
        let index = label as usize - 1;
        if components.len() <= index {
            components.resize_with(index + 1, Component::default);
        }
        let component = &mut components[index];
        component.pixel_count += 1;
        component.touches_border |= x == 0 || y == 0 || x + 1 == width || y + 1 == height;

        let on_boundary = NEIGHBOURS
            .iter()
            .any(|&(dx, dy)| label_at(x as i64 + dx, y as i64 + dy) != label);
        if on_boundary {
            component.boundary.push(Point::new(x as i32, y as i32));
        }
    }

    components.retain(|c| c.pixel_count >= min_pixels);
    components
}
