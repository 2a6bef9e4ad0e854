use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::types::{TriangleFootprint, ATLAS_PALETTE};

/// Rasterize packed triangle footprints onto a black canvas, cycling
/// through the palette so neighboring placements stay distinguishable.
pub fn render(footprints: &[TriangleFootprint], width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    for footprint in footprints {
        fill_triangle(
            &mut image,
            &footprint.corners,
            palette_color(footprint.color_index),
        );
    }
    image
}

fn palette_color(index: usize) -> Rgba<u8> {
    let rgb = ATLAS_PALETTE[index % ATLAS_PALETTE.len()];
    Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255])
}

/// Fill every pixel whose center falls inside the triangle, either winding.
/// Zero-area slivers are skipped.
fn fill_triangle(image: &mut RgbaImage, corners: &[Vec2; 3], color: Rgba<u8>) {
    let area = (corners[1] - corners[0]).perp_dot(corners[2] - corners[0]);
    if area.abs() < f32::EPSILON {
        return;
    }
    let sign = area.signum();

    let (min, max) = corners
        .iter()
        .fold((corners[0], corners[0]), |(lo, hi), c| {
            (lo.min(*c), hi.max(*c))
        });
    let x0 = (min.x.floor() as i32).max(0);
    let y0 = (min.y.floor() as i32).max(0);
    let x1 = (max.x.ceil() as i32).min(image.width() as i32 - 1);
    let y1 = (max.y.ceil() as i32).min(image.height() as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if covers(corners, center, sign) {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn covers(corners: &[Vec2; 3], point: Vec2, sign: f32) -> bool {
    (0..3).all(|e| {
        let edge = corners[(e + 1) % 3] - corners[e];
        sign * edge.perp_dot(point - corners[e]) >= 0.0
    })
}
