#![allow(dead_code)]

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::draw_filled_circle_mut,
    geometric_transformations::{warp_into, Interpolation, Projection},
};

pub const PAPER: Rgb<u8> = Rgb([250, 250, 250]);
pub const INK: Rgb<u8> = Rgb([10, 10, 10]);
pub const BACKGROUND: Rgb<u8> = Rgb([170, 170, 170]);

pub const SHEET_WIDTH: u32 = 340;
const MARGIN: i32 = 80;
const COLUMN_SPACING: i32 = 60;
const ROW_SPACING: i32 = 50;
pub const BUBBLE_RADIUS: i32 = 12;
const HOLE_RADIUS: i32 = 9;

/// Height of a sheet with room for `rows` rows of bubbles.
pub fn sheet_height(rows: usize) -> u32 {
    (2 * MARGIN + ROW_SPACING * (rows.max(1) as i32 - 1)) as u32
}

pub fn bubble_center(row: usize, column: usize) -> (i32, i32) {
    (
        MARGIN + COLUMN_SPACING * column as i32,
        MARGIN + ROW_SPACING * row as i32,
    )
}

pub fn blank_sheet(rows: usize) -> RgbImage {
    RgbImage::from_pixel(SHEET_WIDTH, sheet_height(rows), PAPER)
}

/// An empty bubble is a printed ring; a filled one is solid ink.
pub fn draw_bubble_mut(canvas: &mut RgbImage, center: (i32, i32), filled: bool) {
    draw_filled_circle_mut(canvas, center, BUBBLE_RADIUS, INK);
    if !filled {
        draw_filled_circle_mut(canvas, center, HOLE_RADIUS, PAPER);
    }
}

pub fn draw_question_mut(canvas: &mut RgbImage, row: usize, marked: Option<usize>) {
    for option in 0..4 {
        draw_bubble_mut(canvas, bubble_center(row, option), marked == Some(option));
    }
}

/// A top-down sheet with one row of four bubbles per entry of `marks`.
pub fn render_sheet(marks: &[Option<usize>]) -> RgbImage {
    let mut sheet = blank_sheet(marks.len());
    for (row, &marked) in marks.iter().enumerate() {
        draw_question_mut(&mut sheet, row, marked);
    }
    sheet
}

/// Lays `sheet` flat on a background, `margin` pixels from every edge.
pub fn place_on_background(sheet: &RgbImage, margin: u32) -> RgbImage {
    let mut photo = RgbImage::from_pixel(
        sheet.width() + 2 * margin,
        sheet.height() + 2 * margin,
        BACKGROUND,
    );
    image::imageops::replace(&mut photo, sheet, margin as i64, margin as i64);
    photo
}

/// Simulates photographing `sheet` at an angle: its corners (top-left,
/// top-right, bottom-right, bottom-left) land on `corners` in a `width` x
/// `height` photo.
pub fn photograph(sheet: &RgbImage, corners: [(f32, f32); 4], width: u32, height: u32) -> RgbImage {
    let right = (sheet.width() - 1) as f32;
    let bottom = (sheet.height() - 1) as f32;
    let projection = Projection::from_control_points(
        [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)],
        corners,
    )
    .expect("corners describe a plane");

    let mut photo = RgbImage::new(width, height);
    warp_into(sheet, &projection, Interpolation::Bilinear, BACKGROUND, &mut photo);
    photo
}

/// Number of pixels exactly matching `color`.
pub fn count_color(image: &RgbImage, color: Rgb<u8>) -> usize {
    image.pixels().filter(|p| **p == color).count()
}
