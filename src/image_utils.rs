use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    contours::{find_contours, BorderType, Contour},
    point::Point,
};

pub const WHITE: Luma<u8> = Luma([u8::MAX]);
pub const BLACK: Luma<u8> = Luma([u8::MIN]);

pub const WHITE_RGB: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);
pub const PINK: Rgb<u8> = Rgb([255, 0, 255]);
pub const DARK_GREEN: Rgb<u8> = Rgb([0, 128, 0]);

pub const RAINBOW: [Rgb<u8>; 7] = [
    Rgb([255, 0, 0]),
    Rgb([255, 127, 0]),
    Rgb([255, 255, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([75, 0, 130]),
    Rgb([148, 0, 211]),
];

/// Finds the outer borders of every foreground region that is not nested
/// inside another region.
pub fn find_external_contours(img: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(img)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .collect()
}

/// Removes a trailing point that repeats the first one, leaving an implicitly
/// closed polygon.
pub fn open_polygon(points: &[Point<i32>]) -> &[Point<i32>] {
    match points {
        [first, rest @ .., last] if first == last && !rest.is_empty() => &points[..points.len() - 1],
        _ => points,
    }
}

/// Counts pixels where `mask` is set and the pixel of `img` at the mask's
/// offset matches `luma`. Mask pixels outside `img` are ignored.
pub fn count_masked_pixels(
    img: &GrayImage,
    mask: &GrayImage,
    offset: (i32, i32),
    luma: &Luma<u8>,
) -> u32 {
    let (offset_x, offset_y) = offset;
    mask.enumerate_pixels()
        .filter(|(x, y, mask_pixel)| {
            if **mask_pixel != WHITE {
                return false;
            }
            let image_x = *x as i32 + offset_x;
            let image_y = *y as i32 + offset_y;
            image_x >= 0
                && image_y >= 0
                && (image_x as u32) < img.width()
                && (image_y as u32) < img.height()
                && img.get_pixel(image_x as u32, image_y as u32) == luma
        })
        .count() as u32
}

/// Converts a grayscale image to RGB so it can be drawn on in color.
pub fn gray_to_rgb(img: &GrayImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let Luma([luma]) = *img.get_pixel(x, y);
        Rgb([luma, luma, luma])
    })
}
