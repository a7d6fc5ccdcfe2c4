use image::{imageops::grayscale, GrayImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use log::debug;
use logging_timer::time;

use crate::{geometry::Segment, grade::GradeSheetError, types::Quadrilateral};

/// Fill for destination pixels that map outside the photo.
const FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// A sheet warped to a top-down view.
#[derive(Clone, Debug)]
pub struct RectifiedSheet {
    pub image: RgbImage,
    /// Source corners in top-left, top-right, bottom-right, bottom-left order.
    pub corners: Quadrilateral,
    /// Maps photo coordinates to rectified sheet coordinates.
    pub projection: Projection,
}

impl RectifiedSheet {
    pub fn to_luma8(&self) -> GrayImage {
        grayscale(&self.image)
    }
}

/// Where the ordered corners land in a `width` x `height` rectified image.
/// An empty dimension collapses onto the origin.
pub fn destination_corners(width: u32, height: u32) -> [(f32, f32); 4] {
    let right = width.saturating_sub(1) as f32;
    let bottom = height.saturating_sub(1) as f32;
    [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)]
}

/// Size of the rectified sheet: the longer of each pair of opposite edges.
pub fn rectified_size(corners: &Quadrilateral) -> (u32, u32) {
    let ordered = corners.ordered();
    let top = Segment::new(ordered.top_left(), ordered.top_right()).length();
    let bottom = Segment::new(ordered.bottom_left(), ordered.bottom_right()).length();
    let left = Segment::new(ordered.top_left(), ordered.bottom_left()).length();
    let right = Segment::new(ordered.top_right(), ordered.bottom_right()).length();
    (top.max(bottom) as u32, left.max(right) as u32)
}

#[time]
/// Warps the region inside `corners` so that the sheet's top-left corner
/// lands at (0, 0) and its edges become the image edges.
pub fn rectify_document(
    image: &RgbImage,
    corners: &Quadrilateral,
) -> Result<RectifiedSheet, GradeSheetError> {
    let ordered = corners.ordered();
    let (width, height) = rectified_size(&ordered);
    if width < 2 || height < 2 {
        return Err(GradeSheetError::DocumentNotFound {
            reason: format!("the sheet outline is too small to rectify ({width}x{height})"),
        });
    }

    let source = ordered.corners.map(|p| (p.x, p.y));
    let projection = Projection::from_control_points(source, destination_corners(width, height))
        .ok_or_else(|| GradeSheetError::DocumentNotFound {
            reason: "the sheet outline corners do not describe a plane".to_string(),
        })?;

    let mut rectified = RgbImage::new(width, height);
    warp_into(image, &projection, Interpolation::Bilinear, FILL, &mut rectified);
    debug!("rectified sheet to {}x{}", width, height);

    Ok(RectifiedSheet {
        image: rectified,
        corners: ordered,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use imageproc::point::Point;

    use super::*;

    fn skewed_corners() -> Quadrilateral {
        Quadrilateral::new([
            Point::new(390.0, 510.0),
            Point::new(15.0, 480.0),
            Point::new(30.0, 40.0),
            Point::new(370.0, 20.0),
        ])
    }

    #[test]
    fn rectified_size_uses_longest_edges() {
        assert_eq!(rectified_size(&skewed_corners()), (376, 490));
    }

    #[test]
    fn inverse_projection_recovers_source_corners() {
        let photo = RgbImage::from_pixel(400, 550, Rgb([200, 200, 200]));
        let sheet = rectify_document(&photo, &skewed_corners()).expect("rectifies");
        assert_eq!(sheet.image.dimensions(), (376, 490));

        let inverse = sheet.projection.invert();
        for (corner, destination) in sheet
            .corners
            .corners
            .iter()
            .zip(destination_corners(376, 490))
        {
            let (x, y) = inverse * destination;
            assert!(
                (x - corner.x).abs() < 0.1 && (y - corner.y).abs() < 0.1,
                "{:?} mapped back to ({}, {}), expected {:?}",
                destination,
                x,
                y,
                corner
            );
        }
    }

    #[test]
    fn sheet_top_left_lands_at_origin() {
        let mut photo = RgbImage::from_pixel(400, 550, Rgb([200, 200, 200]));
        for y in 38..=48 {
            for x in 28..=38 {
                photo.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }

        let sheet = rectify_document(&photo, &skewed_corners()).expect("rectifies");

        assert_eq!(sheet.image.get_pixel(2, 2), &Rgb([0, 0, 0]));
        assert_eq!(sheet.image.get_pixel(300, 400), &Rgb([200, 200, 200]));
    }

    #[test]
    fn rectification_is_deterministic() {
        let photo = RgbImage::from_fn(400, 550, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let first = rectify_document(&photo, &skewed_corners()).expect("rectifies");
        let second = rectify_document(&photo, &skewed_corners()).expect("rectifies");
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn destination_corners_of_empty_size_stay_at_origin() {
        assert_eq!(destination_corners(0, 0), [(0.0, 0.0); 4]);
        assert_eq!(
            destination_corners(10, 0),
            [(0.0, 0.0), (9.0, 0.0), (9.0, 0.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn collapsed_outline_cannot_be_rectified() {
        let photo = RgbImage::new(50, 50);
        let point = Point::new(10.0, 10.0);
        let err = rectify_document(&photo, &Quadrilateral::new([point; 4])).unwrap_err();
        assert!(matches!(err, GradeSheetError::DocumentNotFound { .. }));
    }
}
