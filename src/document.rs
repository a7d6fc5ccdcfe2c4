use image::{imageops::grayscale, GrayImage, RgbImage};
use imageproc::{
    distance_transform::Norm, edges::canny, filter::gaussian_blur_f32, morphology::dilate,
};
use log::debug;
use logging_timer::time;

use crate::{
    debug::{draw_quadrilateral_debug_image_mut, ImageDebugWriter},
    geometry::{approximate_closed_polygon, arc_length, polygon_area},
    grade::GradeSheetError,
    image_utils::{find_external_contours, gray_to_rgb},
    sheet::DetectionOptions,
    types::Quadrilateral,
};

/// Edge map used to look for the sheet's outline.
pub fn find_document_edges(image: &RgbImage, options: &DetectionOptions) -> GrayImage {
    let gray = grayscale(image);
    let blurred = if options.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, options.blur_sigma)
    } else {
        gray
    };
    let edges = canny(&blurred, options.canny_low, options.canny_high);
    if options.edge_dilation > 0 {
        dilate(&edges, Norm::LInf, options.edge_dilation)
    } else {
        edges
    }
}

#[time]
/// Finds the outline of the sheet in a photo.
///
/// Outlines are tried largest first and the first one whose polygon
/// approximation has exactly four corners wins, so the sheet is expected to
/// be the biggest four-sided shape in the frame.
pub fn locate_document(
    image: &RgbImage,
    options: &DetectionOptions,
    debug: &ImageDebugWriter,
) -> Result<Quadrilateral, GradeSheetError> {
    let edges = find_document_edges(image, options);

    let mut outlines = find_external_contours(&edges)
        .into_iter()
        .map(|contour| (polygon_area(&contour.points), contour.points))
        .collect::<Vec<_>>();
    outlines.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    if outlines.is_empty() {
        return Err(GradeSheetError::DocumentNotFound {
            reason: "no outlines were found in the photo".to_string(),
        });
    }

    for (area, points) in &outlines {
        let tolerance = options.polygon_tolerance * arc_length(points, true);
        let polygon = approximate_closed_polygon(points, tolerance);

        if let Some(quad) = Quadrilateral::from_polygon(&polygon) {
            debug!(
                "found sheet outline with area {} among {} outlines",
                area,
                outlines.len()
            );
            debug.write("document", || {
                let mut canvas = gray_to_rgb(&edges);
                draw_quadrilateral_debug_image_mut(&mut canvas, &quad);
                canvas
            });
            return Ok(quad);
        }
    }

    Err(GradeSheetError::DocumentNotFound {
        reason: format!(
            "none of the {} outlines in the photo has four corners",
            outlines.len()
        ),
    })
}
