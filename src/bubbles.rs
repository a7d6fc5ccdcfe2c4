use image::{imageops::invert, GrayImage};
use imageproc::{
    contrast::{otsu_level, threshold},
    rect::Rect,
};
use log::debug;
use logging_timer::time;

use crate::{
    grade::GradeSheetError, image_utils::find_external_contours, sheet::DetectionOptions,
    types::BubbleCandidate,
};

#[time]
/// Binarizes a rectified sheet with Otsu's threshold, inverted so that ink
/// and pencil marks are white (foreground) on black.
pub fn binarize_sheet(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    let mut binary = threshold(gray, level);
    invert(&mut binary);
    debug!("binarized sheet at otsu level {}", level);
    binary
}

/// Determines whether a rect could be a bubble based on its size and shape.
pub fn rect_could_be_bubble(options: &DetectionOptions, rect: &Rect) -> bool {
    let aspect_ratio = rect.width() as f32 / rect.height() as f32;
    rect.width() >= options.min_bubble_size
        && rect.height() >= options.min_bubble_size
        && aspect_ratio >= options.min_aspect_ratio
        && aspect_ratio <= options.max_aspect_ratio
}

#[time]
/// Finds every outermost shape in a binarized sheet that is sized and
/// proportioned like a bubble.
pub fn find_bubble_candidates(
    binary: &GrayImage,
    options: &DetectionOptions,
) -> Result<Vec<BubbleCandidate>, GradeSheetError> {
    let contours = find_external_contours(binary);
    let contour_count = contours.len();

    let candidates = contours
        .into_iter()
        .filter_map(|contour| BubbleCandidate::from_contour(contour.points))
        .filter(|candidate| rect_could_be_bubble(options, &candidate.bounds))
        .collect::<Vec<BubbleCandidate>>();

    debug!(
        "kept {} of {} shapes as bubble candidates",
        candidates.len(),
        contour_count
    );

    if candidates.is_empty() {
        return Err(GradeSheetError::NoBubblesFound {
            reason: format!(
                "none of the {} shapes on the sheet are sized like a bubble",
                contour_count
            ),
        });
    }

    Ok(candidates)
}
