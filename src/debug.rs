use std::path::{Path, PathBuf};

use image::RgbImage;
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use log::{debug, warn};

use crate::{
    grid::QuestionGrid,
    image_utils::{BLUE, CYAN, DARK_GREEN, GREEN, PINK, RAINBOW, RED},
    types::{BubbleCandidate, Quadrilateral},
};

/// Creates a path for a debug image.
pub fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_string_lossy(),
        label
    ));
    result
}

/// Writes intermediate pipeline images next to the input image. A disabled
/// writer never renders anything.
#[derive(Debug, Clone, Default)]
pub struct ImageDebugWriter {
    input_path: Option<PathBuf>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path: Some(input_path),
        }
    }

    pub fn disabled() -> Self {
        Self { input_path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_path.is_some()
    }

    /// Renders and saves a debug image. `render` is only called when the
    /// writer is enabled.
    pub fn write(&self, label: &str, render: impl FnOnce() -> RgbImage) -> Option<PathBuf> {
        let input_path = self.input_path.as_ref()?;
        let path = debug_image_path(input_path, label);
        match render().save(&path) {
            Ok(()) => {
                debug!("wrote debug image {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("unable to write debug image {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Draws the outline and corners of the located sheet.
pub fn draw_quadrilateral_debug_image_mut(canvas: &mut RgbImage, quad: &Quadrilateral) {
    let quad = quad.ordered();
    let edges = [
        (quad.top_left(), quad.top_right(), GREEN),
        (quad.top_right(), quad.bottom_right(), CYAN),
        (quad.bottom_right(), quad.bottom_left(), BLUE),
        (quad.bottom_left(), quad.top_left(), RED),
    ];

    for (start, end, color) in edges {
        draw_line_segment_mut(canvas, (start.x, start.y), (end.x, end.y), color);
    }

    for corner in quad.corners {
        draw_cross_mut(canvas, PINK, corner.x.round() as i32, corner.y.round() as i32);
    }
}

/// Draws a debug image of the bubble candidates' bounding boxes.
pub fn draw_bubble_candidates_debug_image_mut(
    canvas: &mut RgbImage,
    candidates: &[BubbleCandidate],
) {
    for (i, candidate) in candidates.iter().enumerate() {
        draw_hollow_rect_mut(canvas, candidate.bounds, RAINBOW[i % RAINBOW.len()]);
    }
}

/// Draws each question's options, colored by option index and joined left
/// to right.
pub fn draw_question_grid_debug_image_mut(canvas: &mut RgbImage, grid: &QuestionGrid) {
    for question in &grid.questions {
        for (option, bubble) in question.options.iter().enumerate() {
            draw_hollow_rect_mut(canvas, bubble.bounds, RAINBOW[option % RAINBOW.len()]);
        }

        for pair in question.options.windows(2) {
            let (start, end) = (pair[0].center(), pair[1].center());
            draw_line_segment_mut(canvas, (start.x, start.y), (end.x, end.y), DARK_GREEN);
        }
    }
}
