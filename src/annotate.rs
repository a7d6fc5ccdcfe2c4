use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size},
    point::Point,
    rect::Rect,
};
use log::warn;
use logging_timer::time;
use rusttype::{Font, Scale};

use crate::{
    exam::AnswerKey,
    grade::GradeFileError,
    image_utils::{open_polygon, BLUE, GREEN, RED, WHITE_RGB},
    score::Score,
    types::{Question, QuestionDecision},
};

const OUTLINE_THICKNESS: i32 = 3;
const SCORE_FONT_SCALE: f32 = 28.0;

/// Loads a TrueType font for drawing the score.
pub fn load_font(path: &Path) -> Result<Font<'static>, GradeFileError> {
    let bytes = std::fs::read(path).map_err(|source| GradeFileError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| GradeFileError::InvalidFont {
        path: path.to_path_buf(),
    })
}

/// Draws a closed outline through `points`, `OUTLINE_THICKNESS` pixels wide.
pub fn draw_contour_outline_mut(canvas: &mut RgbImage, points: &[Point<i32>], color: Rgb<u8>) {
    let points = open_polygon(points);
    let reach = OUTLINE_THICKNESS / 2;
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                draw_line_segment_mut(
                    canvas,
                    ((start.x + dx) as f32, (start.y + dy) as f32),
                    ((end.x + dx) as f32, (end.y + dy) as f32),
                    color,
                );
            }
        }
    }
}

/// Text shown on the annotated sheet, e.g. `Score: 87.50% (35/40)`.
pub fn score_text(score: &Score) -> String {
    format!(
        "Score: {:.2}% ({}/{})",
        score.total_score, score.correct, score.total_questions
    )
}

#[time]
/// Marks the correct option of every keyed question, green when the marked
/// option matches and red otherwise, and writes the score in the top-left
/// corner.
///
/// `decisions` must be in the same order as `questions`. The outline always
/// goes around the correct option, not necessarily the one that was marked.
/// The score is only written when `font` is given; without one it is left
/// off and a warning is logged.
pub fn annotate_sheet(
    sheet: &RgbImage,
    questions: &[Question],
    decisions: &[QuestionDecision],
    answer_key: &AnswerKey,
    score: &Score,
    font: Option<&Font>,
) -> RgbImage {
    let mut canvas = sheet.clone();

    for (question, decision) in questions.iter().zip(decisions) {
        let Some(correct_option) = answer_key.correct_option(question.index) else {
            continue;
        };
        let color = if decision.selected == Some(correct_option) {
            GREEN
        } else {
            RED
        };
        draw_contour_outline_mut(&mut canvas, &question.options[correct_option].contour, color);
    }

    match font {
        Some(font) => draw_text_with_background_mut(
            &mut canvas,
            &score_text(score),
            10,
            10,
            Scale::uniform(SCORE_FONT_SCALE),
            font,
            BLUE,
            WHITE_RGB,
        ),
        None => warn!("no font available, leaving the score off the annotated sheet"),
    }

    canvas
}

/// Box behind text of the given size drawn at (`x`, `y`), or `None` when the
/// text has no extent.
pub fn text_background_rect(x: i32, y: i32, text_size: (i32, i32)) -> Option<Rect> {
    match text_size {
        (width, height) if width > 0 && height > 0 => {
            Some(Rect::at(x, y).of_size(width as u32, height as u32))
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_text_with_background_mut(
    canvas: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    scale: Scale,
    font: &Font,
    text_color: Rgb<u8>,
    background_color: Rgb<u8>,
) {
    if let Some(background) = text_background_rect(x, y, text_size(scale, font, text)) {
        draw_filled_rect_mut(canvas, background, background_color);
    }
    draw_text_mut(canvas, text_color, x, y, scale, font, text);
}
