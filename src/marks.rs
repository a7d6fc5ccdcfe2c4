use image::GrayImage;
use imageproc::{drawing::draw_polygon_mut, point::Point};
use logging_timer::time;

use crate::{
    image_utils::{count_masked_pixels, open_polygon, WHITE},
    types::{BubbleCandidate, Question, QuestionDecision, OPTIONS_PER_QUESTION},
};

/// Picks the option with the most filled pixels.
///
/// Only a strictly greater count takes the lead, so on a tie the earliest
/// option wins. Returns `None` when nothing is filled at all.
pub fn select_marked_option(fill_counts: &[u32]) -> Option<usize> {
    let mut bubbled: Option<(u32, usize)> = None;
    for (option, &count) in fill_counts.iter().enumerate() {
        match bubbled {
            Some((most, _)) if count <= most => {}
            _ => bubbled = Some((count, option)),
        }
    }
    bubbled
        .filter(|(count, _)| *count > 0)
        .map(|(_, option)| option)
}

/// Counts the foreground pixels of `binary` inside the bubble's contour,
/// boundary included.
pub fn count_filled_pixels(bubble: &BubbleCandidate, binary: &GrayImage) -> u32 {
    let bounds = bubble.bounds;
    let mut mask = GrayImage::new(bounds.width(), bounds.height());
    let polygon = open_polygon(&bubble.contour)
        .iter()
        .map(|p| Point::new(p.x - bounds.left(), p.y - bounds.top()))
        .collect::<Vec<_>>();

    if polygon.len() < 3 {
        for p in &polygon {
            mask.put_pixel(p.x as u32, p.y as u32, WHITE);
        }
    } else {
        draw_polygon_mut(&mut mask, &polygon, WHITE);
    }

    count_masked_pixels(binary, &mask, (bounds.left(), bounds.top()), &WHITE)
}

/// Decides which option of a question is marked.
pub fn evaluate_question(question: &Question, binary: &GrayImage) -> QuestionDecision {
    let mut fill_counts = [0u32; OPTIONS_PER_QUESTION];
    for (count, bubble) in fill_counts.iter_mut().zip(&question.options) {
        *count = count_filled_pixels(bubble, binary);
    }

    QuestionDecision {
        question: question.index,
        selected: select_marked_option(&fill_counts),
        fill_counts,
    }
}

#[time]
pub fn evaluate_questions(questions: &[Question], binary: &GrayImage) -> Vec<QuestionDecision> {
    questions
        .iter()
        .map(|question| evaluate_question(question, binary))
        .collect()
}
