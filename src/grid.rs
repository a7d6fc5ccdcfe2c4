use log::{debug, warn};
use logging_timer::time;

use crate::{
    sheet::RowGrouping,
    types::{BubbleCandidate, Question, OPTIONS_PER_QUESTION},
};

/// Bubbles arranged into questions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionGrid {
    /// Complete questions, in sheet order.
    pub questions: Vec<Question>,
    /// Indices of groups that did not have exactly four bubbles. These are
    /// never scored.
    pub skipped: Vec<usize>,
}

#[time]
/// Arranges bubble candidates into questions of four options each.
///
/// With [`RowGrouping::SortAndChunk`] the candidates are sorted top to bottom
/// and split into consecutive groups of four, which only works when every row
/// is a separate band holding exactly four bubbles. Each group is then sorted
/// left to right to fix the option order.
pub fn organize_questions(
    mut candidates: Vec<BubbleCandidate>,
    grouping: RowGrouping,
) -> QuestionGrid {
    candidates.sort_by_key(|c| c.bounds.top());

    let rows = match grouping {
        RowGrouping::SortAndChunk => vec![candidates],
        RowGrouping::Banded { tolerance } => split_into_bands(candidates, tolerance),
    };

    let mut grid = QuestionGrid::default();
    let mut index = 0;
    for row in rows {
        for group in chunk_row(row) {
            match <[BubbleCandidate; OPTIONS_PER_QUESTION]>::try_from(group) {
                Ok(options) => grid.questions.push(Question { index, options }),
                Err(group) => {
                    warn!(
                        "skipping question {}: found {} bubbles instead of {}",
                        index,
                        group.len(),
                        OPTIONS_PER_QUESTION
                    );
                    grid.skipped.push(index);
                }
            }
            index += 1;
        }
    }

    debug!(
        "organized {} questions, skipped {}",
        grid.questions.len(),
        grid.skipped.len()
    );
    grid
}

/// Splits candidates sorted by top edge into rows whose top edges are within
/// `tolerance` of the row's first candidate.
fn split_into_bands(candidates: Vec<BubbleCandidate>, tolerance: u32) -> Vec<Vec<BubbleCandidate>> {
    let mut bands: Vec<Vec<BubbleCandidate>> = vec![];
    for candidate in candidates {
        let starts_new_band = bands.last().map_or(true, |band| {
            candidate.bounds.top() - band[0].bounds.top() > tolerance as i32
        });
        if starts_new_band {
            bands.push(vec![candidate]);
        } else if let Some(band) = bands.last_mut() {
            band.push(candidate);
        }
    }
    bands
}

/// Splits a row into consecutive groups of four, each sorted left to right.
fn chunk_row(row: Vec<BubbleCandidate>) -> Vec<Vec<BubbleCandidate>> {
    let mut groups = vec![];
    let mut remaining = row.into_iter().peekable();
    while remaining.peek().is_some() {
        let mut group = remaining
            .by_ref()
            .take(OPTIONS_PER_QUESTION)
            .collect::<Vec<_>>();
        group.sort_by_key(|c| c.bounds.left());
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use imageproc::{point::Point, rect::Rect};

    use super::*;

    fn bubble(x: i32, y: i32) -> BubbleCandidate {
        BubbleCandidate::from_contour(vec![
            Point::new(x, y),
            Point::new(x + 21, y),
            Point::new(x + 21, y + 21),
            Point::new(x, y + 21),
        ])
        .expect("non-empty contour")
    }

    fn lefts(question: &Question) -> Vec<i32> {
        question.options.iter().map(|o| o.bounds.left()).collect()
    }

    #[test]
    fn sorts_rows_top_to_bottom_and_options_left_to_right() {
        let candidates = vec![
            bubble(130, 52),
            bubble(10, 10),
            bubble(90, 11),
            bubble(50, 50),
            bubble(130, 9),
            bubble(10, 51),
            bubble(50, 10),
            bubble(90, 50),
        ];

        let grid = organize_questions(candidates, RowGrouping::SortAndChunk);

        assert!(grid.skipped.is_empty());
        assert_eq!(grid.questions.len(), 2);
        assert_eq!(grid.questions[0].index, 0);
        assert_eq!(lefts(&grid.questions[0]), [10, 50, 90, 130]);
        assert_eq!(grid.questions[1].index, 1);
        assert_eq!(lefts(&grid.questions[1]), [10, 50, 90, 130]);
    }

    #[test]
    fn leftover_group_is_skipped() {
        let mut candidates = vec![];
        for row in 0..3 {
            for column in 0..4 {
                candidates.push(bubble(10 + 40 * column, 10 + 40 * row));
            }
        }
        // the last row is missing one bubble
        for column in 0..3 {
            candidates.push(bubble(10 + 40 * column, 130));
        }

        let grid = organize_questions(candidates, RowGrouping::SortAndChunk);

        assert_eq!(
            grid.questions.iter().map(|q| q.index).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        assert_eq!(grid.skipped, [3]);
    }

    fn tops(question: &Question) -> Vec<i32> {
        question.options.iter().map(|o| o.bounds.top()).collect()
    }

    #[test]
    fn banded_grouping_contains_a_short_row() {
        let mut candidates = vec![];
        for column in 0..3 {
            candidates.push(bubble(10 + 40 * column, 10));
        }
        for row in 1..3 {
            for column in 0..4 {
                candidates.push(bubble(10 + 40 * column, 10 + 50 * row));
            }
        }

        // chunking by four lets the short first row pull in the next row
        let chunked = organize_questions(candidates.clone(), RowGrouping::SortAndChunk);
        assert_eq!(tops(&chunked.questions[0]), [10, 60, 10, 10]);
        assert_eq!(chunked.skipped, [2]);

        let banded = organize_questions(candidates, RowGrouping::Banded { tolerance: 10 });
        assert_eq!(banded.skipped, [0]);
        assert_eq!(
            banded.questions.iter().map(|q| q.index).collect::<Vec<_>>(),
            [1, 2]
        );
        assert_eq!(tops(&banded.questions[0]), [60, 60, 60, 60]);
        assert_eq!(lefts(&banded.questions[0]), [10, 50, 90, 130]);
        assert_eq!(tops(&banded.questions[1]), [110, 110, 110, 110]);
    }

    #[test]
    fn bounds_drive_ordering() {
        let grid = organize_questions(
            vec![bubble(0, 0), bubble(30, 0), bubble(60, 0), bubble(90, 0)],
            RowGrouping::default(),
        );
        assert_eq!(
            grid.questions[0].options[3].bounds,
            Rect::at(90, 0).of_size(22, 22)
        );
    }
}
