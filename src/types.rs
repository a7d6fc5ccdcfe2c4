use imageproc::point::Point;
use imageproc::rect::Rect;
use serde::Serialize;

use crate::geometry::{bounding_rect, center_of_rect};

/// Every question on a sheet has exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// The four corners of a sheet as found in a photo.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quadrilateral {
    pub corners: [Point<f32>; 4],
}

impl Quadrilateral {
    pub const fn new(corners: [Point<f32>; 4]) -> Self {
        Self { corners }
    }

    /// Builds a quadrilateral from a polygon approximation. Anything other
    /// than exactly four vertices is not a quadrilateral.
    pub fn from_polygon(points: &[Point<i32>]) -> Option<Self> {
        match points {
            [a, b, c, d] => Some(Self::new([
                Point::new(a.x as f32, a.y as f32),
                Point::new(b.x as f32, b.y as f32),
                Point::new(c.x as f32, c.y as f32),
                Point::new(d.x as f32, d.y as f32),
            ])),
            _ => None,
        }
    }

    /// Orders the corners as top-left, top-right, bottom-right, bottom-left.
    ///
    /// The top-left corner has the smallest `x + y` and the bottom-right the
    /// largest; the top-right corner has the smallest `y - x` and the
    /// bottom-left the largest.
    pub fn ordered(&self) -> Self {
        fn sum(p: &Point<f32>) -> f32 {
            p.x + p.y
        }
        fn diff(p: &Point<f32>) -> f32 {
            p.y - p.x
        }

        let mut by_sum = self.corners;
        by_sum.sort_by(|a, b| sum(a).total_cmp(&sum(b)));
        let mut by_diff = self.corners;
        by_diff.sort_by(|a, b| diff(a).total_cmp(&diff(b)));

        Self::new([by_sum[0], by_diff[0], by_sum[3], by_diff[3]])
    }

    pub fn top_left(&self) -> Point<f32> {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point<f32> {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point<f32> {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point<f32> {
        self.corners[3]
    }
}

/// A shape on the sheet that is sized and proportioned like an answer bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleCandidate {
    pub contour: Vec<Point<i32>>,
    pub bounds: Rect,
}

impl BubbleCandidate {
    pub fn from_contour(contour: Vec<Point<i32>>) -> Option<Self> {
        let bounds = bounding_rect(&contour)?;
        Some(Self { contour, bounds })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.bounds.width() as f32 / self.bounds.height() as f32
    }

    pub fn center(&self) -> Point<f32> {
        center_of_rect(&self.bounds)
    }
}

/// One question: its position on the sheet and its options, left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub index: usize,
    pub options: [BubbleCandidate; OPTIONS_PER_QUESTION],
}

/// Which option, if any, was marked for a question, along with the filled
/// pixel count of every option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDecision {
    pub question: usize,
    pub selected: Option<usize>,
    pub fill_counts: [u32; OPTIONS_PER_QUESTION],
}
