use serde::{Deserialize, Serialize};

/// How bubbles are grouped into rows before being split into questions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RowGrouping {
    /// Sort every bubble top to bottom and take them four at a time. Assumes
    /// rows are cleanly separated bands of exactly four bubbles.
    #[default]
    SortAndChunk,

    /// Start a new row whenever a bubble's top edge is more than `tolerance`
    /// pixels below the top edge of the row's first bubble.
    #[serde(rename_all = "camelCase")]
    Banded { tolerance: u32 },
}

/// Tuning for finding a sheet in a photo and the bubbles on it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionOptions {
    /// Sigma of the Gaussian blur applied before edge detection. Zero or
    /// less disables the blur.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Radius of the dilation that closes gaps in the edge map.
    pub edge_dilation: u8,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub polygon_tolerance: f32,
    /// Minimum bubble width and height in rectified pixels.
    pub min_bubble_size: u32,
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    pub row_grouping: RowGrouping,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            edge_dilation: 1,
            polygon_tolerance: 0.02,
            min_bubble_size: 20,
            min_aspect_ratio: 0.9,
            max_aspect_ratio: 1.1,
            row_grouping: RowGrouping::SortAndChunk,
        }
    }
}
