use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{imageops::grayscale, DynamicImage, RgbImage};
use log::{info, warn};
use logging_timer::time;
use rayon::prelude::*;
use rusttype::Font;
use serde::Serialize;
use thiserror::Error;

use crate::{
    annotate::annotate_sheet,
    bubbles::{binarize_sheet, find_bubble_candidates},
    debug::{
        draw_bubble_candidates_debug_image_mut, draw_question_grid_debug_image_mut,
        ImageDebugWriter,
    },
    document::locate_document,
    exam::{AnswerKey, ExamDefinition, SubjectMap},
    grid::organize_questions,
    image_utils::gray_to_rgb,
    marks::evaluate_questions,
    rectify::rectify_document,
    score::{score_decisions, Score},
    sheet::DetectionOptions,
    types::QuestionDecision,
};

/// Why a sheet could not be graded.
#[derive(Debug, Error)]
pub enum GradeSheetError {
    #[error("sheet not found: {reason}")]
    DocumentNotFound { reason: String },

    #[error("no bubbles found: {reason}")]
    NoBubblesFound { reason: String },
}

impl GradeSheetError {
    /// What the person taking the photo can do about it.
    pub fn advice(&self) -> &'static str {
        match self {
            GradeSheetError::DocumentNotFound { .. } => {
                "Make sure the entire sheet is visible, flat and well-lit, then try again."
            }
            GradeSheetError::NoBubblesFound { .. } => {
                "Use a sharper image with better lighting, then try again."
            }
        }
    }
}

/// Errors reading or writing sheet images and fonts.
#[derive(Debug, Error)]
pub enum GradeFileError {
    #[error("unable to open image {}: {source}", path.display())]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unable to save image {}: {source}", path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unable to read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a usable TrueType font", path.display())]
    InvalidFont { path: PathBuf },

    #[error(transparent)]
    Grade(#[from] GradeSheetError),
}

/// Everything one grading run needs. Nothing here is shared between runs.
#[derive(Clone, Default)]
pub struct GradeOptions {
    pub answer_key: AnswerKey,
    pub subjects: SubjectMap,
    pub detection: DetectionOptions,
    /// Font for the score text on the annotated sheet.
    pub font: Option<Font<'static>>,
}

impl GradeOptions {
    pub fn new(answer_key: AnswerKey, subjects: SubjectMap) -> Self {
        Self {
            answer_key,
            subjects,
            ..Self::default()
        }
    }

    pub fn from_exam(exam: &ExamDefinition) -> Self {
        Self {
            answer_key: exam.answer_key.clone(),
            subjects: exam.subjects.clone(),
            detection: exam.detection,
            font: None,
        }
    }

    pub fn with_font(self, font: Font<'static>) -> Self {
        Self {
            font: Some(font),
            ..self
        }
    }
}

/// The outcome of grading one sheet.
#[derive(Clone, Debug)]
pub struct GradingResult {
    score: Score,
    decisions: Vec<QuestionDecision>,
    skipped_questions: Vec<usize>,
    annotated_image: RgbImage,
}

impl GradingResult {
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Percentage of the answer key answered correctly, 0 to 100.
    pub fn total_score(&self) -> f32 {
        self.score.total_score
    }

    pub fn subject_scores(&self) -> &BTreeMap<String, u32> {
        &self.score.subject_scores
    }

    pub fn decisions(&self) -> &[QuestionDecision] {
        &self.decisions
    }

    /// Question positions that did not have exactly four bubbles and were
    /// left out of the score.
    pub fn skipped_questions(&self) -> &[usize] {
        &self.skipped_questions
    }

    pub fn annotated_image(&self) -> &RgbImage {
        &self.annotated_image
    }

    pub fn into_annotated_image(self) -> RgbImage {
        self.annotated_image
    }
}

/// Grades a photo of a sheet.
///
/// The score is only written on the annotated image when
/// [`GradeOptions::font`] is set (`--font` on the command line). Without a
/// font the image carries the answer outlines alone.
pub fn grade_sheet(
    image: &DynamicImage,
    options: &GradeOptions,
) -> Result<GradingResult, GradeSheetError> {
    grade_sheet_with_debug(image, options, &ImageDebugWriter::disabled())
}

#[time]
pub fn grade_sheet_with_debug(
    image: &DynamicImage,
    options: &GradeOptions,
    debug: &ImageDebugWriter,
) -> Result<GradingResult, GradeSheetError> {
    let photo = image.to_rgb8();
    let corners = locate_document(&photo, &options.detection, debug)?;
    let sheet = rectify_document(&photo, &corners)?;
    debug.write("rectified", || sheet.image.clone());
    grade_rectified_sheet(&sheet.image, options, debug)
}

#[time]
/// Grades a sheet that is already a top-down view, skipping the search for
/// the sheet in the photo.
pub fn grade_rectified_sheet(
    sheet: &RgbImage,
    options: &GradeOptions,
    debug: &ImageDebugWriter,
) -> Result<GradingResult, GradeSheetError> {
    let gray = grayscale(sheet);
    let binary = binarize_sheet(&gray);
    debug.write("binary", || gray_to_rgb(&binary));

    let candidates = find_bubble_candidates(&binary, &options.detection)?;
    debug.write("bubbles", || {
        let mut canvas = gray_to_rgb(&binary);
        draw_bubble_candidates_debug_image_mut(&mut canvas, &candidates);
        canvas
    });

    let grid = organize_questions(candidates, options.detection.row_grouping);
    debug.write("grid", || {
        let mut canvas = sheet.clone();
        draw_question_grid_debug_image_mut(&mut canvas, &grid);
        canvas
    });
    if !grid.skipped.is_empty() {
        warn!(
            "{} question(s) left out of the score: {:?}",
            grid.skipped.len(),
            grid.skipped
        );
    }

    let decisions = evaluate_questions(&grid.questions, &binary);
    let score = score_decisions(&decisions, &options.answer_key, &options.subjects);
    let annotated_image = annotate_sheet(
        sheet,
        &grid.questions,
        &decisions,
        &options.answer_key,
        &score,
        options.font.as_ref(),
    );

    Ok(GradingResult {
        score,
        decisions,
        skipped_questions: grid.skipped,
        annotated_image,
    })
}

/// A graded image file and where its annotated copy was written.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSheet {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub score: Score,
    pub skipped_questions: Vec<usize>,
    pub answers: Vec<QuestionDecision>,
}

/// Where the annotated copy of `input` goes. `run_id` and `index` keep names
/// unique across runs and between sheets that share a file name.
pub fn annotated_image_path(output_dir: &Path, input: &Path, run_id: u128, index: usize) -> PathBuf {
    output_dir.join(format!(
        "{}_graded_{}_{}.png",
        input.file_stem().unwrap_or_default().to_string_lossy(),
        run_id,
        index
    ))
}

/// Identifies one batch of grading runs.
pub fn new_run_id() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}

/// Opens and grades one image file, writing the annotated sheet to
/// `output` when given.
pub fn grade_sheet_file(
    input: &Path,
    output: Option<&Path>,
    options: &GradeOptions,
    debug: bool,
) -> Result<GradedSheet, GradeFileError> {
    let image = image::open(input).map_err(|source| GradeFileError::ImageOpen {
        path: input.to_path_buf(),
        source,
    })?;

    let debug = if debug {
        ImageDebugWriter::new(input.to_path_buf())
    } else {
        ImageDebugWriter::disabled()
    };

    let result = grade_sheet_with_debug(&image, options, &debug)?;
    info!(
        "{}: {:.2}% ({}/{})",
        input.display(),
        result.total_score(),
        result.score.correct,
        result.score.total_questions
    );

    if let Some(output) = output {
        result
            .annotated_image()
            .save(output)
            .map_err(|source| GradeFileError::ImageSave {
                path: output.to_path_buf(),
                source,
            })?;
    }

    Ok(GradedSheet {
        input: input.to_path_buf(),
        output: output.map(Path::to_path_buf),
        score: result.score,
        skipped_questions: result.skipped_questions,
        answers: result.decisions,
    })
}

#[time]
/// Grades independent sheets in parallel. Results come back in input order.
pub fn grade_sheet_files(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    options: &GradeOptions,
    debug: bool,
) -> Vec<Result<GradedSheet, GradeFileError>> {
    let run_id = new_run_id();
    inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| {
            let output = output_dir.map(|dir| annotated_image_path(dir, input, run_id, index));
            grade_sheet_file(input, output.as_deref(), options, debug)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_paths_are_unique_per_sheet() {
        let dir = Path::new("/out");
        let first = annotated_image_path(dir, Path::new("/a/sheet.jpg"), 42, 0);
        let second = annotated_image_path(dir, Path::new("/b/sheet.jpg"), 42, 1);

        assert_eq!(first, PathBuf::from("/out/sheet_graded_42_0.png"));
        assert_ne!(first, second);
    }

    #[test]
    fn errors_carry_a_readable_cause() {
        let err = GradeSheetError::DocumentNotFound {
            reason: "no outlines were found in the photo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sheet not found: no outlines were found in the photo"
        );
        assert!(err.advice().contains("entire sheet is visible"));

        let err = GradeFileError::from(GradeSheetError::NoBubblesFound {
            reason: "blank".to_string(),
        });
        assert_eq!(err.to_string(), "no bubbles found: blank");
    }

    #[test]
    fn missing_image_is_an_open_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = grade_sheet_file(
            &dir.path().join("missing.png"),
            None,
            &GradeOptions::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, GradeFileError::ImageOpen { .. }));
    }

    #[test]
    fn blank_photo_fails_with_document_not_found() {
        let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            200,
            200,
            image::Rgb([250, 250, 250]),
        ));
        let err = grade_sheet(&photo, &GradeOptions::default()).unwrap_err();
        assert!(matches!(err, GradeSheetError::DocumentNotFound { .. }));
    }

    #[test]
    fn blank_rectified_sheet_fails_with_no_bubbles() {
        let sheet = RgbImage::from_pixel(200, 300, image::Rgb([250, 250, 250]));
        let err = grade_rectified_sheet(
            &sheet,
            &GradeOptions::default(),
            &ImageDebugWriter::disabled(),
        )
        .unwrap_err();
        assert!(matches!(err, GradeSheetError::NoBubblesFound { .. }));
    }
}
