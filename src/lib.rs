//! Grades photographed multiple-choice bubble sheets.
//!
//! A photo goes through a fixed sequence of stages: the sheet is located
//! ([`document`]) and warped to a top-down view ([`rectify`]), bubble-shaped
//! marks are found ([`bubbles`]) and arranged into questions ([`grid`]), the
//! filled option of each question is picked ([`marks`]), the picks are scored
//! against an answer key ([`score`]) and the result is drawn on the sheet
//! ([`annotate`]). [`grade::grade_sheet`] runs all of them.

pub mod annotate;
pub mod bubbles;
pub mod debug;
pub mod document;
pub mod exam;
pub mod geometry;
pub mod grade;
pub mod grid;
pub mod image_utils;
pub mod marks;
pub mod rectify;
pub mod score;
pub mod sheet;
pub mod types;

pub use exam::{AnswerKey, ExamDefinition, ExamDefinitionError, Subject, SubjectMap};
pub use grade::{
    grade_rectified_sheet, grade_sheet, grade_sheet_file, grade_sheet_files, GradeFileError,
    GradeOptions, GradeSheetError, GradedSheet, GradingResult,
};
pub use score::Score;
pub use sheet::{DetectionOptions, RowGrouping};
pub use types::{BubbleCandidate, Quadrilateral, Question, QuestionDecision, OPTIONS_PER_QUESTION};
