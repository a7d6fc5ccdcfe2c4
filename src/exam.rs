use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sheet::DetectionOptions;
use crate::types::OPTIONS_PER_QUESTION;

#[derive(Debug, Error)]
pub enum ExamDefinitionError {
    #[error("unable to read exam definition {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse exam definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question {question} has answer option {option}, but options run from 0 to {}", OPTIONS_PER_QUESTION - 1)]
    InvalidOption { question: usize, option: usize },

    #[error("subject {label:?} covers no questions ({start}..{end})")]
    EmptySubject {
        label: String,
        start: usize,
        end: usize,
    },

    #[error("subjects {first:?} and {second:?} cover some of the same questions")]
    OverlappingSubjects { first: String, second: String },

    #[error("subject {label:?} is defined more than once")]
    DuplicateSubject { label: String },
}

/// The correct option for each graded question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<usize, usize>", into = "BTreeMap<usize, usize>")]
pub struct AnswerKey(BTreeMap<usize, usize>);

impl AnswerKey {
    pub fn new(answers: BTreeMap<usize, usize>) -> Result<Self, ExamDefinitionError> {
        if let Some((&question, &option)) = answers
            .iter()
            .find(|(_, option)| **option >= OPTIONS_PER_QUESTION)
        {
            return Err(ExamDefinitionError::InvalidOption { question, option });
        }
        Ok(Self(answers))
    }

    /// Builds a key where question `i` is answered by `options[i]`.
    pub fn from_options(options: &[usize]) -> Result<Self, ExamDefinitionError> {
        Self::new(options.iter().copied().enumerate().collect())
    }

    pub fn correct_option(&self, question: usize) -> Option<usize> {
        self.0.get(&question).copied()
    }

    /// Number of questions this key grades.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&question, &option)| (question, option))
    }
}

impl TryFrom<BTreeMap<usize, usize>> for AnswerKey {
    type Error = ExamDefinitionError;

    fn try_from(answers: BTreeMap<usize, usize>) -> Result<Self, Self::Error> {
        Self::new(answers)
    }
}

impl From<AnswerKey> for BTreeMap<usize, usize> {
    fn from(key: AnswerKey) -> Self {
        key.0
    }
}

/// A named section of the sheet covering questions `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Subject {
    pub fn new(label: impl Into<String>, questions: Range<usize>) -> Self {
        Self {
            label: label.into(),
            start: questions.start,
            end: questions.end,
        }
    }

    pub fn questions(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, question: usize) -> bool {
        self.questions().contains(&question)
    }
}

/// Subjects in the order they were defined. No two subjects share a label or
/// a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Subject>", into = "Vec<Subject>")]
pub struct SubjectMap(Vec<Subject>);

impl SubjectMap {
    pub fn new(subjects: Vec<Subject>) -> Result<Self, ExamDefinitionError> {
        if let Some(subject) = subjects.iter().find(|s| s.start >= s.end) {
            return Err(ExamDefinitionError::EmptySubject {
                label: subject.label.clone(),
                start: subject.start,
                end: subject.end,
            });
        }

        let mut labels = BTreeSet::new();
        if let Some(subject) = subjects.iter().find(|s| !labels.insert(s.label.as_str())) {
            return Err(ExamDefinitionError::DuplicateSubject {
                label: subject.label.clone(),
            });
        }

        let mut by_start = subjects.iter().collect::<Vec<_>>();
        by_start.sort_by_key(|s| s.start);
        if let Some(pair) = by_start.windows(2).find(|w| w[1].start < w[0].end) {
            return Err(ExamDefinitionError::OverlappingSubjects {
                first: pair[0].label.clone(),
                second: pair[1].label.clone(),
            });
        }

        Ok(Self(subjects))
    }

    /// Splits questions `0..count * size` into `count` subjects of `size`
    /// questions, labeled "Subject 1", "Subject 2", and so on.
    pub fn uniform(count: usize, size: usize) -> Result<Self, ExamDefinitionError> {
        Self::new(
            (0..count)
                .map(|i| Subject::new(format!("Subject {}", i + 1), i * size..(i + 1) * size))
                .collect(),
        )
    }

    pub fn subject_for(&self, question: usize) -> Option<&Subject> {
        self.0.iter().find(|s| s.contains(question))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Subject>> for SubjectMap {
    type Error = ExamDefinitionError;

    fn try_from(subjects: Vec<Subject>) -> Result<Self, Self::Error> {
        Self::new(subjects)
    }
}

impl From<SubjectMap> for Vec<Subject> {
    fn from(subjects: SubjectMap) -> Self {
        subjects.0
    }
}

/// Everything needed to grade one kind of sheet, as stored in an exam
/// definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDefinition {
    pub title: String,
    pub answer_key: AnswerKey,
    #[serde(default)]
    pub subjects: SubjectMap,
    #[serde(default)]
    pub detection: DetectionOptions,
}

impl ExamDefinition {
    pub fn from_json(json: &str) -> Result<Self, ExamDefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ExamDefinitionError> {
        let json = std::fs::read_to_string(path).map_err(|source| ExamDefinitionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
