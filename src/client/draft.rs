// src/client/draft.rs

use crate::{
    error::ValidationError,
    models::answer_key::{AnswerKeyPayload, AnswerKeySpec, AnswerKeyView, GradingScale},
    utils::answer_key::{key_progress, normalize, random_key, total_marks},
};

/// Edit buffer behind the "set answer key" and "edit answer key" forms.
///
/// `total_marks` has no setter: it follows `num_questions` and
/// `mark_per_question` on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerKeyDraft {
    course_code: String,
    course_name: String,
    num_questions: i32,
    mark_per_question: i32,
    answer_key: String,
    negative_marking: bool,
    negative_points: f64,
    total_marks: i32,
    grading_scale: GradingScale,
}

impl Default for AnswerKeyDraft {
    fn default() -> Self {
        Self {
            course_code: String::new(),
            course_name: String::new(),
            num_questions: 20,
            mark_per_question: 1,
            answer_key: String::new(),
            negative_marking: false,
            negative_points: 0.25,
            total_marks: 20,
            grading_scale: GradingScale::Standard,
        }
    }
}

impl AnswerKeyDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing an existing key.
    pub fn from_view(view: &AnswerKeyView) -> Self {
        let mut draft = Self {
            course_code: view.course_code.clone(),
            course_name: view.course_name.clone(),
            num_questions: view.num_questions,
            mark_per_question: view.mark_per_question,
            answer_key: normalize(&view.answer_key),
            negative_marking: view.negative_marking,
            negative_points: view.negative_points,
            total_marks: 0,
            grading_scale: view.grading_scale,
        };
        draft.recompute_total();
        draft
    }

    pub fn set_course_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.course_code = code.into();
        self
    }

    pub fn set_course_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.course_name = name.into();
        self
    }

    pub fn set_num_questions(&mut self, n: i32) -> &mut Self {
        self.num_questions = n;
        self.recompute_total();
        self
    }

    pub fn set_mark_per_question(&mut self, mark: i32) -> &mut Self {
        self.mark_per_question = mark;
        self.recompute_total();
        self
    }

    /// Stores the typed text already normalized.
    pub fn set_answer_key(&mut self, raw: &str) -> &mut Self {
        self.answer_key = normalize(raw);
        self
    }

    pub fn set_negative_marking(&mut self, enabled: bool, points: f64) -> &mut Self {
        self.negative_marking = enabled;
        self.negative_points = points;
        self
    }

    pub fn set_grading_scale(&mut self, scale: GradingScale) -> &mut Self {
        self.grading_scale = scale;
        self
    }

    /// Fills the key with random letters for the current question count.
    pub fn fill_random_key(&mut self) -> &mut Self {
        self.answer_key = random_key(usize::try_from(self.num_questions).unwrap_or(0));
        self
    }

    pub fn answer_key(&self) -> &str {
        &self.answer_key
    }

    pub fn num_questions(&self) -> i32 {
        self.num_questions
    }

    pub fn total_marks(&self) -> i32 {
        self.total_marks
    }

    /// Live "current/total" counter.
    pub fn progress(&self) -> (usize, i32) {
        key_progress(&self.answer_key, self.num_questions)
    }

    /// Validates the buffer and builds the request body.
    ///
    /// A `ValidationError` here blocks the save call.
    pub fn submit(&self) -> Result<AnswerKeyPayload, ValidationError> {
        let mut payload = AnswerKeyPayload {
            course_code: self.course_code.clone(),
            course_name: self.course_name.clone(),
            num_questions: self.num_questions,
            mark_per_question: self.mark_per_question,
            answer_key: self.answer_key.clone(),
            negative_marking: self.negative_marking,
            negative_points: self.negative_points,
            total_marks: None,
            grading_scale: self.grading_scale,
            author: None,
        };
        let spec = AnswerKeySpec::try_from(&payload)?;
        payload.course_code = spec.course_code;
        payload.course_name = spec.course_name;
        payload.answer_key = spec.answer_key;
        payload.total_marks = Some(spec.total_marks);
        Ok(payload)
    }

    fn recompute_total(&mut self) {
        self.total_marks = total_marks(self.num_questions, self.mark_per_question);
    }
}
