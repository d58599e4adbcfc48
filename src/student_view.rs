//! Student side of the oracle: the question form and its submit flow.

use crate::client::{ClientError, OfficeHoursClient};
use crate::models::{QuestionResponse, QuestionSubmission, TaInfo};

pub const DEFAULT_COURSE: &str = "CS 300";

/// Course code and title, in the order offered to students.
pub const COURSES: [(&str, &str); 5] = [
    ("CS 200", "Programming I"),
    ("CS 300", "Programming II"),
    ("CS 354", "Machine Organization"),
    ("CS 400", "Data Structures"),
    ("CS 577", "Algorithms"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StudentName,
    Course,
    QuestionText,
    CodeSnippet,
    PreferredTa,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionForm {
    pub student_name: String,
    pub course: String,
    pub question_text: String,
    pub code_snippet: String,
    pub preferred_ta_id: Option<i64>,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self {
            student_name: String::new(),
            course: DEFAULT_COURSE.into(),
            question_text: String::new(),
            code_snippet: String::new(),
            preferred_ta_id: None,
        }
    }
}

impl QuestionForm {
    /// Update one field from raw input. The preferred TA takes an id; blank or
    /// non-numeric input means "no preference".
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::StudentName => self.student_name = value.into(),
            Field::Course => self.course = value.into(),
            Field::QuestionText => self.question_text = value.into(),
            Field::CodeSnippet => self.code_snippet = value.into(),
            Field::PreferredTa => self.preferred_ta_id = value.trim().parse().ok(),
        }
    }

    pub fn to_submission(&self) -> QuestionSubmission {
        QuestionSubmission {
            student_name: self.student_name.clone(),
            course: self.course.clone(),
            question_text: self.question_text.clone(),
            code_snippet: Some(self.code_snippet.clone()).filter(|c| !c.is_empty()),
            preferred_ta_id: self.preferred_ta_id,
        }
    }
}

/// State behind the student's question form.
#[derive(Debug, Default)]
pub struct StudentView {
    pub form: QuestionForm,
    tas: Vec<TaInfo>,
    response: Option<QuestionResponse>,
    error: Option<String>,
    loading: bool,
}

impl StudentView {
    pub fn tas(&self) -> &[TaInfo] {
        &self.tas
    }

    pub fn response(&self) -> Option<&QuestionResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the TA list; failures are logged and leave the list as it was.
    pub async fn load_tas(&mut self, client: &OfficeHoursClient) {
        match client.tas().await {
            Ok(tas) => self.tas = tas,
            Err(e) => tracing::error!(error = %e, "Failed to fetch TAs"),
        }
    }

    /// Submit the form. On success the response is kept and the form starts
    /// over; on failure the form is left untouched and the error is stored.
    pub async fn submit(&mut self, client: &OfficeHoursClient) -> Result<(), &str> {
        self.loading = true;
        self.error = None;
        self.response = None;

        let result = client.submit_question(&self.form.to_submission()).await;
        self.loading = false;
        match result {
            Ok(resp) => {
                tracing::info!(queue_id = resp.queue_id, ta = %resp.assigned_ta_name, "question queued");
                self.response = Some(resp);
                self.form = QuestionForm::default();
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    ClientError::Status { context, .. } => (*context).to_string(),
                    other => other.to_string(),
                };
                Err(self.error.insert(message).as_str())
            }
        }
    }
}

/// Lines describing a successful submission.
pub fn response_summary(resp: &QuestionResponse) -> Vec<String> {
    let mut lines = vec![
        format!("Category: {}", resp.category),
        format!("Summary: {}", resp.brief_summary),
        format!("Tags: {}", resp.tags.join(", ")),
        format!("Assigned TA: {}", resp.assigned_ta_name),
        format!("Estimated Wait: ~{} minutes", resp.estimated_wait_minutes),
    ];
    if !resp.similar_questions.is_empty() {
        lines.push(format!(
            "Your question is similar to {} previous question(s) in our knowledge base. \
             The TA will have suggested solution patterns ready!",
            resp.similar_questions.len()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn preferred_ta_parses_or_clears() {
        let mut form = QuestionForm::default();
        form.set(Field::PreferredTa, "3");
        assert_eq!(form.preferred_ta_id, Some(3));
        form.set(Field::PreferredTa, "");
        assert_eq!(form.preferred_ta_id, None);
        form.set(Field::PreferredTa, "abc");
        assert_eq!(form.preferred_ta_id, None);
    }

    #[test]
    fn blank_snippet_is_omitted() {
        let mut form = QuestionForm::default();
        form.set(Field::StudentName, "Ada");
        let sub = form.to_submission();
        assert_eq!(sub.course, DEFAULT_COURSE);
        assert_eq!(sub.code_snippet, None);
    }

    #[test]
    fn summary_mentions_similar_questions_only_when_present() {
        let mut resp = QuestionResponse {
            queue_id: 1,
            assigned_ta_name: "Sam".into(),
            estimated_wait_minutes: 10,
            category: "Recursion".into(),
            tags: vec!["base case".into(), "stack".into()],
            brief_summary: "Missing base case".into(),
            similar_questions: vec![],
        };
        let lines = response_summary(&resp);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "Tags: base case, stack");

        resp.similar_questions = vec![4, 8];
        let lines = response_summary(&resp);
        assert!(lines[5].contains("similar to 2 previous"));
    }

    #[tokio::test]
    async fn successful_submit_resets_form() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/questions");
                then.status(200).json_body(json!({
                    "queue_id": 3,
                    "assigned_ta_name": "Lee",
                    "estimated_wait_minutes": 15,
                    "category": "Graphs",
                    "tags": [],
                    "brief_summary": "BFS",
                    "similar_questions": []
                }));
            })
            .await;
        let client = OfficeHoursClient::new(server.base_url());
        let mut view = StudentView::default();
        view.form.set(Field::StudentName, "Ada");
        view.form.set(Field::Course, "CS 577");

        view.submit(&client).await.unwrap();
        assert_eq!(view.response().unwrap().queue_id, 3);
        assert_eq!(view.form, QuestionForm::default());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn failed_submit_keeps_form_and_reports() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/questions");
                then.status(500);
            })
            .await;
        let client = OfficeHoursClient::new(server.base_url());
        let mut view = StudentView::default();
        view.form.set(Field::StudentName, "Ada");

        let err = view.submit(&client).await.unwrap_err().to_string();
        assert_eq!(err, "Failed to submit question");
        assert_eq!(view.error(), Some("Failed to submit question"));
        assert_eq!(view.form.student_name, "Ada");
        assert!(view.response().is_none());
    }
}
