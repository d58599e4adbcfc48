use serde::{Deserialize, Serialize};

use crate::form::FormResult;

/// A displayable item. Form results and hand-made cards share this shape, so
/// both `title`/`description` and `topic`/`content` are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Card {
    pub fn title(&self) -> String {
        non_empty(&self.title)
            .or_else(|| non_empty(&self.topic))
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Item {}", self.id))
    }

    pub fn description(&self) -> &str {
        non_empty(&self.description)
            .or_else(|| non_empty(&self.content))
            .unwrap_or("No description available")
    }

    pub fn status_color(&self) -> Option<&'static str> {
        non_empty(&self.status).map(status_color)
    }
}

impl From<FormResult> for Card {
    fn from(result: FormResult) -> Self {
        Self {
            id: result.id,
            topic: Some(result.topic),
            content: Some(result.content),
            ..Self::default()
        }
    }
}

pub fn status_color(status: &str) -> &'static str {
    match status {
        "active" => "#48bb78",
        "pending" => "#ed8936",
        "completed" => "#4299e1",
        _ => "#a0aec0",
    }
}

/// Placeholder cards shown before anything has been generated.
pub fn sample_cards() -> Vec<Card> {
    [
        (1, "Sample Card 1", "This is a placeholder card", "active"),
        (2, "Sample Card 2", "Another placeholder", "pending"),
        (3, "Sample Card 3", "Third placeholder", "completed"),
    ]
    .into_iter()
    .map(|(id, title, description, status)| Card {
        id,
        title: Some(title.into()),
        description: Some(description.into()),
        status: Some(status.into()),
        ..Card::default()
    })
    .collect()
}

/// Items to display: `items` itself, or the sample cards when it is empty.
pub fn cards_to_show(items: &[Card]) -> Vec<Card> {
    if items.is_empty() {
        sample_cards()
    } else {
        items.to_vec()
    }
}

/// Plain-text rendering used by the command line shell.
pub fn render(card: &Card) -> String {
    let mut out = String::new();
    if let Some(status) = non_empty(&card.status) {
        out.push_str(&format!("[{status}] "));
    }
    out.push_str(&card.title());
    out.push('\n');
    out.push_str(card.description());
    out
}
