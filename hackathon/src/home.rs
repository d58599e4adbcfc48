use crate::cards::{self, Card};
use crate::form::FormResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Chat,
    Form,
    Cards,
}

/// Top-level page state: which view is open and the latest form results.
#[derive(Debug, Default)]
pub struct Home {
    active: View,
    results: Vec<FormResult>,
}

impl Home {
    pub fn active(&self) -> View {
        self.active
    }

    pub fn select(&mut self, view: View) {
        self.active = view;
    }

    /// Replace the stored results with a fresh submission's output.
    pub fn set_results(&mut self, results: Vec<FormResult>) {
        self.results = results;
    }

    pub fn cards(&self) -> Vec<Card> {
        let items: Vec<Card> = self.results.iter().cloned().map(Card::from).collect();
        cards::cards_to_show(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_chat_with_sample_cards() {
        let home = Home::default();
        assert_eq!(home.active(), View::Chat);
        assert_eq!(home.cards().len(), 3);
    }

    #[test]
    fn new_results_replace_old_ones() {
        let mut home = Home::default();
        home.select(View::Cards);
        home.set_results(vec![FormResult {
            id: 1,
            topic: "a".into(),
            content: "x".into(),
        }]);
        home.set_results(vec![FormResult {
            id: 2,
            topic: "b".into(),
            content: "y".into(),
        }]);
        let cards = home.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title(), "b");
        assert_eq!(home.active(), View::Cards);
    }
}
