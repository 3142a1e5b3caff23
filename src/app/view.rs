//! In-memory widget state.

use crate::domain::{StatusMessage, TipForm, TipView};

/// Widget state held in memory. Starts with the connect control shown and
/// the send control hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub status: Option<StatusMessage>,
    pub connect_visible: bool,
    pub send_visible: bool,
    pub recipient: String,
    pub amount: String,
    pub message: String,
}

impl WidgetView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: None,
            connect_visible: true,
            send_visible: false,
            recipient: String::new(),
            amount: String::new(),
            message: String::new(),
        }
    }

    /// Type into the three input fields.
    pub fn fill(
        &mut self,
        recipient: impl Into<String>,
        amount: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.recipient = recipient.into();
        self.amount = amount.into();
        self.message = message.into();
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }
}

impl Default for WidgetView {
    fn default() -> Self {
        Self::new()
    }
}

impl TipView for WidgetView {
    fn show_status(&mut self, status: &StatusMessage) {
        self.status = Some(status.clone());
    }

    fn set_connect_visible(&mut self, visible: bool) {
        self.connect_visible = visible;
    }

    fn set_send_visible(&mut self, visible: bool) {
        self.send_visible = visible;
    }

    fn read_form(&self) -> TipForm {
        TipForm::new(&self.recipient, self.amount.clone(), self.message.clone())
    }

    fn clear_form(&mut self) {
        self.recipient.clear();
        self.amount.clear();
        self.message.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_affordances() {
        let view = WidgetView::new();
        assert!(view.connect_visible);
        assert!(!view.send_visible);
        assert!(view.status.is_none());
    }

    #[test]
    fn test_status_overwrites_previous() {
        let mut view = WidgetView::new();
        view.show_status(&StatusMessage::info("first"));
        view.show_status(&StatusMessage::error("second"));
        assert_eq!(view.status, Some(StatusMessage::error("second")));
    }

    #[test]
    fn test_read_and_clear_form() {
        let mut view = WidgetView::new();
        view.fill("  alice.base.eth ", "0.01", "thanks");

        let form = view.read_form();
        assert_eq!(form.recipient, "alice.base.eth");
        assert_eq!(form.amount, "0.01");
        assert_eq!(form.message, "thanks");

        view.clear_form();
        assert_eq!(view.read_form(), TipForm::default());
    }
}
