//! Auto-scroll / pause state of the live feed panel.

use serde::{Deserialize, Serialize};

/// Scrolling this far from the top pauses auto-scroll.
pub const AUTO_SCROLL_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedView {
    pub auto_scroll: bool,
    pub offset: u32,
}

impl Default for FeedView {
    fn default() -> Self {
        Self { auto_scroll: true, offset: 0 }
    }
}

impl FeedView {
    /// The user scrolled the panel to `offset`.
    pub fn on_scroll(&mut self, offset: u32) {
        self.offset = offset;
        self.auto_scroll = offset < AUTO_SCROLL_THRESHOLD;
    }

    /// Pause/Resume button. Resuming jumps back to the top.
    /// Returns whether the panel should reset its scroll position.
    pub fn toggle_pause(&mut self) -> bool {
        self.auto_scroll = !self.auto_scroll;
        self.pin_to_top()
    }

    /// "Scroll to Latest Alerts".
    pub fn scroll_to_latest(&mut self) {
        self.offset = 0;
        self.auto_scroll = true;
    }

    /// The buffer changed. Returns whether the panel should reset its scroll position.
    pub fn on_buffer_mutation(&mut self) -> bool {
        self.pin_to_top()
    }

    pub fn shows_scroll_to_latest(&self) -> bool {
        !self.auto_scroll
    }

    fn pin_to_top(&mut self) -> bool {
        if self.auto_scroll {
            self.offset = 0;
        }
        self.auto_scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrolling_away_disables_auto_scroll() {
        let mut view = FeedView::default();
        view.on_scroll(120);
        assert!(!view.auto_scroll);
        assert!(view.shows_scroll_to_latest());
        assert!(!view.on_buffer_mutation());
        assert_eq!(view.offset, 120);
    }

    #[test]
    fn test_small_scroll_keeps_auto_scroll() {
        let mut view = FeedView::default();
        view.on_scroll(49);
        assert!(view.auto_scroll);
        view.on_scroll(AUTO_SCROLL_THRESHOLD);
        assert!(!view.auto_scroll);
    }

    #[test]
    fn test_scroll_to_latest_re_enables() {
        let mut view = FeedView::default();
        view.on_scroll(300);
        view.scroll_to_latest();
        assert_eq!(view, FeedView { auto_scroll: true, offset: 0 });
    }

    #[test]
    fn test_mutation_resets_offset_while_auto_scrolling() {
        let mut view = FeedView::default();
        view.on_scroll(30);
        assert!(view.on_buffer_mutation());
        assert_eq!(view.offset, 0);
    }

    #[test]
    fn test_pause_then_resume() {
        let mut view = FeedView::default();
        assert!(!view.toggle_pause());
        assert!(!view.auto_scroll);
        view.offset = 80;
        assert!(view.toggle_pause());
        assert_eq!(view.offset, 0);
    }
}
