use glam::Vec2;

/// Pointer travel, in physical pixels, below which a press and release count as a click
/// rather than a drag.
pub const CLICK_THRESHOLD: f32 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    press_origin: Option<Vec2>,
    dragged: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known position, `None` once the pointer has left the window.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Records a new position and returns the movement since the previous one.
    pub fn moved(&mut self, position: Vec2) -> Option<Vec2> {
        let delta = self.position.map(|previous| position - previous);
        self.position = Some(position);

        // Travel counts even if the pointer returns to where the press started.
        if let Some(origin) = self.press_origin {
            self.dragged |= position.distance(origin) >= CLICK_THRESHOLD;
        }

        delta
    }

    pub fn left(&mut self) {
        self.position = None;
    }

    pub fn press(&mut self) {
        self.press_origin = self.position;
        self.dragged = false;
    }

    /// Ends a press. Returns true when it was a click.
    pub fn release(&mut self) -> bool {
        let dragged = std::mem::take(&mut self.dragged);
        let Some(origin) = self.press_origin.take() else {
            return false;
        };

        !dragged
            && self
                .position
                .is_some_and(|position| position.distance(origin) < CLICK_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_travel_is_a_click() {
        let mut pointer = PointerState::new();
        pointer.moved(Vec2::new(100.0, 100.0));
        pointer.press();
        pointer.moved(Vec2::new(102.0, 101.0));

        assert!(pointer.release());
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut pointer = PointerState::new();
        pointer.moved(Vec2::new(100.0, 100.0));
        pointer.press();
        pointer.moved(Vec2::new(160.0, 100.0));

        assert!(!pointer.release());
    }

    #[test]
    fn test_drag_returning_to_start_is_not_a_click() {
        let mut pointer = PointerState::new();
        pointer.moved(Vec2::new(400.0, 300.0));
        pointer.press();
        pointer.moved(Vec2::new(700.0, 300.0));
        pointer.moved(Vec2::new(400.0, 300.0));

        assert!(!pointer.release());

        // The next press starts clean.
        pointer.press();
        pointer.moved(Vec2::new(401.0, 300.0));
        assert!(pointer.release());
    }

    #[test]
    fn test_release_without_press() {
        let mut pointer = PointerState::new();
        pointer.moved(Vec2::new(10.0, 10.0));
        assert!(!pointer.release());

        pointer.press();
        assert!(pointer.release());
        // The press is consumed.
        assert!(!pointer.release());
    }

    #[test]
    fn test_moved_reports_delta() {
        let mut pointer = PointerState::new();
        assert_eq!(pointer.moved(Vec2::new(1.0, 1.0)), None);
        assert_eq!(pointer.moved(Vec2::new(4.0, 5.0)), Some(Vec2::new(3.0, 4.0)));

        pointer.left();
        assert_eq!(pointer.position(), None);
    }
}
