/// Horizontal travel (in pixels) a touch must exceed to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 50.0;

/// Full-view overlay state over the flat image list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lightbox {
    #[default]
    Closed,
    Open(usize),
}

impl Lightbox {
    pub fn is_open(&self) -> bool {
        matches!(self, Lightbox::Open(_))
    }

    pub fn index(&self) -> Option<usize> {
        match *self {
            Lightbox::Open(i) => Some(i),
            Lightbox::Closed => None,
        }
    }

    /// Open at `index`. Out-of-range indices leave the state untouched.
    pub fn open(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        *self = Lightbox::Open(index);
        true
    }

    /// Move by `delta` without wrapping. No-op when closed or out of range.
    pub fn step(&mut self, delta: isize, len: usize) -> bool {
        let Lightbox::Open(current) = *self else {
            return false;
        };
        match current.checked_add_signed(delta) {
            Some(next) => self.open(next, len),
            None => false,
        }
    }

    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        *self = Lightbox::Closed;
        was_open
    }
}

/// Step direction for a touch that started at `start_x` and ended at `end_x`.
/// A leftward swipe advances.
pub fn swipe_direction(start_x: f64, end_x: f64) -> Option<isize> {
    let delta = start_x - end_x;
    if delta.abs() > SWIPE_THRESHOLD {
        Some(if delta > 0.0 { 1 } else { -1 })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        assert_eq!(Lightbox::default(), Lightbox::Closed);
        assert_eq!(Lightbox::default().index(), None);
    }

    #[test]
    fn open_in_bounds() {
        let mut lb = Lightbox::Closed;
        assert!(lb.open(2, 3));
        assert_eq!(lb, Lightbox::Open(2));
    }

    #[test]
    fn open_out_of_bounds_keeps_closed() {
        let mut lb = Lightbox::Closed;
        assert!(!lb.open(3, 3));
        assert_eq!(lb, Lightbox::Closed);
        assert!(!lb.open(0, 0));
        assert_eq!(lb, Lightbox::Closed);
    }

    #[test]
    fn open_out_of_bounds_keeps_prior_index() {
        let mut lb = Lightbox::Open(1);
        assert!(!lb.open(10, 3));
        assert_eq!(lb, Lightbox::Open(1));
    }

    #[test]
    fn step_moves_within_bounds() {
        let mut lb = Lightbox::Open(1);
        assert!(lb.step(1, 3));
        assert_eq!(lb, Lightbox::Open(2));
        assert!(lb.step(-1, 3));
        assert_eq!(lb, Lightbox::Open(1));
    }

    #[test]
    fn step_never_wraps() {
        let mut lb = Lightbox::Open(0);
        assert!(!lb.step(-1, 3));
        assert_eq!(lb, Lightbox::Open(0));

        let mut lb = Lightbox::Open(2);
        assert!(!lb.step(1, 3));
        assert_eq!(lb, Lightbox::Open(2));
    }

    #[test]
    fn step_while_closed_is_noop() {
        let mut lb = Lightbox::Closed;
        assert!(!lb.step(1, 3));
        assert_eq!(lb, Lightbox::Closed);
    }

    #[test]
    fn close_is_unconditional() {
        let mut lb = Lightbox::Open(1);
        assert!(lb.close());
        assert_eq!(lb, Lightbox::Closed);
        assert!(!lb.close());
        assert_eq!(lb, Lightbox::Closed);
    }

    #[test]
    fn swipe_needs_more_than_threshold() {
        assert_eq!(swipe_direction(100.0, 50.0), None);
        assert_eq!(swipe_direction(100.0, 49.0), Some(1));
        assert_eq!(swipe_direction(0.0, 51.0), Some(-1));
        assert_eq!(swipe_direction(10.0, 10.0), None);
    }
}
