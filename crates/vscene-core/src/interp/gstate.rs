//! The graphics-state stack the interpreter threads through `save`/`restore`
//! pairs (§4.1), modeled on the save/push-clone, pop/restore shape of PDF- and
//! SVG-like imaging models.

use kurbo::Affine;

use crate::color::ColorInput;

/// The graphics state visible to path-construction and paint operators.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsState {
    pub ctm: Affine,
    pub line_width: f64,
    pub stroke_color: ColorInput,
    pub stroke_alpha: f64,
    pub fill_color: ColorInput,
    pub fill_alpha: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            line_width: 1.0,
            stroke_color: ColorInput::Gray(0.0),
            stroke_alpha: 1.0,
            fill_color: ColorInput::Gray(0.0),
            fill_alpha: 1.0,
        }
    }
}

/// Save/restore stack of [`GraphicsState`] values. `restore` on an empty stack is a
/// no-op, matching the interpreter's local, non-propagating error policy (§4.1, §7):
/// an unbalanced `restore` is an anomaly to tally, not a reason to abort the page.
#[derive(Debug, Default)]
pub struct GraphicsStateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Returns `false` if `restore` was called with no matching `save` (unbalanced
    /// restore, counted by the caller as an anomaly rather than propagated).
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(s) => {
                self.current = s;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let s = GraphicsStateStack::new();
        assert_eq!(s.current().ctm, Affine::IDENTITY);
        assert_eq!(s.current().line_width, 1.0);
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut s = GraphicsStateStack::new();
        s.save();
        s.current_mut().line_width = 4.0;
        assert_eq!(s.current().line_width, 4.0);
        assert!(s.restore());
        assert_eq!(s.current().line_width, 1.0);
    }

    #[test]
    fn test_unbalanced_restore_is_noop() {
        let mut s = GraphicsStateStack::new();
        assert!(!s.restore());
        assert_eq!(s.current().line_width, 1.0);
    }

    #[test]
    fn test_nested_save_restore() {
        let mut s = GraphicsStateStack::new();
        s.save();
        s.current_mut().line_width = 2.0;
        s.save();
        s.current_mut().line_width = 3.0;
        assert_eq!(s.depth(), 2);
        assert!(s.restore());
        assert_eq!(s.current().line_width, 2.0);
        assert!(s.restore());
        assert_eq!(s.current().line_width, 1.0);
        assert_eq!(s.depth(), 0);
    }
}
