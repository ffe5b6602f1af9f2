//! Hover-driven highlight state.
//!
//! The state is a boolean per input. Its length tracks the current input
//! list length, never the (possibly lagging) matrix dimension.

/// A transition of the highlight state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightAction {
    /// Size the state to `len` with nothing highlighted.
    Reset(usize),

    /// Highlight exactly these indices.
    Set(Vec<usize>),
}

/// Pointer interaction with the rendered matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Pointer left the matrix area.
    LeaveMatrix,

    /// Pointer entered the empty top-left header cell.
    EnterCorner,

    /// Pointer entered a column header.
    EnterColumnHeader(usize),

    /// Pointer entered a row header.
    EnterRowHeader(usize),

    /// Pointer entered a data cell.
    EnterCell { row: usize, col: usize },
}

impl PointerEvent {
    /// Translate the event into a transition for a list of length `len`.
    pub fn action(self, len: usize) -> HighlightAction {
        match self {
            Self::LeaveMatrix | Self::EnterCorner => HighlightAction::Reset(len),
            Self::EnterColumnHeader(col) => HighlightAction::Set(vec![col]),
            Self::EnterRowHeader(row) => HighlightAction::Set(vec![row]),
            Self::EnterCell { row, col } if row == col => HighlightAction::Set(vec![row]),
            Self::EnterCell { row, col } => HighlightAction::Set(vec![row, col]),
        }
    }
}

/// Highlight flags, one per input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    flags: Vec<bool>,
}

impl HighlightState {
    /// Nothing highlighted, sized for `len` inputs.
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    /// Apply a transition.
    ///
    /// `Set` keeps the current length; indices at or past it come from a
    /// matrix rendered for an older, longer list and are dropped.
    pub fn apply(&mut self, action: HighlightAction) {
        match action {
            HighlightAction::Reset(len) => {
                self.flags.clear();
                self.flags.resize(len, false);
            }
            HighlightAction::Set(indices) => {
                self.flags.fill(false);
                for index in indices {
                    if let Some(flag) = self.flags.get_mut(index) {
                        *flag = true;
                    }
                }
            }
        }
    }

    /// Apply a pointer event.
    pub fn on_pointer(&mut self, event: PointerEvent) {
        let action = event.action(self.len());
        self.apply(action);
    }

    /// Whether `index` is highlighted.
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Highlighted indices in ascending order.
    pub fn highlighted(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    /// The flags.
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether there are no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
