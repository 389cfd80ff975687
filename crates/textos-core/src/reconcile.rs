//! Overflow reconciliation.
//!
//! The paginator only estimates heights, so a page can still overflow once the host lays it
//! out for real. The host reports measured heights; a page whose measurement exceeds the content
//! box by more than the tolerance forces a full re-pagination and a caret restore.
//!
//! Per-surface state machine:
//!
//! ```text
//! Clean --edit--> Editing --overflow--> Reconciling --caret restored--> Clean
//!                    \------- fits ----------------------------------> Clean
//! ```
//!
//! While `Reconciling`, further overflow checks are deferred to the next idle tick instead of
//! starting a second rebuild.

/// Whether a measured page height overflows the content box.
pub fn check_overflow(measured_height: f64, content_height: f64, tolerance: f64) -> bool {
    measured_height > content_height + tolerance
}

/// Reconciliation state of one editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileState {
    /// Layout matches content; nothing pending.
    #[default]
    Clean,
    /// A page was edited locally and has not been checked yet.
    Editing,
    /// An overflow was found; the rebuild is done but the caret has not been restored yet.
    Reconciling,
}

/// Verdict of a single overflow check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowVerdict {
    /// The page fits; nothing to do.
    Fits,
    /// The page overflows and a reconciliation was started.
    Overflow,
    /// A reconciliation is already in flight; check again on the next tick.
    Deferred,
}

/// Tracks the reconcile state machine and the caret to restore afterwards.
#[derive(Debug, Clone, Default)]
pub struct OverflowReconciler {
    state: ReconcileState,
    restore_caret: Option<usize>,
    reconcile_count: u64,
}

impl OverflowReconciler {
    /// Create a reconciler in the `Clean` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Number of reconciliations started so far.
    pub fn reconcile_count(&self) -> u64 {
        self.reconcile_count
    }

    /// Caret offset waiting to be restored, if a reconciliation is in flight.
    pub fn pending_restore(&self) -> Option<usize> {
        self.restore_caret
    }

    /// A page was edited locally.
    pub fn mark_edited(&mut self) {
        if self.state == ReconcileState::Clean {
            self.state = ReconcileState::Editing;
        }
    }

    /// Evaluate a measured height. On overflow the reconciler enters `Reconciling` and
    /// remembers `caret` for the restore step.
    pub fn evaluate(
        &mut self,
        measured_height: f64,
        content_height: f64,
        tolerance: f64,
        caret: usize,
    ) -> OverflowVerdict {
        if self.state == ReconcileState::Reconciling {
            return OverflowVerdict::Deferred;
        }
        if !check_overflow(measured_height, content_height, tolerance) {
            self.state = ReconcileState::Clean;
            return OverflowVerdict::Fits;
        }

        tracing::debug!(
            measured_height,
            content_height,
            tolerance,
            caret,
            "page overflow detected"
        );
        self.state = ReconcileState::Reconciling;
        self.restore_caret = Some(caret);
        self.reconcile_count += 1;
        OverflowVerdict::Overflow
    }

    /// Finish an in-flight reconciliation, returning the caret offset to restore.
    pub fn finish(&mut self) -> Option<usize> {
        if self.state != ReconcileState::Reconciling {
            return None;
        }
        self.state = ReconcileState::Clean;
        self.restore_caret.take()
    }

    /// Drop any in-flight work (the document was replaced wholesale).
    pub fn reset(&mut self) {
        self.state = ReconcileState::Clean;
        self.restore_caret = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_overflow_tolerance() {
        assert!(!check_overflow(1003.0, 1003.0, 10.0));
        assert!(!check_overflow(1013.0, 1003.0, 10.0));
        assert!(check_overflow(1013.5, 1003.0, 10.0));
    }

    #[test]
    fn test_state_machine() {
        let mut reconciler = OverflowReconciler::new();
        assert_eq!(reconciler.state(), ReconcileState::Clean);

        reconciler.mark_edited();
        assert_eq!(reconciler.state(), ReconcileState::Editing);

        assert_eq!(
            reconciler.evaluate(2000.0, 1003.0, 10.0, 42),
            OverflowVerdict::Overflow
        );
        assert_eq!(reconciler.state(), ReconcileState::Reconciling);

        // A second check while reconciling is deferred, and editing does not leave the state.
        assert_eq!(
            reconciler.evaluate(2000.0, 1003.0, 10.0, 7),
            OverflowVerdict::Deferred
        );
        reconciler.mark_edited();
        assert_eq!(reconciler.state(), ReconcileState::Reconciling);

        assert_eq!(reconciler.finish(), Some(42));
        assert_eq!(reconciler.state(), ReconcileState::Clean);
        assert_eq!(reconciler.finish(), None);
        assert_eq!(reconciler.reconcile_count(), 1);
    }

    #[test]
    fn test_fitting_page_settles_editing() {
        let mut reconciler = OverflowReconciler::new();
        reconciler.mark_edited();
        assert_eq!(
            reconciler.evaluate(100.0, 1003.0, 10.0, 0),
            OverflowVerdict::Fits
        );
        assert_eq!(reconciler.state(), ReconcileState::Clean);
        assert_eq!(reconciler.reconcile_count(), 0);
    }
}
