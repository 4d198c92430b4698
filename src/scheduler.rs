//! Depth-first worklist driver.
//!
//! Every task may change the tree and hand back continuations. A task's
//! continuations, and theirs in turn, are drained before its next sibling
//! runs.

/// Result of running one task.
#[derive(Debug)]
pub(crate) struct ModOutcome<T> {
    /// Whether the task changed the tree.
    pub(crate) changed: bool,
    pub(crate) continuations: Vec<T>,
}

impl<T> ModOutcome<T> {
    pub(crate) fn unchanged() -> Self {
        Self {
            changed: false,
            continuations: vec![],
        }
    }

    pub(crate) fn changed() -> Self {
        Self {
            changed: true,
            continuations: vec![],
        }
    }

    /// Read-only step that only schedules further work.
    pub(crate) fn then(continuations: Vec<T>) -> Self {
        Self {
            changed: false,
            continuations,
        }
    }

    pub(crate) fn and_then(mut self, continuations: Vec<T>) -> Self {
        self.continuations.extend(continuations);
        self
    }
}

/// A deferred unit of work.
pub(crate) trait LazyMod: Sized {
    type Context;

    fn name(&self) -> &'static str;

    fn apply(self, cx: &mut Self::Context) -> ModOutcome<Self>;
}

/// Runs `seed` and everything it schedules. Returns whether any task changed
/// the tree.
pub(crate) fn drain<T: LazyMod>(seed: Vec<T>, cx: &mut T::Context) -> bool {
    let mut dirty = false;
    let mut stack: Vec<T> = seed.into_iter().rev().collect();

    while let Some(task) = stack.pop() {
        let name = task.name();
        let outcome = task.apply(cx);

        tracing::trace!(
            task = name,
            changed = outcome.changed,
            continuations = outcome.continuations.len(),
            "ran task"
        );

        dirty |= outcome.changed;
        stack.extend(outcome.continuations.into_iter().rev());
    }

    dirty
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records its label and expands into its children.
    struct Node {
        label: &'static str,
        changes: bool,
        children: Vec<Node>,
    }

    fn leaf(label: &'static str) -> Node {
        Node {
            label,
            changes: false,
            children: vec![],
        }
    }

    fn node(label: &'static str, children: Vec<Node>) -> Node {
        Node {
            label,
            changes: false,
            children,
        }
    }

    impl LazyMod for Node {
        type Context = Vec<&'static str>;

        fn name(&self) -> &'static str {
            self.label
        }

        fn apply(self, cx: &mut Self::Context) -> ModOutcome<Self> {
            cx.push(self.label);
            ModOutcome {
                changed: self.changes,
                continuations: self.children,
            }
        }
    }

    #[test]
    fn continuations_run_before_later_siblings() {
        let mut order = vec![];
        let seed = vec![
            node("a", vec![node("a1", vec![leaf("a1x")]), leaf("a2")]),
            node("b", vec![leaf("b1")]),
        ];

        let dirty = drain(seed, &mut order);

        assert!(!dirty);
        assert_eq!(order, vec!["a", "a1", "a1x", "a2", "b", "b1"]);
    }

    #[test]
    fn any_change_marks_the_run_dirty() {
        let mut order = vec![];
        let mut changing = leaf("b1");
        changing.changes = true;

        assert!(drain(vec![leaf("a"), node("b", vec![changing])], &mut order));
        assert!(!drain(Vec::<Node>::new(), &mut order));
    }

    #[test]
    fn outcome_builders() {
        let outcome = ModOutcome::changed().and_then(vec![1, 2]);
        assert!(outcome.changed);
        assert_eq!(outcome.continuations, vec![1, 2]);

        let outcome: ModOutcome<u8> = ModOutcome::then(vec![3]);
        assert!(!outcome.changed);
        assert!(ModOutcome::<u8>::unchanged().continuations.is_empty());
    }
}
