/// Allowed successors per state, fixed at compile time.
///
/// A table is built once per machine kind and shared by `&'static` reference
/// across every machine of that kind. States without an entry have no
/// outgoing transitions.
#[derive(Debug)]
pub struct TransitionTable<S: 'static> {
    entries: &'static [(S, &'static [S])],
}

impl<S: Copy + PartialEq> TransitionTable<S> {
    pub const fn new(entries: &'static [(S, &'static [S])]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    pub fn successors(&self, state: S) -> &'static [S] {
        self.entries
            .iter()
            .find(|(from, _)| *from == state)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    pub fn allows(&self, from: S, to: S) -> bool {
        self.successors(from).contains(&to)
    }
}

/// Post-transition hook implemented by the owner of a machine.
///
/// Fires after the state has been mutated. Implementations emit cues only and
/// must not attempt further transitions.
pub trait StateHook<S> {
    fn on_state_changed(&mut self, new_state: S, old_state: S);
}

/// Hook for owners without any transition cues.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl<S> StateHook<S> for NoHook {
    fn on_state_changed(&mut self, _new_state: S, _old_state: S) {}
}

#[derive(Debug)]
pub struct StateMachine<S: 'static> {
    current: S,
    transitions: &'static TransitionTable<S>,
}

impl<S: Copy + PartialEq> StateMachine<S> {
    pub fn new(initial: S, transitions: &'static TransitionTable<S>) -> Self {
        Self {
            current: initial,
            transitions,
        }
    }

    pub fn state(&self) -> S {
        self.current
    }

    pub fn can_transition(&self, target: S) -> bool {
        target != self.current && self.transitions.allows(self.current, target)
    }

    /// Moves to `target` when the table allows it.
    ///
    /// Returns `false` and leaves everything untouched when `target` is the
    /// current state or not a listed successor. A rejected transition is an
    /// ordinary outcome, not an error.
    pub fn set_state(&mut self, target: S, hook: &mut impl StateHook<S>) -> bool {
        if !self.can_transition(target) {
            return false;
        }
        let old_state = self.current;
        self.current = target;
        hook.on_state_changed(target, old_state);
        true
    }
}
