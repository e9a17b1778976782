//! The transition engine.
//!
//! A [`StateMachine`] binds a named state domain to a shared
//! [`EventDispatcher`] and delivers every lifecycle callback as a
//! dispatcher trigger on a synthesized event name
//! (`<prefix>_<domain>_<subState>_<kind>`).
//!
//! # Transition sequencing
//!
//! A transition runs Exit(old) → Finally(old) → assign → Enter(new).
//! Exit and Enter listeners may defer routines through the argument
//! buffer; the engine then suspends and the host scheduler drives the
//! remaining work by calling [`StateMachine::tick`] once per frame.
//! Routine-free transitions complete synchronously inside
//! [`StateMachine::change_state`].
//!
//! # Conflicting requests
//!
//! See [`TransitionPolicy`] for how requests interact with an in-flight
//! transition: Safe requests override the destination during the exit
//! phase but queue (at most one, newest wins) behind the enter phase;
//! Overwrite abandons in-flight work at its suspension point.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use strand_events::args::EventArgs;
use strand_events::dispatcher::{DispatchResult, EventDispatcher};
use strand_events::routine::{Routine, RoutineStep};

use crate::errors::{FsmError, Result};
use crate::slot::StateSlot;
use crate::types::{CallbackKind, MachineConfig, TransitionPolicy, event_name};

/// Meta-state of the transition engine itself.
enum Phase {
    Idle,
    /// Driving the Exit routines of the state being left.
    Exiting(Vec<Box<dyn Routine>>),
    /// Driving the Enter routines of the destination state.
    Entering(Vec<Box<dyn Routine>>),
}

/// A coroutine-driven finite state machine over a declared domain of
/// sub-states.
///
/// The machine never owns its dispatcher; the same dispatcher instance
/// may serve many machines and many unrelated listeners.
pub struct StateMachine {
    domain: String,
    events: Arc<EventDispatcher>,
    config: MachineConfig,
    slots: HashMap<String, StateSlot>,
    /// Active sub-state; `None` before the first transition completes its
    /// exit phase, and after an Overwrite abandons the active state.
    current: Option<String>,
    phase: Phase,
    /// Destination of the in-flight transition. Overridable by Safe
    /// requests while the exit phase runs.
    destination: Option<String>,
    /// At most one Safe request queued behind an in-flight enter phase;
    /// re-issued as a fresh `change_state` when the transition completes.
    queued_retry: Option<String>,
}

impl StateMachine {
    /// Build a machine for `domain` with the given legal sub-states.
    ///
    /// Fails with [`FsmError::EmptyDomain`] if `states` yields nothing.
    pub fn new<S>(
        domain: impl Into<String>,
        states: impl IntoIterator<Item = S>,
        events: Arc<EventDispatcher>,
        config: MachineConfig,
    ) -> Result<Self>
    where
        S: Into<String>,
    {
        let domain = domain.into();
        let slots: HashMap<String, StateSlot> = states
            .into_iter()
            .map(|s| {
                let name = s.into();
                (name.clone(), StateSlot::new(name))
            })
            .collect();
        if slots.is_empty() {
            return Err(FsmError::EmptyDomain(domain));
        }
        Ok(Self {
            domain,
            events,
            config,
            slots,
            current: None,
            phase: Phase::Idle,
            destination: None,
            queued_retry: None,
        })
    }

    /// The domain name this machine governs.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The declared sub-states, sorted by name.
    #[must_use]
    pub fn states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        states.sort_unstable();
        states
    }

    /// The active sub-state, or `None` before the first transition.
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether a transition is in flight (exit or enter phase).
    #[must_use]
    pub fn is_in_transition(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// The dispatcher this machine publishes its callbacks to.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// The machine's configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Request a transition under the default [`TransitionPolicy::Safe`]
    /// policy.
    pub fn change_state(&mut self, destination: &str) -> Result<bool> {
        self.change_state_with(destination, TransitionPolicy::default())
    }

    /// Request a transition to `destination`.
    ///
    /// Returns `Ok(false)` without firing any callback when `destination`
    /// is already the active sub-state. Fails fast with
    /// [`FsmError::UnknownState`] for values outside the domain.
    ///
    /// Under [`TransitionPolicy::Safe`] with a transition in flight, a
    /// request during the exit phase replaces the in-flight destination
    /// (only the newest request wins once exit completes); a request
    /// during the enter phase is queued (at most one, newest wins) and
    /// re-issues itself once the transition completes. The two phases
    /// deliberately behave differently: enter logic may already have
    /// caused external side effects and is never aborted by a Safe
    /// request.
    ///
    /// Under [`TransitionPolicy::Overwrite`], in-flight exit/enter
    /// routines are dropped at their suspension point, Finally fires on
    /// the active state if there is one, and a fresh transition starts.
    /// The abandoned state's Exit never fires.
    pub fn change_state_with(
        &mut self,
        destination: &str,
        policy: TransitionPolicy,
    ) -> Result<bool> {
        if !self.slots.contains_key(destination) {
            return Err(FsmError::UnknownState {
                domain: self.domain.clone(),
                state: destination.to_string(),
            });
        }
        if self.current.as_deref() == Some(destination) {
            return Ok(false);
        }
        self.queued_retry = None;

        match policy {
            TransitionPolicy::Safe => {
                if matches!(self.phase, Phase::Exiting(_)) {
                    debug!(
                        domain = %self.domain,
                        to = destination,
                        "overriding in-flight destination during exit"
                    );
                    self.destination = Some(destination.to_string());
                    return Ok(true);
                }
                if matches!(self.phase, Phase::Entering(_)) {
                    debug!(
                        domain = %self.domain,
                        to = destination,
                        "queueing behind in-flight enter"
                    );
                    self.queued_retry = Some(destination.to_string());
                    return Ok(true);
                }
            }
            TransitionPolicy::Overwrite => {
                if self.is_in_transition() {
                    warn!(
                        domain = %self.domain,
                        to = destination,
                        "abandoning in-flight transition"
                    );
                }
                // Dropping the phase abandons suspended routines at their
                // current resume point.
                self.phase = Phase::Idle;
                self.destination = None;
                if let Some(active) = self.current.take() {
                    let finally = self.callback_name(&active, CallbackKind::Finally);
                    let _ = self.events.trigger(&finally, &mut EventArgs::empty())?;
                }
            }
        }

        let outcome = self.begin(destination.to_string());
        if outcome.is_err() {
            self.reset_engine();
        }
        outcome.map(|()| true)
    }

    /// Advance any in-flight transition by one frame.
    ///
    /// The host's per-frame scheduler calls this once per tick. Each
    /// active routine is resumed once; when a phase's routines all
    /// complete, the transition advances (Finally/assign/Enter after the
    /// exit phase, completion after the enter phase). A no-op while idle.
    pub fn tick(&mut self) -> Result<()> {
        let outcome = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => return Ok(()),
            Phase::Exiting(mut routines) => {
                routines.retain_mut(|r| r.resume() == RoutineStep::Yielded);
                if routines.is_empty() {
                    self.complete_exit()
                } else {
                    self.phase = Phase::Exiting(routines);
                    return Ok(());
                }
            }
            Phase::Entering(mut routines) => {
                routines.retain_mut(|r| r.resume() == RoutineStep::Yielded);
                if routines.is_empty() {
                    self.complete_transition()
                } else {
                    self.phase = Phase::Entering(routines);
                    return Ok(());
                }
            }
        };
        if outcome.is_err() {
            self.reset_engine();
        }
        outcome
    }

    /// Deliver a periodic callback (Update/LateUpdate/FixedUpdate) to the
    /// active sub-state.
    ///
    /// Returns [`DispatchResult::NoListeners`] without dispatching when
    /// there is no active sub-state, or when
    /// [`MachineConfig::periodic_only_in_transition`] is set and no
    /// transition is in flight. Non-periodic kinds fail with
    /// [`FsmError::NotPeriodic`].
    pub fn trigger_periodic(&mut self, kind: CallbackKind) -> Result<DispatchResult> {
        if !kind.is_periodic() {
            return Err(FsmError::NotPeriodic(kind));
        }
        let Some(active) = self.current.clone() else {
            return Ok(DispatchResult::NoListeners);
        };
        if self.config.periodic_only_in_transition && !self.is_in_transition() {
            return Ok(DispatchResult::NoListeners);
        }
        let name = self.callback_name(&active, kind);
        Ok(self.events.trigger(&name, &mut EventArgs::empty())?)
    }

    /// Start the Exit→Finally→assign→Enter sequence toward `dest`.
    fn begin(&mut self, dest: String) -> Result<()> {
        debug!(
            domain = %self.domain,
            from = self.current.as_deref().unwrap_or("<none>"),
            to = %dest,
            "transition started"
        );
        self.destination = Some(dest);
        match self.current.clone() {
            Some(from) => {
                let exit = self.callback_name(&from, CallbackKind::Exit);
                let mut args = EventArgs::empty();
                let _ = self.events.trigger(&exit, &mut args)?;
                let routines = args.take_deferred();
                if routines.is_empty() {
                    self.complete_exit()
                } else {
                    self.phase = Phase::Exiting(routines);
                    Ok(())
                }
            }
            // No prior state: neither Exit nor Finally fires.
            None => self.enter_destination(),
        }
    }

    /// Exit phase finished: fire Finally on the state being left, then
    /// move to the destination.
    fn complete_exit(&mut self) -> Result<()> {
        if let Some(from) = self.current.clone() {
            let finally = self.callback_name(&from, CallbackKind::Finally);
            let _ = self.events.trigger(&finally, &mut EventArgs::empty())?;
        }
        self.enter_destination()
    }

    /// Assign the (possibly overridden) destination and start its Enter
    /// sequence.
    fn enter_destination(&mut self) -> Result<()> {
        let Some(dest) = self.destination.take() else {
            self.phase = Phase::Idle;
            return Ok(());
        };
        // Re-entering a sub-state invalidates its cached trigger names.
        if let Some(slot) = self.slots.get_mut(&dest) {
            slot.invalidate();
        }
        self.current = Some(dest.clone());

        let enter = self.callback_name(&dest, CallbackKind::Enter);
        let mut args = EventArgs::empty();
        let _ = self.events.trigger(&enter, &mut args)?;
        let routines = args.take_deferred();
        if routines.is_empty() {
            self.complete_transition()
        } else {
            self.phase = Phase::Entering(routines);
            Ok(())
        }
    }

    /// Enter phase finished: the transition is done; a queued Safe
    /// request re-issues itself now.
    fn complete_transition(&mut self) -> Result<()> {
        self.phase = Phase::Idle;
        self.destination = None;
        debug!(
            domain = %self.domain,
            state = self.current.as_deref().unwrap_or("<none>"),
            "transition complete"
        );
        if let Some(retry) = self.queued_retry.take() {
            let _ = self.change_state_with(&retry, TransitionPolicy::Safe)?;
        }
        Ok(())
    }

    /// The cached synthesized event name for a state callback.
    fn callback_name(&mut self, state: &str, kind: CallbackKind) -> String {
        match self.slots.get_mut(state) {
            Some(slot) => slot
                .trigger_name(&self.config.event_prefix, &self.domain, kind)
                .to_string(),
            None => event_name(&self.config.event_prefix, &self.domain, state, kind),
        }
    }

    /// Drop in-flight bookkeeping after a failed transition; `current`
    /// keeps whatever value the sequence had reached.
    fn reset_engine(&mut self) {
        self.phase = Phase::Idle;
        self.destination = None;
        self.queued_retry = None;
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("domain", &self.domain)
            .field("current", &self.current)
            .field("in_transition", &self.is_in_transition())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn make_machine(states: &[&str]) -> StateMachine {
        StateMachine::new(
            "game",
            states.iter().copied(),
            Arc::new(EventDispatcher::new()),
            MachineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_domain_is_rejected() {
        let err = StateMachine::new(
            "game",
            Vec::<String>::new(),
            Arc::new(EventDispatcher::new()),
            MachineConfig::default(),
        )
        .unwrap_err();
        assert_matches!(err, FsmError::EmptyDomain(domain) if domain == "game");
    }

    #[test]
    fn unknown_state_fails_fast() {
        let mut machine = make_machine(&["Play"]);
        let err = machine.change_state("Bogus").unwrap_err();
        assert_matches!(err, FsmError::UnknownState { state, .. } if state == "Bogus");
        assert_eq!(machine.current_state(), None);
    }

    #[test]
    fn current_state_is_none_before_first_transition() {
        let machine = make_machine(&["Play", "Pause"]);
        assert_eq!(machine.current_state(), None);
        assert!(!machine.is_in_transition());
    }

    #[test]
    fn first_transition_assigns_current() {
        let mut machine = make_machine(&["Play", "Pause"]);
        assert!(machine.change_state("Play").unwrap());
        assert_eq!(machine.current_state(), Some("Play"));
        assert!(!machine.is_in_transition());
    }

    #[test]
    fn same_state_request_is_a_no_op() {
        let mut machine = make_machine(&["Play", "Pause"]);
        let _ = machine.change_state("Play").unwrap();
        assert!(!machine.change_state("Play").unwrap());
    }

    #[test]
    fn states_are_listed_sorted() {
        let machine = make_machine(&["Pause", "Play", "Over"]);
        assert_eq!(machine.states(), vec!["Over", "Pause", "Play"]);
    }

    #[test]
    fn non_periodic_kind_is_rejected_by_trigger_periodic() {
        let mut machine = make_machine(&["Play"]);
        let _ = machine.change_state("Play").unwrap();
        let err = machine.trigger_periodic(CallbackKind::Enter).unwrap_err();
        assert_matches!(err, FsmError::NotPeriodic(CallbackKind::Enter));
    }

    #[test]
    fn periodic_without_current_state_is_silent() {
        let mut machine = make_machine(&["Play"]);
        let result = machine.trigger_periodic(CallbackKind::Update).unwrap();
        assert_eq!(result, DispatchResult::NoListeners);
    }

    #[test]
    fn debug_reports_domain_and_state() {
        let machine = make_machine(&["Play"]);
        let debug = format!("{machine:?}");
        assert!(debug.contains("StateMachine"));
        assert!(debug.contains("game"));
    }
}
