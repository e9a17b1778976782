//! # strand-fsm
//!
//! Coroutine-driven finite state machine built entirely on the
//! `strand-events` dispatcher.
//!
//! ## Model
//!
//! A [`StateMachine`](machine::StateMachine) governs one named domain of
//! declared sub-states. Every lifecycle callback (Enter, Exit, Finally,
//! Update, LateUpdate, FixedUpdate) is delivered as a dispatcher trigger
//! on a synthesized event name (`<prefix>_<domain>_<subState>_<kind>`),
//! so components react to state changes by registering ordinary
//! listeners.
//!
//! Enter and Exit listeners may span multiple frames by deferring
//! [`Routine`](strand_events::routine::Routine)s through the argument
//! buffer; the transition engine suspends and the host scheduler drives
//! the remaining work through [`tick`](machine::StateMachine::tick).
//! Conflicting requests against an in-flight transition resolve under
//! the [`Safe`](types::TransitionPolicy::Safe) or
//! [`Overwrite`](types::TransitionPolicy::Overwrite) policy.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use strand_events::dispatcher::EventDispatcher;
//! use strand_fsm::machine::StateMachine;
//! use strand_fsm::types::MachineConfig;
//!
//! let events = Arc::new(EventDispatcher::new());
//! let _ = events.listen("FSM_game_Play_Enter", |_| {}).unwrap();
//!
//! let mut machine = StateMachine::new(
//!     "game",
//!     ["Play", "Pause"],
//!     Arc::clone(&events),
//!     MachineConfig::default(),
//! )
//! .unwrap();
//! let _ = machine.change_state("Play").unwrap();
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod machine;
pub mod manager;
pub mod types;

mod slot;
