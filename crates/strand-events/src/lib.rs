//! # strand-events
//!
//! Weighted, short-circuiting event dispatcher for composing object
//! behavior out of independent fragments.
//!
//! ## Model
//!
//! Handlers register explicitly against named events with an integer
//! weight; lower weights run first and ties keep registration order.
//! Filters are listeners at a negative default weight, so they observe
//! and rewrite the shared [`EventArgs`](args::EventArgs) buffer before
//! plain listeners consume it. Any listener can stop the chain by
//! returning `Ok(false)`.
//!
//! Dispatch is synchronous and runs to completion within one scheduler
//! tick. Multi-frame work is expressed as a [`Routine`](routine::Routine)
//! deferred through the argument buffer and driven by the triggering
//! party on later frames.
//!
//! ## Example
//!
//! ```rust
//! use strand_events::args::EventArgs;
//! use strand_events::dispatcher::EventDispatcher;
//!
//! let events = EventDispatcher::new();
//! let id = events.listen("spawn", |_args| {}).unwrap();
//! let _ = events.trigger("spawn", &mut EventArgs::empty()).unwrap();
//! events.unregister(id).unwrap();
//! ```

#![deny(unsafe_code)]

pub mod args;
pub mod dispatcher;
pub mod errors;
pub mod listener;
pub mod routine;

mod table;
