//! Fan-out of per-frame scheduler calls over many machines.
//!
//! The host scheduler owns one [`MachineManager`] and calls
//! [`tick_all`](MachineManager::tick_all) /
//! [`trigger_periodic_all`](MachineManager::trigger_periodic_all) once
//! per frame; the manager forwards to every enabled machine. It also
//! exposes the domain-keyed transition API so application code can
//! address machines by domain name without holding references to them.

use std::collections::HashMap;

use strand_events::dispatcher::DispatchResult;

use crate::errors::{FsmError, Result};
use crate::machine::StateMachine;
use crate::types::{CallbackKind, TransitionPolicy};

struct ManagedMachine {
    machine: StateMachine,
    enabled: bool,
}

/// Owns state machines keyed by their domain name.
#[derive(Default)]
pub struct MachineManager {
    machines: HashMap<String, ManagedMachine>,
}

impl MachineManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a machine, keyed by its domain. Machines start enabled.
    ///
    /// Returns the previously registered machine for the same domain, if
    /// any.
    pub fn add(&mut self, machine: StateMachine) -> Option<StateMachine> {
        let domain = machine.domain().to_string();
        self.machines
            .insert(
                domain,
                ManagedMachine {
                    machine,
                    enabled: true,
                },
            )
            .map(|managed| managed.machine)
    }

    /// Remove and return the machine for `domain`.
    pub fn remove(&mut self, domain: &str) -> Option<StateMachine> {
        self.machines.remove(domain).map(|managed| managed.machine)
    }

    /// Borrow the machine for `domain`.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&StateMachine> {
        self.machines.get(domain).map(|managed| &managed.machine)
    }

    /// Mutably borrow the machine for `domain`.
    pub fn get_mut(&mut self, domain: &str) -> Option<&mut StateMachine> {
        self.machines
            .get_mut(domain)
            .map(|managed| &mut managed.machine)
    }

    /// Enable or disable a machine.
    ///
    /// Disabled machines are skipped by the frame fan-out
    /// (`tick_all`/`trigger_periodic_all`); direct domain-keyed calls
    /// still reach them.
    pub fn set_enabled(&mut self, domain: &str, enabled: bool) -> Result<()> {
        let managed = self
            .machines
            .get_mut(domain)
            .ok_or_else(|| FsmError::UnknownDomain(domain.to_string()))?;
        managed.enabled = enabled;
        Ok(())
    }

    /// Whether the machine for `domain` participates in the frame fan-out.
    pub fn is_enabled(&self, domain: &str) -> Result<bool> {
        self.machines
            .get(domain)
            .map(|managed| managed.enabled)
            .ok_or_else(|| FsmError::UnknownDomain(domain.to_string()))
    }

    /// Request a transition in `domain` under the Safe policy.
    pub fn change_state(&mut self, domain: &str, destination: &str) -> Result<bool> {
        self.change_state_with(domain, destination, TransitionPolicy::default())
    }

    /// Request a transition in `domain` under an explicit policy.
    pub fn change_state_with(
        &mut self,
        domain: &str,
        destination: &str,
        policy: TransitionPolicy,
    ) -> Result<bool> {
        self.lookup_mut(domain)?
            .change_state_with(destination, policy)
    }

    /// The active sub-state of `domain`.
    pub fn current_state(&self, domain: &str) -> Result<Option<&str>> {
        self.machines
            .get(domain)
            .map(|managed| managed.machine.current_state())
            .ok_or_else(|| FsmError::UnknownDomain(domain.to_string()))
    }

    /// Deliver a periodic callback to one domain's machine.
    pub fn trigger_periodic(
        &mut self,
        domain: &str,
        kind: CallbackKind,
    ) -> Result<DispatchResult> {
        self.lookup_mut(domain)?.trigger_periodic(kind)
    }

    /// Advance every enabled machine's in-flight transition by one frame.
    ///
    /// The first handler fault aborts the sweep and propagates.
    pub fn tick_all(&mut self) -> Result<()> {
        for managed in self.machines.values_mut() {
            if managed.enabled {
                managed.machine.tick()?;
            }
        }
        Ok(())
    }

    /// Deliver a periodic callback to every enabled machine.
    ///
    /// The first handler fault aborts the sweep and propagates.
    pub fn trigger_periodic_all(&mut self, kind: CallbackKind) -> Result<()> {
        for managed in self.machines.values_mut() {
            if managed.enabled {
                let _ = managed.machine.trigger_periodic(kind)?;
            }
        }
        Ok(())
    }

    /// Number of managed machines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether the manager holds no machines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// The managed domain names, sorted.
    #[must_use]
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.machines.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    fn lookup_mut(&mut self, domain: &str) -> Result<&mut StateMachine> {
        self.machines
            .get_mut(domain)
            .map(|managed| &mut managed.machine)
            .ok_or_else(|| FsmError::UnknownDomain(domain.to_string()))
    }
}

impl std::fmt::Debug for MachineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineManager")
            .field("machine_count", &self.machines.len())
            .finish()
    }
}
