//! Bounded priority scheduler for roaming threats.

use last_protocol_core::PURSUER_LABEL;
use thiserror::Error;

/// Maximum number of threats pending at once.
pub const THREAT_CAPACITY: usize = 5;

/// A roaming hazard waiting in the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Threat {
    label: String,
    priority: u8,
}

impl Threat {
    /// Creates a threat; lower priority values are more urgent.
    #[must_use]
    pub fn new(label: impl Into<String>, priority: u8) -> Self {
        Self {
            label: label.into(),
            priority,
        }
    }

    /// Opaque label describing the threat.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Urgency of the threat.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        self.priority
    }

    /// Reports whether this is the pursuing threat that demands a bypass.
    #[must_use]
    pub fn is_pursuer(&self) -> bool {
        self.label == PURSUER_LABEL
    }

    /// Consumes the threat, yielding its label.
    #[must_use]
    pub fn into_label(self) -> String {
        self.label
    }
}

/// Error returned when the scheduler is at capacity; carries the rejected threat.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("threat queue is full; cannot add {}", .0.label())]
pub struct QueueFull(pub Threat);

/// Capacity-bounded queue ordered by ascending priority.
///
/// Selection is a plain linear scan that keeps the first entry whose priority
/// is strictly lower than everything scanned before it, so among equal
/// priorities the earliest inserted wins. Removal preserves the relative
/// order of the remaining entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreatScheduler {
    threats: Vec<Threat>,
}

impl ThreatScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a threat unless the scheduler already holds [`THREAT_CAPACITY`].
    pub fn enqueue(&mut self, threat: Threat) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull(threat));
        }
        self.threats.push(threat);
        Ok(())
    }

    /// Removes and returns the most urgent threat.
    pub fn dequeue(&mut self) -> Option<Threat> {
        let index = self.head_index()?;
        Some(self.threats.remove(index))
    }

    /// Most urgent threat, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&Threat> {
        self.head_index().and_then(|index| self.threats.get(index))
    }

    /// Reports whether no threats are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }

    /// Reports whether further threats would be rejected.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.threats.len() >= THREAT_CAPACITY
    }

    /// Number of pending threats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.threats.len()
    }

    fn head_index(&self) -> Option<usize> {
        let mut head: Option<usize> = None;
        for (index, threat) in self.threats.iter().enumerate() {
            match head {
                Some(current) if self.threats[current].priority <= threat.priority => {}
                _ => head = Some(index),
            }
        }
        head
    }
}
