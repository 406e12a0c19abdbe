//! In-memory backend. Every creation, event triple and destruction lands in a
//! shared [`Journal`], which makes the emitted protocol observable without a
//! kernel. Creation failures, external removal and failed teardown can be
//! injected.

use super::{EventSink, GamepadBackend, VirtualControllerConfig};
use crate::error::CreationError;
use evdev::{EventType, InputEvent};
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event_type: EventType,
    pub code: u16,
    pub value: i32,
}

impl RecordedEvent {
    pub fn is_sync(&self) -> bool {
        self.event_type == EventType::SYNCHRONIZATION
    }
}

impl From<&InputEvent> for RecordedEvent {
    fn from(ev: &InputEvent) -> Self {
        Self {
            event_type: ev.event_type(),
            code: ev.code(),
            value: ev.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    Created { index: usize, name: String, vendor: u16 },
    Event { index: usize, event: RecordedEvent },
    Destroyed { index: usize },
    DestroyFailed { index: usize },
}

#[derive(Debug, Default)]
struct JournalState {
    entries: Vec<JournalEntry>,
    unplugged: HashSet<usize>,
}

/// Shared log of everything the recording backend saw.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Arc<Mutex<JournalState>>,
}

impl Journal {
    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, entry: JournalEntry) {
        self.lock().entries.push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().entries.clone()
    }

    /// Events emitted by the controller at `index`, in order.
    pub fn events_for(&self, index: usize) -> Vec<RecordedEvent> {
        self.lock()
            .entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Event { index: i, event } if *i == index => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|e| matches!(e, JournalEntry::Event { .. }))
            .count()
    }

    pub fn created(&self) -> Vec<usize> {
        self.lock()
            .entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Created { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn destroy_failures(&self) -> Vec<usize> {
        self.lock()
            .entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::DestroyFailed { index } => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<usize> {
        self.lock()
            .entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Destroyed { index } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Simulates the device at `index` being removed behind our back:
    /// every later write or sync on it fails.
    pub fn unplug(&self, index: usize) {
        self.lock().unplugged.insert(index);
    }

    fn is_unplugged(&self, index: usize) -> bool {
        self.lock().unplugged.contains(&index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    journal: Journal,
    unavailable: HashSet<usize>,
    rejected: HashSet<usize>,
    undestroyable: HashSet<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creation at `index` fails as if `/dev/uinput` could not be opened.
    pub fn unavailable_at(mut self, index: usize) -> Self {
        self.unavailable.insert(index);
        self
    }

    /// Creation at `index` fails as if the kernel rejected registration.
    pub fn rejected_at(mut self, index: usize) -> Self {
        self.rejected.insert(index);
        self
    }

    /// Teardown of the device at `index` fails as if UI_DEV_DESTROY errored.
    pub fn destroy_fails_at(mut self, index: usize) -> Self {
        self.undestroyable.insert(index);
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl GamepadBackend for RecordingBackend {
    type Sink = RecordingGamepad;

    fn create(&mut self, config: &VirtualControllerConfig) -> Result<RecordingGamepad, CreationError> {
        let index = config.index;
        if self.unavailable.contains(&index) {
            return Err(CreationError::ResourceUnavailable {
                index,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "uinput not accessible"),
            });
        }
        if self.rejected.contains(&index) {
            return Err(CreationError::RegistrationFailed {
                index,
                source: io::Error::new(io::ErrorKind::InvalidInput, "UI_DEV_CREATE rejected"),
            });
        }

        self.journal.push(JournalEntry::Created {
            index,
            name: config.identity.name.clone(),
            vendor: config.identity.vendor,
        });
        Ok(RecordingGamepad {
            index,
            journal: self.journal.clone(),
            fail_destroy: self.undestroyable.contains(&index),
        })
    }
}

pub struct RecordingGamepad {
    index: usize,
    journal: Journal,
    fail_destroy: bool,
}

impl RecordingGamepad {
    fn record(&self, event: RecordedEvent) -> io::Result<()> {
        if self.journal.is_unplugged(self.index) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "device removed"));
        }
        self.journal.push(JournalEntry::Event {
            index: self.index,
            event,
        });
        Ok(())
    }
}

impl EventSink for RecordingGamepad {
    fn write(&mut self, event: InputEvent) -> io::Result<()> {
        self.record(RecordedEvent::from(&event))
    }

    fn sync(&mut self) -> io::Result<()> {
        self.record(RecordedEvent {
            event_type: EventType::SYNCHRONIZATION,
            code: 0, // SYN_REPORT
            value: 0,
        })
    }

    fn destroy(self) -> io::Result<()> {
        if self.fail_destroy {
            self.journal.push(JournalEntry::DestroyFailed { index: self.index });
            return Err(io::Error::new(io::ErrorKind::Other, "UI_DEV_DESTROY failed"));
        }
        self.journal.push(JournalEntry::Destroyed { index: self.index });
        Ok(())
    }
}
