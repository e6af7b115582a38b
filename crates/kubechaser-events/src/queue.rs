// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! FIFO event buffer between producers and the owning loop.
//!
//! Unbounded on the push side and non-blocking on the pop side: the owning
//! loop polls at a fixed cadence and an empty queue simply yields `None`.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::event::{EventType, ResourceEvent};
use kubechaser_layout::{ResourceKind, ResourceSignature, ResourceStatus};

#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<ResourceEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ResourceEvent) {
        self.events.lock().push_back(event);
    }

    /// Build and enqueue an event from its parts
    pub fn push_event(
        &self,
        event_type: EventType,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        owned_by: Vec<ResourceSignature>,
        status: ResourceStatus,
    ) {
        self.push(ResourceEvent::new(
            event_type, kind, name, namespace, owned_by, status,
        ));
    }

    /// Oldest event, or `None` immediately if the queue is empty
    pub fn pop(&self) -> Option<ResourceEvent> {
        self.events.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}
