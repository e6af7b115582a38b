// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Cluster - owning loop over the event queue and layout engine.

Each `tick()` first runs a garbage-collection sweep when the tick number is
a multiple of `collect_every_ticks`, then pops up to `events_per_pop` events
when it is a multiple of `pop_every_ticks`. Tick 0 does both.
*/

use std::sync::Arc;
use tracing::{debug, info};

use kubechaser_config::{KubechaserConfig, RuntimeConfig};
use kubechaser_events::{EventQueue, EventType, ResourceEvent};
use kubechaser_layout::{
    CollectReport, LayoutEngine, LayoutResult, LayoutSettings, Reservation, VisualBackend,
};

/// What a single event did to the layout
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Placed { row_index: usize, merged_rows: usize },
    Duplicate,
    Updated,
    FadeStarted,
    /// Modify or delete for a resource not in the table (or already fading)
    Ignored(EventType),
}

/// Work done during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub dispatched: Vec<DispatchOutcome>,
    pub collected: Option<CollectReport>,
}

pub struct Cluster<B: VisualBackend> {
    engine: LayoutEngine<B>,
    queue: Arc<EventQueue>,
    runtime: RuntimeConfig,
    ticks: u64,
}

impl<B: VisualBackend> Cluster<B> {
    pub fn new(
        settings: LayoutSettings,
        runtime: RuntimeConfig,
        backend: B,
        queue: Arc<EventQueue>,
    ) -> Self {
        info!(
            target: "kubechaser-runtime",
            "Cluster loop: pop {} event(s) every {} ticks, collect every {} ticks",
            runtime.events_per_pop,
            runtime.pop_every_ticks,
            runtime.collect_every_ticks
        );
        Self {
            engine: LayoutEngine::new(settings, backend),
            queue,
            runtime,
            ticks: 0,
        }
    }

    /// Build from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if the `[layout]` section cannot be turned into settings
    pub fn from_config(
        config: &KubechaserConfig,
        backend: B,
        queue: Arc<EventQueue>,
    ) -> LayoutResult<Self> {
        let settings = LayoutSettings::from_config(&config.layout)?;
        Ok(Self::new(settings, config.runtime.clone(), backend, queue))
    }

    pub fn engine(&self) -> &LayoutEngine<B> {
        &self.engine
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advance the loop by one tick
    pub fn tick(&mut self) -> TickReport {
        let tick = self.ticks;
        self.ticks += 1;

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        if tick % self.runtime.collect_every_ticks.max(1) == 0 {
            report.collected = Some(self.engine.collect());
        }

        if tick % self.runtime.pop_every_ticks.max(1) == 0 {
            for _ in 0..self.runtime.events_per_pop.max(1) {
                let Some(event) = self.queue.pop() else {
                    break;
                };
                report.dispatched.push(self.dispatch(event));
            }
        }

        report
    }

    /// Apply one event to the layout engine
    pub fn dispatch(&self, event: ResourceEvent) -> DispatchOutcome {
        debug!(
            target: "kubechaser-runtime",
            "Dispatching {} {}", event.event_type, event.signature
        );

        match event.event_type {
            EventType::Create => {
                match self
                    .engine
                    .reserve(event.signature, event.owned_by, event.status)
                {
                    Reservation::Duplicate => DispatchOutcome::Duplicate,
                    Reservation::Placed {
                        row_index,
                        merged_rows,
                        ..
                    } => DispatchOutcome::Placed {
                        row_index,
                        merged_rows,
                    },
                }
            }
            EventType::Modify => {
                if self.engine.update_status(&event.signature, event.status) {
                    DispatchOutcome::Updated
                } else {
                    DispatchOutcome::Ignored(EventType::Modify)
                }
            }
            EventType::Delete => {
                if self.engine.mark_deleting(&event.signature) {
                    DispatchOutcome::FadeStarted
                } else {
                    DispatchOutcome::Ignored(EventType::Delete)
                }
            }
        }
    }

    /// Dispatch every queued event now, ignoring the tick cadence
    pub fn drain(&self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.queue.pop() {
            outcomes.push(self.dispatch(event));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubechaser_layout::{HeadlessBackend, ResourceKind, ResourceSignature, ResourceStatus};

    fn cluster(runtime: RuntimeConfig) -> Cluster<HeadlessBackend> {
        Cluster::new(
            LayoutSettings::default(),
            runtime,
            HeadlessBackend::new(),
            Arc::new(EventQueue::new()),
        )
    }

    fn push(cluster: &Cluster<HeadlessBackend>, event_type: EventType, name: &str) {
        cluster.queue().push_event(
            event_type,
            ResourceKind::Deployment,
            name,
            "default",
            Vec::new(),
            ResourceStatus::Opaque,
        );
    }

    #[test]
    fn test_default_cadence() {
        let mut cluster = cluster(RuntimeConfig::default());
        for i in 0..3 {
            push(&cluster, EventType::Create, &format!("d{}", i));
        }

        let reports: Vec<TickReport> = (0..21).map(|_| cluster.tick()).collect();

        let popped_on: Vec<u64> = reports
            .iter()
            .filter(|r| !r.dispatched.is_empty())
            .map(|r| r.tick)
            .collect();
        let collected_on: Vec<u64> = reports
            .iter()
            .filter(|r| r.collected.is_some())
            .map(|r| r.tick)
            .collect();

        assert_eq!(popped_on, vec![0, 10, 20]);
        assert_eq!(collected_on, vec![0, 20]);
        assert_eq!(cluster.tick_count(), 21);
        assert_eq!(cluster.engine().len(), 3);
    }

    #[test]
    fn test_events_per_pop() {
        let mut cluster = cluster(RuntimeConfig {
            pop_every_ticks: 1,
            collect_every_ticks: 1,
            events_per_pop: 2,
        });
        for i in 0..3 {
            push(&cluster, EventType::Create, &format!("d{}", i));
        }

        assert_eq!(cluster.tick().dispatched.len(), 2);
        assert_eq!(cluster.tick().dispatched.len(), 1);
        assert!(cluster.tick().dispatched.is_empty());
    }

    #[test]
    fn test_dispatch_outcomes() {
        let cluster = cluster(RuntimeConfig::default());
        push(&cluster, EventType::Modify, "d1");
        push(&cluster, EventType::Create, "d1");
        push(&cluster, EventType::Create, "d1");
        push(&cluster, EventType::Modify, "d1");
        push(&cluster, EventType::Delete, "d1");
        push(&cluster, EventType::Delete, "d1");

        let outcomes = cluster.drain();

        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Ignored(EventType::Modify),
                DispatchOutcome::Placed {
                    row_index: 0,
                    merged_rows: 0
                },
                DispatchOutcome::Duplicate,
                DispatchOutcome::Updated,
                DispatchOutcome::FadeStarted,
                DispatchOutcome::Ignored(EventType::Delete),
            ]
        );
        assert!(cluster.queue().is_empty());
    }

    #[test]
    fn test_collect_runs_before_pop() {
        let mut cluster = cluster(RuntimeConfig {
            pop_every_ticks: 1,
            collect_every_ticks: 1,
            events_per_pop: 1,
        });
        let d1 = ResourceSignature::new(ResourceKind::Deployment, "d1", "default");
        push(&cluster, EventType::Create, "d1");
        cluster.tick();
        push(&cluster, EventType::Delete, "d1");
        cluster.tick();
        cluster.engine().with_backend(|b| b.complete_all_fades());

        let report = cluster.tick();

        assert_eq!(report.collected.unwrap().evicted, vec![d1.clone()]);
        assert!(!cluster.engine().contains(&d1));
    }
}
