// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Outbound interface to whatever draws the scene.

The layout engine never owns drawable objects; it only holds the handles a
`VisualBackend` gives out and tells the backend where to put them, when to
start fading them, and when to destroy them.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;
use crate::signature::ResourceSignature;
use crate::status::{ObjectState, ResourceStatus};
use crate::types::Position;

/// Opaque reference to a drawable owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(u64);

impl VisualHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Appearance hints passed along with create/update calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualStyle {
    pub state: ObjectState,
    pub spinning: bool,
}

impl VisualStyle {
    /// Pods spin; everything else is static
    pub fn for_resource(kind: ResourceKind, status: &ResourceStatus) -> Self {
        Self {
            state: status.object_state(),
            spinning: kind == ResourceKind::Pod,
        }
    }
}

/// Rendering collaborator called by the layout engine
///
/// Calls are made while the engine holds its table lock, so implementations
/// must not call back into the engine.
pub trait VisualBackend: Send {
    fn create_visual(
        &mut self,
        signature: &ResourceSignature,
        position: Position,
        style: VisualStyle,
    ) -> VisualHandle;

    fn reposition_visual(&mut self, handle: VisualHandle, position: Position);

    /// Status changed after creation
    fn update_visual(&mut self, _handle: VisualHandle, _style: VisualStyle) {}

    fn begin_fade_out(&mut self, handle: VisualHandle);

    fn is_fade_complete(&self, handle: VisualHandle) -> bool;

    fn destroy_visual(&mut self, handle: VisualHandle);
}

/// State recorded for one visual by `HeadlessBackend`
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVisual {
    pub signature: ResourceSignature,
    pub position: Position,
    pub style: VisualStyle,
    pub fading: bool,
    pub fade_complete: bool,
    pub reposition_count: usize,
}

/// In-memory backend with no drawing
///
/// Fades never finish on their own; call `complete_fade` or
/// `complete_all_fades` to simulate the animation ending.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    visuals: AHashMap<VisualHandle, HeadlessVisual>,
    destroyed: AHashMap<VisualHandle, usize>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.visuals.get(&handle)
    }

    pub fn position(&self, handle: VisualHandle) -> Option<Position> {
        self.visuals.get(&handle).map(|v| v.position)
    }

    /// Handle of the live visual created for `signature`
    pub fn handle_for(&self, signature: &ResourceSignature) -> Option<VisualHandle> {
        self.visuals
            .iter()
            .find(|(_, visual)| &visual.signature == signature)
            .map(|(handle, _)| *handle)
    }

    /// Mark a fading visual's animation as finished
    ///
    /// Returns false if the visual is unknown or was never told to fade.
    pub fn complete_fade(&mut self, handle: VisualHandle) -> bool {
        match self.visuals.get_mut(&handle) {
            Some(visual) if visual.fading => {
                visual.fade_complete = true;
                true
            }
            _ => false,
        }
    }

    /// Finish every in-progress fade, returning how many were finished
    pub fn complete_all_fades(&mut self) -> usize {
        let mut completed = 0;
        for visual in self.visuals.values_mut() {
            if visual.fading && !visual.fade_complete {
                visual.fade_complete = true;
                completed += 1;
            }
        }
        completed
    }

    pub fn destroy_count(&self, handle: VisualHandle) -> usize {
        self.destroyed.get(&handle).copied().unwrap_or(0)
    }

    pub fn live_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn created_count(&self) -> u64 {
        self.next_id
    }
}

impl VisualBackend for HeadlessBackend {
    fn create_visual(
        &mut self,
        signature: &ResourceSignature,
        position: Position,
        style: VisualStyle,
    ) -> VisualHandle {
        let handle = VisualHandle::new(self.next_id);
        self.next_id += 1;
        self.visuals.insert(
            handle,
            HeadlessVisual {
                signature: signature.clone(),
                position,
                style,
                fading: false,
                fade_complete: false,
                reposition_count: 0,
            },
        );
        handle
    }

    fn reposition_visual(&mut self, handle: VisualHandle, position: Position) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.position = position;
            visual.reposition_count += 1;
        }
    }

    fn update_visual(&mut self, handle: VisualHandle, style: VisualStyle) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.style = style;
        }
    }

    fn begin_fade_out(&mut self, handle: VisualHandle) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.fading = true;
        }
    }

    fn is_fade_complete(&self, handle: VisualHandle) -> bool {
        self.visuals
            .get(&handle)
            .is_some_and(|visual| visual.fade_complete)
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
        *self.destroyed.entry(handle).or_insert(0) += 1;
    }
}
