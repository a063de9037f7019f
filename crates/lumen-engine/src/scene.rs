//! Flat store of animatable nodes and sound cues.
//!
//! [`Scene`] is the engine's [`Stage`]: tweens read and write node
//! transforms and colours here, and `Play` tweens append to the sound log.
//! Nodes are addressed by generational [`NodeId`]s so a tween holding the id
//! of a despawned node sees it as missing rather than hitting a recycled
//! slot. There is no hierarchy; every node's transform is in world space.

use std::collections::{BTreeSet, VecDeque};

use lumen_tween::math::{Color, Vec2};
use lumen_tween::target::{NodeId, SoundId, Stage};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node data
// ---------------------------------------------------------------------------

/// World-space placement of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Radians.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Generational node store plus a registry of sound cue names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    slots: Vec<Option<SceneNode>>,
    generations: Vec<u32>,
    /// Recyclable slot indices (FIFO queue).
    free: VecDeque<u32>,
    /// Registered cue names. Ordered for stable snapshots.
    sounds: BTreeSet<String>,
    /// Cues played since the last drain, in order. Part of every snapshot
    /// hash, so hosts drain it each frame (`TickLoop::tick` does).
    played: Vec<SoundId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the origin with identity scale and white colour.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        self.spawn_at(name, Vec2::ZERO)
    }

    pub fn spawn_at(&mut self, name: impl Into<String>, position: Vec2) -> NodeId {
        let node = SceneNode {
            name: name.into(),
            transform: Transform {
                position,
                ..Transform::default()
            },
            color: Color::WHITE,
        };
        if let Some(index) = self.free.pop_front() {
            self.slots[index as usize] = Some(node);
            NodeId::new(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(node));
            self.generations.push(0);
            NodeId::new(index, 0)
        }
    }

    /// Remove a node. Returns the removed node, or `None` for stale ids.
    pub fn despawn(&mut self, id: NodeId) -> Option<SceneNode> {
        if !self.contains(id) {
            return None;
        }
        let i = id.index() as usize;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push_back(id.index());
        self.slots[i].take()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        let i = id.index() as usize;
        i < self.slots.len() && self.slots[i].is_some() && self.generations[i] == id.generation()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        if self.contains(id) {
            self.slots[id.index() as usize].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.contains(id) {
            self.slots[id.index() as usize].as_mut()
        } else {
            None
        }
    }

    /// First live node with the given name, in slot order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|node| (NodeId::new(i as u32, self.generations[i]), node))
        })
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- sounds -------------------------------------------------------------

    pub fn register_sound(&mut self, name: impl Into<String>) {
        self.sounds.insert(name.into());
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains(name)
    }

    /// Cues played since the last [`drain_played`](Self::drain_played).
    pub fn played_sounds(&self) -> &[SoundId] {
        &self.played
    }

    pub fn drain_played(&mut self) -> Vec<SoundId> {
        std::mem::take(&mut self.played)
    }
}

impl Stage for Scene {
    fn position(&self, node: NodeId) -> Option<Vec2> {
        self.get(node).map(|n| n.transform.position)
    }

    fn set_position(&mut self, node: NodeId, value: Vec2) -> bool {
        self.get_mut(node)
            .map(|n| n.transform.position = value)
            .is_some()
    }

    fn scale(&self, node: NodeId) -> Option<Vec2> {
        self.get(node).map(|n| n.transform.scale)
    }

    fn set_scale(&mut self, node: NodeId, value: Vec2) -> bool {
        self.get_mut(node)
            .map(|n| n.transform.scale = value)
            .is_some()
    }

    fn rotation(&self, node: NodeId) -> Option<f32> {
        self.get(node).map(|n| n.transform.rotation)
    }

    fn set_rotation(&mut self, node: NodeId, value: f32) -> bool {
        self.get_mut(node)
            .map(|n| n.transform.rotation = value)
            .is_some()
    }

    fn color(&self, node: NodeId) -> Option<Color> {
        self.get(node).map(|n| n.color)
    }

    fn set_color(&mut self, node: NodeId, value: Color) -> bool {
        self.get_mut(node).map(|n| n.color = value).is_some()
    }

    fn play_sound(&mut self, sound: &SoundId) -> bool {
        if self.sounds.contains(sound.as_str()) {
            self.played.push(sound.clone());
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
