//! Viewport boundary - the scene graph and clipping renderer the engines draw into
//!
//! The real viewer owns its scene, camera and renderer; the engines only see
//! these traits. Each engine keeps the handles it created and removes exactly
//! those. Removing a handle releases the object's GPU-side resources, so a
//! handle must be removed once and only once.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::geometry::Point;
use crate::entities::section_plane::ClipPlane;

/// Opaque reference to an object added to a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Renderable overlay objects the engines create
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SceneObject {
    /// Sphere marking a picked point
    Marker {
        position: Point,
        radius: f64,
        color: u32,
    },
    /// Straight segment between two points
    Line { start: Point, end: Point, color: u32 },
    /// Camera-facing text sprite
    Label { text: String, position: Point },
    /// Square visualizing a clipping plane
    PlaneHelper {
        plane: ClipPlane,
        size: f64,
        color: u32,
    },
}

/// An addable/removable object graph
pub trait Scene {
    /// Add an object and return its handle
    fn add(&mut self, object: SceneObject) -> ObjectHandle;

    /// Remove an object and release its resources
    ///
    /// Returns `false` if the handle is not in the scene.
    fn remove(&mut self, handle: ObjectHandle) -> bool;

    /// Swap the object behind a handle in place
    fn replace(&mut self, handle: ObjectHandle, object: SceneObject) -> bool;

    fn set_visible(&mut self, handle: ObjectHandle, visible: bool) -> bool;
}

/// A renderer whose clipping-plane list is replaced wholesale
pub trait ClippingRenderer {
    fn set_clipping_planes(&mut self, planes: Vec<ClipPlane>);
}

/// Scene plus renderer, as handed to the section-plane manager
pub trait Viewport: Scene + ClippingRenderer {}

impl<T: Scene + ClippingRenderer> Viewport for T {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub object: SceneObject,
    pub visible: bool,
}

/// Self-contained viewport used by the command line and tests
///
/// Tracks live objects and the number of released ones so leaks and double
/// releases are observable.
#[derive(Debug, Default)]
pub struct InMemoryViewport {
    nodes: BTreeMap<ObjectHandle, SceneNode>,
    next_handle: u64,
    released: usize,
    clipping_planes: Vec<ClipPlane>,
}

impl InMemoryViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects currently in the scene
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Objects removed (and released) so far
    pub fn released_count(&self) -> usize {
        self.released
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&ObjectHandle, &SceneNode)> {
        self.nodes.iter()
    }

    pub fn clipping_planes(&self) -> &[ClipPlane] {
        &self.clipping_planes
    }

    /// Whether geometry at `point` survives every active clipping plane
    pub fn is_point_visible(&self, point: &Point) -> bool {
        !self.clipping_planes.iter().any(|p| p.clips(point))
    }
}

impl Scene for InMemoryViewport {
    fn add(&mut self, object: SceneObject) -> ObjectHandle {
        self.next_handle += 1;
        let handle = ObjectHandle(self.next_handle);
        self.nodes.insert(
            handle,
            SceneNode {
                object,
                visible: true,
            },
        );
        handle
    }

    fn remove(&mut self, handle: ObjectHandle) -> bool {
        match self.nodes.remove(&handle) {
            Some(_) => {
                self.released += 1;
                true
            }
            None => {
                tracing::warn!(handle = handle.raw(), "remove of unknown scene object");
                false
            }
        }
    }

    fn replace(&mut self, handle: ObjectHandle, object: SceneObject) -> bool {
        match self.nodes.get_mut(&handle) {
            Some(node) => {
                node.object = object;
                true
            }
            None => false,
        }
    }

    fn set_visible(&mut self, handle: ObjectHandle, visible: bool) -> bool {
        match self.nodes.get_mut(&handle) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }
}

impl ClippingRenderer for InMemoryViewport {
    fn set_clipping_planes(&mut self, planes: Vec<ClipPlane>) {
        self.clipping_planes = planes;
    }
}
