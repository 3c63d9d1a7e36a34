//! Section-plane manager - a bounded registry of clipping planes
//!
//! Every mutation pushes the complete effective clipping list to the renderer
//! and re-syncs plane helpers, so the viewport never sees a stale equation.

use std::collections::HashMap;

use crate::core::config::SectionConfig;
use crate::core::geometry::Vector;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::scene::{ObjectHandle, SceneObject, Viewport};
use crate::entities::section_plane::{ClipPlane, SectionAxis, SectionPlane};

/// Normals shorter than this cannot be normalized
const MIN_NORMAL_LENGTH: f64 = 1e-12;

/// A helper object owned by one plane
#[derive(Debug, Clone, Copy)]
struct Helper {
    handle: ObjectHandle,
    size: f64,
}

#[derive(Debug, Default)]
pub struct SectionPlaneManager {
    config: SectionConfig,
    planes: Vec<SectionPlane>,
    active: Option<EntityId>,
    show_helpers: bool,
    helpers: HashMap<EntityId, Helper>,
}

impl SectionPlaneManager {
    pub fn new(config: SectionConfig) -> Self {
        Self {
            show_helpers: config.show_helpers,
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    /// Planes in creation order
    pub fn planes(&self) -> &[SectionPlane] {
        &self.planes
    }

    pub fn get(&self, id: &EntityId) -> Option<&SectionPlane> {
        self.planes.iter().find(|p| p.id == *id)
    }

    pub fn active(&self) -> Option<&EntityId> {
        self.active.as_ref()
    }

    pub fn show_helpers(&self) -> bool {
        self.show_helpers
    }

    pub fn helper(&self, id: &EntityId) -> Option<ObjectHandle> {
        self.helpers.get(id).map(|h| h.handle)
    }

    pub fn is_full(&self) -> bool {
        self.planes.len() >= self.config.max_planes
    }

    /// Effective clipping list: enabled planes only, negated when inverted
    pub fn clipping_planes(&self) -> Vec<ClipPlane> {
        self.planes
            .iter()
            .filter(|p| p.enabled)
            .map(SectionPlane::effective_plane)
            .collect()
    }

    /// Create a plane and make it active
    ///
    /// Returns `None` when the registry is full. Axis planes get the unit
    /// axis normal and `constant = -position`; custom planes start at normal
    /// `+X`, constant 0 until [`update_plane_normal`](Self::update_plane_normal).
    pub fn create_plane<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        axis: SectionAxis,
        position: f64,
        name: Option<&str>,
    ) -> Option<SectionPlane> {
        if self.is_full() {
            tracing::warn!(
                max_planes = self.config.max_planes,
                "section plane limit reached"
            );
            return None;
        }

        let (normal, constant) = match axis.unit_normal() {
            Some(normal) => (normal, -position),
            None => (Vector::x(), 0.0),
        };

        let plane = SectionPlane {
            id: EntityId::new(EntityPrefix::Sec),
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} Plane", axis)),
            axis,
            position,
            normal,
            constant,
            enabled: true,
            inverted: false,
        };

        tracing::debug!(id = %plane.id, %axis, position, "section plane created");
        self.active = Some(plane.id);
        self.planes.push(plane.clone());
        self.apply(viewport);
        Some(plane)
    }

    /// Move a plane along its axis
    ///
    /// Custom planes only record the position; their equation is unchanged.
    pub fn update_plane_position<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        id: &EntityId,
        position: f64,
    ) -> bool {
        let Some(plane) = self.planes.iter_mut().find(|p| p.id == *id) else {
            return false;
        };

        plane.position = position;
        if plane.axis.is_axis_aligned() {
            plane.constant = -position;
        }
        self.apply(viewport);
        true
    }

    /// Set an explicit plane equation
    ///
    /// The normal is stored normalized; a zero-length normal is rejected.
    pub fn update_plane_normal<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        id: &EntityId,
        normal: Vector,
        constant: f64,
    ) -> bool {
        let Some(unit) = normal.try_normalize(MIN_NORMAL_LENGTH) else {
            tracing::warn!(%id, "rejected zero-length plane normal");
            return false;
        };
        let Some(plane) = self.planes.iter_mut().find(|p| p.id == *id) else {
            return false;
        };

        plane.normal = unit;
        plane.constant = constant;
        self.apply(viewport);
        true
    }

    pub fn toggle_plane<V: Viewport + ?Sized>(&mut self, viewport: &mut V, id: &EntityId) -> bool {
        self.modify(viewport, id, |p| p.enabled = !p.enabled)
    }

    /// Flip which half-space is clipped
    pub fn invert_plane<V: Viewport + ?Sized>(&mut self, viewport: &mut V, id: &EntityId) -> bool {
        self.modify(viewport, id, |p| p.inverted = !p.inverted)
    }

    /// Remove a plane and its helper
    pub fn delete_plane<V: Viewport + ?Sized>(&mut self, viewport: &mut V, id: &EntityId) -> bool {
        let Some(index) = self.planes.iter().position(|p| p.id == *id) else {
            return false;
        };

        if let Some(helper) = self.helpers.remove(id) {
            viewport.remove(helper.handle);
        }
        self.planes.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }

        tracing::debug!(%id, "section plane deleted");
        self.apply(viewport);
        true
    }

    /// Remove every plane and helper
    pub fn clear_planes<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        for (_, helper) in self.helpers.drain() {
            viewport.remove(helper.handle);
        }
        self.planes.clear();
        self.active = None;
        self.apply(viewport);
    }

    pub fn select_plane(&mut self, id: Option<EntityId>) {
        self.active = id;
    }

    /// Flip helper visibility for all existing and future helpers
    pub fn toggle_helpers<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        self.show_helpers = !self.show_helpers;
        for helper in self.helpers.values() {
            viewport.set_visible(helper.handle, self.show_helpers);
        }
    }

    /// Create the visual helper for a plane
    ///
    /// A plane has at most one helper; calling this again rebuilds it at the
    /// new size. Returns `None` for an unknown plane.
    pub fn create_plane_helper<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        id: &EntityId,
        size: f64,
    ) -> Option<ObjectHandle> {
        let plane = self.get(id)?;
        let object = SceneObject::PlaneHelper {
            plane: plane.effective_plane(),
            size,
            color: self.config.helper_color,
        };

        if let Some(old) = self.helpers.remove(id) {
            viewport.remove(old.handle);
        }
        let handle = viewport.add(object);
        viewport.set_visible(handle, self.show_helpers);
        self.helpers.insert(*id, Helper { handle, size });
        Some(handle)
    }

    fn modify<V, F>(&mut self, viewport: &mut V, id: &EntityId, f: F) -> bool
    where
        V: Viewport + ?Sized,
        F: FnOnce(&mut SectionPlane),
    {
        match self.planes.iter_mut().find(|p| p.id == *id) {
            Some(plane) => {
                f(plane);
                self.apply(viewport);
                true
            }
            None => false,
        }
    }

    /// Push the clipping list and re-sync helper equations
    fn apply<V: Viewport + ?Sized>(&self, viewport: &mut V) {
        viewport.set_clipping_planes(self.clipping_planes());

        for plane in &self.planes {
            if let Some(helper) = self.helpers.get(&plane.id) {
                viewport.replace(
                    helper.handle,
                    SceneObject::PlaneHelper {
                        plane: plane.effective_plane(),
                        size: helper.size,
                        color: self.config.helper_color,
                    },
                );
            }
        }
    }
}
