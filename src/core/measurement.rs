//! Measurement engine - point collection sessions and committed measurements
//!
//! A session is an explicit state machine:
//!
//! ```text
//! Idle --start(kind)--> Collecting(kind, [])
//! Collecting --push(p)--> Collecting(kind, points + p)   (threshold not reached)
//! Collecting --push(p)--> Ready(kind, points + p)        (threshold reached)
//! Ready --commit ok--> Idle                               (record + visuals created)
//! Ready --commit failed--> Collecting(kind, points)       (last point dropped)
//! Collecting --cancel--> Idle
//! ```
//!
//! `SessionState` transitions are pure. `MeasurementEngine` drives them and
//! performs the commit side effects: building the record, drawing it into the
//! scene, and remembering which scene handles belong to which record.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::core::config::MeasurementConfig;
use crate::core::geometry::{self, Point};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::scene::{ObjectHandle, Scene, SceneObject};
use crate::entities::measurement::{Measurement, MeasurementKind, PointCount};

/// Surface under the cursor, offered as a snap target
///
/// `vertices` is a triangle list: every three points form one face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceGeometry {
    pub vertices: Vec<Point>,
}

impl SurfaceGeometry {
    /// Point a geometry snap would move `point` to, if one lies within `threshold`
    ///
    /// Vertices win over faces.
    pub fn snap_candidate(&self, point: &Point, threshold: f64) -> Option<Point> {
        if let Some(v) = geometry::nearest_vertex(point, &self.vertices, threshold) {
            return Some(v);
        }
        self.vertices
            .chunks_exact(3)
            .map(|t| geometry::closest_point_on_triangle(point, &t[0], &t[1], &t[2]))
            .map(|q| (q, geometry::distance(point, &q)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(q, _)| q)
    }
}

/// Why a commit could not produce a measurement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("{kind} measurement needs {expected} points, got {got}")]
    PointCount {
        kind: MeasurementKind,
        expected: String,
        got: usize,
    },

    #[error("{kind} measurement is undefined for the picked points")]
    Degenerate { kind: MeasurementKind },
}

/// Where a measurement session stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Collecting {
        kind: MeasurementKind,
        points: Vec<Point>,
    },
}

/// Outcome of a pure session transition
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keep waiting for input in this state
    Pending(SessionState),
    /// Enough points collected; commit these
    Ready {
        kind: MeasurementKind,
        points: Vec<Point>,
    },
}

impl SessionState {
    pub fn start(kind: MeasurementKind) -> Self {
        SessionState::Collecting {
            kind,
            points: Vec::new(),
        }
    }

    pub fn cancel(self) -> Self {
        SessionState::Idle
    }

    /// Append a point
    ///
    /// Idle sessions ignore points. With `explicit_close`, area sessions never
    /// become ready here; see [`SessionState::close`].
    pub fn push(self, point: Point, explicit_close: bool) -> Step {
        match self {
            SessionState::Idle => Step::Pending(SessionState::Idle),
            SessionState::Collecting { kind, mut points } => {
                points.push(point);
                let waits_for_close = explicit_close && kind == MeasurementKind::Area;
                if !waits_for_close && geometry::validate_point_count(kind, points.len()) {
                    Step::Ready { kind, points }
                } else {
                    Step::Pending(SessionState::Collecting { kind, points })
                }
            }
        }
    }

    /// Close the current polygon
    ///
    /// Ready only for area sessions holding enough points; anything else
    /// stays as it is.
    pub fn close(self) -> Step {
        match self {
            SessionState::Collecting { kind, points }
                if kind == MeasurementKind::Area
                    && geometry::validate_point_count(kind, points.len()) =>
            {
                Step::Ready { kind, points }
            }
            other => Step::Pending(other),
        }
    }

    pub fn kind(&self) -> Option<MeasurementKind> {
        match self {
            SessionState::Idle => None,
            SessionState::Collecting { kind, .. } => Some(*kind),
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            SessionState::Idle => &[],
            SessionState::Collecting { points, .. } => points,
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self, SessionState::Collecting { .. })
    }
}

/// Build a measurement record from collected points
///
/// Pure: no scene access. The value is converted to the configured unit.
pub fn build_measurement(
    kind: MeasurementKind,
    points: &[Point],
    config: &MeasurementConfig,
) -> Result<Measurement, MeasureError> {
    let required = kind.required_points();
    if !required.is_satisfied_by(points.len()) {
        let expected = match required {
            PointCount::Exactly(n) => n.to_string(),
            PointCount::AtLeast(n) => format!("at least {}", n),
        };
        return Err(MeasureError::PointCount {
            kind,
            expected,
            got: points.len(),
        });
    }

    let raw = geometry::measure(kind, points).ok_or(MeasureError::Degenerate { kind })?;
    let value = config.length_unit.convert(raw, kind);

    let unit = match kind {
        MeasurementKind::Angle => kind.default_unit().to_string(),
        MeasurementKind::Distance | MeasurementKind::Area => config
            .unit
            .clone()
            .unwrap_or_else(|| config.length_unit.label_for(kind)),
    };
    let label = geometry::format_measurement(value, kind, &unit, config.precision);

    Ok(Measurement {
        id: EntityId::new(EntityPrefix::Meas),
        kind,
        points: points.to_vec(),
        value,
        unit,
        label,
        created: Utc::now(),
    })
}

/// Scene objects that represent a measurement
///
/// One marker per point, then the kind's lines, then the label.
pub fn visuals_for(measurement: &Measurement, config: &MeasurementConfig) -> Vec<SceneObject> {
    let color = config.color;
    let pts = &measurement.points;

    let mut objects: Vec<SceneObject> = pts
        .iter()
        .map(|p| SceneObject::Marker {
            position: *p,
            radius: config.marker_size,
            color,
        })
        .collect();

    let line = |start: Point, end: Point| SceneObject::Line { start, end, color };

    match measurement.kind {
        MeasurementKind::Distance => objects.push(line(pts[0], pts[1])),
        MeasurementKind::Area => {
            objects.extend((0..pts.len()).map(|i| line(pts[i], pts[(i + 1) % pts.len()])));
        }
        MeasurementKind::Angle => {
            objects.push(line(pts[1], pts[0]));
            objects.push(line(pts[1], pts[2]));
        }
    }

    objects.push(SceneObject::Label {
        text: measurement.label.clone(),
        position: measurement.label_anchor(),
    });

    objects
}

/// Interactive measurement engine
#[derive(Debug, Default)]
pub struct MeasurementEngine {
    config: MeasurementConfig,
    state: SessionState,
    committed: Vec<Measurement>,
    selected: Option<EntityId>,
    snapping: bool,
    visuals: HashMap<EntityId, Vec<ObjectHandle>>,
}

impl MeasurementEngine {
    pub fn new(config: MeasurementConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// Options apply from the next point on
    pub fn config_mut(&mut self) -> &mut MeasurementConfig {
        &mut self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_collecting()
    }

    pub fn current_kind(&self) -> Option<MeasurementKind> {
        self.state.kind()
    }

    pub fn pending_points(&self) -> &[Point] {
        self.state.points()
    }

    /// Committed measurements in creation order
    pub fn measurements(&self) -> &[Measurement] {
        &self.committed
    }

    pub fn get(&self, id: &EntityId) -> Option<&Measurement> {
        self.committed.iter().find(|m| m.id == *id)
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    /// Whether the last point was moved by geometry snapping
    pub fn is_snapping(&self) -> bool {
        self.snapping
    }

    /// Scene handles owned by a measurement
    pub fn visuals(&self, id: &EntityId) -> &[ObjectHandle] {
        self.visuals.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Begin collecting points for `kind`, discarding any pending points
    pub fn start_measurement(&mut self, kind: MeasurementKind) {
        tracing::debug!(%kind, "measurement started");
        self.state = SessionState::start(kind);
    }

    /// Cancel the in-progress measurement; committed ones are kept
    pub fn stop_measurement(&mut self) {
        if self.state.is_collecting() {
            tracing::debug!("measurement cancelled");
        }
        self.state = std::mem::take(&mut self.state).cancel();
    }

    /// Add a picked point to the current measurement
    ///
    /// Does nothing when no measurement is active. Returns the new record if
    /// this point completed a measurement.
    pub fn add_point<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        point: Point,
        surface: Option<&SurfaceGeometry>,
    ) -> Option<&Measurement> {
        if !self.state.is_collecting() {
            return None;
        }

        let point = self.snap(point, surface);
        let state = std::mem::take(&mut self.state);

        match state.push(point, self.config.explicit_polygon_close) {
            Step::Pending(next) => {
                self.state = next;
                None
            }
            Step::Ready { kind, mut points } => match self.commit(scene, kind, &points) {
                Ok(()) => self.committed.last(),
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "measurement not committed");
                    points.pop();
                    self.state = SessionState::Collecting { kind, points };
                    None
                }
            },
        }
    }

    /// Close an area polygon collected with `explicit_polygon_close`
    ///
    /// Returns the new record, or `None` if nothing could be committed.
    pub fn finish_measurement<S: Scene + ?Sized>(&mut self, scene: &mut S) -> Option<&Measurement> {
        let state = std::mem::take(&mut self.state);
        match state.close() {
            Step::Pending(unchanged) => {
                self.state = unchanged;
                None
            }
            Step::Ready { kind, points } => match self.commit(scene, kind, &points) {
                Ok(()) => self.committed.last(),
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "measurement not committed");
                    self.state = SessionState::Collecting { kind, points };
                    None
                }
            },
        }
    }

    /// Remove every committed measurement and its visuals
    pub fn clear_measurements<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for (_, handles) in self.visuals.drain() {
            for handle in handles {
                scene.remove(handle);
            }
        }
        tracing::debug!(count = self.committed.len(), "measurements cleared");
        self.committed.clear();
        self.selected = None;
    }

    /// Remove one measurement and its visuals
    ///
    /// Returns `false` if no measurement has that id.
    pub fn delete_measurement<S: Scene + ?Sized>(&mut self, scene: &mut S, id: &EntityId) -> bool {
        let Some(index) = self.committed.iter().position(|m| m.id == *id) else {
            return false;
        };

        for handle in self.visuals.remove(id).unwrap_or_default() {
            scene.remove(handle);
        }
        self.committed.remove(index);

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        true
    }

    pub fn select_measurement(&mut self, id: Option<EntityId>) {
        self.selected = id;
    }

    fn snap(&mut self, point: Point, surface: Option<&SurfaceGeometry>) -> Point {
        // Grid snapping is the only rule applied; geometry candidates are only reported.
        self.snapping = false;
        if let Some(surface) = surface.filter(|_| self.config.snap_to_geometry) {
            let candidate = surface.snap_candidate(&point, self.config.snap_threshold);
            tracing::trace!(?candidate, "geometry snap candidate ignored");
        }

        if self.config.snap_to_grid {
            geometry::snap_to_grid(&point, self.config.grid_size)
        } else {
            point
        }
    }

    fn commit<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        kind: MeasurementKind,
        points: &[Point],
    ) -> Result<(), MeasureError> {
        let measurement = build_measurement(kind, points, &self.config)?;

        let handles = visuals_for(&measurement, &self.config)
            .into_iter()
            .map(|object| scene.add(object))
            .collect();

        tracing::debug!(id = %measurement.id, label = %measurement.label, "measurement committed");
        self.visuals.insert(measurement.id, handles);
        self.committed.push(measurement);
        self.state = SessionState::Idle;
        Ok(())
    }
}
