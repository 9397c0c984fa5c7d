pub mod zone;

use crate::{
    geometry::{
        mesh::RoadMesh,
        overlap::quads_overlap,
        segment::{clamp_width, SegmentGeometry},
        Quad,
    },
    network::zone::ExclusionZone,
};
use anyhow::{anyhow, Context};
use derive_more::Display;
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use log::debug;
use nalgebra::Point3;
use serde::{Serialize, Serializer};

/// A stable reference to a road in a [RoadNetwork]. Handles are never reused,
/// so a handle to a removed road stays dead forever rather than silently
/// pointing at some other road.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
)]
#[display(fmt = "road #{}", _0)]
pub struct RoadHandle(pub(crate) u32);

/// Anything that can take ownership of road segments. The turtle interpreter
/// emits roads into one of these, so it doesn't care how they're stored.
pub trait RoadCollection {
    /// Create a road between two points, and return a handle to it. Returns
    /// an error if the points don't define a valid road.
    fn add_road(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        width: f64,
    ) -> anyhow::Result<RoadHandle>;

    /// Remove a road, returning it. Returns `None` if there is no road for
    /// that handle (e.g. it was already removed).
    fn remove_road(&mut self, handle: RoadHandle) -> Option<RoadSegment>;
}

/// A single straight piece of road, with rounded ends. All of the derived
/// geometry (mesh, OBB, and zones) is computed on construction, and
/// recomputed in full every time the endpoints or width change. If a
/// recomputation fails, the segment is left exactly as it was.
#[derive(Clone, Debug, Serialize)]
pub struct RoadSegment {
    handle: RoadHandle,
    point_a: Point3<f64>,
    point_b: Point3<f64>,
    width: f64,
    curve_sides: u32,
    #[serde(skip)]
    mesh: RoadMesh,
    obb: Quad,
    #[serde(serialize_with = "serialize_zone")]
    left_zone: ExclusionZone,
    #[serde(serialize_with = "serialize_zone")]
    right_zone: ExclusionZone,
}

impl RoadSegment {
    /// Create a new segment. Fails if the endpoints have no horizontal
    /// separation. Widths below [MIN_ROAD_WIDTH](crate::MIN_ROAD_WIDTH) are
    /// clamped.
    pub fn new(
        handle: RoadHandle,
        point_a: Point3<f64>,
        point_b: Point3<f64>,
        width: f64,
        curve_sides: u32,
    ) -> anyhow::Result<Self> {
        let width = clamp_width(width);
        let geometry =
            SegmentGeometry::compute(point_a, point_b, width, curve_sides)?;
        Ok(Self {
            handle,
            point_a,
            point_b,
            width,
            curve_sides,
            mesh: geometry.mesh,
            obb: geometry.obb,
            left_zone: ExclusionZone::new(geometry.left_zone, handle),
            right_zone: ExclusionZone::new(geometry.right_zone, handle),
        })
    }

    pub fn handle(&self) -> RoadHandle {
        self.handle
    }

    pub fn point_a(&self) -> Point3<f64> {
        self.point_a
    }

    pub fn point_b(&self) -> Point3<f64> {
        self.point_b
    }

    /// Road width, after clamping
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn curve_sides(&self) -> u32 {
        self.curve_sides
    }

    pub fn mesh(&self) -> &RoadMesh {
        &self.mesh
    }

    pub fn obb(&self) -> &Quad {
        &self.obb
    }

    pub fn left_zone(&self) -> &ExclusionZone {
        &self.left_zone
    }

    pub fn right_zone(&self) -> &ExclusionZone {
        &self.right_zone
    }

    /// Both zones, left then right
    pub fn zones(&self) -> [&ExclusionZone; 2] {
        [&self.left_zone, &self.right_zone]
    }

    /// Change the road width, and rebuild all geometry
    pub fn set_width(&mut self, width: f64) -> anyhow::Result<()> {
        self.rebuild(self.point_a, self.point_b, clamp_width(width))
    }

    /// Move the road's endpoints, and rebuild all geometry. Fails (leaving
    /// the road unchanged) if the new endpoints are degenerate.
    pub fn set_endpoints(
        &mut self,
        point_a: Point3<f64>,
        point_b: Point3<f64>,
    ) -> anyhow::Result<()> {
        self.rebuild(point_a, point_b, self.width)
    }

    /// Recompute everything from scratch. Nothing is written until all of the
    /// new geometry is ready.
    fn rebuild(
        &mut self,
        point_a: Point3<f64>,
        point_b: Point3<f64>,
        width: f64,
    ) -> anyhow::Result<()> {
        let geometry =
            SegmentGeometry::compute(point_a, point_b, width, self.curve_sides)
                .with_context(|| format!("error updating {}", self.handle))?;
        self.point_a = point_a;
        self.point_b = point_b;
        self.width = width;
        self.mesh = geometry.mesh;
        self.obb = geometry.obb;
        self.left_zone.update_vertices(geometry.left_zone);
        self.right_zone.update_vertices(geometry.right_zone);
        Ok(())
    }
}

fn serialize_zone<S: Serializer>(
    zone: &ExclusionZone,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    zone.vertices().serialize(serializer)
}

/// An arena of road segments, keyed by [RoadHandle]. Iteration order is
/// always insertion order, so two identical generation runs iterate
/// identically.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    roads: IndexMap<RoadHandle, RoadSegment, FnvBuildHasher>,
    next_handle: u32,
    curve_sides: u32,
}

impl RoadNetwork {
    /// Create an empty network. Every road added to it will have its caps
    /// built with this many `curve_sides`.
    pub fn new(curve_sides: u32) -> Self {
        Self {
            roads: IndexMap::default(),
            next_handle: 0,
            curve_sides,
        }
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn get(&self, handle: RoadHandle) -> Option<&RoadSegment> {
        self.roads.get(&handle)
    }

    /// All roads, in the order they were added
    pub fn roads(&self) -> impl Iterator<Item = &RoadSegment> {
        self.roads.values()
    }

    /// Change the width of a road. Fails if there is no road for the handle.
    pub fn set_width(
        &mut self,
        handle: RoadHandle,
        width: f64,
    ) -> anyhow::Result<()> {
        self.get_mut(handle)?.set_width(width)
    }

    /// Move the endpoints of a road. Fails if there is no road for the
    /// handle, or the new endpoints are degenerate.
    pub fn set_endpoints(
        &mut self,
        handle: RoadHandle,
        point_a: Point3<f64>,
        point_b: Point3<f64>,
    ) -> anyhow::Result<()> {
        self.get_mut(handle)?.set_endpoints(point_a, point_b)
    }

    fn get_mut(
        &mut self,
        handle: RoadHandle,
    ) -> anyhow::Result<&mut RoadSegment> {
        self.roads
            .get_mut(&handle)
            .ok_or_else(|| anyhow!("no road for {}", handle))
    }

    /// Every exclusion zone in the network, two per road
    pub fn zones(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.roads.values().flat_map(|road| road.zones())
    }

    /// Get the roads whose exclusion zones intersect the footprint. Each road
    /// appears at most once, in network order.
    pub fn zone_conflicts(&self, footprint: &Quad) -> Vec<RoadHandle> {
        self.roads
            .values()
            .filter(|road| {
                road.zones().iter().any(|zone| zone.intersects(footprint))
            })
            .map(RoadSegment::handle)
            .collect()
    }

    /// Get the roads whose bounding box intersects the footprint
    pub fn road_conflicts(&self, footprint: &Quad) -> Vec<RoadHandle> {
        self.roads
            .values()
            .filter(|road| quads_overlap(road.obb(), footprint))
            .map(RoadSegment::handle)
            .collect()
    }

    /// Can something with this footprint be placed without touching any road
    /// or any road's exclusion zones?
    pub fn is_footprint_clear(&self, footprint: &Quad) -> bool {
        self.roads.values().all(|road| {
            !quads_overlap(road.obb(), footprint)
                && !road.zones().iter().any(|zone| zone.intersects(footprint))
        })
    }
}

impl RoadCollection for RoadNetwork {
    fn add_road(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        width: f64,
    ) -> anyhow::Result<RoadHandle> {
        let handle = RoadHandle(self.next_handle);
        let road = RoadSegment::new(handle, a, b, width, self.curve_sides)
            .with_context(|| format!("error creating {}", handle))?;
        // Only burn the handle once the road is actually created
        self.next_handle += 1;
        self.roads.insert(handle, road);
        Ok(handle)
    }

    fn remove_road(&mut self, handle: RoadHandle) -> Option<RoadSegment> {
        let removed = self.roads.shift_remove(&handle);
        if removed.is_some() {
            debug!("Removed {}", handle);
        }
        removed
    }
}

impl Serialize for RoadNetwork {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        // Handles are stored on each road, so a plain list is enough
        serializer.collect_seq(self.roads.values())
    }
}
