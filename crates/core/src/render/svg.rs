use crate::{
    geometry::Quad, network::RoadSegment, render::Bounds, util::range::NumRange,
    City,
};
use svg::{
    node::{
        element::{Circle, Group, Line, Polygon},
        Comment,
    },
    Document,
};

const ROAD_COLOR: &str = "#505050";
const ZONE_COLOR: &str = "#e05050";
const CENTERLINE_COLOR: &str = "#f0d040";
const LEAF_COLOR: &str = "#40a040";
/// Empty space around the outermost road, in world units
const MARGIN: f64 = 5.0;

/// Render a city as a top-down SVG. World X maps to SVG x, and world Z to
/// SVG y. Each road gets its bounding box, both exclusion zones and its
/// centerline; leaves are drawn as dots.
pub fn city_to_svg(city: &City) -> Document {
    let network = city.network();
    let bounds = Bounds::of_network(network)
        .unwrap_or(Bounds {
            min_x: 0.0,
            min_z: 0.0,
            max_x: 0.0,
            max_z: 0.0,
        })
        .pad(MARGIN);
    // Scale line widths with the roads, so they stay visible
    let road_width = NumRange::new(0.0, bounds.width().max(bounds.height()))
        .clamp(city.config().road.width);

    let mut document = Document::new()
        .set(
            "viewBox",
            (bounds.min_x, bounds.min_z, bounds.width(), bounds.height()),
        )
        .add(Comment::new(format!("\n{:#?}\n", city.config())));

    for road in network.roads() {
        document = document.add(draw_road(road, road_width));
    }

    let mut leaves = Group::new().set("fill", LEAF_COLOR);
    for leaf in city.leaves().iter() {
        leaves = leaves.add(
            Circle::new()
                .set("cx", leaf.position.x)
                .set("cy", leaf.position.z)
                .set("r", road_width / 2.0),
        );
    }
    document.add(leaves)
}

/// Draw a single road: bounding box, zones, then centerline on top
fn draw_road(road: &RoadSegment, road_width: f64) -> Group {
    let [left_zone, right_zone] = road.zones();
    Group::new()
        .add(Comment::new(road.handle().to_string()))
        .add(
            quad_polygon(left_zone.vertices())
                .set("fill", ZONE_COLOR)
                .set("fill-opacity", 0.3),
        )
        .add(
            quad_polygon(right_zone.vertices())
                .set("fill", ZONE_COLOR)
                .set("fill-opacity", 0.3),
        )
        .add(quad_polygon(road.obb()).set("fill", ROAD_COLOR))
        .add(
            Line::new()
                .set("x1", road.point_a().x)
                .set("y1", road.point_a().z)
                .set("x2", road.point_b().x)
                .set("y2", road.point_b().z)
                .set("stroke", CENTERLINE_COLOR)
                .set("stroke-width", road_width / 10.0),
        )
}

fn quad_polygon(quad: &Quad) -> Polygon {
    Polygon::new().set(
        "points",
        quad.iter()
            .map(|point| format!("{},{}", point.x, point.z))
            .collect::<Vec<_>>()
            .join(" "),
    )
}
