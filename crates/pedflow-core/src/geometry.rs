//! Facility geometry extraction (walls and obstacles) from the JuPedSim geometry XML.
//!
//! Only `<polygon caption="wall">` elements nested under a `<subroom>` count as walls. Other
//! polygons (crossings, transitions, unlabelled outlines) are skipped on purpose, since the
//! profile extent must follow the physical walls.

use crate::error::GeometryError;
use crate::geom::{BoundingBox, Point, point};
use crate::Result;
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::cmp::Ordering;

/// Ordered, de-duplicated vertex ring (counter-clockwise around its centroid).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    /// Deduplicates `raw` and sorts the remaining vertices by angle around their centroid.
    ///
    /// This only fixes the draw order; non-convex or self-intersecting input is not detected.
    pub fn from_raw_vertices(raw: Vec<Point>) -> Self {
        let mut vertices = raw;
        vertices.sort_by(cmp_xy);
        vertices.dedup_by(|a, b| cmp_xy(a, b) == Ordering::Equal);

        if vertices.len() > 1 {
            let n = vertices.len() as f64;
            let cx = vertices.iter().map(|p| p.x).sum::<f64>() / n;
            let cy = vertices.iter().map(|p| p.y).sum::<f64>() / n;
            let centroid = point(cx, cy);
            vertices.sort_by(|a, b| {
                let ta = (*a - centroid).angle_from_x_axis().radians;
                let tb = (*b - centroid).angle_from_x_axis().radians;
                ta.total_cmp(&tb).then_with(|| cmp_xy(a, b))
            });
        }

        Self { vertices }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }
}

fn cmp_xy(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Geometry {
    /// Wall polygons keyed by 1-based parse order.
    pub walls: IndexMap<usize, Polygon>,
    /// Obstacles keyed by 0-based parse order; all polygons of one `<obstacle>` are merged.
    pub obstacles: IndexMap<usize, Polygon>,
}

impl Geometry {
    /// Extent of all wall vertices. Obstacles never widen it.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let bbox = BoundingBox::from_points(self.walls.values().flat_map(|w| w.vertices.iter()))
            .ok_or(GeometryError::NoWalls)?;
        Ok(bbox)
    }
}

pub fn parse_geometry(xml: &str) -> Result<Geometry> {
    let doc = Document::parse(xml).map_err(GeometryError::from)?;
    let mut geometry = Geometry::default();

    let wall_polygons = doc.descendants().filter(|n| {
        n.has_tag_name("polygon")
            && n.attribute("caption") == Some("wall")
            && n.ancestors().skip(1).any(|a| a.has_tag_name("subroom"))
    });
    for (idx, polygon) in wall_polygons.enumerate() {
        let raw = read_vertices(&doc, polygon)?;
        geometry
            .walls
            .insert(idx + 1, Polygon::from_raw_vertices(raw));
    }

    for (idx, obstacle) in doc
        .descendants()
        .filter(|n| n.has_tag_name("obstacle"))
        .enumerate()
    {
        let mut raw = Vec::new();
        for polygon in obstacle.descendants().filter(|n| n.has_tag_name("polygon")) {
            raw.extend(read_vertices(&doc, polygon)?);
        }
        geometry
            .obstacles
            .insert(idx, Polygon::from_raw_vertices(raw));
    }

    if geometry.walls.is_empty() {
        return Err(GeometryError::NoWalls.into());
    }

    tracing::debug!(
        walls = geometry.walls.len(),
        obstacles = geometry.obstacles.len(),
        "parsed facility geometry"
    );
    Ok(geometry)
}

fn read_vertices(doc: &Document<'_>, polygon: Node<'_, '_>) -> Result<Vec<Point>> {
    let mut out = Vec::new();
    for vertex in polygon.children().filter(|n| n.has_tag_name("vertex")) {
        let line = doc.text_pos_at(vertex.range().start).row;
        let x = read_coordinate(vertex, "px", line)?;
        let y = read_coordinate(vertex, "py", line)?;
        out.push(point(x, y));
    }
    Ok(out)
}

fn read_coordinate(vertex: Node<'_, '_>, attribute: &'static str, line: u32) -> Result<f64> {
    let Some(raw) = vertex.attribute(attribute) else {
        return Err(GeometryError::MissingAttribute {
            element: "vertex",
            attribute,
            line,
        }
        .into());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(GeometryError::InvalidCoordinate {
            attribute,
            value: raw.to_string(),
            line,
        }
        .into()),
    }
}

/// Parses polygon text such as `POLYGON((0 0,1 0,1 1))` or `(0, 0), (1, 0), (1, 1)` into its
/// vertices, in the order written.
///
/// Returns `None` when the text holds no coordinates, an odd number of them, or a token that is
/// not a finite number.
pub fn parse_polygon_text(text: &str) -> Option<Vec<Point>> {
    let mut values = Vec::new();
    for token in text
        .split(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .filter(|t| !t.is_empty())
    {
        let v = token.parse::<f64>().ok()?;
        if !v.is_finite() {
            return None;
        }
        values.push(v);
    }
    if values.is_empty() || values.len() % 2 != 0 {
        return None;
    }
    Some(values.chunks_exact(2).map(|c| point(c[0], c[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const CORRIDOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<geometry version="0.8" unit="m">
  <rooms>
    <room id="0" caption="corridor">
      <subroom id="0" closed="0" class="subroom">
        <polygon caption="wall">
          <vertex px="0.0" py="0.0"/>
          <vertex px="10.0" py="0.0"/>
        </polygon>
        <polygon caption="wall">
          <vertex px="0.0" py="4.0"/>
          <vertex px="10.0" py="4.0"/>
        </polygon>
        <polygon caption="crossing">
          <vertex px="-50.0" py="-50.0"/>
          <vertex px="50.0" py="50.0"/>
        </polygon>
        <obstacle id="0" caption="pillar" closed="1">
          <polygon>
            <vertex px="4.0" py="1.0"/>
            <vertex px="5.0" py="1.0"/>
            <vertex px="5.0" py="2.0"/>
            <vertex px="4.0" py="2.0"/>
            <vertex px="4.0" py="1.0"/>
          </polygon>
        </obstacle>
      </subroom>
    </room>
  </rooms>
</geometry>
"#;

    #[test]
    fn walls_are_keyed_in_parse_order_and_bound_the_facility() {
        let geo = parse_geometry(CORRIDOR).unwrap();
        assert_eq!(geo.walls.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        let bbox = geo.bounding_box().unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 10.0, 0.0, 4.0));
    }

    #[test]
    fn obstacle_vertices_are_deduplicated_and_counter_clockwise() {
        let geo = parse_geometry(CORRIDOR).unwrap();
        let pillar = &geo.obstacles[&0];
        assert_eq!(
            pillar.vertices,
            vec![
                point(4.0, 1.0),
                point(5.0, 1.0),
                point(5.0, 2.0),
                point(4.0, 2.0)
            ]
        );
    }

    #[test]
    fn geometry_without_walls_is_an_error() {
        let xml = r#"<geometry><rooms><room><subroom>
            <polygon caption="crossing"><vertex px="0" py="0"/></polygon>
        </subroom></room></rooms></geometry>"#;
        let err = parse_geometry(xml).unwrap_err();
        assert!(matches!(err, Error::Geometry(GeometryError::NoWalls)));
    }

    #[test]
    fn missing_vertex_coordinate_reports_its_line() {
        let xml = "<geometry><subroom>\n<polygon caption=\"wall\">\n<vertex px=\"1\"/>\n</polygon></subroom></geometry>";
        let err = parse_geometry(xml).unwrap_err();
        match err {
            Error::Geometry(GeometryError::MissingAttribute {
                attribute, line, ..
            }) => {
                assert_eq!(attribute, "py");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_coordinate_is_rejected() {
        let xml = r#"<geometry><subroom><polygon caption="wall">
            <vertex px="one" py="2"/></polygon></subroom></geometry>"#;
        let err = parse_geometry(xml).unwrap_err();
        assert!(matches!(
            err,
            Error::Geometry(GeometryError::InvalidCoordinate { attribute: "px", .. })
        ));
    }

    #[test]
    fn walls_outside_a_subroom_are_ignored() {
        let xml = r#"<geometry>
            <polygon caption="wall"><vertex px="0" py="0"/><vertex px="1" py="1"/></polygon>
        </geometry>"#;
        assert!(matches!(
            parse_geometry(xml).unwrap_err(),
            Error::Geometry(GeometryError::NoWalls)
        ));
    }

    #[test]
    fn polygon_text_accepts_wkt_and_tuple_lists() {
        assert_eq!(
            parse_polygon_text("POLYGON((0 0,1.5 0,1.5 -2))").unwrap(),
            vec![point(0.0, 0.0), point(1.5, 0.0), point(1.5, -2.0)]
        );
        assert_eq!(
            parse_polygon_text("(1.0, 2.0), (3.0, 4.0)").unwrap(),
            vec![point(1.0, 2.0), point(3.0, 4.0)]
        );
        assert!(parse_polygon_text("POLYGON(())").is_none());
        assert!(parse_polygon_text("(1.0, 2.0), (3.0)").is_none());
    }
}
