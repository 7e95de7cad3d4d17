//! Flat tab-separated text renderings of the analysis results.
//!
//! Numbers use Rust's shortest round-trip formatting, so reading a file back yields the exact
//! values that were written.

use crate::diagram::{CountPoint, DiagramPoint, FrameMean};
use crate::field::Field;
use crate::grid::BinEdges;
use std::fmt::Write as _;

/// One line per row, lowest y bin first.
pub fn field_to_tsv(field: &Field) -> String {
    let mut out = String::new();
    for row in field.rows_iter() {
        push_row(&mut out, row.iter().copied());
    }
    out
}

pub fn edges_to_tsv(edges: &BinEdges) -> String {
    let mut out = String::new();
    push_row(&mut out, edges.as_slice().iter().copied());
    out
}

pub fn frame_series_to_tsv(series: &[FrameMean]) -> String {
    let mut out = String::from("#frame\tdensity\tvelocity\n");
    for m in series {
        let _ = writeln!(out, "{}\t{}\t{}", m.frame, m.density, m.velocity);
    }
    out
}

pub fn diagram_points_to_tsv(points: &[DiagramPoint]) -> String {
    let mut out = String::from("#frame\tdensity\tvelocity\tflow\n");
    for p in points {
        let _ = writeln!(out, "{}\t{}\t{}\t{}", p.frame, p.density, p.velocity, p.flow);
    }
    out
}

pub fn count_series_to_tsv(counts: &[CountPoint]) -> String {
    let mut out = String::from("#frame\ttime\tcount\n");
    for c in counts {
        let _ = writeln!(out, "{}\t{}\t{}", c.frame, c.time, c.count);
    }
    out
}

fn push_row(out: &mut String, values: impl Iterator<Item = f64>) {
    for (i, v) in values.enumerate() {
        if i > 0 {
            out.push('\t');
        }
        let _ = write!(out, "{v}");
    }
    out.push('\n');
}
