//! Pre-triangulated text formats.
//!
//! Both start with a triangle count line followed by one `x y z` triple per
//! line. They differ only in how points and normals are ordered within a
//! triangle.

use std::str::Lines;

use crate::mesh::{UnifiedMesh, parse_triple};

/// Lines holding one triangle: three points and three normals.
const LINES_PER_TRIANGLE: usize = 6;

/// Walks the non-blank lines of a flat mesh file.
struct TripleReader<'a> {
    lines: Lines<'a>,
}

impl<'a> TripleReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        self.lines.by_ref().map(str::trim).find(|l| !l.is_empty())
    }

    /// Unparseable count lines read as zero triangles. The declared count is
    /// capped at the triangles the remaining lines can start, so only the last
    /// triangle is ever padded.
    fn triangle_count(&mut self) -> usize {
        let declared = self
            .next_line()
            .and_then(|l| l.split_whitespace().next())
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(0);

        let remaining = self.lines.clone().filter(|l| !l.trim().is_empty()).count();
        let available = remaining.div_ceil(LINES_PER_TRIANGLE);
        if declared > available {
            tracing::warn!(declared, available, "triangle count exceeds file contents");
        }
        declared.min(available)
    }

    /// Exhausted input yields `NaN` triples so corner counts stay exact.
    fn triple(&mut self) -> [f32; 3] {
        match self.next_line() {
            Some(line) => parse_triple(line.split_whitespace()),
            None => [f32::NAN; 3],
        }
    }
}

/// `.norm`: point, normal, point, normal, point, normal per triangle.
pub fn parse_point_normal_pairs(text: &str) -> UnifiedMesh {
    let mut reader = TripleReader::new(text);
    let triangles = reader.triangle_count();
    let mut mesh = UnifiedMesh::with_capacity(triangles * 3);

    for _ in 0..triangles * 3 {
        let position = reader.triple();
        let normal = reader.triple();
        mesh.push_corner(position, normal);
    }

    tracing::debug!(triangles, "parsed point/normal pairs");
    mesh
}

/// `.tris`: three points then their three normals per triangle.
pub fn parse_points_then_normals(text: &str) -> UnifiedMesh {
    let mut reader = TripleReader::new(text);
    let triangles = reader.triangle_count();
    let mut mesh = UnifiedMesh::with_capacity(triangles * 3);

    for _ in 0..triangles {
        let points = [reader.triple(), reader.triple(), reader.triple()];
        let normals = [reader.triple(), reader.triple(), reader.triple()];
        for (position, normal) in points.into_iter().zip(normals) {
            mesh.push_corner(position, normal);
        }
    }

    tracing::debug!(triangles, "parsed points-then-normals");
    mesh
}
