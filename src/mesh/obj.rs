use crate::mesh::{FALLBACK_NORMAL, UnifiedMesh, parse_triple};

/// One `vertex[/texture][/normal]` reference from an `f` record, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CornerRef {
    vertex: Option<i64>,
    normal: Option<i64>,
}

impl CornerRef {
    fn parse(token: &str) -> Self {
        let mut parts = token.split('/');
        let vertex = parts.next().and_then(|p| p.parse().ok());
        // the texture slot is skipped; only the third field names a normal
        let normal = parts.nth(1).and_then(|p| p.parse().ok());
        Self { vertex, normal }
    }
}

fn lookup(table: &[[f32; 3]], one_based: Option<i64>) -> Option<[f32; 3]> {
    let index = one_based.filter(|&i| i > 0)?;
    table.get(usize::try_from(index - 1).ok()?).copied()
}

/// Parses OBJ-style `v`, `vn` and `f` records into a triangle soup.
///
/// Every polygon with `k` corners is fanned into `k - 2` triangles around its
/// first corner and each emitted corner gets a fresh index, so the indices are
/// exactly `0..len`. Any other record type is ignored.
pub fn parse_obj(text: &str) -> UnifiedMesh {
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut mesh = UnifiedMesh::default();

    let mut faces = 0usize;
    let mut unresolved = 0usize;

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => vertices.push(parse_triple(tokens)),
            Some("vn") => normals.push(parse_triple(tokens)),
            Some("f") => {
                faces += 1;
                let corners: Vec<CornerRef> = tokens.map(CornerRef::parse).collect();
                for i in 1..corners.len().saturating_sub(1) {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        let position = lookup(&vertices, corner.vertex).unwrap_or_else(|| {
                            unresolved += 1;
                            [f32::NAN; 3]
                        });
                        let normal = lookup(&normals, corner.normal).unwrap_or(FALLBACK_NORMAL);
                        mesh.push_corner(position, normal);
                    }
                }
            }
            _ => {}
        }
    }

    if unresolved > 0 {
        tracing::warn!(unresolved, "face corners reference missing vertices");
    }
    tracing::debug!(
        vertices = vertices.len(),
        normals = normals.len(),
        faces,
        triangles = mesh.triangle_count(),
        "parsed OBJ records"
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 -1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_corner_ref_fields() {
        assert_eq!(
            CornerRef::parse("3"),
            CornerRef { vertex: Some(3), normal: None }
        );
        assert_eq!(
            CornerRef::parse("3/7"),
            CornerRef { vertex: Some(3), normal: None }
        );
        assert_eq!(
            CornerRef::parse("3//2"),
            CornerRef { vertex: Some(3), normal: Some(2) }
        );
        assert_eq!(
            CornerRef::parse("3/7/2"),
            CornerRef { vertex: Some(3), normal: Some(2) }
        );
    }

    #[test]
    fn test_quad_is_fanned_into_two_triangles() {
        let mesh = parse_obj(QUAD);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(
            mesh.positions,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
        );
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_missing_normal_reference_uses_fallback() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1 2/5 3//9\n");
        assert_eq!(mesh.normals, vec![FALLBACK_NORMAL; 3]);
    }

    #[test]
    fn test_shared_corners_are_not_reused() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 3\n");
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.positions[0], mesh.positions[3]);
    }

    #[test]
    fn test_malformed_records_degrade() {
        let mesh = parse_obj("v 0 zero 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 1 2\n# comment\n");
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.positions[0][1].is_nan());
        assert!(mesh.positions[2].iter().all(|c| c.is_nan()));
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[quickcheck]
    fn prop_fan_emits_k_minus_two_triangles(k: u8) -> bool {
        let k = (k % 16) as usize + 3;
        let mut text = String::new();
        for i in 0..k {
            text.push_str(&format!("v {i} {} 0\n", i * 2));
        }
        let refs: Vec<String> = (1..=k).map(|i| i.to_string()).collect();
        text.push_str(&format!("f {}\n", refs.join(" ")));

        let mesh = parse_obj(&text);
        mesh.triangle_count() == k - 2
            && mesh
                .positions
                .chunks(3)
                .all(|tri| tri[0] == [0.0, 0.0, 0.0])
    }

    #[quickcheck]
    fn prop_indices_are_contiguous(face_sizes: Vec<u8>) -> bool {
        let mut text = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\n");
        for size in face_sizes.iter().take(32) {
            let corners: Vec<&str> = (0..*size % 8)
                .map(|i| ["1//1", "2", "3/1/1"][i as usize % 3])
                .collect();
            text.push_str(&format!("f {}\n", corners.join(" ")));
        }

        let mesh = parse_obj(&text);
        let n = mesh.indices.len();
        mesh.positions.len() == n
            && mesh.normals.len() == n
            && mesh.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i)
    }
}
