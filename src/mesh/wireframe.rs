use crate::error::{ViewerError, ViewerResult};

/// Expands a triangle index list into a line list with one segment per
/// triangle edge: `(a, b), (b, c), (c, a)`.
///
/// Shared edges are emitted once per triangle that owns them. A trailing
/// partial triangle is rejected rather than truncated.
pub fn derive_wireframe(indices: &[u32]) -> ViewerResult<Vec<u32>> {
    if indices.len() % 3 != 0 {
        return Err(ViewerError::IncompleteTriangle { len: indices.len() });
    }

    let mut lines = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        lines.extend_from_slice(&[a, b, b, c, c, a]);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_single_triangle() {
        assert_eq!(derive_wireframe(&[4, 5, 6]).unwrap(), vec![4, 5, 5, 6, 6, 4]);
    }

    #[test]
    fn test_empty() {
        assert!(derive_wireframe(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_partial_triangle_is_rejected() {
        let err = derive_wireframe(&[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, ViewerError::IncompleteTriangle { len: 4 }));
    }

    #[quickcheck]
    fn prop_six_indices_per_triangle(indices: Vec<u32>) -> bool {
        let whole = indices.len() / 3 * 3;
        let indices = &indices[..whole];
        let lines = derive_wireframe(indices).unwrap();

        lines.len() == indices.len() * 2
            && lines.chunks_exact(2).all(|edge| {
                indices.chunks_exact(3).any(|tri| {
                    tri.contains(&edge[0]) && tri.contains(&edge[1])
                })
            })
    }
}
