use crossbeam::channel::{self, Receiver, TryRecvError};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::{MeshFormat, UnifiedMesh, derive_wireframe};

/// Everything the renderer needs from disk, built once and never mutated.
pub struct LoadedMesh {
    pub path: PathBuf,
    pub format: MeshFormat,
    pub mesh: UnifiedMesh,
    pub edges: Vec<u32>,
}

impl LoadedMesh {
    pub fn read(path: &Path, format: MeshFormat) -> ViewerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(path, format, &text)
    }

    pub fn from_text(path: &Path, format: MeshFormat, text: &str) -> ViewerResult<Self> {
        let mesh = format.parse(text);
        let edges = derive_wireframe(&mesh.indices)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            mesh,
            edges,
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }
}

/// Reads and parses the mesh on a worker thread.
///
/// The load runs to completion once started; the frame loop polls
/// [`MeshLoader::try_recv`] until a result arrives.
pub struct MeshLoader {
    rx_result: Receiver<ViewerResult<LoadedMesh>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MeshLoader {
    pub fn spawn(path: PathBuf, format: MeshFormat) -> ViewerResult<Self> {
        let (tx_result, rx_result) = channel::bounded(1);

        let thread_handle = thread::Builder::new()
            .name("mesh-loader".into())
            .spawn(move || {
                let started = Instant::now();
                let result = LoadedMesh::read(&path, format);
                if let Ok(loaded) = &result {
                    tracing::info!(
                        path = %loaded.path.display(),
                        format = format.name(),
                        vertices = loaded.mesh.vertex_count(),
                        triangles = loaded.mesh.triangle_count(),
                        edges = loaded.edge_count(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "mesh loaded"
                    );
                }
                let _ = tx_result.send(result);
            })
            .map_err(ViewerError::LoaderSpawn)?;

        Ok(Self {
            rx_result,
            thread_handle: Some(thread_handle),
        })
    }

    /// `None` while the load is still running.
    pub fn try_recv(&self) -> Option<ViewerResult<LoadedMesh>> {
        match self.rx_result.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ViewerError::LoaderDisconnected)),
        }
    }
}

impl Drop for MeshLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_text_derives_edges() {
        let loaded = LoadedMesh::from_text(
            Path::new("tri.norm"),
            MeshFormat::PointNormalPairs,
            "1\n0 0 0\n0 0 1\n1 0 0\n0 0 1\n0 1 0\n0 0 1",
        )
        .unwrap();
        assert_eq!(loaded.edges, vec![0, 1, 1, 2, 2, 0]);
        assert_eq!(loaded.edge_count(), 3);
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let loader = MeshLoader::spawn(
            PathBuf::from("/nonexistent/meshview/model.obj"),
            MeshFormat::Obj,
        )
        .unwrap();

        let mut result = None;
        for _ in 0..500 {
            result = loader.try_recv();
            if result.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(result, Some(Err(ViewerError::Io { .. }))));
    }

    #[test]
    fn test_spawned_loader_delivers_mesh() {
        let path = std::env::temp_dir().join(format!("meshview-loader-{}.norm", std::process::id()));
        std::fs::write(&path, "1\n0 0 0\n0 0 1\n1 0 0\n0 0 1\n0 1 0\n0 0 1\n").unwrap();

        let loader = MeshLoader::spawn(path.clone(), MeshFormat::PointNormalPairs).unwrap();
        let mut result = None;
        for _ in 0..500 {
            result = loader.try_recv();
            if result.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let _ = std::fs::remove_file(&path);

        let loaded = result.unwrap().unwrap();
        assert_eq!(loaded.mesh.triangle_count(), 1);
        assert_eq!(loaded.edge_count(), 3);
    }
}
