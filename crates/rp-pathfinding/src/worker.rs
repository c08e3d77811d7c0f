//! The pathfinder's worker thread: owns the `PathFinder` and serves a queue
//! of `{start, goal, callback}` requests so callers never block the
//! simulation thread on a search.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rp_world::CollisionBitmap;
use tracing::debug;

use crate::astar::PathFinder;
use crate::error::{PathError, PathResult};

type Callback = Box<dyn FnOnce(Option<Vec<(f32, f32)>>) + Send>;

enum WorkItem {
    Request { start: (f32, f32), goal: (f32, f32), callback: Callback },
    Stop,
}

/// A handle to the running pathfinder worker. Dropping this, or calling
/// `stop`, sends the sentinel that drains and terminates the thread.
pub struct PathWorker {
    sender: Sender<WorkItem>,
    handle: Option<JoinHandle<()>>,
}

impl PathWorker {
    pub fn spawn(bitmap: CollisionBitmap) -> Self {
        let (sender, receiver): (Sender<WorkItem>, Receiver<WorkItem>) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("rp-pathfinder".to_string())
            .spawn(move || run(bitmap, receiver))
            .expect("failed to spawn pathfinder thread");

        Self { sender, handle: Some(handle) }
    }

    /// Enqueues a path request. The callback runs on the pathfinder thread;
    /// callers that need the result on another thread must hop back
    /// themselves (e.g. via a thread-safe slot the Pathing component polls).
    pub fn request<F>(&self, start: (f32, f32), goal: (f32, f32), callback: F) -> PathResult<()>
    where
        F: FnOnce(Option<Vec<(f32, f32)>>) + Send + 'static,
    {
        self.sender
            .send(WorkItem::Request { start, goal, callback: Box::new(callback) })
            .map_err(|_| PathError::WorkerStopped)
    }

    pub fn stop(&mut self) {
        let _ = self.sender.send(WorkItem::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

fn run(bitmap: CollisionBitmap, receiver: Receiver<WorkItem>) {
    let mut finder = PathFinder::new(&bitmap);
    debug!("pathfinder worker started");
    loop {
        match receiver.recv() {
            Ok(WorkItem::Request { start, goal, callback }) => {
                let path = finder.find(start, goal);
                callback(path);
            }
            Ok(WorkItem::Stop) | Err(_) => break,
        }
    }
    debug!("pathfinder worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_worker_finds_path() {
        let bm = CollisionBitmap::all_passable(16, 16);
        let worker = PathWorker::spawn(bm);
        let (tx, rx) = channel();
        worker
            .request((0.0, 0.0), (5.0, 5.0), move |path| {
                tx.send(path).unwrap();
            })
            .unwrap();
        let result = rx.recv().unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_worker_stops_cleanly() {
        let bm = CollisionBitmap::all_passable(4, 4);
        let mut worker = PathWorker::spawn(bm);
        worker.stop();
        assert!(worker.request((0.0, 0.0), (1.0, 1.0), |_| {}).is_err());
    }
}
