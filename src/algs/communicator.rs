//! Thin façade over intra-process (threaded) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! Handles are waitable; the blocking helpers in [`crate::algs::wire`]
//! call `.wait()` immediately, which is how the halo protocol gets
//! synchronous send/receive semantics.

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Point-to-point communication interface (minimal by design).
pub trait Communicator: Send + Sync + 'static {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Tear down the whole world after a fatal error on this rank.
    ///
    /// Peers blocked on a receive from this rank must not wait forever.
    /// Backends without peers do nothing.
    fn abort(&self, _reason: &str) {}
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Typed message tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    pub const fn offset(self, by: u16) -> Self {
        Self(self.0.wrapping_add(by))
    }
}

/// Distinct tags for every message kind of a run.
///
/// Halo tags differ per axis and per phase so a phase-1 border can never be
/// matched by a phase-2 receive from the same peer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeatsimTags {
    pub grid_params: CommTag,
    pub grid_data: CommTag,
    pub x_first: CommTag,
    pub x_second: CommTag,
    pub y_first: CommTag,
    pub y_second: CommTag,
    pub result: CommTag,
}

impl HeatsimTags {
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            grid_params: base,
            grid_data: base.offset(1),
            x_first: base.offset(2),
            x_second: base.offset(3),
            y_first: base.offset(4),
            y_second: base.offset(5),
            result: base.offset(6),
        }
    }
}

impl Default for HeatsimTags {
    fn default() -> Self {
        Self::from_base(CommTag::new(0x4800))
    }
}

/// Compile-time no-op comm for pure serial runs: rank 0 of 1, every receive fails.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
}

// --- RayonComm: intra-process / multi-thread ---
type Key = (usize, usize, u16); // (src, dst, tag)

/// Shared state of one in-process world.
///
/// Senders queue into `mailbox` and then notify `arrived` under `lock`;
/// receivers check the queue and the abort flag while holding `lock`, so a
/// wakeup cannot slip in between the check and the wait.
#[derive(Debug, Default)]
struct World {
    mailbox: DashMap<Key, VecDeque<Bytes>>,
    aborted: AtomicBool,
    lock: Mutex<()>,
    arrived: Condvar,
}

impl World {
    fn push(&self, key: Key, bytes: Bytes) {
        self.mailbox.entry(key).or_default().push_back(bytes);
        let _guard = self.lock.lock();
        self.arrived.notify_all();
    }

    fn pop(&self, key: &Key) -> Option<Bytes> {
        self.mailbox.get_mut(key)?.pop_front()
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        let _guard = self.lock.lock();
        self.arrived.notify_all();
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}

static GLOBAL_WORLD: Lazy<Arc<World>> = Lazy::new(|| Arc::new(World::default()));

/// In-process backend: each rank is a thread sharing one mailbox.
///
/// Sends are buffered and complete immediately; receives block until a
/// message with the same `(src, dst, tag)` is queued. Messages between a
/// pair of ranks with one tag are delivered in FIFO order.
///
/// Once any rank calls [`Communicator::abort`], receives that find their
/// queue empty return `None` instead of blocking. Already queued messages
/// are still delivered.
#[derive(Clone, Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
    world: Arc<World>,
}

impl RayonComm {
    /// Rank `rank` of a `size`-rank world on the process-global mailbox.
    ///
    /// Aborting any rank of the global world affects every later user of it.
    pub fn new(rank: usize, size: usize) -> Self {
        Self {
            rank,
            size,
            world: Arc::clone(&GLOBAL_WORLD),
        }
    }

    /// All ranks of a fresh world with its own mailbox.
    pub fn world(size: usize) -> Vec<Self> {
        let world = Arc::new(World::default());
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                world: Arc::clone(&world),
            })
            .collect()
    }

    /// Run `f` once per rank of a fresh world, each on its own thread.
    ///
    /// Returns the results in rank order. A panicking rank aborts the world,
    /// so its peers' pending receives fail; once every rank has finished the
    /// first panic is resumed on the caller.
    pub fn run_world<R, F>(size: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(RayonComm) -> R + Sync,
    {
        let f = &f;
        let joined: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = Self::world(size)
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        let world = Arc::clone(&comm.world);
                        let rank = comm.rank;
                        catch_unwind(AssertUnwindSafe(|| f(comm))).inspect_err(|_| {
                            log::error!("rank {rank} panicked, aborting world");
                            world.abort();
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(Err))
                .collect()
        });
        joined
            .into_iter()
            .map(|r| r.unwrap_or_else(|payload| resume_unwind(payload)))
            .collect()
    }
}

/// Pending receive on a [`RayonComm`] mailbox.
pub struct LocalHandle {
    world: Arc<World>,
    key: Key,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let mut guard = self.world.lock.lock();
        loop {
            if let Some(bytes) = self.world.pop(&self.key) {
                return Some(bytes.to_vec());
            }
            if self.world.is_aborted() {
                return None;
            }
            self.world.arrived.wait(&mut guard);
        }
    }
}

impl Communicator for RayonComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
        self.world
            .push((self.rank, peer, tag), Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> LocalHandle {
        LocalHandle {
            world: Arc::clone(&self.world),
            key: (peer, self.rank, tag),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn abort(&self, reason: &str) {
        log::error!("rank {} aborting world: {reason}", self.rank);
        self.world.abort();
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use crate::heatsim_error::CommError;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination as _, Equivalence as _, Source as _};

    /// World communicator of an already-initialised MPI environment.
    ///
    /// The caller keeps the `mpi::environment::Universe` alive for as long as
    /// the communicator is used. Send and receive are blocking; the handles
    /// are already complete when returned.
    #[derive(Clone, Debug)]
    pub struct MpiComm {
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, CommError> {
            if !mpi::environment::is_initialized() {
                return Err(CommError::Mpi("MPI environment is not initialized".into()));
            }
            let world = SimpleCommunicator::world();
            Ok(Self {
                rank: world.rank() as usize,
                size: world.size() as usize,
            })
        }
    }

    /// Completed MPI receive.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = ();
        type RecvHandle = MpiHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
            let world = SimpleCommunicator::world();
            world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let world = SimpleCommunicator::world();
            let status = world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(&mut *buf, i32::from(tag));
            let n = status.count(u8::equivalent_datatype()) as usize;
            MpiHandle(Some(buf[..n.min(buf.len())].to_vec()))
        }

        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }

        fn abort(&self, reason: &str) {
            log::error!("rank {} aborting MPI world: {reason}", self.rank);
            SimpleCommunicator::world().abort(1)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
