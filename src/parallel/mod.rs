pub mod pool;
pub mod rendezvous;

pub use pool::{SharedSlice, WorkerPool, DEFAULT_CHUNK_SIZE};
pub use rendezvous::{Rendezvous, RendezvousResult};
