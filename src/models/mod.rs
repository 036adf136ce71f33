// Domain models: probe readings and the persisted sample row

mod network;
mod probe;
mod sample;
mod storage;
mod system;

pub use network::NetworkReading;
pub use probe::Probe;
pub use sample::Sample;
pub use storage::StorageReading;
pub use system::{CpuReading, MemoryReading, Readings};
