//! Directory-tree mirroring and bounded-parallel conversion.

pub mod dispatcher;
pub mod paths;
pub mod pool;

pub use dispatcher::{DirectoryPlan, DispatchOptions, DispatchReport, Dispatcher};
pub use paths::{target_file_name, ConversionJob, MirrorLayout, MirrorPathError};
pub use pool::{effective_pool_size, JobOutcome, JobStatus, PoolConfig, WorkerPool};
