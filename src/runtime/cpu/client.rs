//! CPU client and allocator implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::error::Result;
use crate::runtime::{DefaultAllocator, Runtime, RuntimeClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a CPU client spreads batch instances over threads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Size of a dedicated rayon pool; `None` uses the global pool
    pub num_threads: Option<usize>,
    /// Smallest batch that is split across threads
    pub min_batch_len: usize,
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_batch_len: 2,
        }
    }
}

/// CPU client for operation dispatch
///
/// The client is an in-order queue whose launches execute eagerly on the
/// calling thread: by the time a launch returns, its results are visible
/// to the host, so `synchronize` has nothing to wait for. With the `rayon`
/// feature, the instances of one launch run in parallel; instances never
/// share data, so results do not depend on the thread count.
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
    parallelism: ParallelismConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
    launches: Arc<AtomicU64>,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        let allocator = create_cpu_allocator(device.clone());
        Self {
            device,
            allocator,
            parallelism: ParallelismConfig::default(),
            #[cfg(feature = "rayon")]
            pool: None,
            launches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the parallelism settings
    ///
    /// Builds a dedicated thread pool when `num_threads` is set.
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Result<Self> {
        #[cfg(feature = "rayon")]
        {
            self.pool = match config.num_threads {
                Some(n) => Some(Arc::new(
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(n)
                        .build()
                        .map_err(|e| crate::error::Error::Backend(e.to_string()))?,
                )),
                None => None,
            };
        }
        self.parallelism = config;
        Ok(self)
    }

    /// Refuse allocations once `limit_bytes` would be exceeded
    ///
    /// Gives this client a fresh allocator; buffers allocated earlier keep
    /// returning memory to the allocator they came from.
    pub fn with_memory_limit(mut self, limit_bytes: usize) -> Self {
        self.allocator = create_cpu_allocator(self.device.clone()).with_limit(limit_bytes);
        self
    }

    /// Active parallelism settings
    pub fn parallelism(&self) -> &ParallelismConfig {
        &self.parallelism
    }

    /// Number of kernel launches issued through this client (and its clones)
    pub fn launch_count(&self) -> u64 {
        self.launches.load(Ordering::Acquire)
    }

    /// Issue one launch covering `batch_count` instances
    ///
    /// `kernel` is called once per instance index.
    pub(crate) fn launch<F>(&self, batch_count: usize, kernel: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        self.launches.fetch_add(1, Ordering::AcqRel);

        #[cfg(feature = "rayon")]
        {
            if batch_count >= self.parallelism.min_batch_len.max(2) {
                use rayon::prelude::*;

                let run = || (0..batch_count).into_par_iter().for_each(&kernel);
                match &self.pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
                return;
            }
        }

        (0..batch_count).for_each(kernel);
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // Launches complete before they return
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }
}

/// CPU-specific allocator type alias
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

/// Create a CPU allocator for the given device
fn create_cpu_allocator(device: CpuDevice) -> CpuAllocator {
    DefaultAllocator::new(device, CpuRuntime::allocate, CpuRuntime::deallocate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Allocator;
    use std::sync::Mutex;

    #[test]
    fn test_launch_visits_every_instance_once() {
        let client = CpuClient::new(CpuDevice::new());
        let seen = Mutex::new(vec![0u32; 37]);
        client.launch(37, |i| seen.lock().unwrap()[i] += 1);

        assert!(seen.into_inner().unwrap().iter().all(|&c| c == 1));
        assert_eq!(client.launch_count(), 1);
    }

    #[test]
    fn test_launch_count_shared_by_clones() {
        let client = CpuClient::new(CpuDevice::new());
        let clone = client.clone();
        clone.launch(0, |_| {});
        client.launch(1, |_| {});
        assert_eq!(client.launch_count(), 2);
        assert_eq!(clone.launch_count(), 2);
    }

    #[test]
    fn test_dedicated_pool() {
        let config = ParallelismConfig {
            num_threads: Some(2),
            min_batch_len: 4,
        };
        let client = CpuClient::new(CpuDevice::new())
            .with_parallelism(config.clone())
            .unwrap();
        assert_eq!(client.parallelism(), &config);

        let total = std::sync::atomic::AtomicUsize::new(0);
        client.launch(10, |i| {
            total.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(total.into_inner(), 45);
    }

    #[test]
    fn test_memory_limit() {
        let client = CpuClient::new(CpuDevice::new()).with_memory_limit(128);
        assert!(client.allocator().allocate(256).is_err());
        let ptr = client.allocator().allocate(64).unwrap();
        client.allocator().deallocate(ptr, 64);
        assert_eq!(client.allocator().allocated_bytes(), 0);
    }
}
