//! Device-resident arrays of per-instance base addresses

use super::Storage;
use crate::error::Result;
use crate::runtime::Runtime;

/// One device address per batch instance, itself stored in device memory
///
/// Batched kernels receive the address of this array rather than a list of
/// host pointers, so a single launch covers the whole batch. The arrays in
/// a [`DisplacementScratch`](crate::trsm::DisplacementScratch) are rewritten
/// by the displacement kernel before every sub-block operation.
pub struct PointerArray<R: Runtime> {
    storage: Storage<R>,
    len: usize,
}

impl<R: Runtime> PointerArray<R> {
    /// Array of `len` null addresses
    pub fn new(client: &R::Client, len: usize) -> Result<Self> {
        Self::from_addresses(client, &vec![0u64; len])
    }

    /// Upload host-side addresses
    pub fn from_addresses(client: &R::Client, addresses: &[u64]) -> Result<Self> {
        let storage = Storage::from_bytes(client, bytemuck::cast_slice(addresses))?;
        Ok(Self {
            storage,
            len: addresses.len(),
        })
    }

    /// Device address of the array itself
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.storage.ptr()
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the array holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the addresses back to the host
    pub fn addresses(&self) -> Result<Vec<u64>> {
        self.storage.to_vec::<u64>()
    }
}

impl<R: Runtime> std::fmt::Debug for PointerArray<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerArray")
            .field("ptr", &format!("0x{:x}", self.storage.ptr()))
            .field("len", &self.len)
            .finish()
    }
}
