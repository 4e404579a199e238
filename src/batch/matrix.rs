//! Owned batches of column-major matrices

use super::{BatchedView, PointerArray, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::marker::PhantomData;

/// `batch_count` independent `rows x cols` column-major matrices sharing a
/// leading dimension
///
/// The instances live back to back in one device buffer; a device-resident
/// [`PointerArray`] holds each instance's base address, which is what
/// batched kernels consume. Instances are addressed only through that
/// array, so a batch can be presented in any order without moving data
/// (see [`with_pointer_order`](Self::with_pointer_order)).
pub struct BatchedMatrix<R: Runtime, T: Element> {
    storage: Storage<R>,
    pointers: PointerArray<R>,
    rows: usize,
    cols: usize,
    ld: usize,
    batch_count: usize,
    _marker: PhantomData<T>,
}

fn check_layout<T>(rows: usize, cols: usize, ld: usize, batch_count: usize) -> Result<usize> {
    if ld < rows.max(1) {
        return Err(Error::InvalidLayout(format!(
            "leading dimension {ld} must be at least max(1, {rows})"
        )));
    }
    ld.checked_mul(cols)
        .and_then(|stride| stride.checked_mul(batch_count))
        .and_then(|elems| elems.checked_mul(std::mem::size_of::<T>()))
        .ok_or_else(|| {
            Error::InvalidLayout(format!(
                "{batch_count} instances of {ld}x{cols} overflow the address space"
            ))
        })?;
    Ok(ld * cols)
}

impl<R: Runtime, T: Element> BatchedMatrix<R, T> {
    fn from_host_buffer(
        client: &R::Client,
        rows: usize,
        cols: usize,
        ld: usize,
        batch_count: usize,
        host: &[T],
    ) -> Result<Self> {
        let stride = check_layout::<T>(rows, cols, ld, batch_count)?;
        debug_assert_eq!(host.len(), stride * batch_count);

        let storage = Storage::from_bytes(client, bytemuck::cast_slice(host))?;
        let elem_size = std::mem::size_of::<T>() as u64;
        let base = storage.ptr();
        let addresses: Vec<u64> = (0..batch_count)
            .map(|i| {
                if base == 0 {
                    0
                } else {
                    base + (i * stride) as u64 * elem_size
                }
            })
            .collect();
        let pointers = PointerArray::from_addresses(client, &addresses)?;

        Ok(Self {
            storage,
            pointers,
            rows,
            cols,
            ld,
            batch_count,
            _marker: PhantomData,
        })
    }

    /// Batch of zero matrices
    pub fn zeros(
        client: &R::Client,
        rows: usize,
        cols: usize,
        ld: usize,
        batch_count: usize,
    ) -> Result<Self> {
        let stride = check_layout::<T>(rows, cols, ld, batch_count)?;
        let host = vec![T::zero(); stride * batch_count];
        Self::from_host_buffer(client, rows, cols, ld, batch_count, &host)
    }

    /// Batch of `n x n` identity matrices
    pub fn identity(client: &R::Client, n: usize, batch_count: usize) -> Result<Self> {
        let ld = n.max(1);
        let stride = check_layout::<T>(n, n, ld, batch_count)?;
        let mut host = vec![T::zero(); stride * batch_count];
        for inst in host.chunks_mut(stride.max(1)).take(batch_count) {
            for i in 0..n {
                inst[i + i * ld] = T::one();
            }
        }
        Self::from_host_buffer(client, n, n, ld, batch_count, &host)
    }

    /// Upload one packed column-major `rows x cols` slice per instance,
    /// laid out on the device with leading dimension `ld`
    ///
    /// Padding rows (`rows..ld`) are zero.
    pub fn from_instances<I: AsRef<[T]>>(
        client: &R::Client,
        rows: usize,
        cols: usize,
        ld: usize,
        instances: &[I],
    ) -> Result<Self> {
        let batch_count = instances.len();
        let stride = check_layout::<T>(rows, cols, ld, batch_count)?;
        let mut host = vec![T::zero(); stride * batch_count];

        for (i, inst) in instances.iter().enumerate() {
            let data = inst.as_ref();
            if data.len() != rows * cols {
                return Err(Error::InvalidLayout(format!(
                    "instance {i} has {} elements, expected {rows}x{cols}",
                    data.len()
                )));
            }
            let dst = &mut host[i * stride..(i + 1) * stride];
            for j in 0..cols {
                dst[j * ld..j * ld + rows].copy_from_slice(&data[j * rows..(j + 1) * rows]);
            }
        }

        Self::from_host_buffer(client, rows, cols, ld, batch_count, &host)
    }

    /// Same storage, presented in a different instance order
    ///
    /// Instance `i` of the result is instance `order[i]` of `self`. The
    /// data buffer is shared, so writes through either batch are visible
    /// through the other. `order` must be a permutation of
    /// `0..batch_count`; repeated entries would let two instances alias.
    pub fn with_pointer_order(&self, client: &R::Client, order: &[usize]) -> Result<Self> {
        if order.len() != self.batch_count {
            return Err(Error::InvalidLayout(format!(
                "order has {} entries, batch has {}",
                order.len(),
                self.batch_count
            )));
        }
        let current = self.pointers.addresses()?;
        let mut seen = vec![false; self.batch_count];
        let mut addresses = Vec::with_capacity(order.len());
        for &src in order {
            let addr = current.get(src).ok_or_else(|| {
                Error::InvalidLayout(format!(
                    "order entry {src} out of range for batch of {}",
                    self.batch_count
                ))
            })?;
            if std::mem::replace(&mut seen[src], true) {
                return Err(Error::InvalidLayout(format!(
                    "order entry {src} appears more than once"
                )));
            }
            addresses.push(*addr);
        }

        Ok(Self {
            storage: self.storage.clone(),
            pointers: PointerArray::from_addresses(client, &addresses)?,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
            batch_count: self.batch_count,
            _marker: PhantomData,
        })
    }

    /// Whether `self` and `other` address the same device buffer
    pub fn shares_storage(&self, other: &Self) -> bool {
        self.storage.is_same(&other.storage)
    }

    /// Deep copy into freshly allocated storage
    pub fn try_clone(&self, client: &R::Client) -> Result<Self> {
        let instances = self.to_instances()?;
        Self::from_instances(client, self.rows, self.cols, self.ld, &instances)
    }

    /// Full view of every instance
    #[inline]
    pub fn view(&self) -> BatchedView<'_, T> {
        // SAFETY: the pointer array addresses `batch_count` instances of
        // `ld * cols` elements owned by `self.storage`
        unsafe {
            BatchedView::from_raw(
                self.pointers.ptr(),
                self.batch_count,
                self.rows,
                self.cols,
                self.ld,
            )
        }
    }

    /// Copy instance `index` to the host as a packed column-major
    /// `rows x cols` vector
    pub fn instance(&self, index: usize) -> Result<Vec<T>> {
        if index >= self.batch_count {
            return Err(Error::InvalidLayout(format!(
                "instance {index} out of range for batch of {}",
                self.batch_count
            )));
        }
        let base = self.pointers.addresses()?[index];
        self.read_instance(base)
    }

    /// Copy every instance to the host, in pointer-array order
    pub fn to_instances(&self) -> Result<Vec<Vec<T>>> {
        self.pointers
            .addresses()?
            .into_iter()
            .map(|base| self.read_instance(base))
            .collect()
    }

    fn read_instance(&self, base: u64) -> Result<Vec<T>> {
        let mut packed = vec![T::zero(); self.rows * self.cols];
        if packed.is_empty() {
            return Ok(packed);
        }
        let elem_size = std::mem::size_of::<T>();
        for j in 0..self.cols {
            let column = &mut packed[j * self.rows..(j + 1) * self.rows];
            let addr = base + (j * self.ld * elem_size) as u64;
            R::copy_from_device(addr, bytemuck::cast_slice_mut(column), self.storage.device())?;
        }
        Ok(packed)
    }

    /// Rows per instance
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns per instance
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Leading dimension shared by every instance
    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Number of instances
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Elements reserved per instance (`ld * cols`)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ld * self.cols
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// The per-instance address array
    #[inline]
    pub fn pointers(&self) -> &PointerArray<R> {
        &self.pointers
    }
}

impl<R: Runtime, T: Element> std::fmt::Debug for BatchedMatrix<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchedMatrix")
            .field("dtype", &T::DTYPE)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ld", &self.ld)
            .field("batch_count", &self.batch_count)
            .field("storage", &self.storage)
            .finish()
    }
}
