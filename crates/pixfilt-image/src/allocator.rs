use crate::error::ImageError;

/// A trait for allocating the pixel and scratch buffers used by the filters.
///
/// Every allocation is fallible: an implementation must report failure with
/// [`ImageError::OutOfMemory`] instead of aborting, so that an operation can
/// release what it already holds and leave the caller's image untouched.
pub trait ImageAllocator: Clone + Send + Sync {
    /// Allocates an empty buffer able to hold `capacity` elements without
    /// reallocating.
    fn try_with_capacity<T>(&self, capacity: usize) -> Result<Vec<T>, ImageError>;

    /// Allocates a buffer of `len` elements, each set to `val`.
    fn try_alloc<T: Clone>(&self, len: usize, val: T) -> Result<Vec<T>, ImageError> {
        let mut buf = self.try_with_capacity(len)?;
        buf.resize(len, val);
        Ok(buf)
    }

    /// Allocates a buffer holding a copy of `src`.
    fn try_alloc_from_slice<T: Clone>(&self, src: &[T]) -> Result<Vec<T>, ImageError> {
        let mut buf = self.try_with_capacity(src.len())?;
        buf.extend_from_slice(src);
        Ok(buf)
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// An allocator backed by the global system allocator.
pub struct CpuAllocator;

impl ImageAllocator for CpuAllocator {
    fn try_with_capacity<T>(&self, capacity: usize) -> Result<Vec<T>, ImageError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity).map_err(|_| {
            ImageError::OutOfMemory(capacity.saturating_mul(std::mem::size_of::<T>()))
        })?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_allocator() -> Result<(), ImageError> {
        let buf = CpuAllocator.try_alloc(1024, 7u8)?;
        assert_eq!(buf.len(), 1024);
        assert!(buf.iter().all(|&v| v == 7));
        Ok(())
    }

    #[test]
    fn test_cpu_allocator_from_slice() -> Result<(), ImageError> {
        let buf = CpuAllocator.try_alloc_from_slice(&[1u8, 2, 3])?;
        assert_eq!(buf, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_cpu_allocator_overflow() {
        let res = CpuAllocator.try_alloc(usize::MAX, 0u8);
        assert!(matches!(res, Err(ImageError::OutOfMemory(_))));
    }
}
