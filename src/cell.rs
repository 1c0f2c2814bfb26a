use std::cell::UnsafeCell;

/// Storage whose access is arbitrated by an external reader-writer gate.
///
/// The cell itself performs no synchronization. Callers must hold the
/// owning context's gate in shared mode for [`GuardedCell::get`] and in
/// exclusive mode for [`GuardedCell::get_mut`].
pub(crate) struct GuardedCell<T> {
    value: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for GuardedCell<T> {}
unsafe impl<T: Send + Sync> Sync for GuardedCell<T> {}

impl<T> GuardedCell<T> {
    pub(crate) const fn new(val: T) -> Self {
        Self {
            value: UnsafeCell::new(val),
        }
    }

    /// # Safety
    /// The gate must be held in shared (or exclusive) mode for the whole
    /// lifetime of the returned reference.
    #[inline]
    pub(crate) unsafe fn get(&self) -> &T {
        &*self.value.get()
    }

    /// # Safety
    /// The gate must be held in exclusive mode for the whole lifetime of
    /// the returned reference.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get_mut(&self) -> &mut T {
        &mut *self.value.get()
    }

    pub(crate) fn into_inner(self) -> T {
        self.value.into_inner()
    }
}
