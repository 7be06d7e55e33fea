//! Wiping of secret material that the optimizer is not allowed to elide.

#![allow(clippy::module_name_repetitions)]

use alloc::vec::Vec;
use core::{
    fmt::Debug,
    ops::{Deref, DerefMut},
};

#[inline(always)]
fn atomic_fence() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

#[inline(always)]
fn volatile_write<T: Copy + Sized>(src: T, dst: &mut T) {
    unsafe { core::ptr::write_volatile(dst, src) }
}

pub trait Erase {
    fn erase(&mut self);
}

trait DefaultIsErased: Copy + Default + Sized {}

impl<E: DefaultIsErased> Erase for E {
    fn erase(&mut self) {
        volatile_write(E::default(), self);
        atomic_fence();
    }
}

macro_rules! impl_default_is_erased {
    ($($t:ty),*) => {
        $(
            impl DefaultIsErased for $t {}
        )*
    };
}

#[rustfmt::skip]
impl_default_is_erased! {
    bool,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize
}

impl<E: Erase, const N: usize> Erase for [E; N] {
    fn erase(&mut self) {
        self.iter_mut().erase();
    }
}

impl<E: Erase> Erase for [E] {
    fn erase(&mut self) {
        self.iter_mut().erase();
    }
}

impl<E: Erase> Erase for Vec<E> {
    fn erase(&mut self) {
        self.as_mut_slice().erase();
    }
}

impl<E: Erase> Erase for core::slice::IterMut<'_, E> {
    fn erase(&mut self) {
        for elem in self {
            elem.erase();
        }
    }
}

/// Owns a value and erases it when dropped.
///
/// Every exit path out of the owning scope wipes the contents, including early
/// returns through `?` and unwinding.
pub struct Erased<T: Erase>(T);

impl<T: Erase> Erased<T> {
    #[inline]
    pub const fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: Erase + Default> Default for Erased<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

impl<T: Erase> Deref for Erased<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Erase> DerefMut for Erased<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Erase> Drop for Erased<T> {
    fn drop(&mut self) {
        self.0.erase();
    }
}

impl<T: Erase> Debug for Erased<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Erased { ... }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn erases_integers_and_arrays() {
        let mut word = 0xdead_beef_u32;
        word.erase();
        assert_eq!(word, 0);

        let mut block = [0xa5_u8; 64];
        block.erase();
        assert_eq!(block, [0; 64]);

        let mut state = [[7_u32; 4]; 4];
        state.erase();
        assert_eq!(state, [[0; 4]; 4]);
    }

    #[test]
    fn erases_heap_buffers_in_place() {
        let mut buf = vec![0xff_u8; 1000];
        let ptr = buf.as_ptr();
        buf.erase();
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.as_ptr(), ptr);
        assert!(buf.iter().all(|&b| b == 0));

        let mut half = vec![1_u64; 8];
        half[4..].erase();
        assert_eq!(half, [1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn guard_derefs_to_inner_value() {
        let mut guard = Erased::new(vec![1_u8, 2, 3]);
        guard.push(4);
        guard[0] = 9;
        assert_eq!(guard.as_slice(), &[9, 2, 3, 4]);
        assert_eq!(alloc::format!("{guard:?}"), "Erased { ... }");

        let empty: Erased<[u8; 4]> = Erased::default();
        assert_eq!(*empty, [0; 4]);
    }
}
