// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Memory management through the Slurm allocator.

Slurm uses its own allocator (`xmalloc` and friends) for the structures that
its API hands out and takes back. Memory that Slurm will free must come from
that allocator, and memory that Slurm allocated must be returned to it: the
system `malloc`/`free` would corrupt Slurm's bookkeeping. The public headers
don't declare the allocator, but the shared library exports it, so
`slurm-sys` declares `slurm_try_xmalloc` and `slurm_xfree` itself.

Allocations come back zero-filled. Each call passes a (file, line, module)
triple that Slurm records in its allocation log.

 */

use libc::{c_char, c_void};
use slurm_sys;
use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt::{Display, Error as FmtError, Formatter};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::str::Utf8Error;
use std::usize;


/// Errors arising when obtaining memory from Slurm.
#[derive(Copy, Clone, Debug, Eq, Fail, Hash, PartialEq)]
pub enum MemoryError {
    /// The Slurm allocator could not satisfy a request for this many bytes.
    #[fail(display = "the Slurm allocator could not provide {} bytes", _0)]
    OutOfMemory(usize),

    /// A string to be handed to Slurm contained a NUL byte at this offset.
    #[fail(display = "string contains a NUL byte at offset {}", _0)]
    InteriorNul(usize),
}


/// Allocate `size` zeroed bytes with the Slurm allocator.
///
/// The caller owns the result and must release it with `slurm_free` (or hand
/// it to a Slurm function that takes ownership).
pub fn slurm_alloc_bytes(size: usize) -> Result<*mut c_void, MemoryError> {
    let (file, line, func) = diag!();
    let ptr = unsafe { slurm_sys::slurm_try_xmalloc(size as _, file, line, func) };

    if ptr.is_null() {
        Err(MemoryError::OutOfMemory(size))
    } else {
        Ok(ptr)
    }
}


/// Allocate a zeroed array of `count` items with the Slurm allocator.
pub fn slurm_alloc_array<T>(count: usize) -> Result<*mut T, MemoryError> {
    let size = count.checked_mul(mem::size_of::<T>()).ok_or(MemoryError::OutOfMemory(usize::MAX))?;
    Ok(slurm_alloc_bytes(size)? as *mut T)
}


/// Release memory through the Slurm allocator and null out the pointer.
///
/// Does nothing if `*ptr` is already null.
///
/// # Safety
///
/// `*ptr` must be null or have been allocated by the Slurm allocator, and
/// must not be used again after this call.
pub unsafe fn slurm_free<T>(ptr: &mut *mut T) {
    let (file, line, func) = diag!();
    slurm_sys::slurm_xfree(ptr as *mut *mut T as *mut *mut c_void, file, line, func);
}


/// An owned, non-null pointer into memory managed by the Slurm allocator.
///
/// The memory is returned to Slurm when the box is dropped. Use `into_raw`
/// to give the memory to a Slurm function that takes ownership of it.
#[derive(Debug)]
pub struct SlurmBox<T> {
    ptr: *mut T,
}

impl<T> SlurmBox<T> {
    /// Allocate a zero-filled `T`.
    ///
    /// # Safety
    ///
    /// The all-zeros bit pattern must be a valid `T`. That holds for the
    /// plain C structs in `slurm-sys`.
    pub unsafe fn alloc_zeroed() -> Result<SlurmBox<T>, MemoryError> {
        let ptr = slurm_alloc_array::<T>(1)?;
        Ok(SlurmBox { ptr })
    }

    /// Take ownership of a pointer obtained from the Slurm allocator.
    /// Returns `None` if the pointer is null.
    ///
    /// # Safety
    ///
    /// The pointer must come from the Slurm allocator, point to a valid `T`,
    /// and not be owned by anything else.
    pub unsafe fn from_raw(ptr: *mut T) -> Option<SlurmBox<T>> {
        if ptr.is_null() {
            None
        } else {
            Some(SlurmBox { ptr })
        }
    }

    /// Give up ownership without freeing anything.
    pub fn into_raw(self) -> *mut T {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }
}

impl<T> Deref for SlurmBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.ptr }
    }
}

impl<T> DerefMut for SlurmBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.ptr }
    }
}

impl<T> Drop for SlurmBox<T> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(self.ptr);
            slurm_free(&mut self.ptr);
        }
    }
}


/// A NUL-terminated C string living in Slurm-allocated memory.
///
/// Many Slurm structures hold `char *` fields that Slurm frees itself; those
/// must be filled with strings made this way.
#[derive(Debug)]
pub struct SlurmString {
    ptr: *mut c_char,
}

impl SlurmString {
    /// Copy a Rust string into Slurm memory.
    pub fn new<S: AsRef<str>>(s: S) -> Result<SlurmString, MemoryError> {
        let bytes = s.as_ref().as_bytes();

        if let Some(pos) = bytes.iter().position(|b| *b == 0) {
            return Err(MemoryError::InteriorNul(pos));
        }

        // The allocation is zeroed, so the terminator is already in place.
        let ptr = slurm_alloc_array::<c_char>(bytes.len() + 1)?;
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, ptr, bytes.len()) };
        Ok(SlurmString { ptr })
    }

    /// Take ownership of a string allocated by Slurm. Returns `None` if the
    /// pointer is null.
    ///
    /// # Safety
    ///
    /// The pointer must come from the Slurm allocator, be NUL-terminated, and
    /// not be owned by anything else.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<SlurmString> {
        if ptr.is_null() {
            None
        } else {
            Some(SlurmString { ptr })
        }
    }

    /// Give up ownership, typically to store the string in a Slurm struct.
    pub fn into_raw(self) -> *mut c_char {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.ptr
    }

    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.ptr) }
    }

    /// Strings made by `new` are always UTF-8; strings taken from Slurm need
    /// not be.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        self.as_c_str().to_str()
    }

    pub fn to_string_lossy(&self) -> Cow<str> {
        self.as_c_str().to_string_lossy()
    }
}

impl Display for SlurmString {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl Drop for SlurmString {
    fn drop(&mut self) {
        unsafe { slurm_free(&mut self.ptr) };
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Debug)]
    struct Pair {
        a: u32,
        b: u64,
    }

    #[test]
    fn bytes_are_zeroed_and_free_nulls_pointer() {
        let mut p = slurm_alloc_bytes(16).unwrap() as *mut u8;

        unsafe {
            assert!((0..16).all(|i| *p.offset(i) == 0));
            ptr::write_bytes(p, 0, 16);
            slurm_free(&mut p);
        }

        assert!(p.is_null());
    }

    #[test]
    fn free_of_null_is_noop() {
        let mut p: *mut u32 = ptr::null_mut();
        unsafe { slurm_free(&mut p) };
        assert!(p.is_null());
    }

    #[test]
    fn array_size_overflow_is_an_error() {
        assert_eq!(slurm_alloc_array::<u64>(usize::MAX).unwrap_err(),
                   MemoryError::OutOfMemory(usize::MAX));
    }

    #[test]
    fn array_is_zeroed() {
        let mut p = slurm_alloc_array::<u32>(8).unwrap();

        unsafe {
            assert!((0..8).all(|i| *p.offset(i) == 0));
            slurm_free(&mut p);
        }
    }

    #[test]
    fn box_derefs_to_zeroed_value() {
        let mut b = unsafe { SlurmBox::<Pair>::alloc_zeroed() }.unwrap();
        assert_eq!(b.a, 0);
        assert_eq!(b.b, 0);

        b.a = 7;
        b.b = 1 << 40;
        assert_eq!(unsafe { (*b.as_ptr()).b }, 1 << 40);
    }

    #[test]
    fn box_raw_roundtrip() {
        let b = unsafe { SlurmBox::<Pair>::alloc_zeroed() }.unwrap();
        let p = b.into_raw();
        assert!(!p.is_null());

        let b = unsafe { SlurmBox::from_raw(p) }.unwrap();
        assert_eq!(b.as_ptr(), p);
    }

    #[test]
    fn box_from_null_is_none() {
        assert!(unsafe { SlurmBox::<Pair>::from_raw(ptr::null_mut()) }.is_none());
    }

    #[test]
    fn string_copies_text() {
        let s = SlurmString::new("hello world").unwrap();
        assert_eq!(s.to_str().unwrap(), "hello world");
        assert_eq!(s.as_c_str().to_bytes().len(), 11);
        assert_eq!(format!("{}", s), "hello world");
    }

    #[test]
    fn empty_string() {
        let s = SlurmString::new("").unwrap();
        assert_eq!(s.to_str().unwrap(), "");
    }

    #[test]
    fn string_rejects_interior_nul() {
        assert_eq!(SlurmString::new("ab\0c").unwrap_err(), MemoryError::InteriorNul(2));
    }

    #[test]
    fn string_handoff_and_reclaim() {
        let p = SlurmString::new("partition").unwrap().into_raw();
        let s = unsafe { SlurmString::from_raw(p) }.unwrap();
        assert_eq!(s.to_string_lossy(), "partition");
    }
}
