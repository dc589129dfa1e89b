// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Safe access to the bits of the Slurm C API that the headers hide.

The Slurm library marks missing integer values with "no value" sentinels
and allocates the structures it returns with its own private allocator. This
crate wraps both: the [`sentinel`] module exposes the sentinels with their
native widths, and the [`memory`] module provides owned pointers that are
released through the Slurm allocator.

*/

extern crate failure;
#[macro_use] extern crate failure_derive;
extern crate libc;
extern crate slurm_sys;

#[macro_use] mod macros;
pub mod memory;
pub mod sentinel;

pub use memory::{slurm_alloc_array, slurm_alloc_bytes, slurm_free, MemoryError, SlurmBox, SlurmString};
pub use sentinel::{Sentinel, NO_VAL};
#[cfg(slurm_api_no_val64)]
pub use sentinel::NO_VAL64;
