// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT license.

//! Low-level bindings to the `libslurm` and `libslurmdb` libraries.
//!
//! The [Slurm](https://slurm.schedmd.com/) workload manager a system for
//! scheduling and running jobs on large computing clusters. It is often used
//! in scientific HPC (high-performance computing) contexts.
//!
//! These bindings provide nothing beyond the barest minimum needed to
//! interface to the C code unsafely. Two things are added on top of the
//! public headers: the `NO_VAL` sentinels as the constants `SLURMRS_NO_VAL`
//! and (when the headers define it) `SLURMRS_NO_VAL64`, and declarations of
//! the private allocator functions `slurm_try_xmalloc` and `slurm_xfree`.
//! The list `C_API_FEATURES` names the optional parts of the C API that were
//! found at build time. Use a higher-level Rust crate in application code.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
include!(concat!(env!("OUT_DIR"), "/features.rs"));
