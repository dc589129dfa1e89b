// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/// The (file, line, function) triple that the Slurm allocator records for
/// each call. Rust has no function-name macro, so the module path stands in
/// for it.
macro_rules! diag {
    () => {
        (
            concat!(file!(), "\0").as_ptr() as *const ::libc::c_char,
            line!() as ::libc::c_int,
            concat!(module_path!(), "\0").as_ptr() as *const ::libc::c_char,
        )
    }
}
