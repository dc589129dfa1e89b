// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT license.

//! The Slurm version requirement here is totally made up.
//!
//! The docs of this crate should be buildable on docs.rs, whose VM does not
//! have libslurm installed. When the `slurmrs_on_docs_rs` cfg is set (via the
//! `package.metadata.docs.rs` section of Cargo.toml) we download a
//! pre-generated binding file instead of running bindgen, and we don't link
//! with any libraries. The result compiles but cannot run.
//!
//! Some Slurm installs don't ship a pkg-config file. For those, set
//! `SLURM_LIBDIR` (and optionally `SLURM_INCDIR`) to point at the install.
//!
//! After generating the bindings we scan them to learn which optional pieces
//! of the C API are present, and write that list out as `features.rs`.

extern crate bindgen;
extern crate pkg_config;

use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

const PREBUILT_BINDINGS_URL: &str = "https://gist.github.com/pkgw/40e36f9dc0d771323205fc0617ac7141/\
                                     raw/6405dba98cd0eec7fab483b3d090b919e1383094/bindings.rs";

const WRAPPER_HEADER: &str = "src/wrapper.h";

fn main() {
    println!("cargo:rerun-if-changed={}", WRAPPER_HEADER);
    println!("cargo:rerun-if-env-changed=SLURM_LIBDIR");
    println!("cargo:rerun-if-env-changed=SLURM_INCDIR");

    let mut do_the_bindgen = true;
    let mut builder = bindgen::Builder::default()
        .header(WRAPPER_HEADER);
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));
    let bindings_path = out_dir.join("bindings.rs");

    if cfg!(slurmrs_on_docs_rs) {
        // Activate the hack!
        do_the_bindgen = false;
        println!("cargo:warning=using pre-generated Slurm bindings; the result will not link");
        Command::new("curl")
            .arg("-sSL")
            .arg("-o")
            .arg(&bindings_path)
            .arg(PREBUILT_BINDINGS_URL)
            .status()
            .expect("failed to execute process");
    } else if let Ok(libdir) = env::var("SLURM_LIBDIR") {
        println!("cargo:rustc-link-search=native={}", libdir);
        println!("cargo:rustc-link-lib=dylib=slurm");
        println!("cargo:rustc-link-lib=dylib=slurmdb");

        if let Ok(incdir) = env::var("SLURM_INCDIR") {
            builder = builder.clang_arg(format!("-I{}", incdir));
        }
    } else {
        let slurm = pkg_config::Config::new()
            .atleast_version("15.0")
            .probe("slurm")
            .expect("could not find Slurm via pkg-config; try setting SLURM_LIBDIR");

        println!("cargo:rustc-link-lib=dylib=slurmdb");

        for ref path in &slurm.include_paths {
            builder = builder.clang_arg(format!("-I{}", path.display()));
        }
    }

    if do_the_bindgen {
        let bindings = builder
            .whitelist_type("job_.*")
            .whitelist_type("slurm_.*")
            .whitelist_type("slurmdb_.*")
            .whitelist_function("slurm_.*")
            .whitelist_function("slurmdb_.*")
            .whitelist_var("ESCRIPT.*")
            .whitelist_var("ESLURM.*")
            .whitelist_var("NO_VAL.*")
            .whitelist_var("SLURM.*")
            .whitelist_var("SLURMDB.*")
            .whitelist_var("SLURMRS.*")
            .rustfmt_bindings(true)
            .generate()
            .expect("Unable to generate bindings");

        bindings
            .write_to_file(&bindings_path)
            .expect("Couldn't write bindings!");
    }

    // The C API is not super stable. Record what it offers so that the
    // `slurm` crate's build.rs can turn the list into `cfg` flags.

    let features_path = out_dir.join("features.rs");
    let features = scan_c_api_features(&bindings_path)
        .unwrap_or_else(|e| panic!("couldn't scan bindgen output file {}: {}", bindings_path.display(), e));

    if features.contains(&"no_val64") {
        println!("cargo:rustc-cfg=slurmrs_no_val64");
    } else {
        println!("cargo:warning=the installed Slurm headers do not define NO_VAL64");
    }

    write_features(&features_path, &features)
        .unwrap_or_else(|e| panic!("couldn't write features output file {}: {}", features_path.display(), e));
}


/// Grossly parse the rustfmt'ed bindings, looking for optional API items.
fn scan_c_api_features(bindings_path: &Path) -> io::Result<Vec<&'static str>> {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum State {
        Scanning,
        CheckingSelectedStepT,
        CheckingSubmitResponseMsg,
    }

    let bindings_buf = BufReader::new(File::open(bindings_path)?);
    let mut features = Vec::new();
    let mut state = State::Scanning;
    let mut n_lines = 0;

    for maybe_line in bindings_buf.lines() {
        let line = maybe_line?;
        n_lines += 1;

        match state {
            State::Scanning => {
                if line.starts_with("pub struct slurmdb_selected_step_t {") {
                    state = State::CheckingSelectedStepT;
                } else if line.starts_with("pub struct submit_response_msg {") {
                    state = State::CheckingSubmitResponseMsg;
                } else if line.starts_with("pub const job_states_JOB_DEADLINE") {
                    features.push("job_state_deadline");
                } else if line.starts_with("pub const job_states_JOB_OOM") {
                    features.push("job_state_oom");
                } else if line.starts_with("pub const SLURMRS_NO_VAL64") {
                    features.push("no_val64");
                }
            },

            State::CheckingSelectedStepT => {
                if line == "}" {
                    state = State::Scanning;
                } else if line.contains("pack_job_offset") {
                    features.push("selected_step_t_pack_job_offset");
                }
            },

            State::CheckingSubmitResponseMsg => {
                if line == "}" {
                    state = State::Scanning;
                } else if line.contains("job_submit_user_msg") {
                    features.push("submit_response_user_message");
                }
            },
        }
    }

    // If rustfmt is unavailable, the output is all on two (very long) lines. Can't parse that.
    assert!(n_lines > 100, "to build this crate you must install a functional \"rustfmt\" (see README.md)");

    Ok(features)
}


fn write_features(features_path: &Path, features: &[&str]) -> io::Result<()> {
    let mut features_file = File::create(features_path)?;

    writeln!(features_file, "/// Optional items detected in the Slurm C API at build time.")?;
    writeln!(features_file, "pub const C_API_FEATURES: &[&str] = &[")?;

    for feat in features {
        writeln!(features_file, "    \"{}\",", feat)?;
    }

    writeln!(features_file, "];")
}
