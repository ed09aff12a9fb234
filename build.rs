//! Build script to compile the C task implementations.

use std::env;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(c_implementation_active)");
    println!("cargo:rerun-if-env-changed=CC");

    let build = cc::Build::new();
    let compiler = match build.try_get_compiler() {
        Ok(compiler) => compiler,
        Err(e) => {
            println!("cargo:warning=No C compiler found ({e}). C implementations disabled.");
            return;
        }
    };
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    let compiler_name = if compiler.is_like_clang() {
        if target_os == "macos" {
            "Apple Clang"
        } else {
            "Clang"
        }
    } else if compiler.is_like_gnu() {
        "GCC"
    } else if compiler.is_like_msvc() {
        "MSVC"
    } else {
        println!("cargo:warning=C compiler is not compatible (needs GCC, Clang, or MSVC). C implementations disabled.");
        return;
    };

    let c_files: Vec<_> = match glob::glob("src/**/*.c") {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            println!("cargo:warning=Invalid glob pattern ({e}). C implementations disabled.");
            return;
        }
    };
    if c_files.is_empty() {
        return;
    }

    let mut build = cc::Build::new();
    for file in &c_files {
        println!("cargo:rerun-if-changed={}", file.display());
        build.file(file);
    }

    // Hashes must match the Rust implementations bit for bit: no FMA
    // contraction, no fast-math, IEEE evaluation of float expressions.
    build.opt_level(3).warnings(true);
    if compiler.is_like_msvc() {
        build.flag("/fp:precise");
    } else {
        build
            .flag_if_supported("-ffp-contract=off")
            .flag_if_supported("-fno-fast-math")
            .flag_if_supported("-fexcess-precision=standard");
    }

    build.compile("tasks_c");

    if target_os == "linux" {
        println!("cargo:rustc-link-lib=m");
    }
    println!("cargo:rustc-cfg=c_implementation_active");
    println!("cargo:rustc-env=C_COMPILER_NAME={}", compiler_name);
}
