//! Generate `include/backend_ffi.h` for C hosts.

use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let header = PathBuf::from(&crate_dir).join("include").join("backend_ffi.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("BACKEND_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            if let Some(dir) = header.parent() {
                if let Err(err) = std::fs::create_dir_all(dir) {
                    println!("cargo:warning=cannot create {}: {err}", dir.display());
                    return;
                }
            }
            bindings.write_to_file(&header);
        }
        Err(err) => println!("cargo:warning=skipping C header generation: {err}"),
    }
}
