//! Compiles `proto/product_service.proto` into messages, server and client
//! stubs, plus the encoded descriptor set served through reflection.

use std::path::PathBuf;

const PROTO: &str = "proto/product_service.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", PROTO);
    println!("cargo:rerun-if-env-changed=PROTOC");

    // A system protoc wins when PROTOC is set; otherwise use the vendored one
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("product_service_descriptor.bin"))
        .compile_protos(&[PROTO], &["proto"])?;

    Ok(())
}
