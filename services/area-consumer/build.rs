//! Generates the area calculator client (no server) from its schema.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/area_calculator.proto");

    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos_with_config(config, &["proto/area_calculator.proto"], &["proto"])?;

    Ok(())
}
