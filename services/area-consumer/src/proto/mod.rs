//! Protobuf types and gRPC client generated from `proto/area_calculator.proto`.

/// `area_calculator` package.
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod area_calculator {
    tonic::include_proto!("area_calculator");
}
