//! Area calculator client.

use crate::proto::area_calculator::calculator_client::CalculatorClient;
use crate::proto::area_calculator::shape_message::Shape;
use crate::proto::area_calculator::{Rectangle, ShapeMessage};
use std::time::Duration;
use thiserror::Error;
use tonic::transport::Channel;
use tracing::{debug, info, instrument};

/// How long to wait for a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to wait for an answer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Area calculator client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The address is not a valid URI.
    #[error("invalid calculator address {address}: {reason}")]
    InvalidAddress {
        /// Address as given
        address: String,
        /// Parser message
        reason: String,
    },

    /// No connection could be established.
    #[error("failed to connect to calculator at {address}: {source}")]
    Connect {
        /// Address as given
        address: String,
        /// Transport error
        #[source]
        source: tonic::transport::Error,
    },

    /// The call returned a non-OK status.
    #[error("calculateOne failed: {0}")]
    Status(#[from] Box<tonic::Status>),

    /// The response carried no area.
    #[error("calculateOne returned no area")]
    EmptyResponse,
}

/// `http://` URI for a `host:port` address. Addresses that already carry a
/// scheme are kept.
#[must_use]
pub fn endpoint_uri(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

/// Request for the area of a `length` x `width` rectangle.
#[must_use]
pub const fn rectangle_request(length: f32, width: f32) -> ShapeMessage {
    ShapeMessage {
        shape: Some(Shape::Rectangle(Rectangle { length, width })),
    }
}

/// Connect to the calculator at `address`.
///
/// # Errors
///
/// Returns an error if the address is invalid or nothing answers there.
pub async fn connect(address: &str) -> Result<CalculatorClient<Channel>, ClientError> {
    let channel = Channel::from_shared(endpoint_uri(address))
        .map_err(|e| ClientError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .connect()
        .await
        .map_err(|source| ClientError::Connect {
            address: address.to_string(),
            source,
        })?;
    debug!(%address, "connected to area calculator");
    Ok(CalculatorClient::new(channel))
}

/// Ask the calculator at `address` for the area of one rectangle.
///
/// # Errors
///
/// Returns an error if the call fails or the response is empty.
#[instrument(level = "debug")]
pub async fn rectangle_area(address: &str, length: f32, width: f32) -> Result<f32, ClientError> {
    let mut client = connect(address).await?;
    let response = client
        .calculate_one(rectangle_request(length, width))
        .await
        .map_err(Box::new)?
        .into_inner();

    let area = response.value.first().copied().ok_or(ClientError::EmptyResponse)?;
    info!(area, "area calculator answered");
    Ok(area)
}
