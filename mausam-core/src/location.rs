use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location not available")]
    Unavailable,
    #[error("Location lookup failed: {0}")]
    Failed(String),
}

impl LocationError {
    /// Label shown in place of a location name.
    pub fn location_label(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Location Permission Denied",
            LocationError::Unavailable => "Location Not Available",
            LocationError::Failed(_) => "Failed to Fetch Location",
        }
    }

    /// Condition label of the placeholder snapshot shown alongside.
    pub fn condition_label(&self) -> &'static str {
        match self {
            LocationError::Unavailable => "Unavailable",
            LocationError::PermissionDenied | LocationError::Failed(_) => "Error",
        }
    }
}

/// Where the device currently is. Platform services sit behind this.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// A location source that always reports the same coordinate, or nothing.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::Unavailable)
    }
}
