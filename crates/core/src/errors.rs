use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("chat delivery failure: {0}")]
    Delivery(String),
    #[error("invalid interaction: {0}")]
    InvalidInteraction(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("timed out: {message}")]
    TimedOut { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "That action could not be understood. Try `/docs help`.",
            Self::TimedOut { .. } => "The document service took too long to answer. Please retry.",
            Self::ServiceUnavailable { .. } => {
                "The document service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::TimedOut { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::TimedOut { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Gateway(GatewayError::Timeout(secs)) => {
                Self::TimedOut { message: format!("gateway timed out after {secs}s"), correlation_id }
            }
            ApplicationError::Gateway(gateway_error) => {
                Self::ServiceUnavailable { message: gateway_error.to_string(), correlation_id }
            }
            ApplicationError::Delivery(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::InvalidInteraction(message) => {
                Self::BadRequest { message, correlation_id }
            }
        }
    }
}
