//! Google Drive and Google Docs backed [`docbrowse_core::ContentGateway`].

pub mod auth;
pub mod client;
pub mod wire;

pub use auth::{
    AccessTokenSource, CredentialsError, ServiceAccountKey, ServiceAccountTokenSource,
    StaticTokenSource, READONLY_SCOPES,
};
pub use client::{DriveEndpoints, DriveGateway, DriveSetupError};
