// consola-api: async client for the Consola administration REST backend.

pub mod account;
pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use account::TokenPair;
pub use auth::{RequestContext, RoleClaim, Session, TokenClaims, decode_claims};
pub use client::RequestClient;
pub use envelope::{
    ApiResponse, Envelope, PaginatedRequest, PaginatedResult, SortSpec, decode, validate_envelope,
};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
