use crate::domain::errors::EndpointError;
use crate::domain::projection::Projection;
use crate::domain::row::QueryRow;

/// A signer's structured query endpoint.
pub trait QueryEndpoint: Send + Sync {
    /// Query `endpoint` with `projection`. `Ok(None)` means no row came back.
    fn query(&self, endpoint: &str, projection: &Projection) -> Result<Option<QueryRow>, EndpointError>;
}

impl<E: QueryEndpoint + ?Sized> QueryEndpoint for std::sync::Arc<E> {
    fn query(&self, endpoint: &str, projection: &Projection) -> Result<Option<QueryRow>, EndpointError> {
        (**self).query(endpoint, projection)
    }
}
