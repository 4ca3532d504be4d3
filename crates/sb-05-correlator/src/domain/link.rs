/// One physical delivery of an inbound reply address.
///
/// Hosts may hand the same link to the entry point several times across
/// lifecycle callbacks; `processed` marks it once it has been routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundLink {
    address: String,
    processed: bool,
}

impl InboundLink {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            processed: false,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn mark_processed(&mut self) {
        self.processed = true;
    }
}
