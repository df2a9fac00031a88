/// Filesystem checks and protocol directory discovery.
pub mod fs;
