//! Upstream targets and the pure logic around them: caller validation,
//! forecast window resolution, request building and envelope normalization.

pub mod caller;
pub mod envelope;
pub mod forecast;
pub mod request;
pub mod target;
pub mod xmltree;

pub use caller::CallerRequest;
pub use envelope::{normalize, RawBody, UpstreamResponse};
pub use forecast::ForecastWindow;
pub use request::{build_request, UpstreamRequest};
pub use target::{Capability, ResponseFormat, TargetCatalog, TargetDescriptor};
