//! HTTP implementations of the collaborator traits.
//!
//! - [`HttpTransport`]: shared client, bearer attachment and the 401 hook
//! - [`HostedAuthClient`] / [`HostedRecordStore`]: hosted auth and data API
//! - [`RestInferenceClient`] / [`RestAdminClient`]: REST service (`/analyze`, `/admin/*`)

mod admin_client;
mod auth_client;
mod envelope;
mod hosted;
mod inference_client;
mod record_client;
mod transport;

pub use admin_client::RestAdminClient;
pub use auth_client::HostedAuthClient;
pub use envelope::ApiEnvelope;
pub use hosted::HostedService;
pub use inference_client::{HealthStatus, RestInferenceClient};
pub use record_client::HostedRecordStore;
pub use transport::{Bearer, HttpTransport, UnauthorizedPolicy, error_message, join_url};
