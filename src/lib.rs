// Library root
// -----------
// Deploys a packaged theme to a Ghost site through the Admin API: upload
// the zip, then activate it by the name the site reports back. The binary
// (`main.rs`) only parses options and wires these modules together.
//
// Module responsibilities:
// - `config`: command-line/environment options and the validated settings.
// - `token`: the admin credential and the short-lived signed token.
// - `multipart`: the in-memory form-data body for the upload.
// - `api`: the HTTP transport and the upload/activate endpoints.
// - `deploy`: the upload-then-activate state machine.
// - `ui`: terminal rendering of deployment progress.
pub mod api;
pub mod config;
pub mod deploy;
pub mod error;
pub mod multipart;
pub mod token;
pub mod ui;

pub use config::{Cli, DeployConfig};
pub use deploy::{DeployEvent, DeployReport, DeployState, DeploySink, Deployer};
pub use error::{ConfigError, DeployError, TransportError};
