// Deployment orchestrator: upload the theme archive, then activate it by
// the name the site returned. The run is linear
//
//     Idle -> Uploading -> Activating -> Done
//                 |            |
//                 +------------+--> Failed
//
// and reports terminal events to a `DeploySink`.

use std::path::Path;

use tracing::debug;

use crate::api::{ThemeName, ThemesApi, Transport};
use crate::config::DeployConfig;
use crate::error::DeployError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Uploading,
    Activating,
    Done,
    Failed,
}

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Started { site: String },
    Uploading,
    Uploaded { name: String },
    Activating,
    Activated { name: String },
    Failed { detail: String },
}

/// Receiver for deployment progress, e.g. the console.
pub trait DeploySink {
    fn event(&mut self, event: DeployEvent);
}

impl<S: DeploySink + ?Sized> DeploySink for &mut S {
    fn event(&mut self, event: DeployEvent) {
        (**self).event(event)
    }
}

/// Terminal result of `Deployer::run`.
#[derive(Debug)]
pub struct DeployReport {
    pub state: DeployState,
    pub theme: Option<ThemeName>,
    pub error: Option<DeployError>,
}

impl DeployReport {
    pub fn is_success(&self) -> bool {
        self.state == DeployState::Done
    }

    /// Process exit status: 0 on `Done`, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct Deployer<T, S> {
    api: ThemesApi<T>,
    sink: S,
    site: String,
    state: DeployState,
}

impl<T: Transport, S: DeploySink> Deployer<T, S> {
    pub fn new(config: DeployConfig, transport: T, sink: S) -> Self {
        Deployer {
            api: ThemesApi::new(transport, config.credential),
            sink,
            site: config.site.to_string(),
            state: DeployState::Idle,
        }
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    fn transition(&mut self, next: DeployState) {
        debug!(from = ?self.state, to = ?next, "deploy state");
        self.state = next;
    }

    /// Deploy the archive at `artifact`. Runs at most once; a deployer that
    /// already reached a terminal state reports that state again.
    pub fn run(&mut self, artifact: &Path) -> DeployReport {
        if self.state != DeployState::Idle {
            return DeployReport {
                state: self.state,
                theme: None,
                error: None,
            };
        }

        match self.execute(artifact) {
            Ok(theme) => {
                self.transition(DeployState::Done);
                debug!(theme = %theme, "deployment complete");
                DeployReport {
                    state: DeployState::Done,
                    theme: Some(theme),
                    error: None,
                }
            }
            Err(err) => {
                self.transition(DeployState::Failed);
                debug!(error = %err, "deployment failed");
                self.sink.event(DeployEvent::Failed {
                    detail: err.to_string(),
                });
                DeployReport {
                    state: DeployState::Failed,
                    theme: None,
                    error: Some(err),
                }
            }
        }
    }

    fn execute(&mut self, artifact: &Path) -> Result<ThemeName, DeployError> {
        if !artifact.is_file() {
            return Err(DeployError::ArtifactMissing {
                path: artifact.to_path_buf(),
            });
        }

        self.sink.event(DeployEvent::Started {
            site: self.site.clone(),
        });

        self.transition(DeployState::Uploading);
        self.sink.event(DeployEvent::Uploading);
        let theme = self.api.upload_theme(artifact)?;
        self.sink.event(DeployEvent::Uploaded {
            name: theme.to_string(),
        });

        self.transition(DeployState::Activating);
        self.sink.event(DeployEvent::Activating);
        self.api.activate_theme(&theme)?;
        self.sink.event(DeployEvent::Activated {
            name: theme.to_string(),
        });

        Ok(theme)
    }
}
