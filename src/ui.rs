// UI layer: renders deployment progress on the terminal. A spinner runs
// while a request is in flight and a status line is printed when it ends.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::deploy::{DeployEvent, DeploySink};

/// `DeploySink` that prints to stdout.
#[derive(Default)]
pub struct ConsoleSink {
    spinner: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&mut self, msg: &'static str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(msg);
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl DeploySink for ConsoleSink {
    fn event(&mut self, event: DeployEvent) {
        match event {
            DeployEvent::Started { site } => println!("\nDeploying to {site}\n"),
            DeployEvent::Uploading => self.start_spinner("Uploading theme..."),
            DeployEvent::Uploaded { name } => {
                self.stop_spinner();
                println!("   ✓ Uploaded: {name}");
            }
            DeployEvent::Activating => self.start_spinner("Activating theme..."),
            DeployEvent::Activated { name } => {
                self.stop_spinner();
                println!("   ✓ Activated: {name}\n");
                println!("Done!\n");
            }
            DeployEvent::Failed { detail } => {
                self.stop_spinner();
                println!("   ✗ Error: {detail}\n");
            }
        }
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
