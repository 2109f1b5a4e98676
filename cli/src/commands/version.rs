//! Version command

use anyhow::Result;

use crate::app::AppContext;

/// Run the version command.
pub fn run(app: &AppContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if app.json {
        println!(r#"{{"version":"{version}"}}"#);
    } else {
        println!("kubeboot {version}");
    }
    Ok(())
}
