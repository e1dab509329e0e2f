use console::style;
use forgekit::{ForgeAdapter, MilestoneFilter};

use super::{CliResult, report};
use crate::{AuthAction, StateArg};

pub(crate) async fn handle_auth(action: AuthAction, adapter: &dyn ForgeAdapter) -> CliResult {
    match action {
        AuthAction::Status => {
            if adapter.is_authenticated().await? {
                println!("{} authenticated to {}", style("✓").green(), adapter.name());
            } else {
                println!("{} credentials rejected by {}", style("✗").red(), adapter.name());
                if let Some(url) = adapter.token_generation_url() {
                    println!("  Create a token at {}", url);
                }
            }
            Ok(())
        }
    }
}

pub(crate) async fn handle_project(adapter: &dyn ForgeAdapter) -> CliResult {
    report(adapter.current_project().await)
}

pub(crate) async fn handle_fork(organization: Option<String>, adapter: &dyn ForgeAdapter) -> CliResult {
    report(adapter.create_fork(organization.as_deref()).await)
}

pub(crate) async fn handle_labels(adapter: &dyn ForgeAdapter) -> CliResult {
    report(adapter.get_labels().await)
}

pub(crate) async fn handle_milestones(state: Option<StateArg>, adapter: &dyn ForgeAdapter) -> CliResult {
    let filter = MilestoneFilter {
        state: state.and_then(StateArg::issue_state),
    };
    report(adapter.get_milestones(&filter).await)
}

pub(crate) async fn handle_releases(adapter: &dyn ForgeAdapter) -> CliResult {
    report(adapter.get_releases().await)
}
