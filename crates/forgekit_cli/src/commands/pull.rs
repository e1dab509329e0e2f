use forgekit::{AdapterError, ForgeAdapter, PullRequestOptions};

use super::{CliResult, print_json, report};
use crate::PullAction;

pub(crate) async fn handle_pull(action: PullAction, adapter: &dyn ForgeAdapter) -> CliResult {
    match action {
        PullAction::List { state } => {
            report(adapter.get_pull_requests(state.and_then(|s| s.pull_state())).await)
        }
        PullAction::Show { number } => report(adapter.get_pull_request(number).await),
        PullAction::Commits { number } => report(adapter.get_pull_request_commits(number).await),
        PullAction::Open {
            base,
            head,
            title,
            body,
            draft,
        } => {
            let options = PullRequestOptions { draft };
            let pr = adapter
                .open_pull_request(&base, &head, &title, &body, &options)
                .await?;
            print_json(&pr)
        }
        PullAction::Merge { number, message } => {
            match adapter.merge_pull_request(number, &message).await {
                Ok(pr) => print_json(&pr),
                Err(AdapterError::NotMergeable { id, message }) => {
                    Err(format!("Pull request {} cannot be merged: {}", id, message).into())
                }
                Err(e) => Err(e.into()),
            }
        }
        PullAction::Close { number } => report(adapter.close_pull_request(number).await),
    }
}
