use forgekit::{ForgeAdapter, IssueFilter, IssueOptions, IssueUpdate};

use super::{CliResult, print_json, report};
use crate::{IssueAction, StateArg};

pub(crate) async fn handle_issue(action: IssueAction, adapter: &dyn ForgeAdapter) -> CliResult {
    match action {
        IssueAction::List {
            state,
            creator,
            assignee,
        } => {
            let filter = IssueFilter {
                state: state.and_then(StateArg::issue_state),
                creator,
                assignee,
            };
            report(adapter.get_issues(&filter).await)
        }
        IssueAction::Show { number } => report(adapter.get_issue(number).await),
        IssueAction::Url { number } => {
            println!("{}", adapter.issue_url(number));
            Ok(())
        }
        IssueAction::Open {
            title,
            body,
            labels,
            assignee,
        } => {
            let options = IssueOptions {
                labels,
                assignee,
                milestone: None,
            };
            let issue = adapter.open_issue(&title, &body, &options).await?;
            tracing::info!("Opened issue {}", issue.reference);
            print_json(&issue)
        }
        IssueAction::Assign { number, assignee } => {
            let update = IssueUpdate {
                assignee: Some(assignee),
                ..IssueUpdate::default()
            };
            report(adapter.update_issue(number, &update).await)
        }
        IssueAction::Close { number } => report(adapter.close_issue(number).await),
        IssueAction::Comment { number, body } => {
            report(adapter.create_comment(number, &body).await)
        }
        IssueAction::Comments { number } => report(adapter.get_comments(number).await),
    }
}
