//! Locate the configured repository in a provider's project listing.
//!
//! Providers that address projects by numeric id (GitLab) must first find the
//! project for `owner/name`. The listing of accessible projects is paged; the
//! resolver walks it page by page and stops at the first exact match.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::RepositoryRef;
use crate::platform::{AdapterError, Page, Result};

/// A paged listing of the projects accessible to the authenticated user.
#[async_trait]
pub trait ProjectListing: Send + Sync {
    type Project: Send + Sync;

    /// Fetch the first page.
    async fn first_page(&self) -> Result<Page<Self::Project>>;

    /// Fetch the page behind a continuation link.
    async fn next_page(&self, next: &str) -> Result<Page<Self::Project>>;

    /// The `namespace/name` path of a project.
    fn path_with_namespace(project: &Self::Project) -> &str;
}

/// Page through `listing` until a project's path equals `owner/name`.
///
/// The comparison is exact and case-sensitive. No page is fetched after the
/// one holding the match.
pub async fn find_project<L>(listing: &L, repository: &RepositoryRef) -> Result<L::Project>
where
    L: ProjectListing,
{
    let wanted = repository.full_name();
    let mut page = listing.first_page().await?;
    let mut page_number = 1u32;

    loop {
        debug!(
            "Searching page {} ({} projects) for {}",
            page_number,
            page.items.len(),
            wanted
        );

        let Page { items, next } = page;
        if let Some(found) = items
            .into_iter()
            .find(|p| L::path_with_namespace(p) == wanted)
        {
            return Ok(found);
        }

        match next {
            Some(next) => {
                page = listing.next_page(&next).await?;
                page_number += 1;
            }
            None => {
                return Err(AdapterError::ProjectNotFound {
                    owner: repository.owner.clone(),
                    repository: repository.name.clone(),
                });
            }
        }
    }
}

/// Memoizing resolver for one adapter instance.
///
/// The first successful resolution is stored and every later call returns it
/// without touching the listing. A failed resolution is not stored.
pub struct ProjectResolver<P> {
    repository: RepositoryRef,
    resolved: OnceCell<P>,
}

impl<P> ProjectResolver<P> {
    pub fn new(repository: RepositoryRef) -> Self {
        Self {
            repository,
            resolved: OnceCell::new(),
        }
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    /// The resolved project, if resolution already happened.
    pub fn get(&self) -> Option<&P> {
        self.resolved.get()
    }

    /// Resolve the project through `listing`, or return the memoized one.
    pub async fn resolve<L>(&self, listing: &L) -> Result<&P>
    where
        L: ProjectListing<Project = P>,
    {
        self.resolved
            .get_or_try_init(|| async {
                let project = find_project(listing, &self.repository).await?;
                info!("Resolved project {}", self.repository);
                Ok(project)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeListing {
        pages: Vec<Vec<String>>,
        fetches: AtomicUsize,
    }

    impl FakeListing {
        fn new(pages: Vec<Vec<&str>>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|p| p.into_iter().map(String::from).collect())
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn page(&self, index: usize) -> Result<Page<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let items = self
                .pages
                .get(index)
                .cloned()
                .ok_or_else(|| AdapterError::internal("page out of range"))?;
            let next = (index + 1 < self.pages.len()).then(|| format!("page={}", index + 1));
            Ok(Page { items, next })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProjectListing for FakeListing {
        type Project = String;

        async fn first_page(&self) -> Result<Page<String>> {
            self.page(0)
        }

        async fn next_page(&self, next: &str) -> Result<Page<String>> {
            let index = next
                .strip_prefix("page=")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| AdapterError::internal("bad continuation"))?;
            self.page(index)
        }

        fn path_with_namespace(project: &String) -> &str {
            project
        }
    }

    struct FailingListing;

    #[async_trait]
    impl ProjectListing for FailingListing {
        type Project = String;

        async fn first_page(&self) -> Result<Page<String>> {
            Ok(Page {
                items: vec!["other/one".to_string()],
                next: Some("page=1".to_string()),
            })
        }

        async fn next_page(&self, _next: &str) -> Result<Page<String>> {
            Err(AdapterError::network("connection reset"))
        }

        fn path_with_namespace(project: &String) -> &str {
            project
        }
    }

    fn acme_widgets() -> RepositoryRef {
        RepositoryRef::new("acme", "widgets")
    }

    #[tokio::test]
    async fn test_match_on_second_page_stops_paging() {
        let listing = FakeListing::new(vec![
            vec!["acme/gadgets", "other/widgets"],
            vec!["acme/widgets"],
            vec!["acme/zzz"],
        ]);
        let found = find_project(&listing, &acme_widgets()).await.unwrap();
        assert_eq!(found, "acme/widgets");
        assert_eq!(listing.fetches(), 2);
    }

    #[tokio::test]
    async fn test_match_on_first_page_fetches_once() {
        let listing = FakeListing::new(vec![vec!["acme/widgets"], vec!["acme/widgets"]]);
        find_project(&listing, &acme_widgets()).await.unwrap();
        assert_eq!(listing.fetches(), 1);
    }

    #[tokio::test]
    async fn test_no_match_exhausts_pages() {
        let listing = FakeListing::new(vec![vec!["a/b"], vec!["c/d"], vec!["e/f"]]);
        let err = find_project(&listing, &acme_widgets()).await.unwrap_err();
        match err {
            AdapterError::ProjectNotFound { owner, repository } => {
                assert_eq!(owner, "acme");
                assert_eq!(repository, "widgets");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(listing.fetches(), 3);
    }

    #[tokio::test]
    async fn test_comparison_is_case_sensitive_and_exact() {
        let listing = FakeListing::new(vec![vec!["Acme/Widgets", "acme/widgets-old", "acme/widget"]]);
        let err = find_project(&listing, &acme_widgets()).await.unwrap_err();
        assert!(matches!(err, AdapterError::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let listing = FakeListing::new(vec![vec!["acme/widgets", "acme/widgets"]]);
        let found = find_project(&listing, &acme_widgets()).await.unwrap();
        assert_eq!(found, "acme/widgets");
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let err = find_project(&FailingListing, &acme_widgets())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Network { .. }));
    }

    #[tokio::test]
    async fn test_resolver_memoizes() {
        let listing = FakeListing::new(vec![vec!["x/y"], vec!["acme/widgets"]]);
        let resolver = ProjectResolver::new(acme_widgets());
        assert!(resolver.get().is_none());

        let first = resolver.resolve(&listing).await.unwrap().clone();
        assert_eq!(listing.fetches(), 2);

        let second = resolver.resolve(&listing).await.unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(listing.fetches(), 2);
        assert_eq!(resolver.get().map(String::as_str), Some("acme/widgets"));
    }

    #[tokio::test]
    async fn test_resolver_does_not_memoize_failure() {
        let missing = FakeListing::new(vec![vec!["x/y"]]);
        let resolver = ProjectResolver::new(acme_widgets());
        assert!(resolver.resolve(&missing).await.is_err());
        assert!(resolver.get().is_none());

        let present = FakeListing::new(vec![vec!["acme/widgets"]]);
        assert_eq!(resolver.resolve(&present).await.unwrap(), "acme/widgets");
    }
}
