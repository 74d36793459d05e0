//! Attributes merged pull requests to the commit range between two refs.
use chrono::{DateTime, Utc};
use log::*;
use std::{collections::HashSet, rc::Rc, time::Duration};

use crate::{
    DeploynotesError, Result,
    changelog::PullRequestRecord,
    config::Config,
    forge::{
        manager::ForgeManager,
        request::{ClosedPrPageRequest, ClosedPullRequest},
    },
};

/// Lazy sequence of closed pull request pages, most recently updated first.
///
/// Each page only yields pull requests updated at or after `since`. The
/// sequence ends after the first page that contained an older pull request,
/// an empty page, or a page shorter than the requested size.
pub struct CandidatePages<'a> {
    forge: &'a ForgeManager,
    since: DateTime<Utc>,
    per_page: u8,
    delay: Duration,
    page: u32,
    done: bool,
}

impl<'a> CandidatePages<'a> {
    pub fn new(
        forge: &'a ForgeManager,
        since: DateTime<Utc>,
        per_page: u8,
        delay: Duration,
    ) -> Self {
        Self {
            forge,
            since,
            per_page: per_page.max(1),
            delay,
            page: 1,
            done: false,
        }
    }

    /// Fetches the next page of candidates, or `None` once exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ClosedPullRequest>>> {
        if self.done {
            return Ok(None);
        }

        if self.page > 1 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let fetched = self
            .forge
            .closed_pull_requests(ClosedPrPageRequest {
                page: self.page,
                per_page: self.per_page,
            })
            .await
            .map_err(DeploynotesError::into_upstream)?;

        self.page += 1;

        if fetched.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let total = fetched.len();

        let recent = fetched
            .into_iter()
            .filter(|pr| pr.updated_at >= self.since)
            .collect::<Vec<ClosedPullRequest>>();

        if recent.len() < total || total < self.per_page as usize {
            self.done = true;
        }

        Ok(Some(recent))
    }
}

/// Finds the merged pull requests wholly contained in a commit range.
pub struct DiffResolver {
    forge: Rc<ForgeManager>,
    page_size: u8,
    page_delay: Duration,
}

impl DiffResolver {
    pub fn new(forge: Rc<ForgeManager>, config: &Config) -> Self {
        Self {
            forge,
            page_size: config.page_size,
            page_delay: config.page_delay(),
        }
    }

    /// Returns merged pull requests whose commits all fall between `old_ref`
    /// and `new_ref`, most recently updated first.
    ///
    /// Fails with [`DeploynotesError::PreviousCommitNotFound`] when `old_ref`
    /// is unknown to the forge. A 404 from any later lookup (an unknown
    /// `new_ref` for example) is a [`DeploynotesError::ForgeError`].
    pub async fn merged_prs_since(
        &self,
        old_ref: &str,
        new_ref: &str,
    ) -> Result<Vec<PullRequestRecord>> {
        let old_commit =
            self.forge.get_commit(old_ref).await.map_err(|err| match err {
                DeploynotesError::NotFound(msg) => {
                    DeploynotesError::PreviousCommitNotFound(format!(
                        "{old_ref}: {msg}"
                    ))
                }
                err => err,
            })?;

        let in_scope = self
            .forge
            .compare(old_ref, new_ref)
            .await
            .map_err(DeploynotesError::into_upstream)?
            .into_iter()
            .collect::<HashSet<String>>();

        info!(
            "found {} commits between {old_ref} and {new_ref}",
            in_scope.len()
        );

        let mut pages = CandidatePages::new(
            &self.forge,
            old_commit.timestamp,
            self.page_size,
            self.page_delay,
        );

        let mut records = vec![];

        while let Some(candidates) = pages.next_page().await? {
            for pr in candidates {
                if pr.merged_at.is_none() {
                    debug!("skipping unmerged pull request #{}", pr.number);
                    continue;
                }

                let commits = self
                    .forge
                    .pull_request_commits(pr.number)
                    .await
                    .map_err(DeploynotesError::into_upstream)?;

                if !commits.iter().all(|sha| in_scope.contains(sha)) {
                    debug!(
                        "pull request #{} has commits outside of range: skipping",
                        pr.number
                    );
                    continue;
                }

                records.push(PullRequestRecord {
                    number: pr.number,
                    title: pr.title,
                    description: pr.body,
                });
            }
        }

        info!("attributed {} pull requests to deploy", records.len());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DeploynotesError,
        forge::{
            config::RemoteConfig,
            manager::ForgeOptions,
            request::{ClosedPullRequestBuilder, ForgeCommit},
            traits::MockForge,
        },
    };
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn closed(
        number: u64,
        updated_hour: u32,
        merged: bool,
    ) -> ClosedPullRequest {
        ClosedPullRequestBuilder::default()
            .number(number)
            .title(format!("PR {number}"))
            .body(format!("body {number}"))
            .merged_at(merged.then(|| at(updated_hour)))
            .updated_at(at(updated_hour))
            .build()
            .unwrap()
    }

    fn config(page_size: u8) -> Config {
        Config {
            page_size,
            page_delay_ms: 0,
            ..Config::default()
        }
    }

    fn mock_forge() -> MockForge {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_remote_config()
            .returning(RemoteConfig::default);
        mock_forge
    }

    fn expect_old_commit(mock_forge: &mut MockForge, hour: u32) {
        mock_forge
            .expect_get_commit()
            .withf(|sha| sha == "old")
            .times(1)
            .returning(move |sha| {
                Ok(ForgeCommit {
                    sha: sha.to_string(),
                    timestamp: at(hour),
                })
            });
    }

    fn manager(mock_forge: MockForge) -> Rc<ForgeManager> {
        Rc::new(ForgeManager::new(
            Box::new(mock_forge),
            ForgeOptions::default(),
        ))
    }

    #[tokio::test]
    async fn attributes_only_wholly_contained_merged_prs() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 1);
        mock_forge
            .expect_compare()
            .withf(|base, head| base == "old" && head == "new")
            .times(1)
            .returning(|_, _| Ok(vec!["c1".into(), "c2".into(), "c3".into()]));
        mock_forge
            .expect_closed_pull_requests()
            .withf(|req| req.page == 1)
            .times(1)
            .returning(|_| {
                Ok(vec![closed(3, 5, true), closed(2, 4, true), closed(1, 3, true)])
            });
        mock_forge
            .expect_pull_request_commits()
            .times(3)
            .returning(|number| {
                Ok(match number {
                    3 => vec!["c3".into()],
                    2 => vec!["c2".into(), "outside".into()],
                    _ => vec!["c1".into()],
                })
            });

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let prs = resolver.merged_prs_since("old", "new").await.unwrap();

        assert_eq!(
            prs.iter().map(|pr| pr.number).collect::<Vec<u64>>(),
            vec![3, 1]
        );
        assert_eq!(prs[0].title, "PR 3");
        assert_eq!(prs[0].description, "body 3");
    }

    #[tokio::test]
    async fn never_fetches_commits_for_unmerged_prs() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 1);
        mock_forge
            .expect_compare()
            .returning(|_, _| Ok(vec!["c1".into()]));
        mock_forge
            .expect_closed_pull_requests()
            .times(1)
            .returning(|_| Ok(vec![closed(2, 4, false), closed(1, 3, true)]));
        mock_forge
            .expect_pull_request_commits()
            .withf(|number| *number == 1)
            .times(1)
            .returning(|_| Ok(vec!["c1".into()]));

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let prs = resolver.merged_prs_since("old", "new").await.unwrap();

        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 1);
    }

    #[tokio::test]
    async fn stops_paging_at_first_older_pr() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 10);
        mock_forge.expect_compare().returning(|_, _| Ok(vec![]));
        mock_forge
            .expect_closed_pull_requests()
            .withf(|req| req.page == 1 && req.per_page == 2)
            .times(1)
            .returning(|_| Ok(vec![closed(4, 14, false), closed(3, 12, false)]));
        mock_forge
            .expect_closed_pull_requests()
            .withf(|req| req.page == 2)
            .times(1)
            .returning(|_| Ok(vec![closed(2, 11, false), closed(1, 9, true)]));
        mock_forge.expect_pull_request_commits().times(0);

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(2));

        let prs = resolver.merged_prs_since("old", "new").await.unwrap();

        assert!(prs.is_empty());
    }

    #[tokio::test]
    async fn pages_end_on_short_or_empty_page() {
        let mut first_forge = mock_forge();
        first_forge
            .expect_closed_pull_requests()
            .withf(|req| req.page == 1)
            .times(1)
            .returning(|_| Ok(vec![closed(2, 5, true), closed(1, 4, true)]));
        first_forge
            .expect_closed_pull_requests()
            .withf(|req| req.page == 2)
            .times(1)
            .returning(|_| Ok(vec![]));

        let forge = manager(first_forge);
        let mut pages =
            CandidatePages::new(&forge, at(1), 2, Duration::ZERO);

        assert_eq!(pages.next_page().await.unwrap().unwrap().len(), 2);
        assert!(pages.next_page().await.unwrap().is_none());
        assert!(pages.next_page().await.unwrap().is_none());

        let mut mock_forge = mock_forge();
        mock_forge
            .expect_closed_pull_requests()
            .times(1)
            .returning(|_| Ok(vec![closed(1, 4, true)]));

        let forge = manager(mock_forge);
        let mut pages =
            CandidatePages::new(&forge, at(1), 5, Duration::ZERO);

        assert_eq!(pages.next_page().await.unwrap().unwrap().len(), 1);
        assert!(pages.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keeps_prs_updated_exactly_at_old_commit() {
        let mut mock_forge = mock_forge();
        mock_forge
            .expect_closed_pull_requests()
            .times(1)
            .returning(|_| Ok(vec![closed(2, 3, true), closed(1, 2, true)]));

        let forge = manager(mock_forge);
        let mut pages =
            CandidatePages::new(&forge, at(3), 10, Duration::ZERO);

        let page = pages.next_page().await.unwrap().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].number, 2);
    }

    #[tokio::test]
    async fn unknown_old_ref_is_previous_commit_not_found() {
        let mut mock_forge = mock_forge();
        mock_forge
            .expect_get_commit()
            .times(1)
            .returning(|sha| Err(DeploynotesError::not_found(sha)));
        mock_forge.expect_compare().times(0);
        mock_forge.expect_closed_pull_requests().times(0);

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let err = resolver.merged_prs_since("gone", "new").await.unwrap_err();

        assert!(matches!(err, DeploynotesError::PreviousCommitNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_new_ref_is_forge_error() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 1);
        mock_forge.expect_compare().times(1).returning(|_, _| {
            Err(DeploynotesError::not_found("No commit found for SHA: typo"))
        });
        mock_forge.expect_closed_pull_requests().times(0);

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let err = resolver.merged_prs_since("old", "typo").await.unwrap_err();

        assert!(matches!(err, DeploynotesError::ForgeError(_)));
    }

    #[tokio::test]
    async fn missing_pr_commits_are_forge_error() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 1);
        mock_forge
            .expect_compare()
            .returning(|_, _| Ok(vec!["c1".into()]));
        mock_forge
            .expect_closed_pull_requests()
            .returning(|_| Ok(vec![closed(1, 3, true)]));
        mock_forge
            .expect_pull_request_commits()
            .returning(|number| {
                Err(DeploynotesError::not_found(format!("pulls/{number}")))
            });

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let err = resolver.merged_prs_since("old", "new").await.unwrap_err();

        assert!(matches!(err, DeploynotesError::ForgeError(_)));
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let mut mock_forge = mock_forge();
        expect_old_commit(&mut mock_forge, 1);
        mock_forge
            .expect_compare()
            .returning(|_, _| Err(DeploynotesError::forge("boom")));

        let forge = manager(mock_forge);
        let resolver = DiffResolver::new(forge, &config(10));

        let err = resolver.merged_prs_since("old", "new").await.unwrap_err();

        assert!(matches!(err, DeploynotesError::ForgeError(_)));
    }
}
