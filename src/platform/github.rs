//! GitHub platform service implementation

use crate::auth::AuthStatus;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{Platform, PlatformConfig, PrUpdate, PullRequest, WorkflowRun};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::pulls::PullRequest as OctoPullRequest;
use octocrab::params::pulls::MergeMethod;
use tracing::{debug, instrument};

/// Number of workflow runs fetched per poll
const WORKFLOW_RUNS_PAGE_SIZE: u8 = 20;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    has_token: bool,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// Without a token the client is anonymous and [`PlatformService::check_auth`]
    /// reports [`AuthStatus::NoCredentials`].
    pub fn new(
        token: Option<&str>,
        owner: String,
        repo: String,
        host: Option<String>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }

        if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner,
                repo,
                host,
            },
            has_token: token.is_some(),
        })
    }
}

fn convert_pr(pr: &OctoPullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        body: pr.body.as_deref().unwrap_or_default().to_string(),
    }
}

fn is_status(err: &octocrab::Error, code: u16) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == code)
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn check_auth(&self) -> Result<AuthStatus> {
        if !self.has_token {
            return Ok(AuthStatus::NoCredentials);
        }
        match self.client.current().user().await {
            Ok(user) => Ok(AuthStatus::Authenticated {
                username: user.login,
            }),
            Err(e) if is_status(&e, 401) => Ok(AuthStatus::NotAuthenticated),
            Err(e) => Err(Error::Auth(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        Ok(prs.items.first().map(convert_pr))
    }

    async fn get_pr(&self, pr_number: u64) -> Result<Option<PullRequest>> {
        match self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await
        {
            Ok(pr) => Ok(Some(convert_pr(&pr))),
            Err(e) if is_status(&e, 404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, body))]
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        debug!("created PR #{}", pr.number);
        Ok(convert_pr(&pr))
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut request = pulls.update(pr_number);
        if let Some(ref title) = update.title {
            request = request.title(title.clone());
        }
        if let Some(ref body) = update.body {
            request = request.body(body.clone());
        }
        if let Some(ref base) = update.base {
            request = request.base(base.clone());
        }

        let pr = request.send().await?;
        Ok(convert_pr(&pr))
    }

    #[instrument(skip(self))]
    async fn merge_pr(&self, pr_number: u64) -> Result<()> {
        let merge = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(MergeMethod::Squash)
            .send()
            .await?;

        if merge.merged {
            Ok(())
        } else {
            Err(Error::GitHubApi(format!(
                "PR #{pr_number} was not merged: {}",
                merge.message.unwrap_or_default()
            )))
        }
    }

    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &serde_json::Value,
    ) -> Result<()> {
        self.client
            .actions()
            .create_workflow_dispatch(&self.config.owner, &self.config.repo, workflow, git_ref)
            .inputs(inputs.clone())
            .send()
            .await?;
        Ok(())
    }

    async fn list_workflow_runs(&self, workflow: &str, branch: &str) -> Result<Vec<WorkflowRun>> {
        let runs = self
            .client
            .workflows(&self.config.owner, &self.config.repo)
            .list_runs(workflow)
            .branch(branch)
            .per_page(WORKFLOW_RUNS_PAGE_SIZE)
            .send()
            .await?;

        Ok(runs
            .items
            .into_iter()
            .map(|run| WorkflowRun {
                run_id: run.id.0,
                status: run.status,
                conclusion: run.conclusion,
                branch: run.head_branch,
                head_sha: run.head_sha,
                display_title: run.name,
                created_at: run.created_at,
            })
            .collect())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
