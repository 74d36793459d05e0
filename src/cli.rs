//! CLI argument parsing and forge platform configuration.
use clap::{Parser, Subcommand, ValueEnum};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::env;

use crate::{
    DeploynotesError, Result,
    forge::config::{Remote, RemoteConfig},
    publisher::DeployTarget,
};

/// Global CLI arguments for forge configuration and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitHub repository URL (https://github.com/owner/repo).
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, global = true)]
    /// Local deploynotes.toml to use instead of the repository's.
    pub config: Option<String>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Log changelog writes instead of performing them.
    pub dry_run: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Deploy changelog subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish the pull requests deployed to an environment since its last
    /// publication.
    Publish {
        #[arg(long)]
        /// Environment that was deployed to.
        environment: String,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Print the last checkpoint recorded for an environment as JSON.
    Checkpoint {
        #[arg(long)]
        /// Environment to look up.
        environment: String,

        #[command(flatten)]
        sink: SinkArgs,
    },
}

/// The ref that was deployed. Exactly one of `--tag` or `--sha` is required.
#[derive(clap::Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    #[arg(long)]
    /// Deployed tag.
    pub tag: Option<String>,

    #[arg(long)]
    /// Deployed commit sha.
    pub sha: Option<String>,
}

impl TargetArgs {
    pub fn target(&self) -> Result<DeployTarget> {
        match (&self.tag, &self.sha) {
            (Some(tag), None) => Ok(DeployTarget::Tag(tag.clone())),
            (None, Some(sha)) => Ok(DeployTarget::Sha(sha.clone())),
            _ => Err(DeploynotesError::invalid_args(
                "exactly one of --tag or --sha must be set",
            )),
        }
    }
}

/// Where the changelog is persisted.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkKind {
    /// Local file.
    #[default]
    File,
    /// File committed to the repository.
    Content,
    /// Body of the release for the deployed tag.
    Release,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SinkArgs {
    #[arg(long, value_enum, default_value_t = SinkKind::File)]
    /// Changelog destination.
    pub sink: SinkKind,

    #[arg(long)]
    /// Changelog path for the file and content sinks. Overrides
    /// deploynotes.toml.
    pub path: Option<String>,
}

impl Args {
    /// Configure remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<Remote> {
        if !self.github_repo.is_empty() {
            return get_github_remote(&self.github_repo, &self.github_token);
        }

        Err(DeploynotesError::invalid_args(
            "must configure a remote with --github-repo",
        ))
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(DeploynotesError::InvalidRemoteUrl(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

/// Configure GitHub remote with URL parsing and token resolution.
fn get_github_remote(github_repo: &str, github_token: &str) -> Result<Remote> {
    let parsed = GitUrl::parse(github_repo)?;

    validate_scheme(parsed.scheme)?;

    let mut token = github_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = parsed.token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
    {
        token = env_var_token;
    }

    if token.is_empty() {
        return Err(DeploynotesError::AuthenticationError(
            "must set github token".into(),
        ));
    }

    let host = parsed.host.ok_or_else(|| {
        DeploynotesError::InvalidRemoteUrl(
            "unable to parse host from github repo".into(),
        )
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        DeploynotesError::InvalidRemoteUrl(
            "unable to parse owner from github repo".into(),
        )
    })?;

    let project_path = parsed
        .path
        .strip_prefix("/")
        .unwrap_or(&parsed.path)
        .to_string();

    let remote_config = RemoteConfig {
        host,
        port: parsed.port,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        path: project_path,
        token: SecretString::from(token),
    };

    Ok(Remote::Github(remote_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn args(repo: &str, token: &str) -> Args {
        Args {
            github_repo: repo.into(),
            github_token: token.into(),
            config: None,
            debug: false,
            dry_run: false,
            command: Command::Checkpoint {
                environment: "production".into(),
                sink: SinkArgs::default(),
            },
        }
    }

    #[test]
    fn gets_github_remote() {
        let remote = args("https://github.com/acme/shop", "github_token")
            .get_remote()
            .unwrap();

        let Remote::Github(config) = remote;
        assert_eq!(config.host, "github.com");
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "shop");
        assert_eq!(config.scheme, "https");
        assert_eq!(config.token.expose_secret(), "github_token");
    }

    #[test]
    fn requires_a_remote() {
        let result = args("", "github_token").get_remote();
        assert!(matches!(result, Err(DeploynotesError::InvalidArgs(_))));
    }

    #[test]
    fn only_supports_http_and_https_schemes() {
        let result =
            args("git@github.com:acme/shop", "github_token").get_remote();
        assert!(result.is_err());
    }

    #[test]
    fn parses_publish_command() {
        let args = Args::parse_from([
            "deploynotes",
            "publish",
            "--environment",
            "production",
            "--tag",
            "v1.2.0",
            "--sink",
            "release",
            "--dry-run",
        ]);

        assert!(args.dry_run);
        let Command::Publish {
            environment,
            target,
            sink,
        } = args.command
        else {
            panic!("expected publish command");
        };
        assert_eq!(environment, "production");
        assert_eq!(target.target().unwrap(), DeployTarget::Tag("v1.2.0".into()));
        assert_eq!(sink.sink, SinkKind::Release);
        assert!(sink.path.is_none());
    }

    #[test]
    fn publish_requires_exactly_one_target() {
        let both = Args::try_parse_from([
            "deploynotes",
            "publish",
            "--environment",
            "production",
            "--tag",
            "v1",
            "--sha",
            "abc",
        ]);
        assert!(both.is_err());

        let neither = Args::try_parse_from([
            "deploynotes",
            "publish",
            "--environment",
            "production",
        ]);
        assert!(neither.is_err());
    }

    #[test]
    fn target_args_without_value_is_invalid() {
        let result = TargetArgs::default().target();
        assert!(matches!(result, Err(DeploynotesError::InvalidArgs(_))));
    }
}
