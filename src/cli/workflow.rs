//! Workflow command - dispatch an Actions workflow and wait for its run

use crate::cli::style::{check, spinner_style, Stylize};
use crate::cli::{open_platform, print_json, GlobalOpts, RepoContext};
use anstream::println;
use erk::error::{Error, Result};
use erk::git::GitGateway;
use erk::workflow::{trigger_and_wait, PollPolicy, TokioSleeper};
use indicatif::ProgressBar;
use std::time::Duration;

/// Parse `key=value` workflow inputs into a JSON object
pub fn parse_inputs(inputs: &[String]) -> Result<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for input in inputs {
        let (key, value) = input
            .split_once('=')
            .ok_or_else(|| Error::Parse(format!("workflow input must be key=value: {input}")))?;
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(serde_json::Value::Object(map))
}

/// Run `erk workflow run`
pub async fn run_workflow(
    opts: &GlobalOpts,
    workflow: &str,
    branch: Option<&str>,
    inputs: &[String],
) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let branch = match branch {
        Some(b) => b.to_string(),
        None => repo
            .git
            .current_branch(&opts.path)
            .await?
            .ok_or_else(|| Error::Git("HEAD is detached; pass --branch".into()))?,
    };
    let inputs = parse_inputs(inputs)?;
    let platform = open_platform(&repo.git, repo.repo_root()).await?;

    let spinner = (!opts.json).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(format!("Waiting for {workflow} on {branch}"));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });

    let result = trigger_and_wait(
        platform.as_ref(),
        workflow,
        &branch,
        &inputs,
        &PollPolicy::default(),
        &TokioSleeper,
    )
    .await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let run = result?;

    if opts.json {
        return print_json(&run);
    }
    println!(
        "{} Run {} started for {} ({})",
        check(),
        run.run_id.accent(),
        branch.emphasis(),
        run.status.muted()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        let value = parse_inputs(&["issue=12".to_string(), "mode=fast".to_string()]).unwrap();
        assert_eq!(value["issue"], "12");
        assert_eq!(value["mode"], "fast");
        assert!(parse_inputs(&["oops".to_string()]).is_err());
    }
}
