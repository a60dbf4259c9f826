// ABOUTME: Config scaffolding for new deployments.
// ABOUTME: Creates voyage.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const DEFAULT_REPO: &str = "https://github.com/example/monorepo.git";
const DEFAULT_BRANCH: &str = "main";

pub fn init_config(
    dir: &Path,
    repo: Option<&str>,
    branch: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let repo = match repo {
        Some(r) if r.trim().is_empty() => {
            return Err(Error::InvalidConfig("repository cannot be empty".to_string()));
        }
        Some(r) => r,
        None => DEFAULT_REPO,
    };

    let branch = match branch {
        Some(b) if b.trim().is_empty() => {
            return Err(Error::InvalidConfig("branch cannot be empty".to_string()));
        }
        Some(b) => b,
        None => DEFAULT_BRANCH,
    };

    std::fs::write(&config_path, generate_template_yaml(repo, branch))?;

    Ok(())
}

fn generate_template_yaml(repo: &str, branch: &str) -> String {
    format!(
        r#"repo: {repo}
branch: {branch}
out_path: ./checkout
compose_paths:
  - app1/docker-compose.yml
  - app2/docker-compose.yml
# Redeploy every manifest even when nothing changed
# force: false
# debug, info, error or fatal
# log_level: info
# docker or podman (auto-detected when omitted)
# runtime: docker
# Abort the whole run after this long
# timeout: 10m
"#
    )
}
