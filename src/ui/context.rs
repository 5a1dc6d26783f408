//! Detects whether output goes to a person or a pipe

use std::io::IsTerminal;

/// Environment variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Output context for the current invocation
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Detect from the terminal and environment
    pub fn detect() -> Self {
        let on_tty = std::io::stdout().is_terminal();
        let in_ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            fancy: on_tty && !in_ci,
        }
    }

    /// Plain line-oriented output
    pub fn plain() -> Self {
        Self { fancy: false }
    }

    /// Whether to use styled, boxed output
    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}
