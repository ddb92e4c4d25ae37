//! Shell command templates for container actions

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ActionKind;

/// Names the container runtime itself accepts
static CONTAINER_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$")
        .expect("CONTAINER_NAME_REGEX is a valid regex pattern")
});

/// Returns `true` if `name` can be put on a command line unquoted
#[must_use]
pub fn is_valid_container_name(name: &str) -> bool {
    CONTAINER_NAME_REGEX.is_match(name)
}

/// Directory of a compose file: the path with its last segment removed.
///
/// `/srv/app/docker-compose.yml` → `/srv/app`, `/docker-compose.yml` → `/`,
/// and a bare file name is returned unchanged.
#[must_use]
pub fn compose_dir(compose_path: &str) -> &str {
    match compose_path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((dir, _)) => dir,
        None => compose_path,
    }
}

/// Wraps `value` in single quotes for a POSIX shell
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Builds the remote command line for `action` on container `name`.
///
/// `name` must already be validated with [`is_valid_container_name`].
#[must_use]
pub fn action_command(
    runtime: &str,
    compose: &str,
    compose_path: &str,
    name: &str,
    action: ActionKind,
) -> String {
    let dir = shell_quote(compose_dir(compose_path));
    match action {
        ActionKind::Start => format!(
            "cd {dir} && {compose} up -d {name} 2>/dev/null || {runtime} start {name}"
        ),
        ActionKind::Stop | ActionKind::Restart | ActionKind::Pause | ActionKind::Unpause => {
            format!("{runtime} {} {name}", action.as_str())
        }
        ActionKind::Remove => format!("{runtime} stop {name} && {runtime} rm -f {name}"),
        ActionKind::Rebuild => format!(
            "cd {dir} && {compose} up --build -d {name} 2>/dev/null \
             || ({runtime} stop {name} && {runtime} rm {name} && {compose} up -d {name})"
        ),
    }
}
