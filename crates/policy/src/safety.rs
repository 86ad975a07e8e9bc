use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("empty command generated")]
    Empty,
    #[error("generated command contains unsafe operator {0:?}")]
    UnsafeOperator(&'static str),
}

/// Operators that chain or substitute commands. A candidate whose leading
/// program is not allowlisted must not contain any of these.
const UNSAFE_OPERATORS: &[&str] = &["&&", "||", ";", "`", "\n"];

/// Vets sanitized candidate commands before they are shown for
/// confirmation. The allowlist is not an execution permission: it only
/// exempts well-known programs from the chain-operator check. Everything
/// that passes here still goes through the user confirmation gate.
#[derive(Debug, Clone)]
pub struct CommandPolicy {
    allowlist: Vec<String>,
}

impl CommandPolicy {
    pub fn new(allowlist: Vec<String>) -> Self {
        Self { allowlist }
    }

    pub fn default_allowlist() -> Vec<String> {
        [
            "ls", "cd", "pwd", "echo", "cat", "date", "df", "ps", "find", "grep", "pacman",
            "systemctl", "ip", "nmcli", "mount", "umount", "lsusb", "lscpu", "free", "lsblk",
            "journalctl", "uptime", "whoami", "du", "reboot", "poweroff",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub fn vet(&self, candidate: &str) -> Result<(), PolicyError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(PolicyError::Empty);
        }

        let program = candidate.split_whitespace().next().unwrap_or_default();
        if self.allowlist.iter().any(|allowed| allowed == program) {
            return Ok(());
        }

        for op in UNSAFE_OPERATORS {
            if candidate.contains(op) {
                return Err(PolicyError::UnsafeOperator(op));
            }
        }

        Ok(())
    }
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new(Self::default_allowlist())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlisted_program_passes() {
        let policy = CommandPolicy::default();
        assert_eq!(policy.vet("df -h"), Ok(()));
        assert_eq!(policy.vet("ls -la /home"), Ok(()));
    }

    #[test]
    fn empty_candidate_is_rejected() {
        let policy = CommandPolicy::default();
        assert_eq!(policy.vet(""), Err(PolicyError::Empty));
        assert_eq!(policy.vet("   "), Err(PolicyError::Empty));
    }

    #[test]
    fn chained_command_outside_allowlist_is_rejected() {
        let policy = CommandPolicy::default();
        assert!(matches!(
            policy.vet("kquitapp5 plasmashell && kstart5 plasmashell"),
            Err(PolicyError::UnsafeOperator("&&"))
        ));
        assert!(matches!(
            policy.vet("foo; bar"),
            Err(PolicyError::UnsafeOperator(_))
        ));
    }

    #[test]
    fn plain_command_outside_allowlist_passes() {
        let policy = CommandPolicy::default();
        assert_eq!(policy.vet("uname -a"), Ok(()));
    }

    #[test]
    fn allowlist_match_is_whole_token() {
        let policy = CommandPolicy::new(vec!["ls".to_string()]);
        // "lsblk" must not ride on the "ls" entry.
        assert!(matches!(
            policy.vet("lsblk; true"),
            Err(PolicyError::UnsafeOperator(_))
        ));
    }
}
