//! Argv-style command construction for engine invocation.

use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command as TokioCommand;

/// Specification for a command to execute.
///
/// Arguments are discrete `OsString` elements and no shell string evaluation
/// is involved anywhere, so a workspace path with spaces or metacharacters
/// reaches the engine untouched.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Convert this `CommandSpec` into a `tokio::process::Command`.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("compiler")
            .arg("input_code.txt")
            .cwd("/work");
        assert_eq!(spec.program, OsString::from("compiler"));
        assert_eq!(spec.args, vec![OsString::from("input_code.txt")]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/work")));
    }

    #[test]
    fn test_shell_metacharacters_are_preserved() {
        let spec = CommandSpec::new("compiler").arg("$(whoami)").arg("a b;c");
        assert_eq!(spec.args[0], OsString::from("$(whoami)"));
        assert_eq!(spec.args[1], OsString::from("a b;c"));
    }
}
