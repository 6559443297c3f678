use anyhow::Result;
use async_trait::async_trait;

use crate::runtime::InvocationContext;
use crate::scope::CommandScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `CommandErrorKind` values.
pub enum CommandErrorKind {
    Parse,
    Unauthorized,
    UnknownCommand,
    Exception,
    Other,
}

impl CommandErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse_failure",
            Self::Unauthorized => "unauthorized",
            Self::UnknownCommand => "unknown_command",
            Self::Exception => "exception",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of one command execution. Produced exactly once per invocation.
pub enum CommandOutcome {
    Success,
    Failure {
        kind: CommandErrorKind,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Module/command counts reported after command modules load.
pub struct ModuleReport {
    pub modules: usize,
    pub commands: usize,
}

#[async_trait]
/// Trait contract for the command interpreter.
///
/// `execute` never fails out-of-band; parse errors, authorization denials,
/// and handler panics are all folded into the returned outcome.
pub trait CommandInterpreter: Send + Sync {
    async fn load_modules(&self) -> Result<ModuleReport>;
    async fn execute(
        &self,
        context: &InvocationContext,
        argument_offset: usize,
        scope: &dyn CommandScope,
    ) -> CommandOutcome;
}

#[async_trait]
/// Sink for non-exception command failures, keyed by the source message.
pub trait CommandErrorReporter: Send + Sync {
    async fn associate_error(&self, message_id: u64, error: &str) -> Result<()>;
}
