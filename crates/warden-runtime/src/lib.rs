//! Invocation lifecycle manager for the Warden moderation bot.
//!
//! Owns the transport connection, qualifies inbound messages into command
//! invocations, allocates one isolated resource scope per invocation, and
//! guarantees every scope is released exactly once across normal completion,
//! failure, and shutdown.

mod config;
mod interpreter;
mod registry;
mod runtime;
mod scope;
mod transport;

pub use config::{load_bot_config, BotConfig, RuntimeMode};
pub use interpreter::{
    CommandErrorKind, CommandErrorReporter, CommandInterpreter, CommandOutcome, ModuleReport,
};
pub use registry::InFlightRegistry;
pub use runtime::{run_bot, BotRuntimeConfig, InvocationContext};
pub use scope::{Behavior, CommandScope, PersistenceBootstrap, ScopeFactory};
pub use transport::{ChatTransport, InboundMessage, MessageAuthor, TransportError, TransportEvent};
