//! Startup/shutdown protocol and per-message invocation handling.

use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use warden_core::{sanitize_everyone, utc_now_iso8601, write_text_atomic};

use crate::config::{BotConfig, RuntimeMode};
use crate::interpreter::{
    CommandErrorKind, CommandErrorReporter, CommandInterpreter, CommandOutcome,
};
use crate::registry::InFlightRegistry;
use crate::scope::{Behavior, CommandScope, PersistenceBootstrap, ScopeFactory};
use crate::transport::{ChatTransport, InboundMessage, MessageAuthor, TransportEvent};

#[derive(Debug, Clone)]
/// Identity of one inbound message being processed as a command invocation.
///
/// Immutable once built; its message id keys the in-flight registry entry
/// that owns the invocation's resource scope.
pub struct InvocationContext {
    pub message_id: u64,
    pub author: MessageAuthor,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
}

#[derive(Clone)]
/// Collaborators and settings for the bot lifecycle loop.
pub struct BotRuntimeConfig {
    pub transport: Arc<dyn ChatTransport>,
    pub interpreter: Arc<dyn CommandInterpreter>,
    pub scope_factory: Arc<dyn ScopeFactory>,
    pub persistence: Arc<dyn PersistenceBootstrap>,
    pub behaviors: Vec<Arc<dyn Behavior>>,
    pub error_reporter: Arc<dyn CommandErrorReporter>,
    pub registry: Arc<InFlightRegistry>,
    pub bot: BotConfig,
}

/// Runs the bot lifecycle loop until the shutdown signal flips or the
/// transport disconnects.
///
/// Startup failures propagate as `Err` after best-effort cleanup; an
/// unexpected disconnect produces an orderly shutdown and `Ok` — there is
/// no reconnect by design.
pub async fn run_bot(config: BotRuntimeConfig, shutdown: watch::Receiver<bool>) -> Result<()> {
    BotRuntime::new(config).run(shutdown).await
}

struct BotRuntime {
    transport: Arc<dyn ChatTransport>,
    interpreter: Arc<dyn CommandInterpreter>,
    scope_factory: Arc<dyn ScopeFactory>,
    persistence: Arc<dyn PersistenceBootstrap>,
    behaviors: Vec<Arc<dyn Behavior>>,
    error_reporter: Arc<dyn CommandErrorReporter>,
    registry: Arc<InFlightRegistry>,
    bot: BotConfig,
    root_scope: Option<Arc<dyn CommandScope>>,
    started_behaviors: Vec<Arc<dyn Behavior>>,
    ready: bool,
    cleaned_up: bool,
}

impl BotRuntime {
    fn new(config: BotRuntimeConfig) -> Self {
        Self {
            transport: config.transport,
            interpreter: config.interpreter,
            scope_factory: config.scope_factory,
            persistence: config.persistence,
            behaviors: config.behaviors,
            error_reporter: config.error_reporter,
            registry: config.registry,
            bot: config.bot,
            root_scope: None,
            started_behaviors: Vec::new(),
            ready: false,
            cleaned_up: false,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("starting bot runtime");

        let mut events = match self.start_all().await {
            Ok(events) => events,
            Err(error) => {
                error!("startup failed: {error:#}");
                self.shutdown_cleanup().await;
                if let Err(logout_error) = self.transport.logout().await {
                    warn!("logout after failed startup also failed: {logout_error}");
                }
                return Err(error);
            }
        };

        let reason = self.event_loop(&mut events, &mut shutdown).await;
        info!(reason, "bot runtime stopping");

        // Dropping the receiver is what deregisters the event subscription.
        drop(events);
        self.shutdown_cleanup().await;
        if let Err(error) = self.transport.logout().await {
            warn!("logout during shutdown failed: {error}");
        }
        Ok(())
    }

    /// Startup protocol. Strict order; the first failing step aborts.
    async fn start_all(&mut self) -> Result<mpsc::Receiver<TransportEvent>> {
        let root_scope = self
            .scope_factory
            .create_scope()
            .await
            .context("failed to create the root resource scope")?;
        self.root_scope = Some(root_scope);

        let events = self.transport.subscribe();

        info!("running database migrations");
        self.persistence
            .run_migrations()
            .await
            .context("persistence bootstrap failed")?;

        info!("starting behaviors");
        for behavior in self.behaviors.clone() {
            behavior
                .start()
                .await
                .with_context(|| format!("behavior '{}' failed to start", behavior.name()))?;
            self.started_behaviors.push(behavior);
        }

        info!("loading command modules");
        let report = self
            .interpreter
            .load_modules()
            .await
            .context("failed to load command modules")?;
        info!(
            modules = report.modules,
            commands = report.commands,
            "command modules loaded"
        );

        info!("logging into the chat transport and starting the client");
        self.transport
            .login()
            .await
            .context("transport login failed")?;
        self.transport
            .start()
            .await
            .context("transport start failed")?;
        info!("chat transport started");

        Ok(events)
    }

    async fn event_loop(
        &mut self,
        events: &mut mpsc::Receiver<TransportEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> &'static str {
        if *shutdown.borrow() {
            return "cancelled";
        }
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return "cancelled";
                    }
                }
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        return "event stream closed";
                    };
                    match event {
                        TransportEvent::Ready => self.on_ready().await,
                        TransportEvent::MessageReceived(message) => self.on_message(message).await,
                        TransportEvent::LatencyUpdated { old_ms, new_ms } => {
                            self.on_latency_updated(old_ms, new_ms);
                        }
                        TransportEvent::Disconnected { reason } => {
                            info!(%reason, "transport disconnected unexpectedly; stopping the application");
                            return "disconnected";
                        }
                        TransportEvent::Log { source, message } => debug!(%source, "{message}"),
                    }
                }
            }
        }
    }

    /// Post-connect setup. Applied exactly once; later ready events no-op.
    async fn on_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        debug!("transport ready");
        if let Some(presence) = self.bot.presence.clone() {
            if let Err(error) = self.transport.set_presence(&presence).await {
                warn!("failed to set presence: {error}");
            }
        }
    }

    fn on_latency_updated(&self, old_ms: u64, new_ms: u64) {
        debug!(old_ms, new_ms, "latency updated");
        if self.bot.mode != RuntimeMode::Production {
            return;
        }
        if let Err(error) = write_text_atomic(&self.bot.healthcheck_path, &utc_now_iso8601()) {
            warn!("failed to write health timestamp: {error:#}");
        }
    }

    async fn on_message(&self, message: InboundMessage) {
        if message.author.is_bot || message.author.is_webhook {
            return;
        }
        let Some(argument_offset) = command_argument_offset(
            &message.content,
            self.bot.command_prefix,
            self.transport.current_user_id(),
        ) else {
            return;
        };

        let context = InvocationContext {
            message_id: message.id,
            author: message.author,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
        };

        let scope = match self.scope_factory.create_scope().await {
            Ok(scope) => scope,
            Err(error) => {
                warn!(
                    message_id = context.message_id,
                    "failed to create invocation scope: {error:#}"
                );
                return;
            }
        };

        // Tracked before the interpreter runs so shutdown can always find it.
        self.registry.insert(context.message_id, Arc::clone(&scope));

        let registry = Arc::clone(&self.registry);
        let interpreter = Arc::clone(&self.interpreter);
        let transport = Arc::clone(&self.transport);
        let reporter = Arc::clone(&self.error_reporter);
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = match scope.on_user_authenticated(&context.author).await {
                Ok(()) => {
                    interpreter
                        .execute(&context, argument_offset, scope.as_ref())
                        .await
                }
                Err(error) => CommandOutcome::Failure {
                    kind: CommandErrorKind::Exception,
                    reason: format!("{error:#}"),
                },
            };
            drop(scope);
            handle_command_result(&registry, &transport, &reporter, &context, outcome).await;
            debug!(
                message_id = context.message_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "invocation completed"
            );
        });
    }

    /// Idempotent shutdown routine. Every step is best-effort so that a
    /// failing step never prevents the remaining cleanup from running.
    async fn shutdown_cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        for behavior in self.started_behaviors.drain(..).rev() {
            if let Err(error) = behavior.stop().await {
                warn!(behavior = behavior.name(), "behavior stop failed: {error:#}");
            }
        }

        let drained = self.registry.drain();
        if !drained.is_empty() {
            info!(
                count = drained.len(),
                "releasing scopes of in-flight invocations"
            );
        }
        for (_message_id, scope) in drained {
            scope.release().await;
        }

        if let Some(root_scope) = self.root_scope.take() {
            root_scope.release().await;
        }
    }
}

/// Releases the invocation's scope and classifies the outcome. Runs exactly
/// once per completed invocation; a scope already drained by shutdown is not
/// released again.
async fn handle_command_result(
    registry: &InFlightRegistry,
    transport: &Arc<dyn ChatTransport>,
    reporter: &Arc<dyn CommandErrorReporter>,
    context: &InvocationContext,
    outcome: CommandOutcome,
) {
    if let Some(scope) = registry.remove(context.message_id) {
        scope.release().await;
    }

    let CommandOutcome::Failure { kind, reason } = outcome else {
        return;
    };
    let detail = format!("{}: {}", kind.as_str(), reason);
    if kind == CommandErrorKind::UnknownCommand {
        debug!(message_id = context.message_id, "{detail}");
    } else {
        warn!(message_id = context.message_id, "{detail}");
    }

    if kind == CommandErrorKind::Exception {
        let reply = format!("Error: {}", sanitize_everyone(&reason));
        if let Err(error) = transport.send_message(context.channel_id, &reply).await {
            warn!(
                channel_id = context.channel_id,
                "failed to send error reply: {error}"
            );
        }
    } else if let Err(error) = reporter.associate_error(context.message_id, &detail).await {
        warn!(
            message_id = context.message_id,
            "failed to associate command error: {error:#}"
        );
    }
}

/// Returns the offset of command arguments within `content` when the message
/// qualifies as a command trigger: a configured prefix character or a mention
/// of the running account, followed by at least two characters of content.
pub(crate) fn command_argument_offset(
    content: &str,
    prefix: char,
    bot_user_id: u64,
) -> Option<usize> {
    let offset = if content.starts_with(prefix) {
        prefix.len_utf8()
    } else {
        mention_prefix_offset(content, bot_user_id)?
    };
    let remainder = &content[offset..];
    (remainder.chars().count() >= 2).then_some(offset)
}

fn mention_prefix_offset(content: &str, bot_user_id: u64) -> Option<usize> {
    for mention in [format!("<@{bot_user_id}>"), format!("<@!{bot_user_id}>")] {
        if let Some(rest) = content.strip_prefix(&mention) {
            // A single space between the mention and the command is common.
            return Some(mention.len() + usize::from(rest.starts_with(' ')));
        }
    }
    None
}
