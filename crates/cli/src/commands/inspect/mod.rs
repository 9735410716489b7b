//! `inspect`: attach to one target and drive it from stdin until the session ends.
//!
//! One cooperative loop multiplexes four sources: browser events (routed to the
//! registry), operator directives on stdin, the frame ticker that renders ledger
//! changes and the coalesced resource tree, and Ctrl-C, which detaches. The loop
//! ends once the target has no session, whichever path removed it, or when the
//! browser hangs up.


mod directive;
mod render;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tabscope::{CdpHost, HostSignal, Inspection, RequestId, SessionRegistry, SessionState, TargetId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::{LinesStream, UnboundedReceiverStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

pub use directive::{Directive, ExchangeRef, HELP, StorageAction};
pub use render::{ExchangeRow, LedgerView};

use crate::cli::InspectArgs;
use crate::config::{self, CliConfig, Endpoint};
use crate::discovery;
use crate::error::{CliError, Result};
use crate::output::{Envelope, OutputFormat, emit, print_error_stderr, print_lines};

pub async fn execute(endpoint: &Endpoint, args: InspectArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
	let ws_url = discovery::resolve_ws_url(endpoint).await?;
	let (host, events) = CdpHost::connect(&ws_url).await?;
	info!(browser = host.product(), protocol = host.protocol_version(), "connected");

	let targets = discovery::list_targets(endpoint, Some(&host)).await?;
	let target = discovery::resolve_target(&targets, &args.target)?.id.clone();

	let registry = SessionRegistry::new(host.clone(), config::inspector_options(&args, config));
	let console = Console::new(registry.clone(), target.clone(), format);

	registry.toggle(&target).await?;
	if let (Some(filter), Some(inspection)) = (args.filter, registry.inspection(&target)) {
		inspection.set_filter(filter);
	}
	console.emit(console.status()?);

	let signals = UnboundedReceiverStream::new(events).filter_map({
		let host = Arc::clone(&host);
		move |event| host.route(event)
	});
	let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
	drive(
		&console,
		signals,
		lines,
		tokio::signal::ctrl_c(),
		config::frame_interval(&args, config),
	)
	.await;

	if host.is_closed() {
		warn!(target = %target, "browser connection closed");
	}
	console.emit(Reply::new("ended", json!({ "target": target }), vec![format!("session for {target} ended")]));
	Ok(())
}

/// Multiplexes host signals, directives, frame ticks and `interrupt` until the
/// session is gone, then renders the last frame and releases what is left.
async fn drive<S, L, I>(console: &Console, mut signals: S, mut lines: L, interrupt: I, frame_interval: Duration)
where
	S: Stream<Item = HostSignal> + Unpin,
	L: Stream<Item = std::io::Result<String>> + Unpin,
	I: Future,
{
	let registry = &console.registry;
	let target = &console.target;
	let mut stdin_open = true;
	let mut ticker = tokio::time::interval(frame_interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
	tokio::pin!(interrupt);

	loop {
		tokio::select! {
			signal = signals.next() => match signal {
				Some(signal) => registry.handle(signal).await,
				None => {
					debug!(target = %target, "host signals ended");
					break;
				}
			},
			line = lines.next(), if stdin_open => match line {
				Some(Ok(line)) => {
					if console.run_line(&line).await {
						break;
					}
				}
				Some(Err(err)) => {
					warn!(error = %err, "stdin unreadable, directives disabled");
					stdin_open = false;
				}
				None => stdin_open = false,
			},
			_ = ticker.tick() => console.render_frame(),
			_ = &mut interrupt => {
				info!(target = %target, "interrupted");
				console.detach().await;
				break;
			}
		}

		if registry.state(target).is_none() {
			break;
		}
	}

	console.render_frame();
	registry.shutdown().await;
}

/// Outcome of one directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
	pub command: &'static str,
	pub data: Value,
	pub lines: Vec<String>,
	pub quit: bool,
}

impl Reply {
	fn new(command: &'static str, data: Value, lines: Vec<String>) -> Self {
		Self {
			command,
			data,
			lines,
			quit: false,
		}
	}

	fn of<T: Serialize>(command: &'static str, data: &T, lines: Vec<String>) -> Result<Self> {
		Ok(Self::new(command, serde_json::to_value(data)?, lines))
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusView {
	target: TargetId,
	attached: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	state: Option<SessionState>,
	#[serde(skip_serializing_if = "Option::is_none")]
	surface: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	filter: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	preserve_log: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	hide_own_traffic: Option<bool>,
	exchanges: usize,
	visible: usize,
	resources: usize,
}

/// Operator side of one inspected target.
pub struct Console {
	registry: SessionRegistry,
	target: TargetId,
	format: OutputFormat,
}

impl Console {
	pub fn new(registry: SessionRegistry, target: TargetId, format: OutputFormat) -> Self {
		Self {
			registry,
			target,
			format,
		}
	}

	fn inspection(&self) -> Result<Arc<Inspection>> {
		self.registry
			.inspection(&self.target)
			.ok_or_else(|| tabscope::Error::NotAttached(self.target.clone()).into())
	}

	pub fn emit(&self, reply: Reply) {
		match self.format {
			OutputFormat::Text => print_lines(&reply.lines),
			format => emit(&Envelope::success(reply.command, reply.data).for_target(&self.target), format),
		}
	}

	fn emit_error(&self, command: &str, err: &CliError) {
		let error = err.to_command_error();
		match self.format {
			OutputFormat::Text => print_error_stderr(&error),
			format => emit(&Envelope::<Value>::failure(command, error).for_target(&self.target), format),
		}
	}

	/// Runs one input line. Returns true when the operator asked to quit.
	pub async fn run_line(&self, line: &str) -> bool {
		let directive = match Directive::parse(line) {
			Ok(Some(directive)) => directive,
			Ok(None) => return false,
			Err(err) => {
				self.emit_error("directive", &err);
				return false;
			}
		};

		let name = directive.name();
		match self.apply(directive).await {
			Ok(reply) => {
				let quit = reply.quit;
				self.emit(reply);
				quit
			}
			Err(err) => {
				self.emit_error(name, &err);
				false
			}
		}
	}

	pub async fn apply(&self, directive: Directive) -> Result<Reply> {
		let name = directive.name();
		match directive {
			Directive::Status => self.status(),
			Directive::Toggle => {
				let status = self.registry.toggle(&self.target).await?;
				let word = if status.attached { "attached" } else { "detached" };
				Reply::of(name, &status, vec![format!("{} {word}", self.target)])
			}
			Directive::Clear => {
				self.inspection()?.clear_ledger();
				Ok(Reply::new(name, json!({ "cleared": true }), vec!["log cleared".to_string()]))
			}
			Directive::Filter(filter) => {
				self.inspection()?.set_filter(filter);
				Ok(Reply::new(
					name,
					json!({ "filter": filter.to_string() }),
					vec![format!("filter: {filter}")],
				))
			}
			Directive::Preserve(value) => {
				let inspection = self.inspection()?;
				let value = value.unwrap_or_else(|| !inspection.read_ledger(|ledger| ledger.preserve_log()));
				inspection.set_preserve_log(value);
				Ok(Reply::new(
					name,
					json!({ "preserveLog": value }),
					vec![format!("preserve log: {}", on_off(value))],
				))
			}
			Directive::HideOwn(value) => {
				let inspection = self.inspection()?;
				let value = value.unwrap_or_else(|| !inspection.read_ledger(|ledger| ledger.hide_own_traffic()));
				inspection.set_hide_own_traffic(value);
				Ok(Reply::new(
					name,
					json!({ "hideOwnTraffic": value }),
					vec![format!("hide own traffic: {}", on_off(value))],
				))
			}
			Directive::List => {
				let rows = self
					.inspection()?
					.read_ledger(|ledger| render::exchange_rows(&ledger.visible(), None));
				let view = LedgerView { reset: true, rows };
				Reply::of(name, &view, view.lines())
			}
			Directive::Tree => {
				let rows = self.inspection()?.read_resources(|index| index.rows());
				Reply::of(name, &rows, render::tree_lines(&rows))
			}
			Directive::Expand(path) => match self.inspection()?.toggle_expanded(&path) {
				Some(expanded) => Ok(Reply::new(
					name,
					json!({ "path": path, "expanded": expanded }),
					vec![format!("{path} {}", if expanded { "expanded" } else { "collapsed" })],
				)),
				None => Err(CliError::Directive(format!("no folder at '{path}'"))),
			},
			Directive::Open(url) => {
				let content = self.inspection()?.file_content(&url).await?;
				Reply::of(name, &content, render::content_lines(&content))
			}
			Directive::Body(exchange) => {
				let inspection = self.inspection()?;
				let id = resolve_exchange(&inspection, &exchange)?;
				let body = inspection.response_body(&id).await?;
				Ok(Reply::new(
					name,
					json!({ "id": id, "body": body }),
					render::body_lines(&body),
				))
			}
			Directive::Curl { exchange, file } => {
				let inspection = self.inspection()?;
				let id = resolve_exchange(&inspection, &exchange)?;
				let command = inspection.curl_command(&id)?;
				match file {
					Some(path) => {
						write_command(&path, &command)?;
						Ok(Reply::new(
							name,
							json!({ "id": id, "path": path }),
							vec![format!("saved to {}", path.display())],
						))
					}
					None => Ok(Reply::new(name, json!({ "id": id, "command": command }), vec![command])),
				}
			}
			Directive::Storage { area, action } => {
				let inspection = self.inspection()?;
				match action {
					StorageAction::List => {
						let entries = inspection.storage_list(area).await?;
						let lines = render::storage_lines(&entries);
						Ok(Reply::new(name, json!({ "area": area, "entries": entries }), lines))
					}
					StorageAction::Delete(key) => {
						inspection.storage_delete(area, &key).await?;
						let line = format!("deleted {key} from {area}");
						Ok(Reply::new(name, json!({ "area": area, "deleted": key }), vec![line]))
					}
					StorageAction::Clear => {
						inspection.storage_clear(area).await?;
						Ok(Reply::new(
							name,
							json!({ "area": area, "cleared": true }),
							vec![format!("{area} cleared")],
						))
					}
				}
			}
			Directive::Refresh => {
				let added = self.inspection()?.load_resources().await?;
				Ok(Reply::new(
					name,
					json!({ "added": added }),
					vec![format!("{added} new resources")],
				))
			}
			Directive::Help => {
				let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
				let data: Vec<_> = HELP
					.iter()
					.map(|(usage, about)| json!({ "usage": usage, "about": about }))
					.collect();
				let lines = HELP
					.iter()
					.map(|(usage, about)| format!("  {usage:<width$}  {about}"))
					.collect();
				Ok(Reply::new(name, Value::Array(data), lines))
			}
			Directive::Quit => {
				self.detach().await;
				let mut reply = Reply::new(name, json!({ "target": self.target }), Vec::new());
				reply.quit = true;
				Ok(reply)
			}
		}
	}

	fn status(&self) -> Result<Reply> {
		let state = self.registry.state(&self.target);
		let inspection = self.registry.inspection(&self.target);
		let mut view = StatusView {
			target: self.target.clone(),
			attached: self.registry.status(&self.target).attached,
			state,
			surface: self.registry.surface(&self.target).map(|s| s.to_string()),
			filter: None,
			preserve_log: None,
			hide_own_traffic: None,
			exchanges: 0,
			visible: 0,
			resources: 0,
		};
		if let Some(inspection) = &inspection {
			inspection.read_ledger(|ledger| {
				view.filter = Some(ledger.filter().to_string());
				view.preserve_log = Some(ledger.preserve_log());
				view.hide_own_traffic = Some(ledger.hide_own_traffic());
				view.exchanges = ledger.len();
				view.visible = ledger.visible().len();
			});
			view.resources = inspection.read_resources(|index| index.file_count());
		}

		let mut lines = vec![format!(
			"{}: {}",
			self.target,
			state.map(|s| format!("{s:?}").to_lowercase()).unwrap_or_else(|| "detached".to_string())
		)];
		if let Some(filter) = &view.filter {
			lines.push(format!(
				"  {} of {} requests shown (filter {filter}), {} resources",
				view.visible, view.exchanges, view.resources
			));
			lines.push(format!(
				"  preserve log {}, hide own traffic {}",
				on_off(view.preserve_log.unwrap_or(false)),
				on_off(view.hide_own_traffic.unwrap_or(false))
			));
		}
		Reply::of("status", &view, lines)
	}

	/// Explicit detach, if a session is attached. Failures are logged.
	pub async fn detach(&self) {
		if self.registry.state(&self.target) != Some(SessionState::Attached) {
			return;
		}
		if let Err(err) = self.registry.toggle(&self.target).await {
			warn!(target = %self.target, error = %err, "detach failed");
		}
	}

	/// Frame tick: emits ledger changes and, at most once, the resource tree.
	pub fn render_frame(&self) {
		for reply in self.frame() {
			self.emit(reply);
		}
	}

	pub fn frame(&self) -> Vec<Reply> {
		let Some(inspection) = self.registry.inspection(&self.target) else {
			return Vec::new();
		};
		let mut replies = Vec::new();

		let changes = inspection.take_ledger_changes();
		if !changes.is_empty() {
			let rows = inspection.read_ledger(|ledger| {
				let only = (!changes.reset).then_some(changes.touched.as_slice());
				render::exchange_rows(&ledger.visible(), only)
			});
			let view = LedgerView {
				reset: changes.reset,
				rows,
			};
			if view.reset || !view.rows.is_empty() {
				if let Ok(reply) = Reply::of("ledger", &view, view.lines()) {
					replies.push(reply);
				}
			}
		}

		if inspection.take_render() {
			let rows = inspection.read_resources(|index| index.rows());
			if let Ok(reply) = Reply::of("tree", &rows, render::tree_lines(&rows)) {
				replies.push(reply);
			}
		}
		replies
	}
}

fn resolve_exchange(inspection: &Inspection, exchange: &ExchangeRef) -> Result<RequestId> {
	match exchange {
		ExchangeRef::Id(id) => Ok(id.clone()),
		ExchangeRef::Row(row) => inspection
			.read_ledger(|ledger| ledger.visible().get(row - 1).map(|record| record.id.clone()))
			.ok_or_else(|| CliError::Directive(format!("no row #{row} in the visible log"))),
	}
}

fn write_command(path: &Path, command: &str) -> Result<()> {
	std::fs::write(path, format!("{command}\n"))?;
	Ok(())
}

fn on_off(value: bool) -> &'static str {
	if value { "on" } else { "off" }
}
