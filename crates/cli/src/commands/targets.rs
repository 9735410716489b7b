use std::time::Instant;

use tabscope::CdpHost;

use crate::config::Endpoint;
use crate::discovery::{self, PageTarget};
use crate::error::Result;
use crate::output::{Envelope, OutputFormat, emit, print_lines};
use crate::styles;

pub async fn execute(endpoint: &Endpoint, format: OutputFormat) -> Result<()> {
	let start = Instant::now();
	let targets = match endpoint {
		Endpoint::Discover { .. } => discovery::list_targets(endpoint, None).await?,
		Endpoint::WebSocket(url) => {
			let (host, _events) = CdpHost::connect(url).await?;
			discovery::list_targets(endpoint, Some(&host)).await?
		}
	};

	match format {
		OutputFormat::Text => print_lines(text_lines(&targets)),
		format => emit(&Envelope::success("targets", &targets).since(start), format),
	}
	Ok(())
}

fn text_lines(targets: &[PageTarget]) -> Vec<String> {
	if targets.is_empty() {
		return vec![styles::hint("(no page targets)").to_string()];
	}
	targets
		.iter()
		.flat_map(|target| {
			[
				format!("{}  {}", styles::heading(target.id.as_str()), target.title),
				format!("    {}", styles::hint(&target.url)),
			]
		})
		.collect()
}
