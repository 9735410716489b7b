/// Coalesces render requests to at most one render per frame tick.
#[derive(Debug, Default)]
pub struct RenderGate {
	pending: bool,
}

impl RenderGate {
	/// Marks the view dirty. Returns true only for the first request since the last tick.
	pub fn request(&mut self) -> bool {
		!std::mem::replace(&mut self.pending, true)
	}

	/// Called once per frame tick; true means render now.
	pub fn take(&mut self) -> bool {
		std::mem::take(&mut self.pending)
	}

	pub fn is_pending(&self) -> bool {
		self.pending
	}
}
