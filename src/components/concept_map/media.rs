/// Engine-side mirror of the media element: the only source of playback time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaClock {
	pub current_time: f64,
	pub duration: f64,
	pub playing: bool,
}

/// What the component must tell the media element after a clock transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaCommand {
	Seek(f64),
	Play { from: Option<f64> },
	Pause,
}

/// Within this distance of the end, play restarts from the beginning.
const RESTART_WINDOW: f64 = 0.1;

impl MediaClock {
	pub fn on_metadata(&mut self, duration: f64) {
		self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
	}

	pub fn on_time_update(&mut self, t: f64) {
		self.current_time = t;
	}

	pub fn on_play(&mut self) {
		self.playing = true;
	}

	pub fn on_pause(&mut self) {
		self.playing = false;
	}

	/// Playback finished: stop and rewind. The returned seek keeps the element in step.
	pub fn on_ended(&mut self) -> MediaCommand {
		self.playing = false;
		self.current_time = 0.0;
		MediaCommand::Seek(0.0)
	}

	/// Timeline seek, clamped into the known duration.
	pub fn seek(&mut self, t: f64) -> MediaCommand {
		let upper = if self.duration > 0.0 { self.duration } else { f64::INFINITY };
		self.current_time = t.clamp(0.0, upper);
		MediaCommand::Seek(self.current_time)
	}

	pub fn toggle_play(&mut self) -> MediaCommand {
		if self.playing {
			return MediaCommand::Pause;
		}
		if self.duration > 0.0 && self.current_time >= self.duration - RESTART_WINDOW {
			self.current_time = 0.0;
			return MediaCommand::Play { from: Some(0.0) };
		}
		MediaCommand::Play { from: None }
	}

	/// Upper bound for the timeline slider, in whole seconds.
	pub fn slider_max(&self) -> f64 {
		if self.duration > 0.0 { self.duration.floor() } else { 0.0 }
	}
}

/// `mm:ss`, or `hh:mm:ss` from one hour on.
pub fn format_time(seconds: f64) -> String {
	let s = if seconds.is_finite() { seconds.max(0.0).floor() as u64 } else { 0 };
	let (h, m, sec) = (s / 3600, (s % 3600) / 60, s % 60);
	if h > 0 {
		format!("{h:02}:{m:02}:{sec:02}")
	} else {
		format!("{m:02}:{sec:02}")
	}
}
