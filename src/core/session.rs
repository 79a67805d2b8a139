use std::time::{Duration, Instant};

use super::frame::{GeneratedFrame, GenerationResult};
use super::request::OutputKind;

/// Status messages shown while frames are being generated, one per phase
pub const PHASE_MESSAGES: [&str; 6] = [
    "Analyzing the product's shape...",
    "Estimating depth and texture...",
    "Rendering view angles...",
    "Applying studio lighting...",
    "Polishing the final details...",
    "Compiling the 360° visualization...",
];

/// Default display interval between animation frames
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Pick the phase message for a completion percentage
pub fn phase_message(percent: u8) -> &'static str {
    let phases = PHASE_MESSAGES.len();
    let idx = (f64::from(percent.min(100)) / 100.0 * phases as f64).floor() as usize;
    PHASE_MESSAGES[idx.min(phases - 1)]
}

/// Headline progress text, e.g. "Generating frame 3 of 12..."
pub fn progress_text(percent: u8, total_frames: u32, kind: OutputKind) -> String {
    if kind == OutputKind::Static {
        "Generating 3D image...".to_string()
    } else {
        let current = (f64::from(percent) / 100.0 * f64::from(total_frames)).ceil() as u32;
        format!("Generating frame {} of {}...", current, total_frames)
    }
}

/// Where a submission currently stands
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Generating {
        percent: u8,
        total_frames: u32,
        kind: OutputKind,
    },
    Succeeded(GenerationResult),
    Failed(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Generating { .. } => "generating",
            SessionState::Succeeded(_) => "succeeded",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Progress and result state for one view, plus the frame display cycle
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    cycler: FrameCycler,
}

impl Session {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            cycler: FrameCycler::new(interval),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, SessionState::Generating { .. })
    }

    /// Enter Generating; clears any previous result or error
    pub fn begin(&mut self, total_frames: u32, kind: OutputKind) {
        self.transition(SessionState::Generating {
            percent: 0,
            total_frames,
            kind,
        });
        self.cycler.reset(0, kind);
    }

    /// Record progress; ignored unless generating
    pub fn set_progress(&mut self, value: u8) {
        if let SessionState::Generating { percent, .. } = &mut self.state {
            *percent = value.min(100);
        }
    }

    pub fn succeed(&mut self, result: GenerationResult) {
        let animated_len = if result.is_animated() { result.len() } else { 1 };
        self.cycler.reset(animated_len, result.kind());
        self.transition(SessionState::Succeeded(result));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.cycler.reset(0, OutputKind::Static);
        self.transition(SessionState::Failed(message.into()));
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    /// Whether the displayed frame rotates on its own
    pub fn is_cycling(&self) -> bool {
        matches!(self.state, SessionState::Succeeded(_)) && self.cycler.is_animated()
    }

    /// Advance the display cycle; returns true when the shown frame changed
    pub fn tick(&mut self, now: Instant) -> bool {
        matches!(self.state, SessionState::Succeeded(_)) && self.cycler.tick(now)
    }

    /// Frame currently on display, if any
    pub fn current_frame(&self) -> Option<&GeneratedFrame> {
        match &self.state {
            SessionState::Succeeded(result) => result.frames().get(self.cycler.index()),
            _ => None,
        }
    }

    /// Phase message and headline for the current progress, when generating
    pub fn progress_view(&self) -> Option<(u8, String, &'static str)> {
        match &self.state {
            SessionState::Generating {
                percent,
                total_frames,
                kind,
            } => Some((*percent, progress_text(*percent, *total_frames, *kind), phase_message(*percent))),
            _ => None,
        }
    }
}

/// Cycles a display index through a frame set at a fixed interval
#[derive(Debug, Clone)]
pub struct FrameCycler {
    interval: Duration,
    len: usize,
    animated: bool,
    index: usize,
    last_advance: Option<Instant>,
}

impl Default for FrameCycler {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl FrameCycler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            len: 0,
            animated: false,
            index: 0,
            last_advance: None,
        }
    }

    /// Restart on a new frame set
    pub fn reset(&mut self, len: usize, kind: OutputKind) {
        self.len = len;
        self.animated = kind.is_animated() && len > 1;
        self.index = 0;
        self.last_advance = None;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Advance by one frame per elapsed interval; the first tick only arms the timer
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.animated {
            return false;
        }
        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return false;
        };
        if now.saturating_duration_since(last) < self.interval {
            return false;
        }
        self.index = (self.index + 1) % self.len;
        self.last_advance = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: u32) -> Vec<GeneratedFrame> {
        (0..n)
            .map(|i| GeneratedFrame {
                index: i,
                angle: i * 30,
                media_type: "image/png".into(),
                data: String::new(),
            })
            .collect()
    }

    #[test]
    fn phases_bucket_percentage() {
        assert_eq!(phase_message(0), PHASE_MESSAGES[0]);
        assert_eq!(phase_message(16), PHASE_MESSAGES[0]);
        assert_eq!(phase_message(17), PHASE_MESSAGES[1]);
        assert_eq!(phase_message(50), PHASE_MESSAGES[3]);
        assert_eq!(phase_message(99), PHASE_MESSAGES[5]);
        assert_eq!(phase_message(100), PHASE_MESSAGES[5]);
    }

    #[test]
    fn progress_text_counts_frames() {
        assert_eq!(progress_text(0, 1, OutputKind::Static), "Generating 3D image...");
        assert_eq!(progress_text(8, 12, OutputKind::Video), "Generating frame 1 of 12...");
        assert_eq!(progress_text(50, 24, OutputKind::LoopingImage), "Generating frame 12 of 24...");
        assert_eq!(progress_text(0, 24, OutputKind::LoopingImage), "Generating frame 0 of 24...");
    }

    #[test]
    fn session_walks_the_state_machine() {
        let mut session = Session::new(FRAME_INTERVAL);
        assert_eq!(session.state().name(), "idle");

        session.begin(12, OutputKind::Video);
        session.set_progress(42);
        let (percent, headline, _) = session.progress_view().unwrap();
        assert_eq!(percent, 42);
        assert_eq!(headline, "Generating frame 6 of 12...");

        session.succeed(GenerationResult::new(OutputKind::Video, frames(12)));
        assert_eq!(session.state().name(), "succeeded");
        assert!(session.progress_view().is_none());
        assert_eq!(session.current_frame().unwrap().index, 0);

        session.begin(1, OutputKind::Static);
        assert!(session.current_frame().is_none());
        session.fail("Generation blocked by the service: SAFETY");
        assert!(matches!(session.state(), SessionState::Failed(m) if m.contains("SAFETY")));
    }

    #[test]
    fn progress_ignored_outside_generation() {
        let mut session = Session::default();
        session.set_progress(50);
        assert!(session.progress_view().is_none());
    }

    #[test]
    fn animated_result_cycles_every_interval() {
        let mut session = Session::new(FRAME_INTERVAL);
        session.succeed(GenerationResult::new(OutputKind::LoopingImage, frames(3)));

        let t0 = Instant::now();
        assert!(!session.tick(t0));
        assert!(!session.tick(t0 + Duration::from_millis(50)));
        assert!(session.tick(t0 + Duration::from_millis(100)));
        assert_eq!(session.current_frame().unwrap().index, 1);
        assert!(session.tick(t0 + Duration::from_millis(200)));
        assert!(session.tick(t0 + Duration::from_millis(300)));
        assert_eq!(session.current_frame().unwrap().index, 0);
    }

    #[test]
    fn static_result_never_advances() {
        let mut session = Session::new(FRAME_INTERVAL);
        session.succeed(GenerationResult::new(OutputKind::Static, frames(1)));

        let t0 = Instant::now();
        for step in 0..5 {
            assert!(!session.tick(t0 + FRAME_INTERVAL * step));
        }
        assert_eq!(session.current_frame().unwrap().index, 0);
        assert!(!session.is_cycling());
    }

    #[test]
    fn only_animated_successes_cycle() {
        let mut session = Session::new(FRAME_INTERVAL);
        assert!(!session.is_cycling());

        session.succeed(GenerationResult::new(OutputKind::Video, frames(2)));
        assert!(session.is_cycling());

        session.begin(2, OutputKind::Video);
        assert!(!session.is_cycling());
    }

    #[test]
    fn new_result_resets_cycle() {
        let mut cycler = FrameCycler::new(FRAME_INTERVAL);
        cycler.reset(4, OutputKind::Video);
        let t0 = Instant::now();
        cycler.tick(t0);
        cycler.tick(t0 + FRAME_INTERVAL);
        assert_eq!(cycler.index(), 1);

        cycler.reset(2, OutputKind::Static);
        assert_eq!(cycler.index(), 0);
        assert!(!cycler.is_animated());
    }
}
