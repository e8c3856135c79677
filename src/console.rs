use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, info};

use crate::{job::JobState, progress::Event};

const BAR_TEMPLATE: &str = "{msg:>5} [{bar:30.green/white}] {pos:>3}%";

/// Render the worker's events on the terminal.
///
/// Each transfer gets its own progress bar. Status lines are logged with
/// the bar suspended so they never overwrite each other. When the bar
/// cannot be drawn (stderr is not a terminal), progress is logged every
/// 10% instead.
pub struct Console {
    draw_target: fn() -> ProgressDrawTarget,
    bar: Option<ProgressBar>,
    last_percent: Option<u8>,
}

impl Console {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr)
    }

    fn with_draw_target(draw_target: fn() -> ProgressDrawTarget) -> Self {
        Self {
            draw_target,
            bar: None,
            last_percent: None,
        }
    }

    pub fn render(&mut self, event: Event) {
        match event {
            Event::Status(line) => match &self.bar {
                Some(bar) => bar.suspend(|| info!("{line}")),
                None => info!("{line}"),
            },
            Event::Progress(percent) => self.progress(percent),
            Event::State(state) => {
                debug!("Job is {state}");
                match state {
                    JobState::FetchingVideo => self.start_bar("video"),
                    JobState::FetchingAudio => self.start_bar("audio"),
                    _ => self.finish(),
                }
            }
        }
    }

    /// Leave the last bar drawn and stop updating it
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }

    fn start_bar(&mut self, name: &'static str) {
        self.finish();
        self.last_percent = None;

        let bar = ProgressBar::with_draw_target(Some(100), (self.draw_target)());
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(name);
        self.bar = Some(bar);
    }

    fn progress(&mut self, percent: u8) {
        let previous = self.last_percent.replace(percent);
        if previous == Some(percent) {
            return;
        }

        let Some(bar) = &self.bar else {
            return;
        };
        bar.set_position(u64::from(percent));

        if bar.is_hidden() && crosses_step(previous, percent) {
            info!("Download progress: {percent}%");
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }
}

/// Whether `percent` reached another multiple of 10 since `previous`
fn crosses_step(previous: Option<u8>, percent: u8) -> bool {
    previous.map_or(true, |previous| previous / 10 != percent / 10)
}
