use crossbeam_channel::Sender;

use crate::job::JobState;

/// Where a running job reports what it is doing.
///
/// Implementations are called from the worker thread and must not block
/// for long.
pub trait ProgressSink: Send + Sync {
    /// One human-readable line for the status log
    fn status(&self, line: &str);

    /// Completion of the current transfer, 0 to 100
    fn progress(&self, percent: u8);

    /// The job moved to another state
    fn state(&self, _state: &JobState) {}
}

/// What a [`ChannelSink`] forwards to the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Status(String),
    Progress(u8),
    State(JobState),
}

/// Forward every callback as an [`Event`] to another thread.
///
/// Send errors are ignored: a front end that stopped listening does not
/// stop the job.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    send_channel: Sender<Event>,
}

impl ChannelSink {
    pub fn new(send_channel: Sender<Event>) -> Self {
        Self { send_channel }
    }
}

impl ProgressSink for ChannelSink {
    fn status(&self, line: &str) {
        let _ = self.send_channel.send(Event::Status(line.to_owned()));
    }

    fn progress(&self, percent: u8) {
        let _ = self.send_channel.send(Event::Progress(percent));
    }

    fn state(&self, state: &JobState) {
        let _ = self.send_channel.send(Event::State(state.clone()));
    }
}
