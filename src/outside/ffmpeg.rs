use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{Error, Result};

use super::command::{describe_failure, run_command, Capture, FFMPEG, FFXXX_DEFAULT_ARGS};

/// Combine elementary streams into a single container
#[cfg_attr(test, mockall::automock)]
pub trait Muxer: Send + Sync {
    /// Copy the video stream of `video` and the audio stream of `audio`
    /// into `output`, without re-encoding.
    ///
    /// The inputs are left untouched.
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    /// Use the given program, or find `ffmpeg`.
    ///
    /// A binary shipped next to the running executable wins over the one
    /// on the `PATH`.
    pub fn locate(program: Option<PathBuf>) -> Self {
        if let Some(program) = program {
            return Self { program };
        }

        let bundled = std::env::current_exe().ok().and_then(|exe| {
            let candidate = exe
                .parent()?
                .join(format!("{FFMPEG}{}", std::env::consts::EXE_SUFFIX));
            candidate.is_file().then_some(candidate)
        });

        match bundled {
            Some(program) => {
                debug!("Using bundled {}", program.display());
                Self { program }
            }
            None => Self {
                program: PathBuf::from(FFMPEG),
            },
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Verify that the program is reachable
    pub fn check(&self) -> Result<()> {
        let res = run_command(&self.program, |cmd| cmd.arg("-version"), Capture::empty())
            .map_err(|err| self.spawn_error(err))?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::Mux {
                reason: format!("{} -version {}", self.program.display(), describe_failure(&res)),
            })
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        Error::Mux {
            reason: format!("could not run {}: {err}", self.program.display()),
        }
    }
}

/// Arguments copying both streams into the output container.
///
/// `-n` makes ffmpeg refuse to overwrite an existing output.
fn mux_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = FFXXX_DEFAULT_ARGS.iter().map(OsString::from).collect();
    args.push("-n".into());
    args.extend([OsStr::new("-i").to_owned(), video.as_os_str().to_owned()]);
    args.extend([OsStr::new("-i").to_owned(), audio.as_os_str().to_owned()]);
    args.extend(["-c", "copy"].map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

impl Muxer for Ffmpeg {
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let res = run_command(
            &self.program,
            |cmd| cmd.args(mux_args(video, audio, output)),
            Capture::STDERR,
        )
        .map_err(|err| self.spawn_error(err))?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::Mux {
                reason: describe_failure(&res),
            })
        }
    }
}
