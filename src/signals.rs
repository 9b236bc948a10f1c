use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use thiserror::Error;

/// Failure to install one of the process-wide signal dispositions.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("sigaction for SIGCHLD failed: {0}")]
    Sigchld(#[source] nix::Error),
    #[error("sigaction for SIGINT failed: {0}")]
    Sigint(#[source] nix::Error),
}

/// Installs the shell's signal dispositions. Called exactly once, before the
/// read loop starts; either failure is fatal to startup.
///
/// - SIGCHLD gets `SA_NOCLDWAIT`: terminated children are reclaimed by the
///   kernel with no explicit wait, so background children never linger as
///   zombies.
/// - SIGINT is ignored in the shell's own process so Ctrl-C does not kill the
///   shell. Children inherit the ignore disposition; foreground and pipeline
///   children reinstall the default right after they are created, so an
///   interrupt still terminates the running job. Background children keep the
///   inherited ignore on purpose.
pub fn install() -> Result<(), SignalError> {
    let reap_children =
        SigAction::new(SigHandler::SigDfl, SaFlags::SA_NOCLDWAIT, SigSet::empty());
    unsafe { sigaction(Signal::SIGCHLD, &reap_children) }.map_err(SignalError::Sigchld)?;

    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGINT, &ignore) }.map_err(SignalError::Sigint)?;

    Ok(())
}

/// Reinstalls the default SIGINT disposition. Foreground and pipeline
/// children call this immediately after creation, before exec, so they can be
/// interrupted even though the shell itself ignores SIGINT.
pub fn restore_default_sigint() -> nix::Result<()> {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGINT, &default) }.map(|_| ())
}
