use crate::signals;
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, pipe, ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::{CString, NulError};
use std::os::unix::io::RawFd;
use std::process;
use thiserror::Error;

/// A dispatch-level failure. Anything that goes wrong inside a spawned child
/// (exec failure, disposition reset failure) is reported there and never
/// surfaces here; this covers only the dispatcher's own setup phase.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("argument contains an interior NUL byte")]
    BadArgument(#[from] NulError),
}

/// How one argument vector should be executed.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// `left | right`, split at the token index of the first `|`.
    Pipeline(usize),
    /// Trailing `&`: spawn and do not wait.
    Background,
    /// Spawn and wait synchronously.
    Foreground,
}

/// Classifies an argument vector. Total and mutually exclusive: a `|`
/// anywhere wins over a trailing `&`, the first `|` wins over any later one.
pub fn classify(args: &[String]) -> Invocation {
    if let Some(i) = args.iter().position(|t| t == "|") {
        Invocation::Pipeline(i)
    } else if args.last().map_or(false, |t| t == "&") {
        Invocation::Background
    } else {
        Invocation::Foreground
    }
}

/// One end of a pipe, closed when dropped. Each end is owned by exactly one
/// party at a time: the dispatcher between `open_pipe` and the forks, then
/// each child's copy by that child alone.
struct PipeEnd(RawFd);

impl PipeEnd {
    /// Duplicates this end onto `target` (stdin or stdout).
    fn redirect(&self, target: RawFd) -> nix::Result<()> {
        dup2(self.0, target).map(|_| ())
    }

    /// Closes without waiting for drop. Used on child exit paths, which
    /// never unwind back through the owning scope.
    fn release(&self) {
        let _ = close(self.0);
    }
}

impl Drop for PipeEnd {
    fn drop(&mut self) {
        let _ = close(self.0);
    }
}

fn open_pipe() -> nix::Result<(PipeEnd, PipeEnd)> {
    pipe().map(|(read, write)| (PipeEnd(read), PipeEnd(write)))
}

/// Executes one tokenized command line. Returns the loop continuation flag:
/// `Ok(false)` only when dispatch setup failed in a way that should stop the
/// read loop (pipe creation); `Ok(true)` on every other completion path,
/// including after a child-side exec failure, which is confined to the child.
///
/// The argument vector is consumed logically: the pipeline branch splits it
/// at the `|`, the background branch strips the trailing `&`.
pub fn dispatch(args: &mut Vec<String>) -> Result<bool, DispatchError> {
    if args.is_empty() {
        return Ok(true);
    }

    match classify(args) {
        Invocation::Pipeline(i) => run_pipeline(args, i),
        Invocation::Background => {
            args.pop();
            run_background(args)
        }
        Invocation::Foreground => run_foreground(args),
    }
}

/// `left | right`: two children joined by a pipe. The parent holds both pipe
/// ends only until both children exist, then closes them and waits for both,
/// discarding their exit statuses.
fn run_pipeline(args: &[String], split: usize) -> Result<bool, DispatchError> {
    let (left, right) = (&args[..split], &args[split + 1..]);
    if left.is_empty() || right.is_empty() {
        eprintln!("dsh: syntax error near `|`");
        return Ok(true);
    }
    let left = to_exec_args(left)?;
    let right = to_exec_args(right)?;

    let (read_end, write_end) = match open_pipe() {
        Ok(ends) => ends,
        Err(err) => {
            eprintln!("dsh: pipe: {}", err);
            return Ok(false);
        }
    };

    // The reader (right side) first, then the writer, matching the wait
    // order below.
    let reader = spawn(|| exec_pipe_reader(&right, &read_end, &write_end));
    let writer = spawn(|| exec_pipe_writer(&left, &read_end, &write_end));

    // Both children now hold their own copies of the ends they need. If the
    // parent kept the write end open, the reader would never see EOF.
    drop(read_end);
    drop(write_end);

    reap(reader);
    reap(writer);
    Ok(true)
}

/// Trailing `&` already stripped: spawn and return without waiting. The child
/// keeps the inherited ignore disposition for SIGINT, and its eventual exit
/// is reclaimed by the SA_NOCLDWAIT policy, not by us.
fn run_background(args: &[String]) -> Result<bool, DispatchError> {
    if args.is_empty() {
        return Ok(true);
    }
    let argv = to_exec_args(args)?;
    spawn(|| exec_or_die(&argv));
    Ok(true)
}

/// Spawn one child and wait for it synchronously, discarding its status.
fn run_foreground(args: &[String]) -> Result<bool, DispatchError> {
    let argv = to_exec_args(args)?;
    let child = spawn(|| {
        interruptible_or_die();
        exec_or_die(&argv)
    });
    reap(child);
    Ok(true)
}

/// Forks, running `child` (which never returns) in the new process and
/// returning its pid in the parent. A fork failure has no well-defined
/// recovery here (a half-built pipeline cannot be unwound), so it terminates
/// the shell.
fn spawn(child: impl FnOnce() -> Infallible) -> Pid {
    match unsafe { fork() } {
        Ok(ForkResult::Child) => match child() {},
        Ok(ForkResult::Parent { child }) => child,
        Err(err) => {
            eprintln!("dsh: fork: {}", err);
            process::exit(1);
        }
    }
}

/// Right side of a pipeline: reads from the pipe on stdin.
fn exec_pipe_reader(argv: &[CString], read_end: &PipeEnd, write_end: &PipeEnd) -> ! {
    interruptible_or_die();
    write_end.release();
    if let Err(err) = read_end.redirect(STDIN_FILENO) {
        eprintln!("dsh: dup2: {}", err);
        process::exit(1);
    }
    read_end.release();
    exec_or_die(argv)
}

/// Left side of a pipeline: writes to the pipe on stdout.
fn exec_pipe_writer(argv: &[CString], read_end: &PipeEnd, write_end: &PipeEnd) -> ! {
    interruptible_or_die();
    read_end.release();
    if let Err(err) = write_end.redirect(STDOUT_FILENO) {
        eprintln!("dsh: dup2: {}", err);
        process::exit(1);
    }
    write_end.release();
    exec_or_die(argv)
}

/// Child-side SIGINT reset. The shell ignores SIGINT and children inherit
/// that, so a child meant to run interruptibly must undo it before exec.
fn interruptible_or_die() {
    if let Err(err) = signals::restore_default_sigint() {
        eprintln!("dsh: sigaction: {}", err);
        process::exit(1);
    }
}

/// Replaces the child's image. Only returns on failure, which is reported
/// here and ends the child; the parent never sees it as an error value.
fn exec_or_die(argv: &[CString]) -> ! {
    let err = match execvp(&argv[0], argv) {
        Err(err) => err,
        Ok(infallible) => match infallible {},
    };
    eprintln!("dsh: {}: {}", argv[0].to_string_lossy(), err);
    process::exit(1);
}

/// Waits for one child, discarding its status. Under SA_NOCLDWAIT the kernel
/// may reap the child before the wait completes, in which case waitpid ends
/// with ECHILD; either way the child is gone when this returns.
fn reap(child: Pid) {
    let _ = waitpid(child, None);
}

/// Converts tokens to the NUL-terminated form execvp needs, before any fork.
fn to_exec_args(args: &[String]) -> Result<Vec<CString>, DispatchError> {
    args.iter()
        .map(|arg| CString::new(arg.as_str()).map_err(DispatchError::from))
        .collect()
}
