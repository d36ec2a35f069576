//! File descriptor limit detection for capping concurrent checker processes (Unix).

/// Estimated descriptors held per in-flight checker (pipe ends, child handle, reader thread).
pub const FDS_PER_TASK: usize = 4;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Suggested max checker processes so we stay under ~80% of the FD limit.
/// Returns `None` if no limit is available (use caller's limit).
pub fn max_tasks_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_TASK {
        return Some(1);
    }
    Some(usable / FDS_PER_TASK)
}

/// Cap `requested` by the FD budget. Never returns 0.
pub fn effective_process_limit(requested: usize) -> usize {
    match max_tasks_by_fd_limit() {
        Some(cap) if cap < requested => {
            log::debug!("Capping processes {} -> {} (FD limit ~80%)", requested, cap);
            cap.max(1)
        }
        _ => requested.max(1),
    }
}
