//! Resource limit lowering for toolchain children
//!
//! Limits are only ever lowered: a cap replaces a soft or hard value that is
//! infinite or larger, and a value already below the cap stays untouched.

use nix::sys::resource::{getrlimit, setrlimit, Resource};

const MIB: u64 = 1024 * 1024;

pub const DATA_LIMIT: u64 = 1024 * MIB;
pub const STACK_LIMIT: u64 = 1024 * MIB;
pub const FSIZE_LIMIT: u64 = 32 * MIB;

/// Compute the lowered `(soft, hard)` pair for one resource.
pub fn lowered(current: (u64, u64), cap: u64) -> (u64, u64) {
    let lower = |value: u64| {
        if value == libc::RLIM_INFINITY || value > cap {
            cap
        } else {
            value
        }
    };
    (lower(current.0), lower(current.1))
}

/// Lower a single resource of the calling process.
pub fn lower_rlimit(resource: Resource, cap: u64) -> nix::Result<()> {
    let current = getrlimit(resource)?;
    let (soft, hard) = lowered(current, cap);
    if (soft, hard) == current {
        return Ok(());
    }
    setrlimit(resource, soft, hard)
}

/// Apply the harness limit set to the calling process.
///
/// Runs between fork and exec, so it only issues syscalls: no logging, no
/// allocation.
pub fn apply_harness_limits(cpu_seconds: u64) -> nix::Result<()> {
    if cpu_seconds > 0 {
        lower_rlimit(Resource::RLIMIT_CPU, cpu_seconds)?;
    }
    lower_rlimit(Resource::RLIMIT_CORE, 0)?;
    lower_rlimit(Resource::RLIMIT_DATA, DATA_LIMIT)?;
    lower_rlimit(Resource::RLIMIT_STACK, STACK_LIMIT)?;
    lower_rlimit(Resource::RLIMIT_FSIZE, FSIZE_LIMIT)?;
    Ok(())
}
