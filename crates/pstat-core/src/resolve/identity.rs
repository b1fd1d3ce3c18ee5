/// User and group name lookup through the system identity database.
///
/// [`IdentityResolver`] is the seam between the cache and the OS: the cache
/// memoises whatever the resolver returns, and tests substitute a counting
/// resolver to prove each id is looked up only once.
use std::ffi::CStr;
use std::{mem, ptr};

/// Largest scratch buffer we are willing to grow to for a single lookup.
const MAX_LOOKUP_BUF: usize = 1 << 20;

/// Fallback when `sysconf` gives no hint for the lookup buffer size.
const DEFAULT_LOOKUP_BUF: usize = 1024;

/// Resolves numeric ids to names. `None` means "no such id" or a lookup error.
pub trait IdentityResolver: Send + Sync {
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Resolver backed by `getpwuid_r` / `getgrgid_r`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

impl IdentityResolver for SystemIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; initial_buf_len(libc::_SC_GETPW_R_SIZE_MAX)];
        let mut passwd = unsafe { mem::zeroed::<libc::passwd>() };
        let mut result = ptr::null_mut::<libc::passwd>();

        loop {
            let r = unsafe {
                libc::getpwuid_r(
                    uid as libc::uid_t,
                    &mut passwd,
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut result,
                )
            };
            if r != libc::ERANGE {
                break;
            }
            buf.resize(grow(buf.len())?, 0);
        }

        // Null result: no such user, or the lookup failed (errno set).
        if result.is_null() || passwd.pw_name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(passwd.pw_name) };
        Some(name.to_string_lossy().into_owned())
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; initial_buf_len(libc::_SC_GETGR_R_SIZE_MAX)];
        let mut group = unsafe { mem::zeroed::<libc::group>() };
        let mut result = ptr::null_mut::<libc::group>();

        loop {
            let r = unsafe {
                libc::getgrgid_r(
                    gid as libc::gid_t,
                    &mut group,
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut result,
                )
            };
            if r != libc::ERANGE {
                break;
            }
            buf.resize(grow(buf.len())?, 0);
        }

        if result.is_null() || group.gr_name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(group.gr_name) };
        Some(name.to_string_lossy().into_owned())
    }
}

fn initial_buf_len(name: libc::c_int) -> usize {
    let hint = unsafe { libc::sysconf(name) };
    if hint > 0 {
        hint as usize
    } else {
        DEFAULT_LOOKUP_BUF
    }
}

fn grow(len: usize) -> Option<usize> {
    len.checked_mul(2).filter(|&n| n <= MAX_LOOKUP_BUF)
}
