//! 基于 Linux xattr 系统调用的存储实现

use super::storage::XattrStorage;
use crate::error::{Error, ErrorKind, Result};
use std::ffi::CString;
use std::io;

/// 通过 `getxattr(2)` / `setxattr(2)` 访问真实文件系统
#[derive(Debug, Default, Clone, Copy)]
pub struct OsXattr;

impl OsXattr {
    /// 创建存储
    pub const fn new() -> Self {
        Self
    }
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::new(ErrorKind::InvalidInput, "path or key contains NUL"))
}

fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO)
}

impl XattrStorage for OsXattr {
    fn get(&self, path: &str, key: &str, buf: &mut [u8]) -> Result<Option<usize>> {
        let c_path = c_string(path)?;
        let c_key = c_string(key)?;
        // SAFETY: 指针在调用期间有效，buf 长度与传入的 size 一致
        let res = unsafe {
            libc::getxattr(
                c_path.as_ptr(),
                c_key.as_ptr(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if res >= 0 {
            return Ok(Some(res as usize));
        }
        match last_errno() {
            // 键不存在，或文件系统不支持 xattr：都视为没有记录
            libc::ENODATA | libc::ENOTSUP => Ok(None),
            errno => {
                log::debug!("[XATTR] getxattr({}, {}) failed: errno {}", path, key, errno);
                Err(Error::with_errno(ErrorKind::Storage, "getxattr failed", errno))
            }
        }
    }

    fn set(&mut self, path: &str, key: &str, value: &[u8]) -> Result<()> {
        let c_path = c_string(path)?;
        let c_key = c_string(key)?;
        // SAFETY: 指针在调用期间有效，value 长度与传入的 size 一致
        let res = unsafe {
            libc::setxattr(
                c_path.as_ptr(),
                c_key.as_ptr(),
                value.as_ptr() as *const libc::c_void,
                value.len(),
                0,
            )
        };
        if res < 0 {
            let errno = last_errno();
            log::debug!("[XATTR] setxattr({}, {}) failed: errno {}", path, key, errno);
            return Err(Error::with_errno(ErrorKind::Storage, "setxattr failed", errno));
        }
        Ok(())
    }
}
