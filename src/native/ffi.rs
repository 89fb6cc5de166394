//! libdcac 绑定
//!
//! 通过 `extern "C"` 调用 libdcac。需要在链接时提供 `libdcac`。

use super::DcacExtension;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{AttrFlags, AttrId, Right};
use alloc::string::{String, ToString};
use alloc::vec;
use core::ffi::{c_char, c_int, c_ushort, CStr};
use std::ffi::CString;

#[link(name = "dcac")]
extern "C" {
    fn dcac_add_any_attr(attr: *const c_char, flags: c_int) -> c_int;
    fn dcac_add_uname_attr(flags: c_int) -> c_int;
    fn dcac_add_gname_attr(flags: c_int) -> c_int;
    fn dcac_get_attr_name(fd: c_int, buf: *mut c_char, len: c_int) -> c_int;
    fn dcac_get_attr_fd_list(buf: *mut c_int, len: c_int) -> c_int;

    fn dcac_set_def_rdacl(acl: *const c_char) -> c_int;
    fn dcac_set_def_wracl(acl: *const c_char) -> c_int;
    fn dcac_set_def_exacl(acl: *const c_char) -> c_int;
    fn dcac_set_def_mdacl(acl: *const c_char) -> c_int;

    fn dcac_set_file_rdacl(file: *const c_char, acl: *const c_char) -> c_int;
    fn dcac_set_file_wracl(file: *const c_char, acl: *const c_char) -> c_int;
    fn dcac_set_file_exacl(file: *const c_char, acl: *const c_char) -> c_int;
    fn dcac_set_file_mdacl(file: *const c_char, acl: *const c_char) -> c_int;

    fn dcac_set_attr_acl(attr_fd: c_int, gateway_fd: c_int, add_acl: *const c_char, mod_acl: *const c_char) -> c_int;

    fn dcac_set_mask(mask: c_ushort);
    fn dcac_get_mask() -> c_ushort;
    fn dcac_lockdown();
    fn dcac_unlock();
}

/// 真实内核扩展
///
/// 零大小类型；内核扩展的状态本身就是进程级的。
#[derive(Debug, Default)]
pub struct NativeDcac;

impl NativeDcac {
    /// 创建绑定
    pub const fn new() -> Self {
        Self
    }
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::new(ErrorKind::InvalidInput, "string contains NUL"))
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO)
}

/// 把 libdcac 的返回值（负数为错误）转换为 Result
fn check(ret: c_int, kind: ErrorKind, message: &'static str) -> Result<c_int> {
    if ret < 0 {
        Err(Error::with_errno(kind, message, ret))
    } else {
        Ok(ret)
    }
}

fn flags_to_c(flags: AttrFlags) -> c_int {
    flags.bits() as c_int
}

impl DcacExtension for NativeDcac {
    fn add_any_attr(&mut self, name: &str, flags: AttrFlags) -> Result<AttrId> {
        let name = c_string(name)?;
        // SAFETY: name 在调用期间有效且以 NUL 结尾
        let fd = unsafe { dcac_add_any_attr(name.as_ptr(), flags_to_c(flags)) };
        check(fd, ErrorKind::Registration, "dcac_add_any_attr failed").map(AttrId::from_raw)
    }

    fn add_uname_attr(&mut self, flags: AttrFlags) -> Result<AttrId> {
        // SAFETY: 无指针参数
        let fd = unsafe { dcac_add_uname_attr(flags_to_c(flags)) };
        check(fd, ErrorKind::Registration, "dcac_add_uname_attr failed").map(AttrId::from_raw)
    }

    fn add_gname_attr(&mut self, flags: AttrFlags) -> Result<AttrId> {
        // SAFETY: 无指针参数
        let fd = unsafe { dcac_add_gname_attr(flags_to_c(flags)) };
        check(fd, ErrorKind::Registration, "dcac_add_gname_attr failed").map(AttrId::from_raw)
    }

    fn add_sub_attr(&mut self, parent: AttrId, segment: &str, flags: AttrFlags) -> Result<AttrId> {
        let segment = c_string(segment)?;
        // SAFETY: segment 在调用期间有效且以 NUL 结尾
        let fd = unsafe { libc::openat(parent.raw(), segment.as_ptr(), flags_to_c(flags)) };
        if fd < 0 {
            return Err(Error::with_errno(ErrorKind::Registration, "openat on attribute failed", last_errno()));
        }
        Ok(AttrId::from_raw(fd))
    }

    fn release_attr(&mut self, id: AttrId) -> Result<()> {
        // SAFETY: fd 由本进程持有
        if unsafe { libc::close(id.raw()) } < 0 {
            return Err(Error::with_errno(ErrorKind::Release, "close on attribute failed", last_errno()));
        }
        Ok(())
    }

    fn attr_name(&self, id: AttrId, max_len: usize) -> Result<String> {
        let mut buf = vec![0u8; max_len.max(1)];
        let len = c_int::try_from(buf.len())
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "name buffer too large"))?;
        // SAFETY: buf 长度为 len
        let ret = unsafe { dcac_get_attr_name(id.raw(), buf.as_mut_ptr() as *mut c_char, len) };
        check(ret, ErrorKind::Native, "dcac_get_attr_name failed")?;
        let name = CStr::from_bytes_until_nul(&buf)
            .map_err(|_| Error::new(ErrorKind::Native, "attribute name not terminated"))?;
        name.to_str()
            .map(ToString::to_string)
            .map_err(|_| Error::new(ErrorKind::Native, "attribute name is not UTF-8"))
    }

    fn attr_list(&self, out: &mut [AttrId]) -> Result<usize> {
        let mut fds = vec![0 as c_int; out.len()];
        let len = c_int::try_from(fds.len())
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "attribute list too large"))?;
        // SAFETY: fds 长度为 len
        let size = unsafe { dcac_get_attr_fd_list(fds.as_mut_ptr(), len) };
        if size < 0 {
            return Err(Error::with_errno(ErrorKind::Exhausted, "too many attributes added", size));
        }
        let size = size as usize;
        for (slot, fd) in out.iter_mut().zip(fds.iter().take(size)) {
            *slot = AttrId::from_raw(*fd);
        }
        Ok(size)
    }

    fn set_default_acl(&mut self, right: Right, acl: &str) -> Result<()> {
        let acl = c_string(acl)?;
        // SAFETY: acl 在调用期间有效且以 NUL 结尾
        let ret = unsafe {
            match right {
                Right::Read => dcac_set_def_rdacl(acl.as_ptr()),
                Right::Write => dcac_set_def_wracl(acl.as_ptr()),
                Right::Execute => dcac_set_def_exacl(acl.as_ptr()),
                Right::Modify => dcac_set_def_mdacl(acl.as_ptr()),
            }
        };
        check(ret, ErrorKind::Native, "dcac_set_def_acl failed").map(|_| ())
    }

    fn set_file_acl(&mut self, right: Right, path: &str, acl: &str) -> Result<()> {
        let path = c_string(path)?;
        let acl = c_string(acl)?;
        // SAFETY: path / acl 在调用期间有效且以 NUL 结尾
        let ret = unsafe {
            match right {
                Right::Read => dcac_set_file_rdacl(path.as_ptr(), acl.as_ptr()),
                Right::Write => dcac_set_file_wracl(path.as_ptr(), acl.as_ptr()),
                Right::Execute => dcac_set_file_exacl(path.as_ptr(), acl.as_ptr()),
                Right::Modify => dcac_set_file_mdacl(path.as_ptr(), acl.as_ptr()),
            }
        };
        check(ret, ErrorKind::Native, "dcac_set_file_acl failed").map(|_| ())
    }

    fn create_gateway(&mut self, attr: AttrId, path: &str, add: &str, modify: &str) -> Result<()> {
        let path = c_string(path)?;
        let add = c_string(add)?;
        let modify = c_string(modify)?;
        // SAFETY: path 以 NUL 结尾
        let gateway_fd = unsafe {
            libc::open(path.as_ptr(), libc::O_CREAT, (libc::S_IRUSR | libc::S_IWUSR) as libc::c_uint)
        };
        if gateway_fd < 0 {
            return Err(Error::with_errno(ErrorKind::Native, "failed to create gateway file", last_errno()));
        }
        // SAFETY: add / modify 以 NUL 结尾，gateway_fd 刚刚打开
        let ret = unsafe { dcac_set_attr_acl(attr.raw(), gateway_fd, add.as_ptr(), modify.as_ptr()) };
        // SAFETY: gateway_fd 由本函数打开
        unsafe { libc::close(gateway_fd) };
        check(ret, ErrorKind::Native, "dcac_set_attr_acl failed").map(|_| ())
    }

    fn open_gateway(&mut self, path: &str, flags: i32) -> Result<AttrId> {
        let path = c_string(path)?;
        // SAFETY: path 以 NUL 结尾
        let fd = unsafe { libc::open(path.as_ptr(), flags) };
        if fd < 0 {
            return Err(Error::with_errno(ErrorKind::Registration, "failed to open gateway file", last_errno()));
        }
        Ok(AttrId::from_raw(fd))
    }

    fn set_mask(&mut self, mask: u16) -> Result<()> {
        // SAFETY: 无指针参数
        unsafe { dcac_set_mask(mask as c_ushort) };
        Ok(())
    }

    fn get_mask(&self) -> Result<u16> {
        // SAFETY: 无指针参数
        Ok(unsafe { dcac_get_mask() } as u16)
    }

    fn lockdown(&mut self) -> Result<()> {
        // SAFETY: 无参数
        unsafe { dcac_lockdown() };
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        // SAFETY: 无参数
        unsafe { dcac_unlock() };
        Ok(())
    }
}
