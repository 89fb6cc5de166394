//! 进程级 lockdown 与掩码
//!
//! 对应 libdcac 的 `dcac_lockdown/unlock` 和 `dcac_set_mask/get_mask` API
//!
//! lockdown 状态和掩码都是进程级的，与内核扩展自身的语义一致。
//! [`ProcessGuard`] 只在 [`Dcac`](crate::Dcac) 服务对象中存在一份，
//! 不为单个操作单独实例化。

use crate::error::{Error, ErrorKind, Result};
use crate::native::DcacExtension;

/// lockdown 标志的进程内镜像
///
/// 内核扩展本身也会强制 lockdown；这里的检查在发出调用之前进行，
/// 被拒绝的操作不会到达内核扩展。
#[derive(Debug, Default)]
pub struct ProcessGuard {
    locked: bool,
}

impl ProcessGuard {
    /// 创建未锁定的 guard
    pub const fn new() -> Self {
        Self { locked: false }
    }

    /// 是否处于 lockdown
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// 修改进程级状态之前调用
    ///
    /// 处于 lockdown 时返回 [`ErrorKind::Locked`]
    pub fn check_unlocked(&self, op: &'static str) -> Result<()> {
        if self.locked {
            log::debug!("[GUARD] {} rejected: process is locked down", op);
            return Err(Error::new(ErrorKind::Locked, "process is locked down"));
        }
        Ok(())
    }

    /// 进入 lockdown
    ///
    /// 对应 libdcac 的 `dcac_lockdown()`；已锁定时再次调用不报错
    pub fn lock<E: DcacExtension>(&mut self, ext: &mut E) -> Result<()> {
        ext.lockdown()?;
        self.locked = true;
        log::debug!("[GUARD] lockdown enabled");
        Ok(())
    }

    /// 解除 lockdown
    ///
    /// 对应 libdcac 的 `dcac_unlock()`
    pub fn unlock<E: DcacExtension>(&mut self, ext: &mut E) -> Result<()> {
        ext.unlock()?;
        self.locked = false;
        log::debug!("[GUARD] lockdown disabled");
        Ok(())
    }

    /// 设置进程掩码，lockdown 时失败
    pub fn set_mask<E: DcacExtension>(&self, ext: &mut E, mask: u16) -> Result<()> {
        self.check_unlocked("set_mask")?;
        ext.set_mask(mask)?;
        log::debug!("[GUARD] mask set to {:#06x}", mask);
        Ok(())
    }

    /// 读取进程掩码
    pub fn get_mask<E: DcacExtension>(&self, ext: &E) -> Result<u16> {
        ext.get_mask()
    }
}
