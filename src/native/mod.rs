//! DCAC 内核扩展接口
//!
//! 内核扩展被视为一个不透明的能力提供者。本模块只定义它暴露的原语，
//! 不重新实现任何内核侧的强制逻辑。
//!
//! # 实现
//!
//! - [`ffi::NativeDcac`] - 通过 libdcac 调用真实内核扩展（`ffi` feature）
//! - 测试中使用内存模拟实现
//!
//! # 错误约定
//!
//! | 原语                               | 失败时的 [`ErrorKind`]            |
//! |------------------------------------|-----------------------------------|
//! | `add_*_attr` / `open_gateway`      | [`ErrorKind::Registration`]       |
//! | `release_attr`                     | [`ErrorKind::Release`]            |
//! | `attr_list` 超出容量               | [`ErrorKind::Exhausted`]          |
//! | 其他                               | [`ErrorKind::Native`]             |
//!
//! ACL 以文本形式（`a|b`）跨越此接口。
//!
//! [`ErrorKind`]: crate::ErrorKind
//! [`ErrorKind::Registration`]: crate::ErrorKind::Registration
//! [`ErrorKind::Release`]: crate::ErrorKind::Release
//! [`ErrorKind::Exhausted`]: crate::ErrorKind::Exhausted
//! [`ErrorKind::Native`]: crate::ErrorKind::Native

#[cfg(feature = "ffi")]
pub mod ffi;

use crate::error::Result;
use crate::types::{AttrFlags, AttrId, Right};
use alloc::string::String;

/// DCAC 内核扩展原语
///
/// 所有调用都是同步阻塞的，没有超时或取消语义。
/// 扩展的状态是进程级的；会修改进程级状态的原语取 `&mut self`。
pub trait DcacExtension {
    /// 注册任意属性
    ///
    /// 对应 libdcac 的 `dcac_add_any_attr()`
    fn add_any_attr(&mut self, name: &str, flags: AttrFlags) -> Result<AttrId>;

    /// 注册由进程用户名派生的属性
    ///
    /// 对应 libdcac 的 `dcac_add_uname_attr()`。返回值不包含属性名。
    fn add_uname_attr(&mut self, flags: AttrFlags) -> Result<AttrId>;

    /// 注册由进程组名派生的属性
    ///
    /// 对应 libdcac 的 `dcac_add_gname_attr()`
    fn add_gname_attr(&mut self, flags: AttrFlags) -> Result<AttrId>;

    /// 在已持有的属性下注册子属性
    ///
    /// 对应 `openat(parent_fd, segment, flags)`
    fn add_sub_attr(&mut self, parent: AttrId, segment: &str, flags: AttrFlags) -> Result<AttrId>;

    /// 释放属性
    ///
    /// 对应 `close(fd)`
    fn release_attr(&mut self, id: AttrId) -> Result<()>;

    /// 查询属性名
    ///
    /// 对应 libdcac 的 `dcac_get_attr_name()`，`max_len` 为名称缓冲区大小
    fn attr_name(&self, id: AttrId, max_len: usize) -> Result<String>;

    /// 列出活跃属性
    ///
    /// 对应 libdcac 的 `dcac_get_attr_fd_list()`。
    /// 填充 `out` 并返回活跃属性的真实数量；数量可能大于 `out.len()`，
    /// 此时调用方必须视为资源耗尽。
    fn attr_list(&self, out: &mut [AttrId]) -> Result<usize>;

    /// 设置进程的默认 ACL
    ///
    /// 对应 libdcac 的 `dcac_set_def_{rd,wr,ex,md}acl()`
    fn set_default_acl(&mut self, right: Right, acl: &str) -> Result<()>;

    /// 设置文件 ACL 的一个槽位
    ///
    /// 对应 libdcac 的 `dcac_set_file_{rd,wr,ex,md}acl()`
    fn set_file_acl(&mut self, right: Right, path: &str, acl: &str) -> Result<()>;

    /// 创建 gateway 文件并把属性绑定到它
    ///
    /// 对应 `open(path, O_CREAT)` + `dcac_set_attr_acl()`
    fn create_gateway(&mut self, attr: AttrId, path: &str, add: &str, modify: &str) -> Result<()>;

    /// 打开 gateway 文件，获得它委托的属性
    ///
    /// 对应 `open(path, flags)`
    fn open_gateway(&mut self, path: &str, flags: i32) -> Result<AttrId>;

    /// 设置进程掩码
    fn set_mask(&mut self, mask: u16) -> Result<()>;

    /// 读取进程掩码
    fn get_mask(&self) -> Result<u16>;

    /// 进入 lockdown
    fn lockdown(&mut self) -> Result<()>;

    /// 解除 lockdown
    fn unlock(&mut self) -> Result<()>;
}
