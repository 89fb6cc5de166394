//! DCAC 公共数据类型
//!
//! 这个模块定义了跨模块共享的小型值类型：权限类别、属性 ID、注册标志和配置。

use crate::consts::*;
use bitflags::bitflags;
use core::fmt;

/// 四种受 ACL 保护的权限
///
/// 对应 libdcac 的 rdacl / wracl / exacl / mdacl
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Right {
    /// 读
    Read = 0,
    /// 写
    Write = 1,
    /// 执行
    Execute = 2,
    /// 修改 ACL
    Modify = 3,
}

impl Right {
    /// 普通文件的槽位顺序
    pub const ALL: [Right; 4] = [Right::Read, Right::Write, Right::Execute, Right::Modify];

    /// gateway 文件的槽位顺序
    pub const GATEWAY: [Right; 2] = [Right::Read, Right::Modify];

    /// 简短名称（日志使用）
    pub const fn as_str(self) -> &'static str {
        match self {
            Right::Read => "rd",
            Right::Write => "wr",
            Right::Execute => "ex",
            Right::Modify => "md",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 内核扩展分配的属性资源标识
///
/// 对应 libdcac 中属性的 fd。只有 [`AttrHandle`](crate::AttrHandle) 才能拥有它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrId(i32);

impl AttrId {
    /// 从原始 fd 创建
    pub const fn from_raw(fd: i32) -> Self {
        Self(fd)
    }

    /// 原始 fd
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd{}", self.0)
    }
}

bitflags! {
    /// 属性注册标志
    ///
    /// 对应 libdcac 的 `DCAC_ADDONLY` / `DCAC_ADDMOD`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttrFlags: u32 {
        /// 只能把属性加入 ACL
        const ADDONLY = DCAC_ADDONLY;
        /// 可以加入并修改 ACL
        const ADDMOD  = DCAC_ADDMOD;
    }
}

/// DCAC 配置
///
/// 所有字段都是容量上限，不是协议限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcacConfig {
    /// 读取 ACL 记录时使用的缓冲区大小（字节）
    pub xattr_buf_size: usize,
    /// 查询属性表时的句柄列表容量
    pub attr_list_capacity: usize,
    /// 解析属性名时的名称缓冲区大小（字节）
    pub attr_name_max: usize,
}

impl Default for DcacConfig {
    fn default() -> Self {
        Self {
            xattr_buf_size: DCAC_DEFAULT_XATTR_BUF_SIZE,
            attr_list_capacity: DCAC_DEFAULT_ATTR_LIST_CAPACITY,
            attr_name_max: DCAC_DEFAULT_ATTR_NAME_MAX,
        }
    }
}
