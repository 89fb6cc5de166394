//! dcac_core: DCAC 用户态库的 Rust 实现
//!
//! DCAC（分层属性访问控制）内核扩展之上的用户态库，提供：
//! - **属性生命周期**：注册、子属性派生、幂等释放
//! - **ACL 代数**：纯函数式的集合运算
//! - **ACL 记录编解码**：xattr 中二进制记录的无损、边界检查编解码
//! - **gateway 文件**：属性委托
//! - **进程级 lockdown 与掩码**
//!
//! 内核扩展和 xattr 存储都通过 trait 抽象，测试可以替换为内存实现。
//!
//! # 示例
//!
//! ```rust,ignore
//! use dcac_core::{Acl, AttrFlags, AttrName, Dcac, FileAcls, Right, Result};
//! use dcac_core::native::ffi::NativeDcac;
//! use dcac_core::xattr::OsXattr;
//!
//! fn main() -> Result<()> {
//!     let mut dcac = Dcac::new(NativeDcac::new(), OsXattr::new());
//!
//!     let admin = dcac.add(&AttrName::new("u.fm.users.admin")?, AttrFlags::ADDMOD)?;
//!     let add = FileAcls::default().with(Right::Read, admin.acl());
//!     dcac.modify_file_acls("doc.txt", Some(&add), None)?;
//!
//!     println!("{:?}", dcac.get_file_acls("doc.txt")?);
//!     dcac.drop_attr(admin)
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`consts`] - 常量定义
//! - [`types`] - 基础类型和配置
//! - [`attr`] - 属性名、ACL、属性句柄和属性表
//! - [`native`] - 内核扩展接口
//! - [`xattr`] - ACL 记录编解码与存储
//! - [`guard`] - lockdown 与掩码
//! - [`dcac`] - 服务对象
//!
//! # Features
//!
//! - `std`（默认）- Linux xattr 存储实现 [`xattr::OsXattr`]
//! - `ffi` - 链接 libdcac 的 [`native::ffi::NativeDcac`]

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 常量定义
pub mod consts;

/// 基础类型定义
pub mod types;

/// 属性与 ACL
pub mod attr;

/// 内核扩展接口
pub mod native;

/// ACL 记录存储
pub mod xattr;

/// 进程级 lockdown 与掩码
pub mod guard;

/// 服务对象
pub mod dcac;

#[cfg(test)]
mod testing;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 基础类型
pub use types::{AttrFlags, AttrId, DcacConfig, Right};

// 属性
pub use attr::{Acl, AttrEntry, AttrHandle, AttrName, AttrTable, ScopedAttr};

// 内核扩展
pub use native::DcacExtension;

// 记录
pub use xattr::{AclSlot, FileAcls, FileRecord, RecordKind, XattrStorage};

// 服务
pub use dcac::Dcac;
pub use guard::ProcessGuard;
