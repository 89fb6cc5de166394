//! DCAC ACL 记录的 xattr 存储
//!
//! 每个文件的 ACL 记录以二进制形式保存在扩展属性中：
//! - **security.dcac.pm** - 普通文件记录（Read、Write、Execute、Modify）
//! - **security.dcac.at** - gateway 文件记录（目标属性名 + Read、Modify）
//!
//! # 功能特性
//!
//! - ✅ 存储键与记录形态映射（key.rs）
//! - ✅ 无损编解码，所有长度都做边界检查（codec.rs）
//! - ✅ 记录读写 API（api.rs）
//! - ✅ Linux xattr 系统调用实现（os.rs，`std` feature）
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use dcac_core::xattr::{self, OsXattr};
//!
//! let storage = OsXattr::new();
//! let record = xattr::read_record(&storage, "doc.txt", 1000)?;
//! println!("{:?}", record.acls());
//! ```

mod key;
mod record;
mod storage;
mod api;
pub mod codec;

#[cfg(all(feature = "std", target_os = "linux"))]
mod os;

pub use api::{read_record, write_record};
pub use key::RecordKind;
pub use record::{AclSlot, FileAcls, FileRecord};
pub use storage::XattrStorage;

#[cfg(all(feature = "std", target_os = "linux"))]
pub use os::OsXattr;
