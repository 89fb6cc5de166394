//! DCAC 属性
//!
//! 属性是层级化、类似 capability 的命名标识，可以授予用户、组或文件。
//!
//! # 主要组件
//!
//! - [`AttrName`] - 层级属性名（纯值类型）
//! - [`Acl`] - 属性名集合及其集合运算
//! - [`AttrTable`] - 内核扩展活跃属性的快照
//! - [`AttrHandle`] - 进程独占持有的一个属性注册
//! - [`ScopedAttr`] - 作用域结束时自动释放的句柄

mod name;
mod acl;
mod handle;
mod table;

pub use acl::Acl;
pub use handle::{AttrHandle, ScopedAttr};
pub use name::AttrName;
pub use table::{AttrEntry, AttrTable};
