//! 文件 ACL 记录
//!
//! 对应内核扩展存放在 `security.dcac.pm` / `security.dcac.at` 中的结构

use super::key::RecordKind;
use crate::attr::{Acl, AttrName};
use crate::types::Right;
use alloc::vec::Vec;

/// 一个文件的四个 ACL
///
/// 既用作 [`Dcac::get_file_acls`](crate::Dcac::get_file_acls) 的结果，
/// 也用作 [`Dcac::modify_file_acls`](crate::Dcac::modify_file_acls) 的增删请求：
/// 请求中为空的槽位表示不修改该槽位。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAcls {
    /// 读
    pub read: Acl,
    /// 写
    pub write: Acl,
    /// 执行
    pub execute: Acl,
    /// 修改
    pub modify: Acl,
}

impl FileAcls {
    /// 按权限取 ACL
    pub fn get(&self, right: Right) -> &Acl {
        match right {
            Right::Read => &self.read,
            Right::Write => &self.write,
            Right::Execute => &self.execute,
            Right::Modify => &self.modify,
        }
    }

    /// 按权限取可变 ACL
    pub fn get_mut(&mut self, right: Right) -> &mut Acl {
        match right {
            Right::Read => &mut self.read,
            Right::Write => &mut self.write,
            Right::Execute => &mut self.execute,
            Right::Modify => &mut self.modify,
        }
    }

    /// 设置一个槽位并返回自身
    ///
    /// ```
    /// use dcac_core::{Acl, FileAcls, Right};
    ///
    /// let add = FileAcls::default().with(Right::Read, Acl::from_strs(["uname.fm.users.admin"]));
    /// assert!(add.write.is_empty());
    /// ```
    pub fn with(mut self, right: Right, acl: Acl) -> Self {
        *self.get_mut(right) = acl;
        self
    }

    /// 所有槽位都为空
    pub fn is_empty(&self) -> bool {
        Right::ALL.iter().all(|&r| self.get(r).is_empty())
    }
}

/// 一个 ACL 槽位
///
/// 除属性名列表外还保留操作字节和元数据，保证记录可以无损重编码。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclSlot {
    /// 操作字节
    pub op: u8,
    /// 元数据
    pub metadata: Vec<u8>,
    /// 属性名列表
    pub acl: Acl,
}

impl AclSlot {
    /// 只有属性名的槽位
    pub fn from_acl(acl: Acl) -> Self {
        Self {
            acl,
            ..Self::default()
        }
    }

    /// 是否为默认槽位（编码为单个零字节）
    pub fn is_default(&self) -> bool {
        self.op == 0 && self.metadata.is_empty() && self.acl.is_empty()
    }
}

/// 文件的 ACL 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRecord {
    /// 普通文件记录，槽位顺序为 Read、Write、Execute、Modify
    Normal {
        /// 四个槽位
        slots: [AclSlot; 4],
    },
    /// gateway 文件记录
    Gateway {
        /// 委托目标属性
        target: AttrName,
        /// 读槽位
        read: AclSlot,
        /// 修改槽位
        modify: AclSlot,
    },
}

impl FileRecord {
    /// 用四个 ACL 构造普通记录
    pub fn normal(acls: FileAcls) -> Self {
        let FileAcls {
            read,
            write,
            execute,
            modify,
        } = acls;
        FileRecord::Normal {
            slots: [
                AclSlot::from_acl(read),
                AclSlot::from_acl(write),
                AclSlot::from_acl(execute),
                AclSlot::from_acl(modify),
            ],
        }
    }

    /// 构造 gateway 记录
    pub fn gateway(target: AttrName, read: Acl, modify: Acl) -> Self {
        FileRecord::Gateway {
            target,
            read: AclSlot::from_acl(read),
            modify: AclSlot::from_acl(modify),
        }
    }

    /// 记录形态
    pub fn kind(&self) -> RecordKind {
        match self {
            FileRecord::Normal { .. } => RecordKind::Normal,
            FileRecord::Gateway { .. } => RecordKind::Gateway,
        }
    }

    /// gateway 的委托目标
    pub fn target(&self) -> Option<&AttrName> {
        match self {
            FileRecord::Normal { .. } => None,
            FileRecord::Gateway { target, .. } => Some(target),
        }
    }

    /// 按权限取槽位；gateway 记录没有 Write、Execute
    pub fn slot(&self, right: Right) -> Option<&AclSlot> {
        match (self, right) {
            (FileRecord::Normal { slots }, r) => Some(&slots[r as usize]),
            (FileRecord::Gateway { read, .. }, Right::Read) => Some(read),
            (FileRecord::Gateway { modify, .. }, Right::Modify) => Some(modify),
            (FileRecord::Gateway { .. }, _) => None,
        }
    }

    /// 按权限取可变槽位
    pub fn slot_mut(&mut self, right: Right) -> Option<&mut AclSlot> {
        match (self, right) {
            (FileRecord::Normal { slots }, r) => Some(&mut slots[r as usize]),
            (FileRecord::Gateway { read, .. }, Right::Read) => Some(read),
            (FileRecord::Gateway { modify, .. }, Right::Modify) => Some(modify),
            (FileRecord::Gateway { .. }, _) => None,
        }
    }

    /// 按权限取 ACL
    pub fn acl(&self, right: Right) -> Option<&Acl> {
        self.slot(right).map(|slot| &slot.acl)
    }

    /// 转换为四个 ACL；gateway 记录的 Write、Execute 为空
    pub fn acls(&self) -> FileAcls {
        let mut acls = FileAcls::default();
        for &right in self.kind().rights() {
            if let Some(acl) = self.acl(right) {
                *acls.get_mut(right) = acl.clone();
            }
        }
        acls
    }
}
