//! xattr 存储键与记录形态
//!
//! ACL 记录保存在哪个 xattr 键下决定了记录的形态，而不是文件类型。

use crate::consts::*;
use crate::types::Right;

/// 记录形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// 普通文件：Read、Write、Execute、Modify 四个槽位
    Normal,
    /// gateway 文件：目标属性名 + Read、Modify 两个槽位
    Gateway,
}

/// 存储键表条目
struct RecordKey {
    key: &'static str,
    kind: RecordKind,
}

/// 存储键表
///
/// 顺序即读取时的查找顺序：先普通记录，再 gateway 记录
static KEY_TABLE: &[RecordKey] = &[
    RecordKey {
        key: DCAC_XATTR_PERMISSION,
        kind: RecordKind::Normal,
    },
    RecordKey {
        key: DCAC_XATTR_GATEWAY,
        kind: RecordKind::Gateway,
    },
];

impl RecordKind {
    /// 读取记录时的查找顺序
    pub fn lookup_order() -> impl Iterator<Item = RecordKind> {
        KEY_TABLE.iter().map(|entry| entry.kind)
    }

    /// 对应的 xattr 键
    pub fn xattr_key(self) -> &'static str {
        match self {
            RecordKind::Normal => DCAC_XATTR_PERMISSION,
            RecordKind::Gateway => DCAC_XATTR_GATEWAY,
        }
    }

    /// 根据 xattr 键确定记录形态
    ///
    /// 不是 DCAC 键时返回 None
    pub fn from_xattr_key(key: &str) -> Option<RecordKind> {
        KEY_TABLE.iter().find(|entry| entry.key == key).map(|entry| entry.kind)
    }

    /// 槽位顺序
    pub fn rights(self) -> &'static [Right] {
        match self {
            RecordKind::Normal => &Right::ALL,
            RecordKind::Gateway => &Right::GATEWAY,
        }
    }

    /// 是否携带指定权限的槽位
    pub fn has_slot(self, right: Right) -> bool {
        self.rights().contains(&right)
    }
}
