//! 属性表
//!
//! 属性表是内核扩展当前活跃属性的快照（id → 名称）。
//! 它不持有独立状态，每次查询都重新向内核扩展获取，不做缓存。

use super::name::AttrName;
use crate::error::{Error, ErrorKind, Result};
use crate::native::DcacExtension;
use crate::types::{AttrId, DcacConfig};
use alloc::vec;
use alloc::vec::Vec;

/// 属性表中的一项
///
/// 只是视图，不拥有属性；持有者仍是对应的 [`AttrHandle`](crate::AttrHandle)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrEntry {
    /// 属性 id
    pub id: AttrId,
    /// 属性名
    pub name: AttrName,
}

/// 活跃属性快照
#[derive(Debug, Clone, Default)]
pub struct AttrTable {
    entries: Vec<AttrEntry>,
}

impl AttrTable {
    /// 查询内核扩展，生成快照
    ///
    /// 对应 libdcac 的 `dcac_get_attr_fd_list()` + `dcac_get_attr_name()`
    ///
    /// 内核报告的活跃属性多于 `attr_list_capacity` 时返回
    /// [`ErrorKind::Exhausted`]，绝不返回截断的结果。
    pub fn query<E: DcacExtension>(ext: &E, config: &DcacConfig) -> Result<Self> {
        let capacity = config.attr_list_capacity;
        let mut ids = vec![AttrId::from_raw(-1); capacity];
        let count = ext.attr_list(&mut ids)?;
        if count > capacity {
            log::error!("[TABLE] {} live attributes exceed table capacity {}", count, capacity);
            return Err(Error::new(ErrorKind::Exhausted, "too many attributes added"));
        }

        let mut entries = Vec::with_capacity(count);
        for &id in &ids[..count] {
            let raw = ext.attr_name(id, config.attr_name_max)?;
            let name = AttrName::new(&raw)
                .map_err(|_| Error::new(ErrorKind::Native, "extension reported an empty attribute name"))?;
            entries.push(AttrEntry { id, name });
        }
        log::trace!("[TABLE] snapshot of {} attributes", entries.len());
        Ok(Self { entries })
    }

    /// 在新快照中解析刚注册的属性名
    ///
    /// 用于 `add_uname_attr` / `add_gname_attr` 这类不返回名称的原语。
    /// 找不到 id 说明属性表已不可信，返回 [`ErrorKind::AttributeNotFound`]，
    /// 调用方不得重试。
    pub fn resolve_added<E: DcacExtension>(ext: &E, config: &DcacConfig, id: AttrId) -> Result<AttrName> {
        let table = Self::query(ext, config)?;
        match table.find(id) {
            Some(name) => Ok(name.clone()),
            None => {
                log::error!("[TABLE] could not find added attribute {}", id);
                Err(Error::new(ErrorKind::AttributeNotFound, "could not find added attribute"))
            }
        }
    }

    /// 按 id 查找名称
    pub fn find(&self, id: AttrId) -> Option<&AttrName> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.name)
    }

    /// 按名称查找 id
    pub fn find_by_name(&self, name: &AttrName) -> Option<AttrId> {
        self.entries.iter().find(|e| &e.name == name).map(|e| e.id)
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 迭代条目
    pub fn iter(&self) -> impl Iterator<Item = &AttrEntry> {
        self.entries.iter()
    }
}
