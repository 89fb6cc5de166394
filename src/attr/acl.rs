//! 访问控制列表
//!
//! ACL 是属性名字符串的集合：内部保持插入顺序以便稳定序列化，
//! 但语义上是集合，永远不会存储重复元素。
//!
//! 所有运算都返回新的 ACL（写时复制），两个持有者不会观察到对方的修改。

use super::name::AttrName;
use crate::consts::{DCAC_ACL_SEPARATOR, DCAC_NAME_TERMINATOR};
use crate::error::{Error, ErrorKind, Result};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// 访问控制列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Acl {
    names: Vec<String>,
}

impl Acl {
    /// 空 ACL
    pub const fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// 只包含一个属性的 ACL
    pub fn from_name(name: &AttrName) -> Self {
        Self {
            names: alloc::vec![name.to_string()],
        }
    }

    /// 从字符串序列构造，重复项只保留第一次出现
    pub fn from_strs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut acl = Self::new();
        for name in names {
            acl.push_unique(name.into());
        }
        acl
    }

    /// 解析文本形式（`a|b|c`）
    pub fn parse(s: &str) -> Self {
        Self::from_strs(s.split(DCAC_ACL_SEPARATOR).filter(|name| !name.is_empty()))
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 按插入顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// 是否包含指定属性
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 加入属性（已存在时原样返回）
    pub fn add(&self, name: &AttrName) -> Self {
        let mut acl = self.clone();
        acl.push_unique(name.to_string());
        acl
    }

    /// 移除属性（不存在时原样返回）
    pub fn remove(&self, name: &AttrName) -> Self {
        let target = name.to_string();
        Self {
            names: self.names.iter().filter(|n| **n != target).cloned().collect(),
        }
    }

    /// 并集，左操作数的顺序在前
    pub fn or_with(&self, other: &Acl) -> Self {
        let mut acl = self.clone();
        for name in &other.names {
            acl.push_unique(name.clone());
        }
        acl
    }

    /// `self` 中不属于 `other` 的元素
    pub fn remove_all(&self, other: &Acl) -> Self {
        let drop: BTreeSet<&str> = other.iter().collect();
        Self {
            names: self
                .names
                .iter()
                .filter(|n| !drop.contains(n.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// 先移除 `remove` 再并入 `add`
    ///
    /// 同时出现在两个列表中的属性最终保留。
    pub fn add_and_remove_all(&self, add: &Acl, remove: &Acl) -> Self {
        self.remove_all(remove).or_with(add)
    }

    /// 忽略顺序比较
    pub fn set_eq(&self, other: &Acl) -> bool {
        self.len() == other.len() && self.iter().all(|n| other.contains(n))
    }

    /// 转换为传给内核扩展的文本形式
    ///
    /// 属性名不能包含 `|` 或 NUL，否则内核会把它拆成其他属性。
    pub fn to_native(&self) -> Result<String> {
        for name in &self.names {
            if name.contains(DCAC_ACL_SEPARATOR) || name.bytes().any(|b| b == DCAC_NAME_TERMINATOR) {
                return Err(Error::new(ErrorKind::InvalidInput, "attribute name not representable in native ACL"));
            }
        }
        Ok(self.to_string())
    }

    fn push_unique(&mut self, name: String) {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DCAC_ACL_SEPARATOR)?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromIterator<AttrName> for Acl {
    fn from_iter<I: IntoIterator<Item = AttrName>>(iter: I) -> Self {
        Self::from_strs(iter.into_iter().map(|name| name.to_string()))
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a str;
    type IntoIter = core::iter::Map<core::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}
