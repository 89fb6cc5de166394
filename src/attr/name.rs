//! 层级属性名
//!
//! 属性名是由 `.` 连接的非空段序列，例如 `uname.fm.users.admin`。

use crate::consts::DCAC_NAME_SEPARATOR;
use crate::error::{Error, ErrorKind, Result};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// 层级属性名
///
/// 对应 libdcac 中的属性路径。所有变换返回新值，不修改调用者持有的名称。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrName {
    segments: Vec<String>,
}

impl AttrName {
    /// 解析属性名
    ///
    /// 按 `.` 切分；只有空字符串会失败。
    ///
    /// # 示例
    ///
    /// ```
    /// use dcac_core::AttrName;
    ///
    /// let name = AttrName::new("uname.fm.users").unwrap();
    /// assert_eq!(name.depth(), 3);
    /// assert_eq!(name.to_string(), "uname.fm.users");
    /// ```
    pub fn new(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "empty attribute name"));
        }
        Ok(Self {
            segments: s.split(DCAC_NAME_SEPARATOR).map(ToString::to_string).collect(),
        })
    }

    /// 段列表
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 段数
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// 最后一段
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// 追加一段，得到子属性名
    ///
    /// 段必须非空且不含 `.`，否则拼接后无法再解析回同一个名称。
    pub fn sub_attr(&self, segment: &str) -> Result<Self> {
        if segment.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "empty attribute segment"));
        }
        if segment.contains(DCAC_NAME_SEPARATOR) {
            return Err(Error::new(ErrorKind::InvalidInput, "attribute segment contains separator"));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// 父属性名
    ///
    /// 单段名称没有父名称，返回 InvalidInput。
    pub fn parent(&self) -> Result<Self> {
        if self.segments.len() <= 1 {
            return Err(Error::new(ErrorKind::InvalidInput, "root attribute has no parent"));
        }
        Ok(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// `self` 是否是 `other` 的祖先（或相同）
    pub fn is_prefix_of(&self, other: &AttrName) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DCAC_NAME_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for AttrName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
