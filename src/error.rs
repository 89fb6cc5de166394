//! 错误类型定义
//!
//! 提供 DCAC 属性、ACL 记录和内核扩展调用的错误类型。

use core::fmt;

/// DCAC 操作错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
    errno: Option<i32>,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 内核扩展拒绝创建属性（重名、格式错误等）
    Registration,
    /// 内核扩展拒绝释放属性
    Release,
    /// 新注册的属性在属性表中找不到（内部不一致，不可恢复）
    AttributeNotFound,
    /// 进程处于 lockdown 状态
    Locked,
    /// 文件在两个 xattr 键下都没有 ACL 记录
    NoSuchRecord,
    /// xattr 字节不符合记录格式（长度越界、缺少终止符）
    Malformed,
    /// 底层 xattr 读写失败（权限、路径不存在等）
    Storage,
    /// 无效参数
    InvalidInput,
    /// 活跃属性数量超过属性表容量（资源耗尽，不可恢复）
    Exhausted,
    /// 其他内核扩展调用失败
    Native,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            errno: None,
        }
    }

    /// 创建带 errno 的错误
    ///
    /// 负数 errno（内核风格的返回值）会被取绝对值
    pub const fn with_errno(kind: ErrorKind, message: &'static str, errno: i32) -> Self {
        Self {
            kind,
            message,
            errno: Some(if errno < 0 { -errno } else { errno }),
        }
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// 获取底层 errno（如果有）
    pub const fn errno(&self) -> Option<i32> {
        self.errno
    }

    /// 是否属于不可恢复的内部一致性错误
    ///
    /// 调用方不应重试这类错误；继续运行意味着属性表不可信。
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::AttributeNotFound | ErrorKind::Exhausted)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errno {
            Some(errno) => write!(f, "{:?}: {} (errno {})", self.kind, self.message, errno),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
