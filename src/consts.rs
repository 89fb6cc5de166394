//! DCAC 常量定义
//!
//! 这个模块包含了：
//! - xattr 存储键
//! - 属性注册标志的原始值
//! - 缓冲区容量上限（可通过 [`DcacConfig`](crate::DcacConfig) 覆盖）
//! - 记录格式的分隔符

//=============================================================================
// xattr 存储键
//=============================================================================

/// 普通文件的 ACL 记录键
pub const DCAC_XATTR_PERMISSION: &str = "security.dcac.pm";

/// gateway 文件的 ACL 记录键
pub const DCAC_XATTR_GATEWAY: &str = "security.dcac.at";

//=============================================================================
// 属性注册标志
//=============================================================================

/// 只允许向 ACL 中添加该属性
pub const DCAC_ADDONLY: u32 = 0x1;

/// 允许添加并修改该属性
pub const DCAC_ADDMOD: u32 = 0x2;

//=============================================================================
// 容量上限
//=============================================================================

/// 默认 xattr 读缓冲区大小（字节）
pub const DCAC_DEFAULT_XATTR_BUF_SIZE: usize = 1000;

/// 默认属性句柄列表容量
pub const DCAC_DEFAULT_ATTR_LIST_CAPACITY: usize = 256;

/// 默认属性名缓冲区大小（字节，含 NUL）
pub const DCAC_DEFAULT_ATTR_NAME_MAX: usize = 256;

//=============================================================================
// 记录格式
//=============================================================================

/// 属性名的层级分隔符
pub const DCAC_NAME_SEPARATOR: char = '.';

/// 文本 ACL 的属性分隔符（传给内核扩展的形式）
pub const DCAC_ACL_SEPARATOR: char = '|';

/// 单个长度字节能表示的最大长度
pub const DCAC_MAX_LEN_BYTE: usize = u8::MAX as usize;

/// 名称列表 / gateway 名称的终止字节
pub const DCAC_NAME_TERMINATOR: u8 = 0x00;
