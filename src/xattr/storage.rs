//! xattr 存储接口

use crate::error::Result;

/// 扩展属性存储
///
/// 实现此 trait 以提供对文件扩展属性的访问。
///
/// # 示例
///
/// ```rust,ignore
/// use dcac_core::{XattrStorage, Result};
///
/// struct MyStorage {
///     // ...
/// }
///
/// impl XattrStorage for MyStorage {
///     fn get(&self, path: &str, key: &str, buf: &mut [u8]) -> Result<Option<usize>> {
///         // 读取 xattr 值到 buf，键不存在时返回 Ok(None)
///         Ok(None)
///     }
///
///     fn set(&mut self, path: &str, key: &str, value: &[u8]) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait XattrStorage {
    /// 读取扩展属性
    ///
    /// # 返回
    ///
    /// - `Ok(Some(len))` - 值已写入 `buf[..len]`
    /// - `Ok(None)` - 文件没有此键
    /// - `Err(_)` - 其他失败（[`ErrorKind::Storage`](crate::ErrorKind::Storage)），
    ///   包括 `buf` 放不下整个值
    fn get(&self, path: &str, key: &str, buf: &mut [u8]) -> Result<Option<usize>>;

    /// 写入扩展属性
    fn set(&mut self, path: &str, key: &str, value: &[u8]) -> Result<()>;
}
