//! ACL 记录读写 API
//!
//! 在 [`XattrStorage`] 之上按键选择记录形态并调用编解码器。

use super::codec;
use super::key::RecordKind;
use super::record::FileRecord;
use super::storage::XattrStorage;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec;

/// 读取文件的 ACL 记录
///
/// 先查找 `security.dcac.pm`，再查找 `security.dcac.at`；
/// 两个键都不存在时返回 [`ErrorKind::NoSuchRecord`]。
///
/// # 参数
///
/// * `storage` - xattr 存储
/// * `path` - 文件路径
/// * `buf_size` - 读缓冲区大小，必须能容纳最大的记录
pub fn read_record<S: XattrStorage>(storage: &S, path: &str, buf_size: usize) -> Result<FileRecord> {
    let mut buf = vec![0u8; buf_size];
    for kind in RecordKind::lookup_order() {
        if let Some(len) = storage.get(path, kind.xattr_key(), &mut buf)? {
            if len > buf.len() {
                return Err(Error::new(ErrorKind::Storage, "xattr length exceeds read buffer"));
            }
            log::trace!("[XATTR] {} has {:?} record ({} bytes)", path, kind, len);
            return codec::decode(kind, &buf[..len]);
        }
    }
    Err(Error::new(ErrorKind::NoSuchRecord, "no DCAC ACL found for file"))
}

/// 写入文件的 ACL 记录
///
/// 记录形态决定写入的键；编码失败时不写入任何内容
pub fn write_record<S: XattrStorage>(storage: &mut S, path: &str, record: &FileRecord) -> Result<()> {
    let bytes = codec::encode(record)?;
    storage.set(path, record.kind().xattr_key(), &bytes)
}
