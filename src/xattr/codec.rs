//! ACL 记录编解码
//!
//! 在 [`FileRecord`] 和 xattr 原始字节之间做无损双向转换。
//!
//! # 格式
//!
//! ```text
//! slot        := len(total) ++ inner_block
//! inner_block := len(inner) ++ op ++ len(M) ++ metadata[M] ++ name_list
//! name_list   := (name ++ 0x00)* ++ 0x00
//!
//! normal      := slot(Read) ++ slot(Write) ++ slot(Execute) ++ slot(Modify)
//! gateway     := len(N) ++ target[N] ++ 0x00 ++ slot(Read) ++ slot(Modify)
//! ```
//!
//! - `total` 是槽位中长度字节之后的字节数，恒等于 `1 + inner`
//! - `inner` 是内层长度字节之后的字节数（op、元数据长度、元数据、名称列表）
//! - `total == 0` 是最小槽位：空 ACL，op 为 0，无元数据
//! - gateway 的 `N` 不含终止符，因此跳过的长度是 `N + 2`
//!
//! 解码时每个长度都先与剩余字节数比较，越界即返回
//! [`ErrorKind::Malformed`]；任何错误都会放弃整个记录，不返回部分结果。

use super::key::RecordKind;
use super::record::{AclSlot, FileRecord};
use crate::attr::{Acl, AttrName};
use crate::consts::{DCAC_MAX_LEN_BYTE, DCAC_NAME_TERMINATOR};
use crate::error::{Error, ErrorKind, Result};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// 内层块固定头：inner 长度、op、元数据长度
const INNER_HEADER_LEN: usize = 3;

/// 编码记录
///
/// 单个槽位超过长度字节的表示范围，或属性名为空 / 含 NUL 时返回 InvalidInput。
pub fn encode(record: &FileRecord) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if let Some(target) = record.target() {
        encode_target(target, &mut out)?;
    }
    for &right in record.kind().rights() {
        // kind().rights() 中的槽位一定存在
        if let Some(slot) = record.slot(right) {
            encode_slot(slot, &mut out)?;
        }
    }
    log::trace!("[CODEC] encoded {:?} record, {} bytes", record.kind(), out.len());
    Ok(out)
}

/// 解码记录
///
/// `kind` 由记录所在的 xattr 键决定
pub fn decode(kind: RecordKind, data: &[u8]) -> Result<FileRecord> {
    let mut reader = RecordReader::new(data);

    let record = match kind {
        RecordKind::Normal => {
            let read = reader.read_slot()?;
            let write = reader.read_slot()?;
            let execute = reader.read_slot()?;
            let modify = reader.read_slot()?;
            FileRecord::Normal {
                slots: [read, write, execute, modify],
            }
        }
        RecordKind::Gateway => {
            let target = reader.read_target()?;
            let read = reader.read_slot()?;
            let modify = reader.read_slot()?;
            FileRecord::Gateway { target, read, modify }
        }
    };

    if reader.remaining() != 0 {
        return Err(Error::new(ErrorKind::Malformed, "trailing bytes after record"));
    }
    log::trace!("[CODEC] decoded {:?} record, {} bytes", kind, data.len());
    Ok(record)
}

fn encode_target(target: &AttrName, out: &mut Vec<u8>) -> Result<()> {
    let name = target_string(target)?;
    if name.len() > DCAC_MAX_LEN_BYTE {
        return Err(Error::new(ErrorKind::InvalidInput, "gateway target name too long"));
    }
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    out.push(DCAC_NAME_TERMINATOR);
    Ok(())
}

fn encode_slot(slot: &AclSlot, out: &mut Vec<u8>) -> Result<()> {
    if slot.is_default() {
        out.push(0);
        return Ok(());
    }

    // op ++ len(M) ++ metadata ++ name_list
    let mut inner = Vec::with_capacity(INNER_HEADER_LEN + slot.metadata.len());
    inner.push(slot.op);
    if slot.metadata.len() > DCAC_MAX_LEN_BYTE {
        return Err(Error::new(ErrorKind::InvalidInput, "slot metadata too long"));
    }
    inner.push(slot.metadata.len() as u8);
    inner.extend_from_slice(&slot.metadata);
    for name in slot.acl.iter() {
        if name.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "empty attribute name in ACL"));
        }
        if name.bytes().any(|b| b == DCAC_NAME_TERMINATOR) {
            return Err(Error::new(ErrorKind::InvalidInput, "attribute name contains NUL"));
        }
        inner.extend_from_slice(name.as_bytes());
        inner.push(DCAC_NAME_TERMINATOR);
    }
    inner.push(DCAC_NAME_TERMINATOR);

    // total = 1 + inner 也必须放得进一个字节
    if inner.len() + 1 > DCAC_MAX_LEN_BYTE {
        return Err(Error::new(ErrorKind::InvalidInput, "ACL slot too large for record"));
    }
    out.push((inner.len() + 1) as u8);
    out.push(inner.len() as u8);
    out.extend_from_slice(&inner);
    Ok(())
}

/// 记录读取游标
///
/// 所有读取都先做边界检查
struct RecordReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> RecordReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        match self.data.get(self.offset) {
            Some(&b) => {
                self.offset += 1;
                Ok(b)
            }
            None => Err(Error::new(ErrorKind::Malformed, what)),
        }
    }

    fn read_bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::new(ErrorKind::Malformed, what));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_target(&mut self) -> Result<AttrName> {
        let len = self.read_u8("missing gateway target length")? as usize;
        let name = self.read_bytes(len, "gateway target length exceeds buffer")?;
        if self.read_u8("gateway target not terminated")? != DCAC_NAME_TERMINATOR {
            return Err(Error::new(ErrorKind::Malformed, "gateway target not terminated"));
        }
        let name = core::str::from_utf8(name)
            .map_err(|_| Error::new(ErrorKind::Malformed, "gateway target is not UTF-8"))?;
        AttrName::new(name).map_err(|_| Error::new(ErrorKind::Malformed, "empty gateway target"))
    }

    fn read_slot(&mut self) -> Result<AclSlot> {
        let total = self.read_u8("missing slot length")? as usize;
        let block = self.read_bytes(total, "slot length exceeds buffer")?;
        if total == 0 {
            return Ok(AclSlot::default());
        }

        let inner_len = block[0] as usize;
        if inner_len + 1 != total {
            return Err(Error::new(ErrorKind::Malformed, "inner length disagrees with slot length"));
        }
        let inner = &block[1..];
        if inner.len() < INNER_HEADER_LEN - 1 {
            return Err(Error::new(ErrorKind::Malformed, "slot header truncated"));
        }

        let op = inner[0];
        let metadata_len = inner[1] as usize;
        let body = &inner[2..];
        if metadata_len > body.len() {
            return Err(Error::new(ErrorKind::Malformed, "metadata length exceeds slot"));
        }
        let metadata = body[..metadata_len].to_vec();
        let acl = parse_name_list(&body[metadata_len..])?;

        Ok(AclSlot { op, metadata, acl })
    }
}

/// 解析名称列表，在第一个空名称处停止
///
/// 重复的名称返回 Malformed：编码器从不产生重复项，接受它们会让重编码改变字节
fn parse_name_list(mut list: &[u8]) -> Result<Acl> {
    let mut names: Vec<String> = Vec::new();
    loop {
        let end = list
            .iter()
            .position(|&b| b == DCAC_NAME_TERMINATOR)
            .ok_or(Error::new(ErrorKind::Malformed, "name list not terminated"))?;
        if end == 0 {
            if list.len() != 1 {
                return Err(Error::new(ErrorKind::Malformed, "trailing bytes after name list"));
            }
            return Ok(Acl::from_strs(names));
        }
        let name = core::str::from_utf8(&list[..end])
            .map_err(|_| Error::new(ErrorKind::Malformed, "attribute name is not UTF-8"))?;
        if names.iter().any(|n| n == name) {
            return Err(Error::new(ErrorKind::Malformed, "duplicate attribute name in list"));
        }
        names.push(String::from(name));
        list = &list[end + 1..];
    }
}

/// 编码用的字符串形式，拒绝含 NUL 的名称
fn target_string(target: &AttrName) -> Result<String> {
    let s = target.to_string();
    if s.bytes().any(|b| b == DCAC_NAME_TERMINATOR) {
        return Err(Error::new(ErrorKind::InvalidInput, "attribute name contains NUL"));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Right;
    use crate::xattr::FileAcls;
    use alloc::vec;
    use proptest::prelude::*;

    fn acl(names: &[&str]) -> Acl {
        Acl::from_strs(names.iter().copied())
    }

    #[test]
    fn test_encode_empty_normal_record() {
        let record = FileRecord::normal(FileAcls::default());
        assert_eq!(encode(&record).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_slot_layout() {
        let record = FileRecord::normal(FileAcls::default().with(Right::Read, acl(&["ab"])));
        let bytes = encode(&record).unwrap();
        // total=7, inner=6, op=0, M=0, "ab\0", "\0"
        assert_eq!(&bytes[..8], &[7, 6, 0, 0, b'a', b'b', 0, 0]);
        assert_eq!(&bytes[8..], &[0, 0, 0]);
    }

    #[test]
    fn test_decode_minimal_slot_is_empty_acl() {
        let record = decode(RecordKind::Normal, &[0, 0, 0, 0]).unwrap();
        for right in Right::ALL {
            assert!(record.acl(right).unwrap().is_empty());
        }
    }

    #[test]
    fn test_decode_full_form_empty_slot() {
        // 完整形式但名称列表为空：op=2 M=1 meta=0x9 终止符
        let data = [5, 4, 2, 1, 0x9, 0, 0, 0, 0];
        let record = decode(RecordKind::Normal, &data).unwrap();
        let read = record.slot(Right::Read).unwrap();
        assert_eq!(read.op, 2);
        assert_eq!(read.metadata, vec![0x9]);
        assert!(read.acl.is_empty());
        assert_eq!(encode(&record).unwrap(), data.to_vec());
    }

    #[test]
    fn test_decode_stops_at_first_empty_name() {
        let data = [8, 7, 0, 0, b'a', 0, b'b', 0, 0, 0, 0, 0];
        let record = decode(RecordKind::Normal, &data).unwrap();
        assert_eq!(record.acl(Right::Read).unwrap().to_string(), "a|b");
    }

    #[test]
    fn test_decode_rejects_duplicate_names() {
        let data = [8, 7, 0, 0, b'a', 0, b'a', 0, 0, 0, 0, 0];
        assert_eq!(decode(RecordKind::Normal, &data).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_decode_truncated_name_list() {
        let record = FileRecord::normal(FileAcls::default().with(Right::Read, acl(&["uname.fm", "other"])));
        let bytes = encode(&record).unwrap();
        // 在名称列表中间截断
        for cut in 1..12 {
            let err = decode(RecordKind::Normal, &bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed);
        }
    }

    #[test]
    fn test_decode_missing_terminator() {
        // 长度自洽但名称没有终止符
        let data = [5, 4, 0, 0, b'a', b'b', 0, 0, 0];
        assert_eq!(decode(RecordKind::Normal, &data).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_decode_length_mismatch() {
        let data = [4, 4, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode(RecordKind::Normal, &data).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_decode_metadata_overflow() {
        let data = [4, 3, 0, 9, 0, 0, 0, 0];
        assert_eq!(decode(RecordKind::Normal, &data).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_decode_trailing_bytes() {
        assert_eq!(decode(RecordKind::Normal, &[0, 0, 0, 0, 7]).unwrap_err().kind(), ErrorKind::Malformed);
        let data = [6, 5, 0, 0, b'a', 0, 0, 0, 0, 0];
        // 块内终止符后还有字节
        let mut bad = data.to_vec();
        bad[0] = 7;
        bad[1] = 6;
        bad.insert(7, 0x42);
        assert_eq!(decode(RecordKind::Normal, &bad).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert_eq!(decode(RecordKind::Normal, &[]).unwrap_err().kind(), ErrorKind::Malformed);
        assert_eq!(decode(RecordKind::Gateway, &[]).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_gateway_layout() {
        let target = AttrName::new("u.fm").unwrap();
        let record = FileRecord::gateway(target, acl(&["r"]), Acl::new());
        let bytes = encode(&record).unwrap();
        assert_eq!(&bytes[..6], &[4, b'u', b'.', b'f', b'm', 0]);
        assert_eq!(decode(RecordKind::Gateway, &bytes).unwrap(), record);
        // 同样的字节按普通记录解析必然失败
        assert!(decode(RecordKind::Normal, &bytes).is_err());
    }

    #[test]
    fn test_gateway_target_unterminated() {
        let data = [2, b'a', b'b', 1, 0, 0];
        assert_eq!(decode(RecordKind::Gateway, &data).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_encode_rejects_oversized_slot() {
        let names: Vec<String> = (0..40).map(|i| alloc::format!("attribute{:02}", i)).collect();
        let record = FileRecord::normal(FileAcls::default().with(Right::Read, Acl::from_strs(names)));
        assert_eq!(encode(&record).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    fn single_name_record(len: usize) -> FileRecord {
        let name: String = core::iter::repeat('a').take(len).collect();
        FileRecord::normal(FileAcls::default().with(Right::Read, Acl::from_strs([name])))
    }

    #[test]
    fn test_largest_slot_fits() {
        // inner = op + M + 250 + NUL + NUL = 254，total = 255
        let record = single_name_record(250);
        let bytes = encode(&record).unwrap();
        assert_eq!(bytes.len(), 256 + 3);
        assert_eq!(&bytes[..2], &[255, 254]);
        assert_eq!(decode(RecordKind::Normal, &bytes).unwrap(), record);
    }

    #[test]
    fn test_slot_one_byte_too_large() {
        let record = single_name_record(251);
        assert_eq!(encode(&record).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_encode_rejects_nul_name() {
        let record = FileRecord::normal(FileAcls::default().with(Right::Modify, acl(&["a\0b"])));
        assert_eq!(encode(&record).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    fn acl_strategy() -> impl Strategy<Value = Acl> {
        prop::collection::vec("[a-z]{1,6}(\\.[a-z]{1,6}){0,2}", 0..4).prop_map(Acl::from_strs)
    }

    fn slot_strategy() -> impl Strategy<Value = AclSlot> {
        (any::<u8>(), prop::collection::vec(any::<u8>(), 0..6), acl_strategy())
            .prop_map(|(op, metadata, acl)| AclSlot { op, metadata, acl })
    }

    fn record_strategy() -> impl Strategy<Value = FileRecord> {
        prop_oneof![
            prop::array::uniform4(slot_strategy()).prop_map(|slots| FileRecord::Normal { slots }),
            ("[a-z]{1,6}(\\.[a-z]{1,6}){0,3}", slot_strategy(), slot_strategy()).prop_map(|(target, read, modify)| {
                FileRecord::Gateway {
                    target: AttrName::new(&target).unwrap(),
                    read,
                    modify,
                }
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(record in record_strategy()) {
            let bytes = encode(&record).unwrap();
            prop_assert_eq!(decode(record.kind(), &bytes).unwrap(), record);
        }

        #[test]
        fn prop_decode_never_panics(kind in prop_oneof![Just(RecordKind::Normal), Just(RecordKind::Gateway)],
                                    data in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode(kind, &data);
        }

        #[test]
        fn prop_truncation_is_malformed(record in record_strategy(), cut in any::<prop::sample::Index>()) {
            let bytes = encode(&record).unwrap();
            let cut = cut.index(bytes.len());
            let err = decode(record.kind(), &bytes[..cut]).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Malformed);
        }
    }
}
