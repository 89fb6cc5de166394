//! 测试用的内存内核扩展
//!
//! [`FakeKernel`] 模拟 DCAC 内核扩展：属性表、文件 xattr、默认 ACL、
//! 掩码和 lockdown 都保存在共享的内存状态中。
//! [`FakeKernel::storage`] 返回共享同一状态的 xattr 存储，
//! 因此通过内核写入的 ACL 可以通过存储读出，反之亦然。

use crate::attr::{Acl, AttrName};
use crate::error::{Error, ErrorKind, Result};
use crate::native::DcacExtension;
use crate::types::{AttrFlags, AttrId, Right};
use crate::xattr::{codec, FileAcls, FileRecord, RecordKind, XattrStorage};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

const EPERM: i32 = 1;
const EBADF: i32 = 9;
const EEXIST: i32 = 17;
const ERANGE: i32 = 34;

#[derive(Debug)]
struct State {
    attrs: BTreeMap<i32, String>,
    next_fd: i32,
    uname: String,
    gname: String,
    files: BTreeMap<(String, String), Vec<u8>>,
    default_acls: BTreeMap<Right, String>,
    mask: u16,
    locked: bool,
    /// 修改状态的原语调用次数
    calls: usize,
    /// set_file_acl 调用记录
    file_acl_calls: Vec<(Right, String, String)>,
    fail_release: bool,
    /// 下一个 uname 属性注册后不出现在属性表中
    hide_next_uname: bool,
    hidden: Vec<i32>,
}

/// 内存内核扩展
#[derive(Debug, Clone)]
pub(crate) struct FakeKernel {
    state: Rc<RefCell<State>>,
}

/// 与 [`FakeKernel`] 共享状态的 xattr 存储
#[derive(Debug, Clone)]
pub(crate) struct FakeXattr {
    state: Rc<RefCell<State>>,
}

impl FakeKernel {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                attrs: BTreeMap::new(),
                next_fd: 3,
                uname: "alice".to_string(),
                gname: "staff".to_string(),
                files: BTreeMap::new(),
                default_acls: BTreeMap::new(),
                mask: 0,
                locked: false,
                calls: 0,
                file_acl_calls: Vec::new(),
                fail_release: false,
                hide_next_uname: false,
                hidden: Vec::new(),
            })),
        }
    }

    pub(crate) fn storage(&self) -> FakeXattr {
        FakeXattr {
            state: Rc::clone(&self.state),
        }
    }

    pub(crate) fn raw_xattr(&self, path: &str, key: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(&(path.to_string(), key.to_string())).cloned()
    }

    pub(crate) fn put_raw_xattr(&self, path: &str, key: &str, value: &[u8]) {
        self.state
            .borrow_mut()
            .files
            .insert((path.to_string(), key.to_string()), value.to_vec());
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.state.borrow().locked
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.borrow().calls
    }

    pub(crate) fn file_acl_calls(&self) -> Vec<(Right, String, String)> {
        self.state.borrow().file_acl_calls.clone()
    }

    pub(crate) fn default_acl(&self, right: Right) -> Option<String> {
        self.state.borrow().default_acls.get(&right).cloned()
    }

    pub(crate) fn is_live(&self, id: AttrId) -> bool {
        self.state.borrow().attrs.contains_key(&id.raw())
    }

    pub(crate) fn live_ids(&self) -> Vec<AttrId> {
        self.state.borrow().attrs.keys().map(|&fd| AttrId::from_raw(fd)).collect()
    }

    pub(crate) fn fail_release(&self, fail: bool) {
        self.state.borrow_mut().fail_release = fail;
    }

    pub(crate) fn hide_next_uname(&self) {
        self.state.borrow_mut().hide_next_uname = true;
    }

    fn register(&mut self, name: String) -> Result<AttrId> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if state.locked {
            return Err(Error::with_errno(ErrorKind::Registration, "locked", EPERM));
        }
        if name.is_empty() || state.attrs.values().any(|n| *n == name) {
            return Err(Error::with_errno(ErrorKind::Registration, "attribute exists", EEXIST));
        }
        let fd = state.next_fd;
        state.next_fd += 1;
        state.attrs.insert(fd, name);
        Ok(AttrId::from_raw(fd))
    }

    fn record(&self, path: &str) -> Result<Option<FileRecord>> {
        let state = self.state.borrow();
        for kind in RecordKind::lookup_order() {
            if let Some(bytes) = state.files.get(&(path.to_string(), kind.xattr_key().to_string())) {
                return codec::decode(kind, bytes).map(Some);
            }
        }
        Ok(None)
    }

    fn store(&self, path: &str, record: &FileRecord) -> Result<()> {
        let bytes = codec::encode(record)?;
        self.put_raw_xattr(path, record.kind().xattr_key(), &bytes);
        Ok(())
    }
}

impl DcacExtension for FakeKernel {
    fn add_any_attr(&mut self, name: &str, _flags: AttrFlags) -> Result<AttrId> {
        self.register(name.to_string())
    }

    fn add_uname_attr(&mut self, _flags: AttrFlags) -> Result<AttrId> {
        let name = format!("u.{}", self.state.borrow().uname);
        let id = self.register(name)?;
        let mut state = self.state.borrow_mut();
        if state.hide_next_uname {
            state.hide_next_uname = false;
            state.hidden.push(id.raw());
        }
        Ok(id)
    }

    fn add_gname_attr(&mut self, _flags: AttrFlags) -> Result<AttrId> {
        let name = format!("g.{}", self.state.borrow().gname);
        self.register(name)
    }

    fn add_sub_attr(&mut self, parent: AttrId, segment: &str, _flags: AttrFlags) -> Result<AttrId> {
        let parent_name = self.state.borrow().attrs.get(&parent.raw()).cloned();
        match parent_name {
            Some(p) => self.register(format!("{}.{}", p, segment)),
            None => Err(Error::with_errno(ErrorKind::Registration, "bad parent", EBADF)),
        }
    }

    fn release_attr(&mut self, id: AttrId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if state.fail_release || state.attrs.remove(&id.raw()).is_none() {
            return Err(Error::with_errno(ErrorKind::Release, "close failed", EBADF));
        }
        Ok(())
    }

    fn attr_name(&self, id: AttrId, max_len: usize) -> Result<String> {
        match self.state.borrow().attrs.get(&id.raw()) {
            Some(name) if name.len() < max_len => Ok(name.clone()),
            Some(_) => Err(Error::with_errno(ErrorKind::Native, "name too long", ERANGE)),
            None => Err(Error::with_errno(ErrorKind::Native, "no such attribute", EBADF)),
        }
    }

    fn attr_list(&self, out: &mut [AttrId]) -> Result<usize> {
        let state = self.state.borrow();
        let live: Vec<i32> = state
            .attrs
            .keys()
            .copied()
            .filter(|fd| !state.hidden.contains(fd))
            .collect();
        for (slot, fd) in out.iter_mut().zip(&live) {
            *slot = AttrId::from_raw(*fd);
        }
        Ok(live.len())
    }

    fn set_default_acl(&mut self, right: Right, acl: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.default_acls.insert(right, acl.to_string());
        Ok(())
    }

    fn set_file_acl(&mut self, right: Right, path: &str, acl: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            state.file_acl_calls.push((right, path.to_string(), acl.to_string()));
        }
        let mut record = self.record(path)?.unwrap_or_else(|| FileRecord::normal(FileAcls::default()));
        match record.slot_mut(right) {
            Some(slot) => slot.acl = Acl::parse(acl),
            None => return Err(Error::with_errno(ErrorKind::Native, "no such slot", EPERM)),
        }
        self.store(path, &record)
    }

    fn create_gateway(&mut self, attr: AttrId, path: &str, add: &str, modify: &str) -> Result<()> {
        let target = {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            if state.locked {
                return Err(Error::with_errno(ErrorKind::Native, "locked", EPERM));
            }
            state.attrs.get(&attr.raw()).cloned()
        };
        let target = target.ok_or(Error::with_errno(ErrorKind::Native, "bad attribute", EBADF))?;
        let target = AttrName::new(&target)?;
        self.store(path, &FileRecord::gateway(target, Acl::parse(add), Acl::parse(modify)))
    }

    fn open_gateway(&mut self, path: &str, _flags: i32) -> Result<AttrId> {
        let target = match self.record(path)? {
            Some(FileRecord::Gateway { target, .. }) => target,
            _ => return Err(Error::with_errno(ErrorKind::Registration, "not a gateway", EPERM)),
        };
        // 真实扩展允许同名属性的多个 fd，这里直接分配新 id
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        let fd = state.next_fd;
        state.next_fd += 1;
        state.attrs.insert(fd, target.to_string());
        Ok(AttrId::from_raw(fd))
    }

    fn set_mask(&mut self, mask: u16) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if state.locked {
            return Err(Error::with_errno(ErrorKind::Native, "locked", EPERM));
        }
        state.mask = mask;
        Ok(())
    }

    fn get_mask(&self) -> Result<u16> {
        Ok(self.state.borrow().mask)
    }

    fn lockdown(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.locked = true;
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.locked = false;
        Ok(())
    }
}

impl XattrStorage for FakeXattr {
    fn get(&self, path: &str, key: &str, buf: &mut [u8]) -> Result<Option<usize>> {
        let state = self.state.borrow();
        match state.files.get(&(path.to_string(), key.to_string())) {
            None => Ok(None),
            Some(bytes) if bytes.len() > buf.len() => {
                Err(Error::with_errno(ErrorKind::Storage, "getxattr failed", ERANGE))
            }
            Some(bytes) => {
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(Some(bytes.len()))
            }
        }
    }

    fn set(&mut self, path: &str, key: &str, value: &[u8]) -> Result<()> {
        self.state
            .borrow_mut()
            .files
            .insert((path.to_string(), key.to_string()), value.to_vec());
        Ok(())
    }
}
