//! DCAC 服务对象
//!
//! 进程启动时创建一次，以引用方式传给所有调用者（依赖注入），
//! 测试可以替换为模拟的内核扩展和存储。

use crate::attr::{Acl, AttrHandle, AttrName, AttrTable, ScopedAttr};
use crate::error::{Error, ErrorKind, Result};
use crate::guard::ProcessGuard;
use crate::native::DcacExtension;
use crate::types::{AttrFlags, AttrId, DcacConfig, Right};
use crate::xattr::{self, FileAcls, FileRecord, XattrStorage};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// DCAC 服务
///
/// 持有内核扩展接口、xattr 存储、进程级 guard 和配置。
///
/// # 并发使用
///
/// Dcac 本身不包含内部锁。所有修改进程级状态的操作（属性注册/释放、
/// lock/unlock、掩码）都需要 `&mut self`。多线程环境下用一个进程级的
/// Mutex 包装唯一的服务对象：
///
/// ```rust,ignore
/// use std::sync::{Arc, Mutex};
///
/// let dcac = Arc::new(Mutex::new(Dcac::new(NativeDcac::new(), OsXattr::new())));
/// ```
///
/// # 示例
///
/// ```rust,ignore
/// let mut dcac = Dcac::new(NativeDcac::new(), OsXattr::new());
///
/// let uname = dcac.add_uname(AttrFlags::ADDMOD)?;
/// let fm = dcac.add_sub(&uname, "fm", AttrFlags::ADDMOD)?;
///
/// let add = FileAcls::default().with(Right::Read, fm.acl());
/// dcac.modify_file_acls("doc.txt", Some(&add), None)?;
///
/// dcac.drop_attr(fm)?;
/// dcac.drop_attr(uname)?;
/// ```
pub struct Dcac<E: DcacExtension, S: XattrStorage> {
    ext: E,
    storage: S,
    guard: ProcessGuard,
    config: DcacConfig,
    /// 本进程持有的属性 id
    owned: BTreeSet<AttrId>,
}

impl<E: DcacExtension, S: XattrStorage> Dcac<E, S> {
    /// 使用默认配置创建服务
    pub fn new(ext: E, storage: S) -> Self {
        Self::with_config(ext, storage, DcacConfig::default())
    }

    /// 使用指定配置创建服务
    pub fn with_config(ext: E, storage: S, config: DcacConfig) -> Self {
        Self {
            ext,
            storage,
            guard: ProcessGuard::new(),
            config,
            owned: BTreeSet::new(),
        }
    }

    /// 配置
    pub fn config(&self) -> &DcacConfig {
        &self.config
    }

    /// 内核扩展接口
    pub fn extension(&self) -> &E {
        &self.ext
    }

    /// xattr 存储
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 是否处于 lockdown
    pub fn is_locked(&self) -> bool {
        self.guard.is_locked()
    }

    /// 拆分服务对象，返回内核扩展接口和存储
    ///
    /// 仍有未释放的属性时记录警告；这些属性不会被自动释放。
    pub fn into_parts(self) -> (E, S) {
        if !self.owned.is_empty() {
            log::warn!("[ATTR] service dismantled with {} attributes still held", self.owned.len());
        }
        (self.ext, self.storage)
    }

    //=========================================================================
    // 属性生命周期
    //=========================================================================

    /// 注册属性
    ///
    /// 对应 libdcac 的 `dcac_add_any_attr()`
    ///
    /// # 错误
    ///
    /// - `ErrorKind::Locked` - 进程处于 lockdown
    /// - `ErrorKind::Registration` - 内核扩展拒绝（重名、格式错误）
    pub fn add(&mut self, name: &AttrName, flags: AttrFlags) -> Result<AttrHandle> {
        self.guard.check_unlocked("add")?;
        let id = self.ext.add_any_attr(&name.to_string(), flags)?;
        self.adopt(name.clone(), id)
    }

    /// 注册由用户名派生的属性
    ///
    /// 原语不返回属性名，需要扫描属性表解析。
    /// 解析失败返回 `ErrorKind::AttributeNotFound`，不得重试。
    /// 此时新注册的 id 不会被释放：属性表已不可信，调用方应视为致命错误。
    pub fn add_uname(&mut self, flags: AttrFlags) -> Result<AttrHandle> {
        self.guard.check_unlocked("add_uname")?;
        let id = self.ext.add_uname_attr(flags)?;
        let name = AttrTable::resolve_added(&self.ext, &self.config, id)?;
        self.adopt(name, id)
    }

    /// 注册由组名派生的属性
    ///
    /// 解析失败的处理与 [`Dcac::add_uname`] 相同：不释放新 id，不得重试。
    pub fn add_gname(&mut self, flags: AttrFlags) -> Result<AttrHandle> {
        self.guard.check_unlocked("add_gname")?;
        let id = self.ext.add_gname_attr(flags)?;
        let name = AttrTable::resolve_added(&self.ext, &self.config, id)?;
        self.adopt(name, id)
    }

    /// 在 `parent` 下注册子属性 `parent.segment`
    pub fn add_sub(&mut self, parent: &AttrHandle, segment: &str, flags: AttrFlags) -> Result<AttrHandle> {
        self.guard.check_unlocked("add_sub")?;
        if parent.is_released() {
            return Err(Error::new(ErrorKind::InvalidInput, "parent attribute already released"));
        }
        let name = parent.name().sub_attr(segment)?;
        let id = self.ext.add_sub_attr(parent.id(), segment, flags)?;
        self.adopt(name, id)
    }

    /// 释放属性（幂等）
    ///
    /// 已释放的句柄直接返回 Ok，不会再次调用内核扩展。
    /// 失败时句柄保持未释放状态。
    pub fn release(&mut self, handle: &mut AttrHandle) -> Result<()> {
        if handle.is_released() {
            return Ok(());
        }
        self.guard.check_unlocked("release")?;
        self.ext.release_attr(handle.id())?;
        self.owned.remove(&handle.id());
        handle.mark_released();
        log::debug!("[ATTR] released {} ({})", handle.name(), handle.id());
        Ok(())
    }

    /// 释放并消费属性句柄
    ///
    /// 对应 `close(fd)`。需要在失败后保留句柄时使用 [`Dcac::release`]。
    pub fn drop_attr(&mut self, mut handle: AttrHandle) -> Result<()> {
        self.release(&mut handle)
    }

    /// 把句柄交给作用域 guard，guard 丢弃时释放
    pub fn scoped(&mut self, handle: AttrHandle) -> ScopedAttr<'_, E, S> {
        ScopedAttr::new(self, handle)
    }

    /// 查询活跃属性快照
    pub fn list_attrs(&self) -> Result<AttrTable> {
        AttrTable::query(&self.ext, &self.config)
    }

    /// 把活跃属性写入日志
    pub fn log_attrs(&self) {
        match self.list_attrs() {
            Ok(table) => {
                for entry in table.iter() {
                    log::info!("[ATTR] {} {}", entry.id, entry.name);
                }
            }
            Err(e) => log::warn!("[ATTR] failed to list attributes: {}", e),
        }
    }

    fn adopt(&mut self, name: AttrName, id: AttrId) -> Result<AttrHandle> {
        if !self.owned.insert(id) {
            log::error!("[ATTR] extension returned {} for {}, but it is already held", id, name);
            return Err(Error::new(ErrorKind::Registration, "attribute id already held by another handle"));
        }
        log::debug!("[ATTR] registered {} as {}", name, id);
        Ok(AttrHandle::new(name, id))
    }

    //=========================================================================
    // ACL
    //=========================================================================

    /// 设置进程的默认 ACL
    ///
    /// 对应 libdcac 的 `dcac_set_def_{rd,wr,ex,md}acl()`
    pub fn set_default_acl(&mut self, right: Right, acl: &Acl) -> Result<()> {
        self.ext.set_default_acl(right, &acl.to_native()?)
    }

    /// 设置文件 ACL 的一个槽位
    ///
    /// 对应 libdcac 的 `dcac_set_file_{rd,wr,ex,md}acl()`
    pub fn set_file_acl(&mut self, path: &str, right: Right, acl: &Acl) -> Result<()> {
        self.ext.set_file_acl(right, path, &acl.to_native()?)
    }

    /// 读取完整记录（形态、gateway 目标、所有槽位）
    pub fn get_file_record(&self, path: &str) -> Result<FileRecord> {
        xattr::read_record(&self.storage, path, self.config.xattr_buf_size)
    }

    /// 读取文件的 ACL
    ///
    /// gateway 文件的 Write、Execute 为空
    ///
    /// # 错误
    ///
    /// - `ErrorKind::NoSuchRecord` - 两个键下都没有记录
    /// - `ErrorKind::Malformed` - 记录字节损坏
    /// - `ErrorKind::Storage` - xattr 读取失败
    pub fn get_file_acls(&self, path: &str) -> Result<FileAcls> {
        self.get_file_record(path).map(|record| record.acls())
    }

    /// 直接写入编码后的记录
    ///
    /// 绕过内核扩展，通过存储接口写入；用于预置记录
    pub fn put_file_record(&mut self, path: &str, record: &FileRecord) -> Result<()> {
        xattr::write_record(&mut self.storage, path, record)
    }

    /// 修改文件 ACL
    ///
    /// 读取当前记录，对 `add` 或 `remove` 中非空的每个槽位计算
    /// `current.add_and_remove_all(add, remove)`，并逐槽位写回
    /// （每个被修改的槽位一次 `set_file_acl` 调用）。未涉及的槽位不写。
    ///
    /// # 竞争
    ///
    /// 读取与逐槽位写入之间没有隔离：对同一文件并发调用会交错，
    /// 按槽位后写者生效，可能丢失更新。需要正确性的调用方必须在整个
    /// 修改周期内持有该路径的外部锁。失败不会自动重试。
    ///
    /// # 错误
    ///
    /// - `ErrorKind::NoSuchRecord` - 文件没有记录（请求为空时也会检查）
    /// - `ErrorKind::InvalidInput` - 对 gateway 记录请求 Write / Execute，
    ///   或 ACL 无法转换为文本形式（此时不会写入任何槽位）
    pub fn modify_file_acls(&mut self, path: &str, add: Option<&FileAcls>, remove: Option<&FileAcls>) -> Result<()> {
        let record = self.get_file_record(path)?;
        let empty = FileAcls::default();
        let add = add.unwrap_or(&empty);
        let remove = remove.unwrap_or(&empty);
        if add.is_empty() && remove.is_empty() {
            log::trace!("[MODIFY] {}: nothing to change", path);
            return Ok(());
        }

        // 先计算所有槽位，全部合法后再写入
        let mut updates: Vec<(Right, String)> = Vec::new();
        for right in Right::ALL {
            let (to_add, to_remove) = (add.get(right), remove.get(right));
            if to_add.is_empty() && to_remove.is_empty() {
                continue;
            }
            let current = record.acl(right).ok_or(Error::new(
                ErrorKind::InvalidInput,
                "gateway records carry only read and modify ACLs",
            ))?;
            let updated = current.add_and_remove_all(to_add, to_remove);
            log::debug!("[MODIFY] {} {}: [{}] -> [{}]", path, right, current, updated);
            updates.push((right, updated.to_native()?));
        }

        for (right, acl) in updates {
            self.ext.set_file_acl(right, path, &acl)?;
        }
        Ok(())
    }

    //=========================================================================
    // gateway
    //=========================================================================

    /// 创建 gateway 文件
    ///
    /// gateway 把 `attr` 委托给能通过其 ACL 检查的进程：
    /// `add` 控制谁能打开它获得该属性，`modify` 控制谁能修改这些 ACL。
    pub fn create_gateway_file(&mut self, attr: &AttrHandle, path: &str, add: &Acl, modify: &Acl) -> Result<()> {
        self.guard.check_unlocked("create_gateway_file")?;
        if attr.is_released() {
            return Err(Error::new(ErrorKind::InvalidInput, "attribute already released"));
        }
        self.ext.create_gateway(attr.id(), path, &add.to_native()?, &modify.to_native()?)?;
        log::debug!("[GATEWAY] created {} for {}", path, attr.name());
        Ok(())
    }

    /// 打开 gateway 文件，获得其委托的属性
    ///
    /// `flags` 为 `open(2)` 标志
    pub fn open_gateway_file(&mut self, path: &str, flags: i32) -> Result<AttrHandle> {
        self.guard.check_unlocked("open_gateway_file")?;
        let id = self.ext.open_gateway(path, flags)?;
        let name = match self.resolve_name(id) {
            Ok(name) => name,
            Err(e) => {
                // 还没有句柄持有 id，必须在这里释放
                if let Err(release_err) = self.ext.release_attr(id) {
                    log::warn!("[GATEWAY] failed to release {} from {}: {}", id, path, release_err);
                }
                return Err(e);
            }
        };
        log::debug!("[GATEWAY] opened {} -> {}", path, name);
        self.adopt(name, id)
    }

    fn resolve_name(&self, id: AttrId) -> Result<AttrName> {
        let raw = self.ext.attr_name(id, self.config.attr_name_max)?;
        AttrName::new(&raw).map_err(|_| Error::new(ErrorKind::Native, "extension reported an empty attribute name"))
    }

    //=========================================================================
    // lockdown / 掩码
    //=========================================================================

    /// 进入 lockdown
    pub fn lock(&mut self) -> Result<()> {
        self.guard.lock(&mut self.ext)
    }

    /// 解除 lockdown
    pub fn unlock(&mut self) -> Result<()> {
        self.guard.unlock(&mut self.ext)
    }

    /// 设置进程掩码，lockdown 时失败
    pub fn set_pmask(&mut self, mask: u16) -> Result<()> {
        self.guard.set_mask(&mut self.ext, mask)
    }

    /// 读取进程掩码
    pub fn get_pmask(&self) -> Result<u16> {
        self.guard.get_mask(&self.ext)
    }
}
