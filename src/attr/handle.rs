//! 属性句柄 - 独占持有的属性注册
//!
//! 对应 libdcac 中属性 fd 的生命周期

use super::acl::Acl;
use super::name::AttrName;
use crate::dcac::Dcac;
use crate::native::DcacExtension;
use crate::types::AttrId;
use crate::xattr::XattrStorage;
use core::ops::Deref;

/// 属性句柄
///
/// 把属性名和内核扩展分配的 [`AttrId`] 绑定在一起。
///
/// - 不实现 `Clone`：一个 id 只属于一个句柄
/// - 释放必须显式进行（[`Dcac::drop_attr`] / [`Dcac::release`]），
///   或者交给 [`ScopedAttr`] 在作用域结束时释放
/// - 内部的 released 标志保证同一个 id 不会被释放两次
#[derive(Debug)]
pub struct AttrHandle {
    name: AttrName,
    id: AttrId,
    released: bool,
}

impl AttrHandle {
    pub(crate) fn new(name: AttrName, id: AttrId) -> Self {
        Self {
            name,
            id,
            released: false,
        }
    }

    /// 属性名
    pub fn name(&self) -> &AttrName {
        &self.name
    }

    /// 内核扩展分配的 id
    pub fn id(&self) -> AttrId {
        self.id
    }

    /// 只授予此属性的 ACL
    pub fn acl(&self) -> Acl {
        Acl::from_name(&self.name)
    }

    /// 是否已经释放
    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn mark_released(&mut self) {
        self.released = true;
    }
}

impl Drop for AttrHandle {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("[ATTR] handle {} ({}) dropped without release, leaking", self.name, self.id);
        }
    }
}

/// 作用域属性句柄
///
/// 持有 `&mut Dcac` 和一个 [`AttrHandle`]，丢弃时自动释放属性。
/// 由于持有可变引用，同一时刻只能存在一个 ScopedAttr；
/// 需要调用其他操作时通过 [`ScopedAttr::dcac`] 访问服务对象。
///
/// # 示例
///
/// ```rust,ignore
/// let handle = dcac.add(&AttrName::new("app.reader")?, AttrFlags::ADDMOD)?;
/// let mut scoped = dcac.scoped(handle);
/// let acl = scoped.acl();
/// scoped.dcac().set_file_acl("doc.txt", Right::Read, &acl)?;
/// // scoped 超出作用域时释放属性
/// ```
pub struct ScopedAttr<'a, E: DcacExtension, S: XattrStorage> {
    dcac: &'a mut Dcac<E, S>,
    handle: AttrHandle,
    /// 已经尝试过释放（成功或失败），drop 时不再尝试
    attempted: bool,
}

impl<'a, E: DcacExtension, S: XattrStorage> ScopedAttr<'a, E, S> {
    pub(crate) fn new(dcac: &'a mut Dcac<E, S>, handle: AttrHandle) -> Self {
        Self {
            dcac,
            handle,
            attempted: false,
        }
    }

    /// 访问服务对象
    pub fn dcac(&mut self) -> &mut Dcac<E, S> {
        self.dcac
    }

    /// 显式释放，返回释放结果
    pub fn release(mut self) -> crate::Result<()> {
        self.attempted = true;
        self.dcac.release(&mut self.handle)
    }
}

impl<'a, E: DcacExtension, S: XattrStorage> Deref for ScopedAttr<'a, E, S> {
    type Target = AttrHandle;

    fn deref(&self) -> &AttrHandle {
        &self.handle
    }
}

impl<'a, E: DcacExtension, S: XattrStorage> Drop for ScopedAttr<'a, E, S> {
    fn drop(&mut self) {
        if self.attempted {
            return;
        }
        // drop 不能返回 Result
        if let Err(e) = self.dcac.release(&mut self.handle) {
            log::warn!("[ATTR] scoped release of {} failed: {}", self.handle.name(), e);
        }
    }
}
