//! 组件扫描 - 在命名空间中发现组件类型
//!
//! 扫描器只负责发现，不会修改容器状态。

use std::collections::HashMap;

use crate::component::{Component, ComponentDescriptor, ComponentRegistration};
use crate::error::{ContainerError, ContainerResult};

/// 组件扫描器 trait
pub trait ComponentScanner: Send + Sync {
    /// 枚举命名空间中的所有组件描述符
    fn scan(&self, namespace: &str) -> ContainerResult<Vec<ComponentDescriptor>>;
}

/// 默认扫描器 - 读取 `#[derive(Component)]` 在链接期提交的注册表
///
/// 命名空间匹配与之相等或嵌套在其下（`ns::...`）的模块路径，
/// 结果按类型名排序以保证顺序确定。
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryScanner;

impl InventoryScanner {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentScanner for InventoryScanner {
    fn scan(&self, namespace: &str) -> ContainerResult<Vec<ComponentDescriptor>> {
        validate_namespace(namespace)?;

        let mut registrations: Vec<&ComponentRegistration> = inventory::iter::<ComponentRegistration>()
            .filter(|registration| in_namespace(registration.namespace, namespace))
            .collect();

        if registrations.is_empty() {
            tracing::warn!("No components found in namespace '{}'", namespace);
            return Ok(Vec::new());
        }

        registrations.sort_by_key(|registration| registration.type_name);

        for registration in &registrations {
            tracing::trace!(
                "Discovered component '{}' in namespace '{}'",
                registration.type_name,
                namespace
            );
        }

        Ok(registrations
            .into_iter()
            .map(|registration| (registration.descriptor)())
            .collect())
    }
}

/// 静态扫描器 - 显式声明的 `命名空间 -> 组件` 绑定表
///
/// 组件按加入顺序返回；未绑定的命名空间视为发现失败
#[derive(Debug, Default, Clone)]
pub struct StaticScanner {
    bindings: HashMap<String, Vec<ComponentDescriptor>>,
}

impl StaticScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把组件 `T` 绑定到命名空间
    pub fn with_component<T: Component>(self, namespace: impl Into<String>) -> Self {
        self.with_descriptor(namespace, T::descriptor())
    }

    /// 把手工构造的描述符绑定到命名空间
    pub fn with_descriptor(mut self, namespace: impl Into<String>, descriptor: ComponentDescriptor) -> Self {
        self.bind(namespace, descriptor);
        self
    }

    /// 声明一个命名空间但不绑定组件
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.bindings.entry(namespace.into()).or_default();
        self
    }

    pub fn bind(&mut self, namespace: impl Into<String>, descriptor: ComponentDescriptor) {
        self.bindings.entry(namespace.into()).or_default().push(descriptor);
    }
}

impl ComponentScanner for StaticScanner {
    fn scan(&self, namespace: &str) -> ContainerResult<Vec<ComponentDescriptor>> {
        let descriptors = self
            .bindings
            .get(namespace)
            .ok_or_else(|| ContainerError::discovery(namespace, "namespace is not bound"))?;

        if descriptors.is_empty() {
            tracing::warn!("No components found in namespace '{}'", namespace);
        }
        Ok(descriptors.clone())
    }
}

fn in_namespace(module_path: &str, namespace: &str) -> bool {
    module_path == namespace
        || module_path
            .strip_prefix(namespace)
            .map(|rest| rest.starts_with("::"))
            .unwrap_or(false)
}

/// 命名空间必须是由 `::` 分隔的合法标识符序列
fn validate_namespace(namespace: &str) -> ContainerResult<()> {
    if namespace.is_empty() {
        return Err(ContainerError::discovery(namespace, "namespace is empty"));
    }

    for segment in namespace.split("::") {
        if !is_identifier(segment) {
            return Err(ContainerError::discovery(
                namespace,
                format!("'{}' is not a valid module path segment", segment),
            ));
        }
    }
    Ok(())
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    segment != "_" && chars.all(|c| c == '_' || c.is_alphanumeric())
}
