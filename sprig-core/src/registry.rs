//! 组件注册表 - 组件类型到其唯一实例的映射
//!
//! 实例在第一次被引用时创建，之后一直存活到注册表被销毁。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::{Component, ComponentInstance, ComponentType, Shared};
use crate::error::{ContainerError, ContainerResult};

struct RegistryEntry {
    type_name: &'static str,
    instance: ComponentInstance,
}

/// 组件注册表
///
/// 每种类型最多只有一个实例（单例不变量）
#[derive(Default)]
pub struct ComponentRegistry {
    instances: RwLock<HashMap<TypeId, RegistryEntry>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已有实例，不存在时通过无参工厂创建并缓存
    ///
    /// 已存在的实例原样返回，不会重新创建也不会重新注入
    pub fn get_or_create(&self, component: &ComponentType) -> ContainerResult<ComponentInstance> {
        if let Some(instance) = self.get(component) {
            tracing::trace!("Returning cached instance of component '{}'", component.name());
            return Ok(instance);
        }

        // 检查与创建在同一把写锁内完成
        let mut instances = self.instances.write();
        if let Some(entry) = instances.get(&component.id()) {
            return Ok(Arc::clone(&entry.instance));
        }

        tracing::debug!("Creating shared instance of component '{}'", component.name());
        let instance = component.create().map_err(|e| {
            tracing::error!("Failed to instantiate component '{}': {}", component.name(), e);
            e
        })?;

        instances.insert(
            component.id(),
            RegistryEntry {
                type_name: component.name(),
                instance: Arc::clone(&instance),
            },
        );
        Ok(instance)
    }

    /// 纯查询，从未创建过的类型返回 None
    pub fn get(&self, component: &ComponentType) -> Option<ComponentInstance> {
        self.instances
            .read()
            .get(&component.id())
            .map(|entry| Arc::clone(&entry.instance))
    }

    /// 类型化的 [`get_or_create`](Self::get_or_create)
    pub fn get_or_create_typed<T: Component>(&self) -> ContainerResult<Shared<T>> {
        let instance = self.get_or_create(&ComponentType::of::<T>())?;
        downcast::<T>(instance)
    }

    /// 类型化的 [`get`](Self::get)
    pub fn get_typed<T: Component>(&self) -> Option<Shared<T>> {
        self.get(&ComponentType::of::<T>())
            .and_then(|instance| downcast::<T>(instance).ok())
    }

    pub fn contains(&self, component: &ComponentType) -> bool {
        self.instances.read().contains_key(&component.id())
    }

    /// 已创建的组件数量
    pub fn size(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// 已创建组件的类型名，按字母排序
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .instances
            .read()
            .values()
            .map(|entry| entry.type_name)
            .collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.component_names())
            .finish()
    }
}

fn downcast<T: Component>(instance: ComponentInstance) -> ContainerResult<Shared<T>> {
    instance.downcast::<RwLock<T>>().map_err(|_| {
        ContainerError::instantiation(
            std::any::type_name::<T>(),
            anyhow::anyhow!("registered instance has an unexpected type"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Counter {
        hits: usize,
    }

    impl Component for Counter {
        fn instantiate() -> ContainerResult<Self> {
            CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Self::default())
        }
    }

    #[derive(Debug)]
    struct Unconstructible;

    impl Component for Unconstructible {
        fn instantiate() -> ContainerResult<Self> {
            Err(ContainerError::instantiation(
                std::any::type_name::<Self>(),
                anyhow::anyhow!("no zero-argument constructor"),
            ))
        }
    }

    #[derive(Debug, Default)]
    struct Other;

    #[derive(Debug, Default)]
    struct Alpha;

    impl Component for Alpha {
        fn instantiate() -> ContainerResult<Self> {
            Ok(Self)
        }
    }

    impl Component for Other {
        fn instantiate() -> ContainerResult<Self> {
            Ok(Self)
        }
    }

    static SLOW_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Slow;

    impl Component for Slow {
        fn instantiate() -> ContainerResult<Self> {
            SLOW_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Self)
        }
    }

    #[test]
    fn test_get_or_create_returns_identical_instance() {
        let registry = ComponentRegistry::new();
        let before = CONSTRUCTIONS.load(Ordering::SeqCst);

        let first = registry.get_or_create_typed::<Counter>().unwrap();
        first.write().hits += 1;
        let second = registry.get_or_create_typed::<Counter>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.read().hits, 1);
        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst) - before, 1);
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_get_does_not_instantiate() {
        let registry = ComponentRegistry::new();
        assert!(registry.get_typed::<Other>().is_none());
        assert!(registry.get(&ComponentType::of::<Other>()).is_none());
        assert!(registry.is_empty());

        let created = registry.get_or_create_typed::<Other>().unwrap();
        let looked_up = registry.get_typed::<Other>().unwrap();
        assert!(Arc::ptr_eq(&created, &looked_up));
        assert!(registry.contains(&ComponentType::of::<Other>()));
    }

    #[test]
    fn test_instantiation_failure_is_not_cached() {
        let registry = ComponentRegistry::new();
        let err = registry.get_or_create_typed::<Unconstructible>().unwrap_err();

        assert!(matches!(err, ContainerError::Instantiation { .. }));
        assert!(err.to_string().contains("Unconstructible"));
        assert_eq!(registry.size(), 0);
    }

    #[test]
    fn test_component_names_are_sorted() {
        let registry = ComponentRegistry::new();
        registry.get_or_create_typed::<Other>().unwrap();
        registry.get_or_create_typed::<Alpha>().unwrap();

        let names = registry.component_names();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Alpha"));
        assert!(names[1].ends_with("Other"));
    }

    #[test]
    fn test_concurrent_get_or_create_constructs_once() {
        let registry = &ComponentRegistry::new();
        let barrier = &std::sync::Barrier::new(8);

        let instances: Vec<Shared<Slow>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        registry.get_or_create_typed::<Slow>().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(SLOW_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
        assert_eq!(registry.size(), 1);
    }
}
