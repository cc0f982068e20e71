use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ContainerError, ContainerResult};

/// 容器管理的共享组件实例
///
/// 组件在被其他组件引用之后仍可能继续接受注入，所以实例放在读写锁中共享
pub type Shared<T> = Arc<RwLock<T>>;

/// 类型擦除后的组件实例，实际类型为 `RwLock<T>`
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的字段写入函数
pub type FieldSetter = Arc<dyn Fn(&ComponentInstance, InjectedValue) -> ContainerResult<()> + Send + Sync>;

/// Component trait - 可以被容器管理的类型
///
/// 通常通过 `#[derive(Component)]` 自动实现；也可以手动实现，
/// 通过 [`InjectionPoint`] 显式声明需要注入的字段
///
/// # 示例
///
/// ```ignore
/// use sprig_core::prelude::*;
/// use sprig_core_macros::Component;
///
/// #[derive(Component, Default)]
/// struct UserService {
///     #[inject]
///     repository: Option<Shared<UserRepository>>,
///
///     #[inject(property = "user.page-size")]
///     page_size: Option<usize>,
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// 无参构造，失败时应返回 [`ContainerError::Instantiation`]
    fn instantiate() -> ContainerResult<Self>;

    /// 按声明顺序返回所有注入点
    fn injection_points() -> Vec<InjectionPoint> {
        Vec::new()
    }

    /// 组件描述符
    fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::new(ComponentType::of::<Self>(), Self::injection_points())
    }
}

/// 从 `Shared<T>` 中取出组件类型 `T`，供派生宏在字段类型上使用
pub trait ComponentRef {
    type Target: Component;
}

impl<T: Component> ComponentRef for Arc<RwLock<T>> {
    type Target = T;
}

/// 组件类型标识：`TypeId`、完整类型名和无参工厂
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    factory: fn() -> ContainerResult<ComponentInstance>,
}

impl ComponentType {
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            factory: create_instance::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 创建一个新的、尚未注入的实例
    pub fn create(&self) -> ContainerResult<ComponentInstance> {
        (self.factory)()
    }
}

fn create_instance<T: Component>() -> ContainerResult<ComponentInstance> {
    let instance = T::instantiate()?;
    Ok(Arc::new(RwLock::new(instance)))
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

/// 注入点的目标值类型
///
/// 当目标类型本身是组件时携带其 [`ComponentType`]，否则只有类型名
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    name: &'static str,
    component: Option<ComponentType>,
}

impl ValueType {
    pub fn component<T: Component>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            component: Some(ComponentType::of::<T>()),
        }
    }

    pub fn value<T: 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            component: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn as_component(&self) -> Option<&ComponentType> {
        self.component.as_ref()
    }
}

/// 解析完成、等待写入字段的值
#[derive(Clone)]
pub enum InjectedValue {
    /// 配置值；键不存在时为 None
    Property(Option<String>),
    /// 容器管理的组件实例
    Component(ComponentInstance),
}

impl fmt::Debug for InjectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectedValue::Property(value) => f.debug_tuple("Property").field(value).finish(),
            InjectedValue::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// 注入点 - 组件上一个需要由容器填充的字段
#[derive(Clone)]
pub struct InjectionPoint {
    field: &'static str,
    value_type: ValueType,
    property: Option<&'static str>,
    setter: FieldSetter,
}

impl InjectionPoint {
    /// 通用构造，用于手写的注入点
    pub fn new<F>(
        field: &'static str,
        value_type: ValueType,
        property: Option<&'static str>,
        setter: F,
    ) -> Self
    where
        F: Fn(&ComponentInstance, InjectedValue) -> ContainerResult<()> + Send + Sync + 'static,
    {
        Self {
            field,
            value_type,
            property,
            setter: Arc::new(setter),
        }
    }

    /// 组件类型的注入点：字段值从容器中的 `D` 实例解析
    pub fn component<C: Component, D: Component>(
        field: &'static str,
        write: fn(&mut C, Shared<D>),
    ) -> Self {
        Self::new(field, ValueType::component::<D>(), None, move |instance, value| {
            let target = downcast_target::<C>(instance, field)?;
            let dependency = match value {
                InjectedValue::Component(dependency) => {
                    dependency.downcast::<RwLock<D>>().map_err(|_| {
                        ContainerError::field_access(
                            std::any::type_name::<C>(),
                            field,
                            format!(
                                "resolved component is not of type '{}'",
                                std::any::type_name::<D>()
                            ),
                        )
                    })?
                }
                InjectedValue::Property(_) => {
                    return Err(ContainerError::field_access(
                        std::any::type_name::<C>(),
                        field,
                        format!(
                            "expected component '{}', got a configuration value",
                            std::any::type_name::<D>()
                        ),
                    ))
                }
            };
            write(&mut *target.write(), dependency);
            Ok(())
        })
    }

    /// 配置类型的注入点：字段值从配置键 `key` 解析并转换为 `T`
    ///
    /// 键不存在时写入 None；值无法解析为 `T` 时返回 [`ContainerError::FieldAccess`]
    pub fn property<C, T>(field: &'static str, key: &'static str, write: fn(&mut C, Option<T>)) -> Self
    where
        C: Component,
        T: FromStr + 'static,
        T::Err: fmt::Display,
    {
        Self::new(field, ValueType::value::<T>(), Some(key), move |instance, value| {
            let target = downcast_target::<C>(instance, field)?;
            let raw = match value {
                InjectedValue::Property(raw) => raw,
                InjectedValue::Component(_) => {
                    return Err(ContainerError::field_access(
                        std::any::type_name::<C>(),
                        field,
                        "expected a configuration value, got a component",
                    ))
                }
            };
            let parsed = raw
                .map(|raw| {
                    raw.parse::<T>().map_err(|e| {
                        ContainerError::field_access(
                            std::any::type_name::<C>(),
                            field,
                            format!(
                                "cannot convert '{}' to '{}': {}",
                                raw,
                                std::any::type_name::<T>(),
                                e
                            ),
                        )
                    })
                })
                .transpose()?;
            write(&mut *target.write(), parsed);
            Ok(())
        })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// 声明的配置键（可能为空字符串）
    pub fn declared_property(&self) -> Option<&'static str> {
        self.property
    }

    /// 配置键存在且非空时，从配置解析
    pub fn configuration_key(&self) -> Option<&'static str> {
        self.property.filter(|key| !key.is_empty())
    }

    /// 把解析好的值写入目标实例
    pub fn inject(&self, target: &ComponentInstance, value: InjectedValue) -> ContainerResult<()> {
        (self.setter)(target, value)
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("field", &self.field)
            .field("value_type", &self.value_type.name)
            .field("property", &self.property)
            .finish()
    }
}

fn downcast_target<'a, C: Component>(
    instance: &'a ComponentInstance,
    field: &str,
) -> ContainerResult<&'a RwLock<C>> {
    instance.downcast_ref::<RwLock<C>>().ok_or_else(|| {
        ContainerError::field_access(
            std::any::type_name::<C>(),
            field,
            "target instance is not of the declaring component type",
        )
    })
}

/// 组件描述符：组件类型及其按声明顺序排列的注入点
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    component: ComponentType,
    injection_points: Vec<InjectionPoint>,
}

impl ComponentDescriptor {
    pub fn new(component: ComponentType, injection_points: Vec<InjectionPoint>) -> Self {
        Self {
            component,
            injection_points,
        }
    }

    pub fn of<T: Component>() -> Self {
        T::descriptor()
    }

    pub fn component(&self) -> &ComponentType {
        &self.component
    }

    pub fn type_name(&self) -> &'static str {
        self.component.name()
    }

    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }
}

/// 组件注册表项 - 由 `#[derive(Component)]` 通过 inventory 在链接期收集
pub struct ComponentRegistration {
    /// 声明组件的模块路径，即 `module_path!()`
    pub namespace: &'static str,
    pub type_name: &'static str,
    pub descriptor: fn() -> ComponentDescriptor,
}

inventory::collect!(ComponentRegistration);
