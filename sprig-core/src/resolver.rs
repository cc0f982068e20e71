use crate::component::{ComponentDescriptor, InjectedValue, InjectionPoint};
use crate::config::ConfigurationMap;
use crate::error::{ContainerError, ContainerResult};
use crate::registry::ComponentRegistry;

/// 注入解析器 - 无状态
///
/// 对每个注入点：
/// 1. 通过 `get_or_create` 取得目标组件实例
/// 2. 配置键非空时从配置取值，键不存在写入 None
/// 3. 否则按字段声明的类型 `get_or_create` 依赖实例（只创建，不在此时注入）
///
/// 不做拓扑排序，也不检测循环依赖：已存在的实例会被直接返回，
/// 因此其他组件可能观察到尚未完成注入的实例。
pub struct InjectionResolver;

impl InjectionResolver {
    /// 解析并写入一个组件的所有注入点，按声明顺序进行
    pub fn resolve(
        descriptor: &ComponentDescriptor,
        registry: &ComponentRegistry,
        configuration: &ConfigurationMap,
    ) -> ContainerResult<()> {
        tracing::debug!(
            "Examining component '{}' ({} injection point(s))",
            descriptor.type_name(),
            descriptor.injection_points().len()
        );

        for point in descriptor.injection_points() {
            let target = registry.get_or_create(descriptor.component())?;
            let value = Self::resolve_value(descriptor, point, registry, configuration)?;

            point.inject(&target, value).map_err(|e| {
                tracing::error!("{}", e);
                e
            })?;

            tracing::debug!("Injected field '{}::{}'", descriptor.type_name(), point.field());
        }

        Ok(())
    }

    fn resolve_value(
        descriptor: &ComponentDescriptor,
        point: &InjectionPoint,
        registry: &ComponentRegistry,
        configuration: &ConfigurationMap,
    ) -> ContainerResult<InjectedValue> {
        if let Some(key) = point.configuration_key() {
            let value = configuration.get(key).map(str::to_string);
            if value.is_none() {
                tracing::debug!(
                    "Property '{}' not found, field '{}::{}' left empty",
                    key,
                    descriptor.type_name(),
                    point.field()
                );
            }
            return Ok(InjectedValue::Property(value));
        }

        let value_type = point.value_type();
        let dependency = value_type.as_component().ok_or_else(|| {
            ContainerError::instantiation(
                value_type.name(),
                anyhow::anyhow!(
                    "type is not a component and has no configuration key (field '{}::{}')",
                    descriptor.type_name(),
                    point.field()
                ),
            )
        })?;

        let instance = registry.get_or_create(dependency)?;
        Ok(InjectedValue::Component(instance))
    }
}
