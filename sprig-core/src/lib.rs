// sprig-core: 轻量的依赖注入容器
//
// 从配置的命名空间中发现组件，每种组件只创建一个实例，
// 并把配置值和其他组件实例注入到声明的字段中：
// - 单例注册表（按 TypeId 索引）
// - properties / TOML 配置加载
// - 通过 #[derive(Component)] 生成的注入点元数据

pub mod app;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
mod properties;
pub mod registry;
pub mod resolver;
pub mod scanner;

// 重新导出常用类型
pub use app::{Initializer, SprigApplication};
pub use component::{
    Component, ComponentDescriptor, ComponentInstance, ComponentRef, ComponentRegistration,
    ComponentType, FieldSetter, InjectedValue, InjectionPoint, Shared, ValueType,
};
pub use config::{ConfigurationMap, ConfigurationStore};
pub use context::{ApplicationContext, ApplicationContextBuilder, ContextState};
pub use error::{
    ApplicationError, ApplicationResult, ConfigLoadError, ContainerError, ContainerResult,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use registry::ComponentRegistry;
pub use resolver::InjectionResolver;
pub use scanner::{ComponentScanner, InventoryScanner, StaticScanner};

// 导出 anyhow 和 inventory，供宏使用
pub use anyhow;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::app::SprigApplication;
    pub use crate::component::{Component, ComponentDescriptor, ComponentType, InjectionPoint, Shared};
    pub use crate::config::ConfigurationMap;
    pub use crate::context::ApplicationContext;
    pub use crate::error::{ApplicationResult, ContainerError, ContainerResult};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scanner::{ComponentScanner, InventoryScanner, StaticScanner};
    pub use anyhow::{anyhow, Context};
}
