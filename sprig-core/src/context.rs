use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::component::{Component, ComponentInstance, ComponentType, Shared};
use crate::config::{ConfigurationMap, ConfigurationStore};
use crate::error::{ConfigLoadError, ContainerResult};
use crate::registry::ComponentRegistry;
use crate::resolver::InjectionResolver;
use crate::scanner::{ComponentScanner, InventoryScanner};

/// 进程级应用上下文
static GLOBAL_CONTEXT: OnceCell<ApplicationContext> = OnceCell::new();

/// 进程级上下文的状态，取值见 [`ContextState`]
static GLOBAL_STATE: AtomicU8 = AtomicU8::new(ContextState::Uninitialized as u8);

/// 上下文生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContextState {
    Uninitialized = 0,
    Bootstrapping = 1,
    Ready = 2,
}

impl ContextState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ContextState::Bootstrapping,
            2 => ContextState::Ready,
            _ => ContextState::Uninitialized,
        }
    }
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContextState::Uninitialized => "UNINITIALIZED",
            ContextState::Bootstrapping => "BOOTSTRAPPING",
            ContextState::Ready => "READY",
        };
        write!(f, "{}", s)
    }
}

/// 应用上下文 - 持有配置和组件注册表
///
/// 启动流程：
/// 1. 按顺序加载配置文件（失败的文件只记录警告）
/// 2. 依次扫描每个命名空间，收集组件描述符
/// 3. 按扫描顺序解析每个组件的注入点
///
/// 启动完成后上下文只读。进程级实例通过 [`get_instance`](Self::get_instance) 获取，
/// 独立实例通过 [`bootstrap`](Self::bootstrap) 或 [`builder`](Self::builder) 构建。
pub struct ApplicationContext {
    configuration: ConfigurationMap,
    config_warnings: Vec<ConfigLoadError>,
    registry: ComponentRegistry,
    namespaces: Vec<String>,
    property_files: Vec<PathBuf>,
    state: ContextState,
}

impl ApplicationContext {
    /// 获取进程级上下文，首次调用时同步启动
    ///
    /// 之后的调用直接返回已有实例，参数被忽略（不会重新扫描）。
    /// 启动失败时不会发布任何实例，下一次调用会重新尝试。
    pub fn get_instance<N, P>(namespaces: N, property_files: P) -> ContainerResult<&'static ApplicationContext>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<PathBuf>,
    {
        if let Some(context) = GLOBAL_CONTEXT.get() {
            tracing::debug!("Returning existing application context");
            return Ok(context);
        }

        let context = GLOBAL_CONTEXT.get_or_try_init(|| {
            GLOBAL_STATE.store(ContextState::Bootstrapping as u8, Ordering::SeqCst);
            Self::bootstrap(namespaces, property_files).map_err(|e| {
                GLOBAL_STATE.store(ContextState::Uninitialized as u8, Ordering::SeqCst);
                e
            })
        })?;

        GLOBAL_STATE.store(ContextState::Ready as u8, Ordering::SeqCst);
        Ok(context)
    }

    /// 进程级上下文的当前状态
    pub fn global_state() -> ContextState {
        ContextState::from_u8(GLOBAL_STATE.load(Ordering::SeqCst))
    }

    /// 使用默认的 [`InventoryScanner`] 构建一个独立上下文
    pub fn bootstrap<N, P>(namespaces: N, property_files: P) -> ContainerResult<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<PathBuf>,
    {
        Self::bootstrap_with(&InventoryScanner, namespaces, property_files)
    }

    /// 使用指定扫描器构建一个独立上下文
    pub fn bootstrap_with<N, P>(
        scanner: &dyn ComponentScanner,
        namespaces: N,
        property_files: P,
    ) -> ContainerResult<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<PathBuf>,
    {
        let namespaces: Vec<String> = namespaces.into_iter().map(Into::into).collect();
        let property_files: Vec<PathBuf> = property_files.into_iter().map(Into::into).collect();
        let start = Instant::now();

        tracing::info!(
            "Bootstrapping application context for namespace(s) {:?}",
            namespaces
        );

        // 1. 配置
        let (configuration, config_warnings) = ConfigurationStore::load(&property_files).into_parts();

        // 2. 扫描
        let mut descriptors = Vec::new();
        for namespace in &namespaces {
            tracing::info!("Starting component scan in namespace '{}'", namespace);
            let found = scanner.scan(namespace).map_err(|e| {
                tracing::error!("Component scan failed: {}", e);
                e
            })?;
            tracing::info!(
                "Found {} component(s) in namespace '{}'",
                found.len(),
                namespace
            );
            descriptors.extend(found);
        }

        // 3. 注入
        let registry = ComponentRegistry::new();
        for descriptor in &descriptors {
            InjectionResolver::resolve(descriptor, &registry, &configuration).map_err(|e| {
                tracing::error!(
                    "Failed to resolve component '{}': {}",
                    descriptor.type_name(),
                    e
                );
                e
            })?;
        }

        tracing::info!(
            "Application context ready: {} component(s) instantiated, {} property(ies) loaded in {:?}",
            registry.size(),
            configuration.len(),
            start.elapsed()
        );

        Ok(Self {
            configuration,
            config_warnings,
            registry,
            namespaces,
            property_files,
            state: ContextState::Ready,
        })
    }

    /// 创建上下文构建器
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    /// 按类型获取组件，从不创建实例
    pub fn get_component<T: Component>(&self) -> Option<Shared<T>> {
        self.registry.get_typed::<T>()
    }

    pub fn get_component_by_type(&self, component: &ComponentType) -> Option<ComponentInstance> {
        self.registry.get(component)
    }

    pub fn contains_component<T: Component>(&self) -> bool {
        self.registry.contains(&ComponentType::of::<T>())
    }

    /// 已创建的组件数量
    pub fn get_components_size(&self) -> usize {
        self.registry.size()
    }

    pub fn get_component_names(&self) -> Vec<&'static str> {
        self.registry.component_names()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn configuration(&self) -> &ConfigurationMap {
        &self.configuration
    }

    /// 启动时被跳过的配置文件
    pub fn config_warnings(&self) -> &[ConfigLoadError] {
        &self.config_warnings
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn property_files(&self) -> &[PathBuf] {
        &self.property_files
    }

    pub fn state(&self) -> ContextState {
        self.state
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("namespaces", &self.namespaces)
            .field("property_files", &self.property_files)
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish()
    }
}

/// ApplicationContext 构建器
#[derive(Default)]
pub struct ApplicationContextBuilder {
    namespaces: Vec<String>,
    property_files: Vec<PathBuf>,
    scanner: Option<Box<dyn ComponentScanner>>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.extend(namespaces.into_iter().map(Into::into));
        self
    }

    pub fn property_file(mut self, path: impl AsRef<Path>) -> Self {
        self.property_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn property_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.property_files
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// 替换默认的 [`InventoryScanner`]
    pub fn scanner(mut self, scanner: impl ComponentScanner + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    /// 构建并启动上下文
    pub fn build(self) -> ContainerResult<ApplicationContext> {
        match self.scanner {
            Some(scanner) => {
                ApplicationContext::bootstrap_with(scanner.as_ref(), self.namespaces, self.property_files)
            }
            None => ApplicationContext::bootstrap(self.namespaces, self.property_files),
        }
    }
}
