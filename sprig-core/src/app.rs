use std::path::PathBuf;
use std::time::Instant;

use crate::context::ApplicationContext;
use crate::error::ApplicationResult;
use crate::logging::LoggingConfig;

/// 启动完成后执行的初始化器
pub type Initializer = Box<dyn Fn(&ApplicationContext) -> ApplicationResult<()> + Send + Sync>;

/// Sprig 应用程序
///
/// 提供便捷的应用启动方式：初始化日志、打印 banner、启动上下文、执行初始化器
///
/// ```ignore
/// let context = SprigApplication::new("inventory-service")
///     .namespace("inventory_service::components")
///     .property_file("application.properties")
///     .run()?;
/// ```
pub struct SprigApplication {
    name: String,
    namespaces: Vec<String>,
    property_files: Vec<PathBuf>,
    show_banner: bool,
    init_logging: bool,
    logging_config: Option<LoggingConfig>,
    initializers: Vec<Initializer>,
}

impl SprigApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            property_files: Vec::new(),
            show_banner: true,
            init_logging: true,
            logging_config: None,
            initializers: Vec::new(),
        }
    }

    /// 添加要扫描的命名空间
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

    /// 添加配置文件，后添加的文件优先
    pub fn property_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.property_files.push(path.into());
        self
    }

    pub fn property_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.property_files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 设置日志配置，不设置时从环境变量读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 是否由启动器安装全局日志订阅者（默认：是）
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// 添加初始化器，在上下文就绪后按添加顺序执行
    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&ApplicationContext) -> ApplicationResult<()> + Send + Sync + 'static,
    {
        self.initializers.push(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 运行应用，启动进程级上下文
    ///
    /// 若进程级上下文已存在，直接复用它
    pub fn run(self) -> ApplicationResult<&'static ApplicationContext> {
        let start_time = self.prepare()?;
        let context = ApplicationContext::get_instance(self.namespaces.clone(), self.property_files.clone())?;
        self.finish(context, start_time)?;
        Ok(context)
    }

    /// 运行应用，构建不接触全局状态的独立上下文
    pub fn run_isolated(self) -> ApplicationResult<ApplicationContext> {
        let start_time = self.prepare()?;
        let context = ApplicationContext::bootstrap(self.namespaces.clone(), self.property_files.clone())?;
        self.finish(&context, start_time)?;
        Ok(context)
    }

    fn prepare(&self) -> ApplicationResult<Instant> {
        if self.init_logging {
            let logging_config = self.logging_config.clone().unwrap_or_else(LoggingConfig::from_env);
            logging_config.init()?;
        }

        let start_time = Instant::now();

        if self.show_banner {
            self.print_banner();
        }

        tracing::info!("Starting {} application", self.name);
        if self.property_files.is_empty() {
            tracing::info!("No property files configured");
        }
        Ok(start_time)
    }

    fn finish(&self, context: &ApplicationContext, start_time: Instant) -> ApplicationResult<()> {
        for (idx, initializer) in self.initializers.iter().enumerate() {
            tracing::debug!("Running initializer {}", idx + 1);
            initializer(context).map_err(|e| {
                tracing::error!("Initializer {} failed: {}", idx + 1, e);
                e
            })?;
        }

        tracing::info!(
            "Started {} in {}ms ({} component(s))",
            self.name,
            start_time.elapsed().as_millis(),
            context.get_components_size()
        );
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(r"   ____             _        ");
        println!(r"  / ___| _ __  _ __(_) __ _  ");
        println!(r"  \___ \| '_ \| '__| |/ _` | ");
        println!(r"   ___) | |_) | |  | | (_| | ");
        println!(r"  |____/| .__/|_|  |_|\__, | ");
        println!(r"        |_|           |___/  ");
        println!();
        println!("  :: Sprig ::        (v{})", env!("CARGO_PKG_VERSION"));
        println!();
    }
}

impl Default for SprigApplication {
    fn default() -> Self {
        Self::new("SprigApplication")
    }
}
