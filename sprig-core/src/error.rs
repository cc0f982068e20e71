//! 统一的错误处理类型
//!
//! 容器错误分为两类：
//! - 配置加载错误（[`ConfigLoadError`]）：非致命，记录警告后跳过该配置源
//! - 容器错误（[`ContainerError`]）：致命，中止启动并返回给调用者

use std::path::PathBuf;
use thiserror::Error;

/// 容器操作的结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动器的结果类型
pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 组件无法通过无参构造创建
    #[error("Failed to instantiate component '{type_name}': {source}")]
    Instantiation {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 解析出的值无法写入目标字段
    #[error("Cannot inject field '{field}' of component '{component}': {reason}")]
    FieldAccess {
        component: String,
        field: String,
        reason: String,
    },

    /// 扫描器无法枚举指定命名空间
    #[error("Cannot scan namespace '{namespace}': {reason}")]
    Discovery { namespace: String, reason: String },
}

impl ContainerError {
    pub fn instantiation(type_name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    pub fn field_access(
        component: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldAccess {
            component: component.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn discovery(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Discovery {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}

/// 配置文件加载错误
///
/// 只会被记录为警告，不会中止启动
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Error loading property file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed property file {path:?} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Malformed TOML file {path:?}: {message}")]
    Toml { path: PathBuf, message: String },
}

impl ConfigLoadError {
    /// 出错的配置文件路径
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigLoadError::Io { path, .. }
            | ConfigLoadError::Parse { path, .. }
            | ConfigLoadError::Toml { path, .. } => path,
        }
    }
}

/// 应用启动器错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}
