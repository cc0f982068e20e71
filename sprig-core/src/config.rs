use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigLoadError;
use crate::properties;

/// 扁平的配置映射：键 -> 字符串值
///
/// 通过依次合并多个配置源构建，后合并的值覆盖先前的值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMap {
    properties: HashMap<String, String>,
}

impl ConfigurationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取配置值，不存在时返回 None
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// 获取配置值（带默认值）
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// 获取并解析配置值，不存在或解析失败时返回 None
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// 插入配置值，返回被覆盖的旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    /// 合并另一个配置映射，重复的键以 `other` 为准
    pub fn merge(&mut self, other: ConfigurationMap) {
        self.properties.extend(other.properties);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigurationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ConfigurationMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// 配置存储 - 从磁盘加载配置文件并合并为一个 [`ConfigurationMap`]
///
/// `.toml` 文件按 TOML 解析并展平为点分隔的键，其余文件按 properties 格式解析。
/// 无法读取或解析的文件只记录警告并跳过，不会中止启动。
#[derive(Debug, Default)]
pub struct ConfigurationStore {
    properties: ConfigurationMap,
    warnings: Vec<ConfigLoadError>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序加载所有配置文件，后加载的文件覆盖先前的同名键
    pub fn load<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut store = Self::new();
        for path in paths {
            let path = path.as_ref();
            match store.load_file(path) {
                Ok(count) => {
                    tracing::info!("Loaded {} property(ies) from {:?}", count, path);
                }
                Err(e) => {
                    tracing::warn!("{}, skipping", e);
                    store.warnings.push(e);
                }
            }
        }

        tracing::debug!(
            "Configuration loaded: {} key(s), {} source(s) skipped",
            store.properties.len(),
            store.warnings.len()
        );
        store
    }

    /// 加载单个配置文件并合并到当前存储
    ///
    /// 文件要么整体生效，要么完全不生效；返回该文件贡献的键数量
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ConfigLoadError> {
        let source = read_source(path.as_ref())?;
        let count = source.len();
        self.properties.merge(source);
        Ok(count)
    }

    pub fn properties(&self) -> &ConfigurationMap {
        &self.properties
    }

    /// 加载过程中被跳过的配置源
    pub fn warnings(&self) -> &[ConfigLoadError] {
        &self.warnings
    }

    pub fn into_properties(self) -> ConfigurationMap {
        self.properties
    }

    /// 拆分为合并后的配置和被跳过的配置源
    pub fn into_parts(self) -> (ConfigurationMap, Vec<ConfigLoadError>) {
        (self.properties, self.warnings)
    }
}

fn read_source(path: &Path) -> Result<ConfigurationMap, ConfigLoadError> {
    let io_error = |source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    // 文件句柄只在这个作用域内存活，无论成功与否都会在离开时释放
    let content = {
        let mut file = File::open(path).map_err(io_error)?;
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(io_error)?;
        content
    };

    if is_toml(path) {
        parse_toml(&content).map_err(|message| ConfigLoadError::Toml {
            path: path.to_path_buf(),
            message,
        })
    } else {
        properties::parse(&content)
            .map(|pairs| pairs.into_iter().collect::<ConfigurationMap>())
            .map_err(|e| ConfigLoadError::Parse {
                path: PathBuf::from(path),
                line: e.line,
                message: e.message,
            })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

fn parse_toml(content: &str) -> Result<ConfigurationMap, String> {
    let value: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut map = ConfigurationMap::new();
    flatten_toml(&value, String::new(), &mut map);
    Ok(map)
}

/// 展平 TOML 结构
/// 例如: { database: { url: "xxx" } } -> { "database.url": "xxx" }
fn flatten_toml(value: &toml::Value, prefix: String, result: &mut ConfigurationMap) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_toml(val, new_prefix, result);
            }
        }
        other => {
            result.insert(prefix, toml_scalar_to_string(other));
        }
    }
}

/// 标量转为字符串，数组以逗号连接
fn toml_scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(arr) => arr
            .iter()
            .map(toml_scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        toml::Value::Table(table) => toml::Value::Table(table.clone()).to_string(),
    }
}
