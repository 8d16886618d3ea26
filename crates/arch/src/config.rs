//! 分析配置

/// 分析配置
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// 源文件扩展名 (不含点)
    pub extensions: Vec<String>,
    /// 遍历时跳过的目录名
    pub skip_dirs: Vec<String>,
    /// 构造方法名
    pub constructor: String,
    /// 并行解析 (合并顺序固定, 输出与串行一致)
    pub parallel: bool,
    /// PlantUML 渲染命令
    pub plantuml_command: String,
    /// Mermaid 渲染命令
    pub mmdc_command: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            skip_dirs: ["__pycache__", ".git", ".venv", "venv", "node_modules"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            constructor: "__init__".to_string(),
            parallel: true,
            plantuml_command: "plantuml".to_string(),
            mmdc_command: "mmdc".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[doc(hidden)]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("CLASSMAP_EXTENSIONS") {
            let extensions = split_list(&v, true);
            if !extensions.is_empty() {
                config.extensions = extensions;
            }
        }

        if let Some(v) = lookup("CLASSMAP_SKIP_DIRS") {
            config.skip_dirs = split_list(&v, false);
        }

        if let Some(v) = lookup("CLASSMAP_CONSTRUCTOR") {
            if !v.trim().is_empty() {
                config.constructor = v.trim().to_string();
            }
        }

        if let Some(v) = lookup("CLASSMAP_PARALLEL") {
            config.parallel = !matches!(
                v.trim().to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        if let Some(v) = lookup("CLASSMAP_PLANTUML") {
            config.plantuml_command = v;
        }

        if let Some(v) = lookup("CLASSMAP_MMDC") {
            config.mmdc_command = v;
        }

        config
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 扩展名是否属于源文件 (大小写不敏感)
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

fn split_list(value: &str, strip_dot: bool) -> Vec<String> {
    value
        .split(',')
        .map(|item| {
            let item = item.trim();
            if strip_dot {
                item.trim_start_matches('.')
            } else {
                item
            }
        })
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}
