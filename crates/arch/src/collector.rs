use crate::config::AnalyzerConfig;
use crate::error::FileSkipped;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// 待分析的源文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: String,
}

impl SourceFile {
    /// 读取源码; 读失败或非 UTF-8 时返回跳过记录
    pub fn read(&self) -> Result<String, FileSkipped> {
        let bytes = fs::read(&self.path).map_err(|e| FileSkipped::new(&self.path, e))?;
        String::from_utf8(bytes)
            .map_err(|e| FileSkipped::new(&self.path, format!("invalid UTF-8: {}", e.utf8_error())))
    }
}

/// 源文件收集器
pub struct SourceCollector<'a> {
    root: &'a Path,
    config: &'a AnalyzerConfig,
}

impl<'a> SourceCollector<'a> {
    pub fn new(root: &'a Path, config: &'a AnalyzerConfig) -> Self {
        Self { root, config }
    }

    /// 递归收集源文件, 按路径字典序返回
    ///
    /// 无法列出的目录记为跳过, 不中断遍历.
    pub fn collect(&self) -> (Vec<SourceFile>, Vec<FileSkipped>) {
        let mut paths = Vec::new();
        let mut skipped = Vec::new();
        self.walk(self.root, &mut paths, &mut skipped);
        paths.sort();

        let files = paths
            .into_iter()
            .map(|path| SourceFile {
                package: package_name(self.root, &path),
                path,
            })
            .collect();
        (files, skipped)
    }

    fn walk(&self, dir: &Path, paths: &mut Vec<PathBuf>, skipped: &mut Vec<FileSkipped>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                skipped.push(FileSkipped::new(dir, e));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skipped.push(FileSkipped::new(dir, e));
                    continue;
                }
            };
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            // 不跟随目录符号链接, 避免环
            if file_type.is_dir() {
                if !self.is_skipped_dir(&path) {
                    self.walk(&path, paths, skipped);
                }
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && self.is_source(&path)
            {
                paths.push(path);
            }
        }
    }

    fn is_skipped_dir(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.config.skip_dirs.iter().any(|d| name == d.as_str()))
            .unwrap_or(false)
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.config.is_source_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }
}

/// 由相对根目录的路径计算包名: 去掉文件名, 目录段以 `.` 连接
pub fn package_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let Some(dir) = relative.parent() else {
        return String::new();
    };

    dir.components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}
