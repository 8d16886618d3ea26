use crate::collector::{SourceCollector, SourceFile};
use crate::config::AnalyzerConfig;
use crate::error::{ArchError, FileSkipped, Result};
use crate::model::{AnalysisModel, FileAnalysis};
use crate::visitor::StructuralVisitor;
use rayon::prelude::*;
use std::path::Path;
use syntax::{PythonParser, SourceParser};

/// 一次分析的结果
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub model: AnalysisModel,
    /// 被跳过的文件/目录, 按遇到的顺序
    pub skipped: Vec<FileSkipped>,
    /// 成功解析的文件数
    pub files_analyzed: usize,
}

/// 模型合并器
///
/// 类按名字插入, 同名时后合并的覆盖先前的; 函数与导入只追加不去重.
#[derive(Debug, Default)]
pub struct ModelAssembler {
    model: AnalysisModel,
}

impl ModelAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, file: FileAnalysis) {
        for class in file.classes {
            let name = class.name.clone();
            let file_path = class.file_path.clone();
            if let Some(previous) = self.model.classes.insert(name, class) {
                tracing::debug!(
                    "Class {} from {} replaced by declaration in {}",
                    previous.name,
                    previous.file_path,
                    file_path
                );
            }
        }
        self.model.functions.extend(file.functions);
        self.model.imports.extend(file.imports);
    }

    pub fn finish(self) -> AnalysisModel {
        self.model
    }
}

/// 结构分析器
pub struct StructureAnalyzer {
    config: AnalyzerConfig,
}

impl StructureAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// 分析根目录下的 Python 源码
    pub fn analyze(&self, root: &Path) -> Result<Analysis> {
        self.analyze_with(root, PythonParser::new)
    }

    /// 使用指定的解析器分析
    ///
    /// 文件按路径字典序处理; 并行模式下每个工作线程各建一个解析器, 结果仍按该顺序合并.
    pub fn analyze_with<P, F>(&self, root: &Path, make_parser: F) -> Result<Analysis>
    where
        P: SourceParser,
        F: Fn() -> syntax::Result<P> + Sync + Send,
    {
        if !root.is_dir() {
            return Err(ArchError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }
        let root = root.canonicalize().map_err(|_| ArchError::InvalidRoot {
            path: root.to_path_buf(),
        })?;

        // 语言初始化失败是致命错误, 在遍历前暴露
        let mut parser = make_parser()?;

        let (files, mut skipped) = SourceCollector::new(&root, &self.config).collect();
        tracing::info!(
            "Analyzing {} {} files under {}",
            files.len(),
            parser.language(),
            root.display()
        );

        let outcomes: Vec<std::result::Result<FileAnalysis, FileSkipped>> =
            if self.config.parallel {
                files
                    .par_iter()
                    .map_init(&make_parser, |worker, file| match worker {
                        Ok(parser) => self.analyze_file(parser, file),
                        Err(e) => Err(FileSkipped::new(&file.path, e)),
                    })
                    .collect()
            } else {
                files
                    .iter()
                    .map(|file| self.analyze_file(&mut parser, file))
                    .collect()
            };

        let mut assembler = ModelAssembler::new();
        let mut files_analyzed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(file) => {
                    files_analyzed += 1;
                    assembler.merge(file);
                }
                Err(skip) => {
                    tracing::debug!("{}", skip);
                    skipped.push(skip);
                }
            }
        }

        let model = assembler.finish();
        tracing::info!(
            "Found {} classes, {} functions, {} imports ({} files skipped)",
            model.classes.len(),
            model.functions.len(),
            model.imports.len(),
            skipped.len()
        );

        Ok(Analysis {
            model,
            skipped,
            files_analyzed,
        })
    }

    fn analyze_file<P: SourceParser>(
        &self,
        parser: &mut P,
        file: &SourceFile,
    ) -> std::result::Result<FileAnalysis, FileSkipped> {
        let source = file.read()?;
        let module = parser
            .parse(&source)
            .map_err(|e| FileSkipped::new(&file.path, e))?;

        let file_path = file.path.to_string_lossy();
        let visitor = StructuralVisitor::new(&file_path, &file.package, &self.config.constructor);
        Ok(visitor.visit_module(&module))
    }
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}
