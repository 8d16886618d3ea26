//! 图渲染 - 调用外部命令 (plantuml / mmdc) 把图描述渲染为图片
//!
//! 渲染失败不影响已写出的文件, 调用方只记录警告.

use crate::config::AnalyzerConfig;
use crate::export::DiagramFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("renderer command is empty")]
    EmptyCommand,
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// 渲染器 trait
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 渲染图描述文件, 返回产物路径
    async fn render(&self, diagram: &Path) -> Result<PathBuf, RenderError>;
}

/// 外部命令渲染器
///
/// 参数中的 `{input}` / `{output}` 替换为图描述文件与图片路径.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: String,
    args: Vec<String>,
}

impl CommandRenderer {
    /// `command` 可带参数, 按空白分割
    pub fn new(command: &str, args: &[&str]) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        let mut all_args: Vec<String> = parts.collect();
        all_args.extend(args.iter().map(|a| a.to_string()));
        Self {
            command: program,
            args: all_args,
        }
    }

    pub fn plantuml(command: &str) -> Self {
        Self::new(command, &["{input}"])
    }

    pub fn mermaid(command: &str) -> Self {
        Self::new(command, &["-i", "{input}", "-o", "{output}"])
    }

    pub fn for_format(format: DiagramFormat, config: &AnalyzerConfig) -> Self {
        match format {
            DiagramFormat::PlantUml => Self::plantuml(&config.plantuml_command),
            DiagramFormat::Mermaid => Self::mermaid(&config.mmdc_command),
        }
    }

    pub fn program(&self) -> &str {
        &self.command
    }

    #[doc(hidden)]
    pub fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }

    /// 图片路径: 替换图描述文件的扩展名为 png
    pub fn output_path(diagram: &Path) -> PathBuf {
        diagram.with_extension("png")
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(&self, diagram: &Path) -> Result<PathBuf, RenderError> {
        if self.command.is_empty() {
            return Err(RenderError::EmptyCommand);
        }

        let output = Self::output_path(diagram);
        let args = self.expand_args(diagram, &output);
        tracing::info!("Rendering: {} {:?}", self.command, args);

        let status = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| RenderError::Launch {
                program: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(RenderError::Failed {
                program: self.command.clone(),
                status,
            });
        }
        Ok(output)
    }
}

/// 渲染并吞掉错误; 失败时记录警告
pub async fn render_diagram<R: Renderer + ?Sized>(renderer: &R, diagram: &Path) -> Option<PathBuf> {
    match renderer.render(diagram).await {
        Ok(image) => {
            tracing::info!("Rendered {}", image.display());
            Some(image)
        }
        Err(e) => {
            tracing::warn!("Could not render {}: {}", diagram.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_inline_args() {
        let renderer = CommandRenderer::plantuml("java -jar plantuml.jar");
        assert_eq!(renderer.program(), "java");
        let args = renderer.expand_args(Path::new("out/d.puml"), Path::new("out/d.png"));
        assert_eq!(args, vec!["-jar", "plantuml.jar", "out/d.puml"]);
    }

    #[test]
    fn test_mermaid_args() {
        let renderer = CommandRenderer::mermaid("mmdc");
        let output = CommandRenderer::output_path(Path::new("d.mmd"));
        assert_eq!(output, PathBuf::from("d.png"));
        let args = renderer.expand_args(Path::new("d.mmd"), &output);
        assert_eq!(args, vec!["-i", "d.mmd", "-o", "d.png"]);
    }

    #[test]
    fn test_for_format_uses_config_commands() {
        let config = AnalyzerConfig {
            plantuml_command: "puml-bin".to_string(),
            ..AnalyzerConfig::default()
        };
        let plantuml = CommandRenderer::for_format(DiagramFormat::PlantUml, &config);
        let mermaid = CommandRenderer::for_format(DiagramFormat::Mermaid, &config);
        assert_eq!(plantuml.program(), "puml-bin");
        assert_eq!(mermaid.program(), "mmdc");
    }

    #[tokio::test]
    async fn test_empty_command() {
        let renderer = CommandRenderer::plantuml("   ");
        let result = renderer.render(Path::new("d.puml")).await;
        assert!(matches!(result, Err(RenderError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let renderer = CommandRenderer::plantuml("classmap-no-such-renderer-binary");
        let result = renderer.render(Path::new("d.puml")).await;
        assert!(matches!(result, Err(RenderError::Launch { .. })));
        assert!(render_diagram(&renderer, Path::new("d.puml")).await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let renderer = CommandRenderer::new("false", &[]);
        let result = renderer.render(Path::new("d.puml")).await;
        assert!(matches!(result, Err(RenderError::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_render_returns_image_path() {
        let renderer = CommandRenderer::new("true", &["{input}"]);
        let image = renderer.render(Path::new("out/d.puml")).await.unwrap();
        assert_eq!(image, PathBuf::from("out/d.png"));
    }
}
