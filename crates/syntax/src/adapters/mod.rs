mod python;

pub use python::PythonParser;

use crate::types::{Module, Result};

/// 语言解析器 trait
///
/// 每个实例持有自己的底层解析器, 不能跨线程共享; 并行解析时每个线程各建一个.
pub trait SourceParser: Send {
    /// 语言名称
    fn language(&self) -> &'static str;

    /// 解析一个文件的源码, 含语法错误的文件返回 `ParseError::Syntax`
    fn parse(&mut self, source: &str) -> Result<Module>;
}
