//! syntax - 源码解析
//!
//! 基于 tree-sitter 把源文件转换为结构分析使用的语法树

mod adapters;
mod types;

pub use adapters::{PythonParser, SourceParser};
pub use types::{Assign, ClassDef, Expr, FunctionDef, Module, ParseError, Result, Stmt};
