use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("syntax error at line {line}")]
    Syntax { line: u32 },
    #[error("language error: {0}")]
    Language(String),
    #[error("parser produced no tree")]
    NoTree,
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// 模块 - 一个源文件的语法树
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// 语句节点
///
/// 只保留结构分析关心的节点种类, 其余语句归入 `Nested` (含子块) 或 `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ClassDef(ClassDef),
    FunctionDef(FunctionDef),
    /// `import a.b, c as d` -> ["a.b", "c"]
    Import(Vec<String>),
    /// `from m import x` -> Some("m"), `from . import x` -> None
    ImportFrom(Option<String>),
    Assign(Assign),
    /// 表达式语句
    Expr(Expr),
    /// 复合语句 (if/for/while/try/with/match) 内所有子块的语句, 按源码顺序展开
    Nested(Vec<Stmt>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    /// 1-based
    pub line: u32,
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub line: u32,
    /// 参数, 按声明顺序; 普通参数取名字, `*args` / `**kwargs` / `*` 等保留原文
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// 赋值语句, 链式赋值 `a = b = f()` 展开为多个 target
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub line: u32,
    pub targets: Vec<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute { value: Box<Expr>, attr: String },
    Call { func: Box<Expr> },
    Other,
}

impl Expr {
    pub fn name(id: &str) -> Self {
        Expr::Name(id.to_string())
    }

    pub fn attribute(value: Expr, attr: &str) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.to_string(),
        }
    }

    pub fn call(func: Expr) -> Self {
        Expr::Call {
            func: Box::new(func),
        }
    }

    /// 简单名字 (非限定) 的标识符
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_builders() {
        let expr = Expr::call(Expr::attribute(Expr::name("obj"), "run"));
        match expr {
            Expr::Call { func } => match *func {
                Expr::Attribute { value, attr } => {
                    assert_eq!(attr, "run");
                    assert_eq!(value.as_name(), Some("obj"));
                }
                other => panic!("unexpected func: {:?}", other),
            },
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_as_name_only_for_simple_names() {
        assert_eq!(Expr::name("Foo").as_name(), Some("Foo"));
        assert_eq!(Expr::attribute(Expr::name("abc"), "ABC").as_name(), None);
        assert_eq!(Expr::Other.as_name(), None);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Syntax { line: 7 };
        assert_eq!(err.to_string(), "syntax error at line 7");
    }
}
