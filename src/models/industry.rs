use serde::Serialize;

/// 同花顺行业板块
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Industry {
    pub name: String,
    /// 数据源的板块代码，例如 881121
    pub code: String,
}

impl Industry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}
