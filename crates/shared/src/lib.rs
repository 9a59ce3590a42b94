use std::fmt;

use serde::{Deserialize, Serialize};

/// Узел входного иерархического набора данных.
///
/// Листья несут `value`, внутренние узлы несут `children`. Схема не
/// проверяется: отсутствующее значение просто считается нулём при суммировании.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DatasetNode>>,
}

impl DatasetNode {
    /// Лист с числовым значением
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: None,
        }
    }

    /// Внутренний узел с дочерними узлами
    pub fn branch(name: impl Into<String>, children: Vec<DatasetNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: Some(children),
        }
    }

    /// Дочерние узлы (пустой срез для листа)
    pub fn children(&self) -> &[DatasetNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Разобрать набор данных из JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Количество узлов в поддереве (включая этот)
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(DatasetNode::count).sum::<usize>()
    }
}

/// Позиция здания на сетке игрушечного города
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub z: u32,
}

impl GridPos {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}
