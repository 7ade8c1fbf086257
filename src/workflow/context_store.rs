//! 单篇文献的阶段结果存储
//!
//! 每篇文献独享一个存储，随流水线创建、随流水线丢弃，不在文献之间共享。

use std::collections::HashMap;

use crate::error::ContextError;
use crate::workflow::stage::{StageDefinition, StageId, StageResult};

/// 阶段结果存储
///
/// - 每个阶段只能写入一次
/// - 读取必须来自已声明的依赖，且依赖已完成
#[derive(Debug, Default)]
pub struct ContextStore {
    results: HashMap<StageId, StageResult>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个阶段的结果
    pub fn put(&mut self, result: StageResult) -> Result<(), ContextError> {
        if self.results.contains_key(&result.stage_id) {
            return Err(ContextError::AlreadyRecorded(result.stage_id));
        }
        self.results.insert(result.stage_id, result);
        Ok(())
    }

    /// 以 `requester` 的身份读取依赖 `dependency` 的结果
    pub fn get(
        &self,
        requester: &StageDefinition,
        dependency: StageId,
    ) -> Result<&StageResult, ContextError> {
        if !requester.depends_on(dependency) {
            return Err(ContextError::UndeclaredDependency {
                requester: requester.id,
                dependency,
            });
        }
        self.results
            .get(&dependency)
            .ok_or(ContextError::NotCompleted {
                requester: requester.id,
                dependency,
            })
    }

    /// 按声明顺序读取 `requester` 的全部依赖
    pub fn dependencies_of(
        &self,
        requester: &StageDefinition,
    ) -> Result<Vec<&StageResult>, ContextError> {
        requester
            .dependencies
            .iter()
            .map(|dep| self.get(requester, *dep))
            .collect()
    }

    /// 取出某个阶段的结果并消费存储
    pub fn into_result(mut self, stage: StageId) -> Option<StageResult> {
        self.results.remove(&stage)
    }
}
