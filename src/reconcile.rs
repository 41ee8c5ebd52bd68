//! 集合差分：根据当前集合与期望集合计算需要新增和移除的键。
//!
//! 与关系种类无关，群组成员和房间授权都走这里。移除到底是硬删除
//! 还是撤销，由调用方决定（见 [`crate::assignment`]）。

use std::collections::BTreeSet;

use serde::Serialize;

/// 一次差分的结果，两个序列都按键升序排列且互不相交。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff<K> {
    pub to_add: Vec<K>,
    pub to_remove: Vec<K>,
}

impl<K: Ord + Clone> Diff<K> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// 先移除后新增，得到应用差分之后的集合
    pub fn apply<I>(&self, current: I) -> BTreeSet<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut state: BTreeSet<K> = current.into_iter().collect();
        for key in &self.to_remove {
            state.remove(key);
        }
        state.extend(self.to_add.iter().cloned());
        state
    }
}

/// 计算 `to_remove = current − desired` 与 `to_add = desired − current`。
///
/// 两侧输入都会先去重，重复勾选同一个 id 不会产生重复操作。
pub fn reconcile<K, C, D>(current: C, desired: D) -> Diff<K>
where
    K: Ord + Clone,
    C: IntoIterator<Item = K>,
    D: IntoIterator<Item = K>,
{
    let current: BTreeSet<K> = current.into_iter().collect();
    let desired: BTreeSet<K> = desired.into_iter().collect();

    Diff {
        to_add: desired.difference(&current).cloned().collect(),
        to_remove: current.difference(&desired).cloned().collect(),
    }
}
