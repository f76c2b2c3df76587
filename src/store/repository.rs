//! 仓库抽象
//!
//! 核心逻辑只依赖 `get`/`upsert` 能力，不关心对象如何缓存或持久化。

use std::collections::HashMap;
use std::hash::Hash;

pub trait Repository<K, V> {
    fn get(&self, key: &K) -> Option<&V>;
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;
    /// 插入或替换，返回被替换的旧值
    fn upsert(&mut self, key: K, value: V) -> Option<V>;

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// 所有键，按升序排列
    fn keys(&self) -> Vec<K>;
}

/// 基于 `HashMap` 的内存仓库
#[derive(Debug)]
pub struct InMemoryRepository<K, V> {
    items: HashMap<K, V>,
}

impl<K, V> Default for InMemoryRepository<K, V> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<K, V> InMemoryRepository<K, V> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Eq + Hash + Ord + Clone, V> Repository<K, V> for InMemoryRepository<K, V> {
    fn get(&self, key: &K) -> Option<&V> {
        self.items.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.items.get_mut(key)
    }

    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        self.items.insert(key, value)
    }

    fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.items.keys().cloned().collect();
        keys.sort();
        keys
    }
}
