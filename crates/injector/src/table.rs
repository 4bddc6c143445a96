//! Двухуровневое хранилище: TypeKey -> Name -> V
//!
//! Каждая операция берет lock ровно на одно обращение. Lock никогда не
//! удерживается во время вызова recipe, поэтому recipe может сам обращаться
//! к реестру.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::key::{Name, RegistryKey, TypeKey};

pub struct Table<V> {
    rows: RwLock<HashMap<TypeKey, HashMap<Name, V>>>,
}

impl<V: Clone> Table<V> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Записать значение, вернуть вытесненное
    pub fn set(&self, type_key: TypeKey, name: Name, value: V) -> Option<V> {
        let mut rows = self.rows.write();
        rows.entry(type_key).or_default().insert(name, value)
    }

    pub fn get(&self, type_key: &TypeKey, name: &Name) -> Option<V> {
        let rows = self.rows.read();
        rows.get(type_key).and_then(|names| names.get(name)).cloned()
    }

    pub fn contains(&self, type_key: &TypeKey, name: &Name) -> bool {
        let rows = self.rows.read();
        rows.get(type_key)
            .is_some_and(|names| names.contains_key(name))
    }

    pub fn delete(&self, type_key: &TypeKey, name: &Name) -> Option<V> {
        self.delete_if(type_key, name, |_| true)
    }

    /// Удалить значение, только если `predicate` его принимает
    pub fn delete_if<P>(&self, type_key: &TypeKey, name: &Name, predicate: P) -> Option<V>
    where
        P: FnOnce(&V) -> bool,
    {
        let mut rows = self.rows.write();
        let names = rows.get_mut(type_key)?;
        if !names.get(name).is_some_and(predicate) {
            return None;
        }

        let removed = names.remove(name);
        if names.is_empty() {
            rows.remove(type_key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        let rows = self.rows.read();
        rows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Все ключи, отсортированные
    pub fn keys(&self) -> Vec<RegistryKey> {
        let rows = self.rows.read();
        let mut keys: Vec<RegistryKey> = rows
            .iter()
            .flat_map(|(type_key, names)| {
                names
                    .keys()
                    .map(|name| RegistryKey::new(type_key.clone(), name.clone()))
            })
            .collect();
        keys.sort();
        keys
    }

    pub fn clear(&self) {
        self.rows.write().clear();
    }
}

impl<V: Clone> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}
