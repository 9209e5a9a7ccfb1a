//! `Dict`: the hand-rolled bucketed hash table backing `Value::Dict`
//! (spec §4.3). Deliberately not a wrapper over `std::collections::HashMap`:
//! the spec describes bucket storage and an explicit resize-on-load-factor
//! rule, so the table is built the way the spec describes it rather than
//! through a library's opaque internals.

use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHasher;

use crate::value::{values_equal, Value};

const INITIAL_BUCKETS: usize = 8;
const MAX_LOAD_FACTOR: f64 = 0.7;

/// Hash a key value. Only scalar, comparable-by-value types are hashable;
/// containers and callables are rejected with a descriptive message, the
/// same restriction the `mataburros` type-check in the source enforces.
fn hash_key(key: &Value) -> Result<u64, String> {
    let mut hasher = AHasher::default();
    match key {
        Value::Number(n) => {
            // Integral floats hash identically to the equal-valued int, so
            // `1` and `1.0` land in the same bucket (numbers subsume
            // int/float, spec §3).
            let bits = n.as_f64().to_bits();
            bits.hash(&mut hasher);
        }
        Value::Str(s) => {
            0u8.hash(&mut hasher);
            s.hash(&mut hasher);
        }
        Value::Bool(b) => {
            1u8.hash(&mut hasher);
            b.hash(&mut hasher);
        }
        Value::Nil => {
            2u8.hash(&mut hasher);
        }
        other => return Err(format!("'{}' no es hasheable, no puede usarse como clave", other.type_name())),
    }
    Ok(hasher.finish())
}

/// A bucketed hash table over `Value` keys, doubling its bucket count
/// whenever the load factor would exceed [`MAX_LOAD_FACTOR`].
pub struct Dict {
    buckets: Vec<Vec<(Value, Value)>>,
    len: usize,
    /// Preserves first-insertion order across buckets for iteration and
    /// `Display`, since bucket order alone isn't stable across a resize.
    order: Vec<Value>,
}

impl Dict {
    pub fn new() -> Self {
        Self { buckets: (0..INITIAL_BUCKETS).map(|_| Vec::new()).collect(), len: 0, order: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) % self.buckets.len()
    }

    fn resize(&mut self) {
        let new_count = self.buckets.len() * 2;
        let mut new_buckets: Vec<Vec<(Value, Value)>> = (0..new_count).map(|_| Vec::new()).collect();
        for bucket in self.buckets.drain(..) {
            for (k, v) in bucket {
                let hash = hash_key(&k).expect("already-hashable key");
                let idx = (hash as usize) % new_count;
                new_buckets[idx].push((k, v));
            }
        }
        self.buckets = new_buckets;
    }

    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), String> {
        let hash = hash_key(&key)?;
        let idx = self.bucket_of(hash);
        if let Some(slot) = self.buckets[idx].iter_mut().find(|(k, _)| values_equal(k, &key)) {
            slot.1 = value;
            return Ok(());
        }
        self.buckets[idx].push((key.clone(), value));
        self.order.push(key);
        self.len += 1;
        if self.load_factor() > MAX_LOAD_FACTOR {
            self.resize();
        }
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, String> {
        let hash = hash_key(key)?;
        let idx = self.bucket_of(hash);
        Ok(self.buckets[idx].iter().find(|(k, _)| values_equal(k, key)).map(|(_, v)| v.clone()))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, String> {
        Ok(self.get(key)?.is_some())
    }

    pub fn remove(&mut self, key: &Value) -> Result<Option<Value>, String> {
        let hash = hash_key(key)?;
        let idx = self.bucket_of(hash);
        let bucket = &mut self.buckets[idx];
        if let Some(pos) = bucket.iter().position(|(k, _)| values_equal(k, key)) {
            let (k, v) = bucket.remove(pos);
            self.len -= 1;
            if let Some(order_pos) = self.order.iter().position(|ok| values_equal(ok, &k)) {
                self.order.remove(order_pos);
            }
            return Ok(Some(v));
        }
        Ok(None)
    }

    pub fn clear(&mut self) {
        self.buckets = (0..INITIAL_BUCKETS).map(|_| Vec::new()).collect();
        self.order.clear();
        self.len = 0;
    }

    /// Iterate entries in insertion order (stable across resizes).
    pub fn iter(&self) -> impl Iterator<Item = (Value, Value)> + '_ {
        self.order.iter().map(move |k| {
            let v = self.get(k).ok().flatten().expect("key present in order list");
            (k.clone(), v)
        })
    }

    pub fn keys(&self) -> Vec<Value> {
        self.order.clone()
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
