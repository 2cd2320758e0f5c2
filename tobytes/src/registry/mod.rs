// Copyright 2015-2023 Swim Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use tobytes_model::Object;

use crate::engine::{DecodeHandle, EncodeHandle};
use crate::error::EngineError;


/// Errors produced by user codecs. Engine errors from recursive calls
/// convert transparently.
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A codec for a single `(namespace, type_id)` pair. The handles give
/// recursive access to the engine so that payloads can themselves be
/// tobytes messages.
pub trait TypeCodec: Send + Sync {
    fn encode(&self, engine: &EncodeHandle<'_>, body: &Object) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, engine: &DecodeHandle<'_>, data: &[u8]) -> Result<Object, CodecError>;
}

/// A handler dispatching every type id of a namespace through one pair of
/// functions.
pub trait NamespaceFallback: Send + Sync {
    fn encode(
        &self,
        engine: &EncodeHandle<'_>,
        type_id: u32,
        body: &Object,
    ) -> Result<Vec<u8>, CodecError>;

    fn decode(
        &self,
        engine: &DecodeHandle<'_>,
        type_id: u32,
        data: &[u8],
    ) -> Result<Object, CodecError>;
}

/// The result of resolving a `(namespace, type_id)` pair against a registry.
pub enum Lookup<'a> {
    Codec(&'a Arc<dyn TypeCodec>),
    Fallback(&'a Arc<dyn NamespaceFallback>),
    UnknownType,
    UnknownNamespace,
}

#[derive(Clone, Default)]
struct NamespaceEntry {
    codecs: HashMap<u32, Arc<dyn TypeCodec>>,
    fallback: Option<Arc<dyn NamespaceFallback>>,
}

/// A catalog of codecs keyed by namespace and type id. A registry is
/// mutable while it is being populated; engines take an [`Arc`] snapshot so
/// that any number of concurrent operations can read it safely.
#[derive(Clone, Default)]
pub struct Registry {
    namespaces: HashMap<String, NamespaceEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a codec for a namespace and type id. Fails if the pair is
    /// already registered.
    pub fn register<N>(
        &mut self,
        namespace: N,
        type_id: u32,
        codec: Arc<dyn TypeCodec>,
    ) -> Result<(), EngineError>
    where
        N: Into<String>,
    {
        let namespace = namespace.into();
        let entry = self.namespaces.entry(namespace.clone()).or_default();
        if entry.codecs.contains_key(&type_id) {
            return Err(EngineError::AlreadyRegistered { namespace, type_id });
        }
        entry.codecs.insert(type_id, codec);
        debug!(namespace = %namespace, type_id, "Registered a custom type codec.");
        Ok(())
    }

    /// Register a handler that catches every type id in a namespace that has
    /// no dedicated codec.
    pub fn register_fallback<N>(
        &mut self,
        namespace: N,
        handler: Arc<dyn NamespaceFallback>,
    ) -> Result<(), EngineError>
    where
        N: Into<String>,
    {
        let namespace = namespace.into();
        let entry = self.namespaces.entry(namespace.clone()).or_default();
        if entry.fallback.is_some() {
            return Err(EngineError::FallbackAlreadyRegistered { namespace });
        }
        entry.fallback = Some(handler);
        debug!(namespace = %namespace, "Registered a namespace fallback handler.");
        Ok(())
    }

    /// Resolve a namespace and type id to a codec, falling back to the
    /// namespace handler when no dedicated codec exists.
    pub fn lookup(&self, namespace: &str, type_id: u32) -> Lookup<'_> {
        match self.namespaces.get(namespace) {
            Some(entry) => match entry.codecs.get(&type_id) {
                Some(codec) => Lookup::Codec(codec),
                None => match &entry.fallback {
                    Some(handler) => Lookup::Fallback(handler),
                    None => Lookup::UnknownType,
                },
            },
            None => Lookup::UnknownNamespace,
        }
    }

    /// The set of registered namespace names.
    pub fn namespaces(&self) -> HashSet<String> {
        self.namespaces.keys().cloned().collect()
    }

    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }
}

/// A registry shared between threads. Mutation is only safe between
/// operations; engines work against the frozen snapshot produced by
/// [`SharedRegistry::snapshot`].
#[derive(Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        SharedRegistry::default()
    }

    pub fn register<N>(
        &self,
        namespace: N,
        type_id: u32,
        codec: Arc<dyn TypeCodec>,
    ) -> Result<(), EngineError>
    where
        N: Into<String>,
    {
        self.inner.write().register(namespace, type_id, codec)
    }

    pub fn register_fallback<N>(
        &self,
        namespace: N,
        handler: Arc<dyn NamespaceFallback>,
    ) -> Result<(), EngineError>
    where
        N: Into<String>,
    {
        self.inner.write().register_fallback(namespace, handler)
    }

    pub fn namespaces(&self) -> HashSet<String> {
        self.inner.read().namespaces()
    }

    /// Freeze the current contents into a snapshot for use by an engine.
    pub fn snapshot(&self) -> Arc<Registry> {
        Arc::new(self.inner.read().clone())
    }
}
