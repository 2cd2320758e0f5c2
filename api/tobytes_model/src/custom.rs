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

use std::fmt::{Debug, Display, Formatter};

use crate::Object;

/// The namespace field of a custom-type envelope as it appears on the wire;
/// either the namespace string itself or an integer bound to it by an
/// enclosing namespace-id mapping.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum NamespaceRef {
    Name(String),
    Id(u64),
}

impl NamespaceRef {
    pub fn name<T: Into<String>>(name: T) -> Self {
        NamespaceRef::Name(name.into())
    }

    pub fn id(id: u64) -> Self {
        NamespaceRef::Id(id)
    }
}

impl Debug for NamespaceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespaceRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            NamespaceRef::Id(id) => f.debug_tuple("Id").field(id).finish(),
        }
    }
}

impl Display for NamespaceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespaceRef::Name(name) => write!(f, "{}", name),
            NamespaceRef::Id(id) => write!(f, "#{}", id),
        }
    }
}

impl From<&str> for NamespaceRef {
    fn from(name: &str) -> Self {
        NamespaceRef::Name(name.to_owned())
    }
}

impl From<String> for NamespaceRef {
    fn from(name: String) -> Self {
        NamespaceRef::Name(name)
    }
}

impl From<u64> for NamespaceRef {
    fn from(id: u64) -> Self {
        NamespaceRef::Id(id)
    }
}

/// An instance of a registered custom type. The body is the logical value
/// that the registered codec for `(namespace, type_id)` turns into payload
/// bytes and back.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomValue {
    pub namespace: String,
    pub type_id: u32,
    pub body: Box<Object>,
}

impl CustomValue {
    pub fn new<T: Into<String>>(namespace: T, type_id: u32, body: Object) -> Self {
        CustomValue {
            namespace: namespace.into(),
            type_id,
            body: Box::new(body),
        }
    }
}

/// A custom type that could not be resolved against the registry, preserved
/// verbatim. The namespace is kept in its wire form so that re-encoding the
/// value reproduces the original bytes exactly.
#[derive(Clone, PartialEq, Eq)]
pub struct RawCustom {
    pub namespace: NamespaceRef,
    pub type_id: u32,
    pub bytes: Vec<u8>,
}

impl RawCustom {
    pub fn new<N: Into<NamespaceRef>>(namespace: N, type_id: u32, bytes: Vec<u8>) -> Self {
        RawCustom {
            namespace: namespace.into(),
            type_id,
            bytes,
        }
    }
}

impl Debug for RawCustom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCustom")
            .field("namespace", &self.namespace)
            .field("type_id", &self.type_id)
            .field("len", &self.bytes.len())
            .finish()
    }
}
